//! The merged-atmosphere resolver: temperature-band dispatch over the
//! single-grid fetchers.
//!
//! Cool stars use PHOENIX-type atmospheres, the 5000-5500 K transition uses
//! a linear ATLAS/PHOENIX merge, and hotter stars use the ATLAS (ck04) grid.
//! The dispatch is a data-driven ordered list of temperature bands validated
//! at construction; the resolver itself performs no snapping, it only picks
//! a family and forwards the request unchanged.
//!
//! The reference policy uses strict inequalities on every band, so the
//! boundary temperatures 5000 K and 5500 K fall in no band at all. Those
//! gaps are preserved deliberately and reported as a structured
//! [`RejectReason::BandGap`] rejection rather than closed silently.

use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::catalog::CatalogInterpolator;
use crate::error::AtmosError;
use crate::fetch::{get_model_atmosphere, NoModel, RejectReason, Resolution};
use crate::grid::{AtmosphereRequest, GridFamily};

/// Above this temperature no dedicated hot-star grid is wired in yet and
/// ATLAS keeps being used. A CMFGEN band is the intended replacement once
/// that grid is complete.
pub const HOT_STAR_FALLBACK_TEMPERATURE: f64 = 20000.0;

/// A temperature interval with explicit open bounds, matching the strict
/// inequalities of the dispatch policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandRange {
    /// Matches `temperature < limit`.
    Below(f64),
    /// Matches `low < temperature < high`.
    Open(f64, f64),
    /// Matches `temperature > limit`.
    Above(f64),
}

impl BandRange {
    fn contains(&self, temperature: f64) -> bool {
        match *self {
            BandRange::Below(limit) => temperature < limit,
            BandRange::Open(low, high) => temperature > low && temperature < high,
            BandRange::Above(limit) => temperature > limit,
        }
    }

    /// Lower and upper edges, for ordering and overlap validation.
    fn edges(&self) -> (f64, f64) {
        match *self {
            BandRange::Below(limit) => (f64::NEG_INFINITY, limit),
            BandRange::Open(low, high) => (low, high),
            BandRange::Above(limit) => (limit, f64::INFINITY),
        }
    }
}

/// One band of the dispatch table: a temperature range and the family that
/// serves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureBand {
    pub range: BandRange,
    pub family: GridFamily,
}

/// An ordered, non-overlapping list of temperature bands.
///
/// Construction validates ordering and overlap so a misconfigured table
/// fails loudly up front instead of dispatching wrongly at runtime. Gaps
/// between bands are allowed (the reference policy has them) and show up
/// as [`RejectReason::BandGap`] rejections when hit.
#[derive(Debug, Clone)]
pub struct BandTable {
    bands: Vec<TemperatureBand>,
}

impl BandTable {
    /// Build a table, validating band ordering and non-overlap.
    pub fn new(bands: Vec<TemperatureBand>) -> Result<Self, AtmosError> {
        if bands.is_empty() {
            return Err(AtmosError::InvalidBandTable("no bands defined".into()));
        }
        for band in &bands {
            let (low, high) = band.range.edges();
            if low >= high {
                return Err(AtmosError::InvalidBandTable(format!(
                    "empty range {low}..{high} for {:?}",
                    band.family
                )));
            }
        }
        for pair in bands.windows(2) {
            let (_, previous_high) = pair[0].range.edges();
            let (next_low, _) = pair[1].range.edges();
            if previous_high > next_low {
                return Err(AtmosError::InvalidBandTable(format!(
                    "bands for {:?} and {:?} overlap",
                    pair[0].family, pair[1].family
                )));
            }
        }
        Ok(Self { bands })
    }

    /// The reference merged-atmosphere policy:
    /// PHOENIX v16 below 5000 K, the ATLAS/PHOENIX merge strictly between
    /// 5000 and 5500 K, ATLAS above 5500 K.
    pub fn merged() -> Self {
        Self::new(vec![
            TemperatureBand {
                range: BandRange::Below(5000.0),
                family: GridFamily::PhoenixV16,
            },
            TemperatureBand {
                range: BandRange::Open(5000.0, 5500.0),
                family: GridFamily::AtlasPhoenix,
            },
            TemperatureBand {
                range: BandRange::Above(5500.0),
                family: GridFamily::CastelliKurucz04,
            },
        ])
        .expect("reference band table is valid")
    }

    /// The family serving a temperature, or `None` in a band gap.
    pub fn select(&self, temperature: f64) -> Option<GridFamily> {
        self.bands
            .iter()
            .find(|band| band.range.contains(temperature))
            .map(|band| band.family)
    }

    pub fn bands(&self) -> &[TemperatureBand] {
        &self.bands
    }

    /// Dispatch a request through this table to the single-grid fetcher.
    ///
    /// The resolver forwards the request unchanged; all snapping and
    /// validation happens in the selected family's fetcher. The selected
    /// family is reported in the returned [`Resolution`].
    pub fn resolve<I: CatalogInterpolator>(
        &self,
        request: AtmosphereRequest,
        interpolator: &I,
    ) -> Result<Resolution, AtmosError> {
        let Some(family) = self.select(request.temperature) else {
            warn!(
                teff = request.temperature,
                mh = request.metallicity,
                logg = request.gravity,
                "temperature falls in a band gap; no model family selected"
            );
            return Ok(Resolution::NoModel(NoModel {
                family: None,
                reason: RejectReason::BandGap,
                request,
            }));
        };

        info!(
            family = ?family,
            teff = request.temperature,
            mh = request.metallicity,
            logg = request.gravity,
            "model family selected"
        );
        if request.temperature > HOT_STAR_FALLBACK_TEMPERATURE {
            warn!(
                family = ?family,
                teff = request.temperature,
                "no dedicated hot-star grid wired in; still using ATLAS at high temperatures"
            );
        }

        get_model_atmosphere(family, request, interpolator)
    }
}

static MERGED_BANDS: Lazy<BandTable> = Lazy::new(BandTable::merged);

/// Resolve a request through the reference merged-atmosphere policy.
pub fn get_merged_atmosphere<I: CatalogInterpolator>(
    request: AtmosphereRequest,
    interpolator: &I,
) -> Result<Resolution, AtmosError> {
    MERGED_BANDS.resolve(request, interpolator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResolvedQuery;
    use crate::spectrum::Spectrum;
    use std::cell::RefCell;

    struct RecordingCatalog {
        calls: RefCell<Vec<ResolvedQuery>>,
    }

    impl RecordingCatalog {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CatalogInterpolator for RecordingCatalog {
        fn interpolate(&self, query: &ResolvedQuery) -> Result<Spectrum, AtmosError> {
            self.calls.borrow_mut().push(query.clone());
            Spectrum::from_vecs(vec![3000.0, 4000.0, 5000.0], vec![1.0, 1.0, 1.0])
        }
    }

    #[test]
    fn test_band_selection() {
        let table = BandTable::merged();
        assert_eq!(table.select(4999.0), Some(GridFamily::PhoenixV16));
        assert_eq!(table.select(5200.0), Some(GridFamily::AtlasPhoenix));
        assert_eq!(table.select(6000.0), Some(GridFamily::CastelliKurucz04));
        assert_eq!(table.select(30000.0), Some(GridFamily::CastelliKurucz04));

        // The strict-inequality gaps at the band edges.
        assert_eq!(table.select(5000.0), None);
        assert_eq!(table.select(5500.0), None);
    }

    #[test]
    fn test_resolver_routes_to_expected_catalogs() {
        for (temperature, catalog) in [
            (4999.0, "phoenix_v16_rebin"),
            (5200.0, "merged"),
            (6000.0, "ck04models"),
        ] {
            let interpolator = RecordingCatalog::new();
            let request = AtmosphereRequest::new(0.0, temperature, 4.0);
            let resolution = get_merged_atmosphere(request, &interpolator).unwrap();
            assert!(!resolution.is_no_model(), "{temperature} K was rejected");
            assert_eq!(interpolator.calls.borrow()[0].catalog, catalog);
        }
    }

    #[test]
    fn test_boundary_gap_returns_no_model_without_querying() {
        let interpolator = RecordingCatalog::new();
        let request = AtmosphereRequest::new(0.0, 5000.0, 4.0);
        let resolution = get_merged_atmosphere(request, &interpolator).unwrap();

        match resolution {
            Resolution::NoModel(rejection) => {
                assert_eq!(rejection.family, None);
                assert_eq!(rejection.reason, RejectReason::BandGap);
                assert_eq!(rejection.request, request);
            }
            Resolution::Model(_) => panic!("5000 K must fall in the band gap"),
        }
        assert!(interpolator.calls.borrow().is_empty());
    }

    #[test]
    fn test_resolver_forwards_request_unchanged() {
        // The dispatcher does no snapping of its own; the fetcher snaps
        // 6120 K onto the ck04 grid.
        let interpolator = RecordingCatalog::new();
        let request = AtmosphereRequest::new(-0.5, 6120.0, 4.3);
        let resolution = get_merged_atmosphere(request, &interpolator).unwrap();

        assert_eq!(resolution.family(), Some(GridFamily::CastelliKurucz04));
        let query = interpolator.calls.borrow()[0].clone();
        assert_eq!(query.temperature, 6000.0);
        assert_eq!(query.metallicity, -0.5);
        assert_eq!(query.gravity, 4.5);
    }

    #[test]
    fn test_hot_stars_still_use_atlas() {
        let interpolator = RecordingCatalog::new();
        let request = AtmosphereRequest::new(0.0, 35000.0, 4.0);
        let resolution = get_merged_atmosphere(request, &interpolator).unwrap();
        assert_eq!(resolution.family(), Some(GridFamily::CastelliKurucz04));
        assert_eq!(interpolator.calls.borrow()[0].catalog, "ck04models");
    }

    #[test]
    fn test_band_table_rejects_overlap() {
        let result = BandTable::new(vec![
            TemperatureBand {
                range: BandRange::Below(5000.0),
                family: GridFamily::PhoenixV16,
            },
            TemperatureBand {
                range: BandRange::Open(4000.0, 5500.0),
                family: GridFamily::AtlasPhoenix,
            },
        ]);
        assert!(matches!(result, Err(AtmosError::InvalidBandTable(_))));
    }

    #[test]
    fn test_band_table_rejects_empty_range() {
        let result = BandTable::new(vec![TemperatureBand {
            range: BandRange::Open(5500.0, 5000.0),
            family: GridFamily::AtlasPhoenix,
        }]);
        assert!(matches!(result, Err(AtmosError::InvalidBandTable(_))));
    }

    #[test]
    fn test_band_table_rejects_empty_table() {
        assert!(matches!(
            BandTable::new(vec![]),
            Err(AtmosError::InvalidBandTable(_))
        ));
    }

    #[test]
    fn test_custom_table_with_cmfgen_band() {
        // The table is a value; callers can wire a CMFGEN band in once that
        // grid is complete.
        let table = BandTable::new(vec![
            TemperatureBand {
                range: BandRange::Below(5000.0),
                family: GridFamily::PhoenixV16,
            },
            TemperatureBand {
                range: BandRange::Open(5500.0, 20000.0),
                family: GridFamily::CastelliKurucz04,
            },
            TemperatureBand {
                range: BandRange::Above(20000.0),
                family: GridFamily::CmfgenRot,
            },
        ])
        .unwrap();

        assert_eq!(table.select(25000.0), Some(GridFamily::CmfgenRot));

        let interpolator = RecordingCatalog::new();
        let request = AtmosphereRequest::new(0.0, 30000.0, 4.14);
        let resolution = table.resolve(request, &interpolator).unwrap();
        assert_eq!(resolution.family(), Some(GridFamily::CmfgenRot));
        assert_eq!(interpolator.calls.borrow()[0].catalog, "cmfgenF15_rot");
    }
}
