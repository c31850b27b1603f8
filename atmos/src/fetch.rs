//! The generic single-grid fetcher.
//!
//! One operation serves every model family, driven by the family's
//! [`ModelGrid`] descriptor: validate the raw request against the family's
//! hard bounds, snap temperature and gravity independently onto the nearest
//! defined nodes, reject snaps that land too far from the request, apply the
//! family's gravity clamp, then delegate to the external interpolator and
//! flag all-zero flux results.

use std::fmt;

use tracing::{debug, warn};

use crate::catalog::{CatalogInterpolator, ResolvedQuery};
use crate::error::AtmosError;
use crate::grid::{AtmosphereRequest, GridFamily, ModelGrid};
use crate::spectrum::Spectrum;

/// Why a request was rejected without querying the interpolator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// The raw request falls outside the family's hard validity bounds.
    OutOfDomain,
    /// A nearest node exists but is farther from the request than the
    /// family tolerates on at least one axis.
    SnapTooFar {
        temperature_distance: f64,
        gravity_distance: f64,
    },
    /// The merged-atmosphere band table covers no band at this temperature.
    BandGap,
}

/// A structured rejection: which family said no, why, and for what request.
/// Every rejection names the family (when one was selected) and the three
/// input parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct NoModel {
    /// The family that rejected the request. `None` for band gaps, where
    /// no family was ever selected.
    pub family: Option<GridFamily>,
    pub reason: RejectReason,
    pub request: AtmosphereRequest,
}

impl fmt::Display for NoModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.family {
            Some(family) => write!(f, "no {family:?} model for ")?,
            None => write!(f, "no model family covers ")?,
        }
        write!(
            f,
            "Teff = {:.0} K, [M/H] = {:.1}, log g = {:.1}",
            self.request.temperature, self.request.metallicity, self.request.gravity
        )?;
        match self.reason {
            RejectReason::OutOfDomain => write!(f, " (outside grid domain)"),
            RejectReason::SnapTooFar {
                temperature_distance,
                gravity_distance,
            } => write!(
                f,
                " (nearest node too far: dT = {temperature_distance:.0} K, dlogg = {gravity_distance:.2})"
            ),
            RejectReason::BandGap => write!(f, " (temperature band gap)"),
        }
    }
}

/// A successfully fetched model atmosphere.
#[derive(Debug, Clone)]
pub struct ModelAtmosphere {
    /// The family that produced the spectrum.
    pub family: GridFamily,
    /// The snapped query as forwarded to the interpolator.
    pub query: ResolvedQuery,
    pub spectrum: Spectrum,
    /// True when the interpolator returned all-zero flux: the grid has a
    /// hole at this point. The spectrum is returned regardless; downstream
    /// photometry may have its own handling.
    pub degenerate: bool,
}

/// Outcome of a resolution call: a spectrum, or a structured rejection.
/// Rejections are expected-domain conditions, not errors.
#[derive(Debug, Clone)]
pub enum Resolution {
    Model(ModelAtmosphere),
    NoModel(NoModel),
}

impl Resolution {
    /// The spectrum, when one was fetched.
    pub fn spectrum(&self) -> Option<&Spectrum> {
        match self {
            Resolution::Model(model) => Some(&model.spectrum),
            Resolution::NoModel(_) => None,
        }
    }

    /// The family that handled the request, when one was selected.
    pub fn family(&self) -> Option<GridFamily> {
        match self {
            Resolution::Model(model) => Some(model.family),
            Resolution::NoModel(rejection) => rejection.family,
        }
    }

    pub fn is_no_model(&self) -> bool {
        matches!(self, Resolution::NoModel(_))
    }
}

/// Fetch a spectrum from a single model family.
///
/// Families with defined node arrays are snapped client-side; the rest are
/// passed straight through to the interpolator, which applies its own
/// nearest-neighbor logic. Metallicity is never snapped.
///
/// # Errors
///
/// Only hard interpolator faults surface as `Err`. Domain rejections come
/// back as [`Resolution::NoModel`].
pub fn get_model_atmosphere<I: CatalogInterpolator>(
    family: GridFamily,
    request: AtmosphereRequest,
    interpolator: &I,
) -> Result<Resolution, AtmosError> {
    let grid = ModelGrid::get(family);

    if grid.rejects(&request) {
        let rejection = NoModel {
            family: Some(family),
            reason: RejectReason::OutOfDomain,
            request,
        };
        warn!(
            family = ?family,
            teff = request.temperature,
            mh = request.metallicity,
            logg = request.gravity,
            "request outside grid domain"
        );
        return Ok(Resolution::NoModel(rejection));
    }

    let (temperature, temperature_distance) = match grid.snap_temperature(request.temperature) {
        Some(snap) => (snap.value, snap.distance),
        None => (request.temperature, 0.0),
    };
    let (gravity, gravity_distance) = match grid.snap_gravity(request.gravity) {
        Some(snap) => (snap.value, snap.distance),
        None => (request.gravity, 0.0),
    };

    let temperature_too_far = grid
        .max_temperature_snap
        .is_some_and(|tolerance| temperature_distance > tolerance);
    let gravity_too_far = grid
        .max_gravity_snap
        .is_some_and(|tolerance| gravity_distance > tolerance);
    if temperature_too_far || gravity_too_far {
        let rejection = NoModel {
            family: Some(family),
            reason: RejectReason::SnapTooFar {
                temperature_distance,
                gravity_distance,
            },
            request,
        };
        warn!(
            family = ?family,
            teff = request.temperature,
            mh = request.metallicity,
            logg = request.gravity,
            dt = temperature_distance,
            dlogg = gravity_distance,
            "nearest grid node too far from request"
        );
        return Ok(Resolution::NoModel(rejection));
    }

    let gravity = match grid.gravity_clamp {
        Some(floor) if gravity < floor => floor,
        _ => gravity,
    };

    let query = ResolvedQuery {
        catalog: grid.catalog,
        temperature,
        metallicity: request.metallicity,
        gravity,
    };
    debug!(
        family = ?family,
        catalog = query.catalog,
        teff = query.temperature,
        mh = query.metallicity,
        logg = query.gravity,
        "querying catalog interpolator"
    );

    let spectrum = interpolator.interpolate(&query)?;

    let degenerate = spectrum.is_flux_all_zero();
    if degenerate {
        warn!(
            family = ?family,
            teff = request.temperature,
            mh = request.metallicity,
            logg = request.gravity,
            "could not find a model atmosphere: interpolator returned all-zero flux"
        );
    }

    Ok(Resolution::Model(ModelAtmosphere {
        family,
        query,
        spectrum,
        degenerate,
    }))
}
