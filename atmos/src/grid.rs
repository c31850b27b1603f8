//! Model-grid descriptors and nearest-node snapping.
//!
//! Each published atmosphere-model family is described by a static
//! [`ModelGrid`] record: the catalog identifier the external interpolator
//! knows it by, the temperature/gravity node arrays where the family has
//! directly computed template spectra, hard validity bounds, and the
//! family-specific snapping tolerances and clamps. The single-grid fetcher
//! in [`crate::fetch`] is one generic operation driven entirely by these
//! records; there is no per-family branching code.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// A requested atmosphere point: metallicity [M/H], effective temperature
/// in Kelvin, and log surface gravity (cgs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereRequest {
    pub metallicity: f64,
    pub temperature: f64,
    pub gravity: f64,
}

impl AtmosphereRequest {
    pub fn new(metallicity: f64, temperature: f64, gravity: f64) -> Self {
        Self {
            metallicity,
            temperature,
            gravity,
        }
    }
}

/// The supported model-atmosphere families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridFamily {
    /// Kurucz (1993) ATLAS9 grid.
    Kurucz93,
    /// Castelli & Kurucz (2004) ATLAS9 grid.
    CastelliKurucz04,
    /// NextGen (Hauschildt+ 1999).
    NextGen,
    /// AMES-Dusty (Allard+ 2000).
    AmesDusty,
    /// PHOENIX BT-Settl (Allard+ 2011).
    PhoenixBtSettl,
    /// CMFGEN rotating models (Fierro+ 2015).
    CmfgenRot,
    /// CMFGEN non-rotating models (Fierro+ 2015).
    CmfgenNoRot,
    /// PHOENIX v16 (Husser+ 2013), rebinned to ATLAS resolution.
    /// The rebinned catalog is the default for spectrophotometry.
    PhoenixV16,
    /// PHOENIX v16 (Husser+ 2013) at native HiRes sampling.
    PhoenixV16HiRes,
    /// Linear ATLAS/PHOENIX merge covering the 5000-5500 K transition.
    AtlasPhoenix,
}

impl GridFamily {
    /// Every supported family, in dispatch-table order.
    pub const ALL: [GridFamily; 10] = [
        GridFamily::Kurucz93,
        GridFamily::CastelliKurucz04,
        GridFamily::NextGen,
        GridFamily::AmesDusty,
        GridFamily::PhoenixBtSettl,
        GridFamily::CmfgenRot,
        GridFamily::CmfgenNoRot,
        GridFamily::PhoenixV16,
        GridFamily::PhoenixV16HiRes,
        GridFamily::AtlasPhoenix,
    ];
}

/// Result of snapping a requested value onto a node array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    /// The nearest defined node value.
    pub value: f64,
    /// Absolute distance between the request and the node.
    pub distance: f64,
}

/// Static description of one atmosphere-model family.
///
/// Families without node arrays are passed straight to the external
/// interpolator, which applies its own nearest-neighbor logic internally.
#[derive(Debug, Clone)]
pub struct ModelGrid {
    pub family: GridFamily,
    /// Catalog identifier the external interpolator is queried with.
    pub catalog: &'static str,
    /// Defined temperature nodes in Kelvin, strictly increasing.
    pub temperature_nodes: Option<Vec<f64>>,
    /// Defined log g nodes, strictly increasing.
    pub gravity_nodes: Option<Vec<f64>>,
    /// Reject requests with temperature below this floor.
    pub min_temperature: Option<f64>,
    /// Reject requests with temperature above this ceiling.
    pub max_temperature: Option<f64>,
    /// Reject requests with gravity below this floor.
    pub min_gravity: Option<f64>,
    /// Maximum allowed temperature snap distance before rejecting.
    pub max_temperature_snap: Option<f64>,
    /// Maximum allowed gravity snap distance before rejecting.
    pub max_gravity_snap: Option<f64>,
    /// Raise post-snap gravity to at least this value. The ATLAS
    /// interpolator is known to fail below log g = 2.5 even though the
    /// grid defines lower nodes.
    pub gravity_clamp: Option<f64>,
    /// Metallicity values the family publishes. Informational only; the
    /// base policy never snaps or validates metallicity.
    pub metallicity_domain: &'static str,
    /// The documented default request for this family.
    pub default_request: AtmosphereRequest,
}

impl ModelGrid {
    /// Look up the static descriptor for a family.
    pub fn get(family: GridFamily) -> &'static ModelGrid {
        &REGISTRY[&family]
    }

    /// True when the raw request falls outside this family's hard bounds.
    pub fn rejects(&self, request: &AtmosphereRequest) -> bool {
        if let Some(floor) = self.min_temperature {
            if request.temperature < floor {
                return true;
            }
        }
        if let Some(ceiling) = self.max_temperature {
            if request.temperature > ceiling {
                return true;
            }
        }
        if let Some(floor) = self.min_gravity {
            if request.gravity < floor {
                return true;
            }
        }
        false
    }

    /// Snap a temperature onto the nearest defined node, or `None` when the
    /// family has no client-side temperature nodes.
    pub fn snap_temperature(&self, temperature: f64) -> Option<Snap> {
        self.temperature_nodes
            .as_deref()
            .map(|nodes| nearest_node(nodes, temperature))
    }

    /// Snap a gravity onto the nearest defined node, or `None` when the
    /// family has no client-side gravity nodes.
    pub fn snap_gravity(&self, gravity: f64) -> Option<Snap> {
        self.gravity_nodes
            .as_deref()
            .map(|nodes| nearest_node(nodes, gravity))
    }
}

/// Nearest node by L1 distance on a single axis. Ties go to the
/// lowest-index node so the choice is deterministic.
pub fn nearest_node(nodes: &[f64], value: f64) -> Snap {
    debug_assert!(!nodes.is_empty(), "node arrays are non-empty by construction");
    let mut best_index = 0;
    let mut best_distance = (nodes[0] - value).abs();
    for (index, &node) in nodes.iter().enumerate().skip(1) {
        let distance = (node - value).abs();
        if distance < best_distance {
            best_index = index;
            best_distance = distance;
        }
    }
    Snap {
        value: nodes[best_index],
        distance: best_distance,
    }
}

/// Build a strictly increasing node array from stepped segments
/// `(start, end, step)` with inclusive ends. Shared joints between
/// consecutive segments are deduplicated.
fn stepped_nodes(segments: &[(f64, f64, f64)]) -> Vec<f64> {
    let mut nodes: Vec<f64> = Vec::new();
    for &(start, end, step) in segments {
        let count = ((end - start) / step).round() as usize;
        for i in 0..=count {
            let value = start + i as f64 * step;
            if nodes.last().map_or(true, |&last| value > last + 1e-9) {
                nodes.push(value);
            }
        }
    }
    nodes
}

static REGISTRY: Lazy<HashMap<GridFamily, ModelGrid>> = Lazy::new(|| {
    let phoenix_v16_temperatures =
        stepped_nodes(&[(2300.0, 7000.0, 100.0), (7000.0, 12000.0, 200.0)]);
    let phoenix_v16_gravities = stepped_nodes(&[(2.0, 6.0, 0.5)]);

    let grids = vec![
        ModelGrid {
            family: GridFamily::Kurucz93,
            catalog: "k93models",
            temperature_nodes: None,
            gravity_nodes: None,
            min_temperature: None,
            max_temperature: None,
            min_gravity: None,
            max_temperature_snap: None,
            max_gravity_snap: None,
            gravity_clamp: None,
            metallicity_domain: "[Fe/H] +1.0 to -5.0",
            default_request: AtmosphereRequest::new(0.0, 20000.0, 4.0),
        },
        ModelGrid {
            family: GridFamily::CastelliKurucz04,
            catalog: "ck04models",
            temperature_nodes: Some(stepped_nodes(&[
                (3000.0, 13000.0, 250.0),
                (13000.0, 50000.0, 1000.0),
            ])),
            gravity_nodes: Some(stepped_nodes(&[(2.0, 5.0, 0.5)])),
            min_temperature: Some(3000.0),
            max_temperature: None,
            min_gravity: None,
            max_temperature_snap: None,
            max_gravity_snap: None,
            gravity_clamp: Some(2.5),
            metallicity_domain: "[Fe/H] 0.0 to -2.5",
            default_request: AtmosphereRequest::new(0.0, 20000.0, 4.0),
        },
        ModelGrid {
            family: GridFamily::NextGen,
            catalog: "nextgen",
            temperature_nodes: None,
            gravity_nodes: None,
            min_temperature: None,
            max_temperature: None,
            min_gravity: None,
            max_temperature_snap: None,
            max_gravity_snap: None,
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 5000.0, 4.0),
        },
        ModelGrid {
            family: GridFamily::AmesDusty,
            catalog: "AMESdusty",
            temperature_nodes: None,
            gravity_nodes: None,
            min_temperature: None,
            max_temperature: None,
            min_gravity: None,
            max_temperature_snap: None,
            max_gravity_snap: None,
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 5000.0, 4.0),
        },
        ModelGrid {
            family: GridFamily::PhoenixBtSettl,
            catalog: "phoenix",
            temperature_nodes: None,
            gravity_nodes: None,
            min_temperature: None,
            max_temperature: None,
            min_gravity: None,
            max_temperature_snap: None,
            max_gravity_snap: None,
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 5000.0, 4.0),
        },
        ModelGrid {
            family: GridFamily::CmfgenRot,
            catalog: "cmfgenF15_rot",
            temperature_nodes: None,
            gravity_nodes: None,
            min_temperature: None,
            max_temperature: None,
            min_gravity: None,
            max_temperature_snap: None,
            max_gravity_snap: None,
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 30000.0, 4.14),
        },
        ModelGrid {
            family: GridFamily::CmfgenNoRot,
            catalog: "cmfgenF15_noRot",
            temperature_nodes: None,
            gravity_nodes: None,
            min_temperature: None,
            max_temperature: None,
            min_gravity: None,
            max_temperature_snap: None,
            max_gravity_snap: None,
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 30000.0, 4.14),
        },
        ModelGrid {
            family: GridFamily::PhoenixV16,
            catalog: "phoenix_v16_rebin",
            temperature_nodes: Some(phoenix_v16_temperatures.clone()),
            gravity_nodes: Some(phoenix_v16_gravities.clone()),
            min_temperature: Some(2300.0),
            max_temperature: Some(12000.0),
            min_gravity: Some(2.0),
            max_temperature_snap: Some(100.0),
            max_gravity_snap: Some(0.5),
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 4000.0, 4.0),
        },
        ModelGrid {
            family: GridFamily::PhoenixV16HiRes,
            catalog: "phoenix_v16",
            temperature_nodes: Some(phoenix_v16_temperatures),
            gravity_nodes: Some(phoenix_v16_gravities),
            min_temperature: Some(2300.0),
            max_temperature: Some(12000.0),
            min_gravity: Some(2.0),
            max_temperature_snap: Some(100.0),
            max_gravity_snap: Some(0.5),
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 4000.0, 4.0),
        },
        ModelGrid {
            family: GridFamily::AtlasPhoenix,
            catalog: "merged",
            temperature_nodes: Some(vec![5250.0]),
            gravity_nodes: Some(stepped_nodes(&[(0.0, 5.0, 0.5)])),
            min_temperature: Some(5000.0),
            max_temperature: Some(5500.0),
            min_gravity: None,
            max_temperature_snap: Some(250.0),
            max_gravity_snap: Some(0.5),
            gravity_clamp: None,
            metallicity_domain: "[M/H] solar",
            default_request: AtmosphereRequest::new(0.0, 4000.0, 4.0),
        },
    ];

    let registry: HashMap<GridFamily, ModelGrid> =
        grids.into_iter().map(|grid| (grid.family, grid)).collect();

    // Node arrays must be strictly increasing and non-empty for every grid
    // that performs snapping.
    for grid in registry.values() {
        for nodes in [&grid.temperature_nodes, &grid.gravity_nodes]
            .into_iter()
            .flatten()
        {
            assert!(!nodes.is_empty(), "{:?}: empty node array", grid.family);
            assert!(
                nodes.windows(2).all(|pair| pair[0] < pair[1]),
                "{:?}: node array not strictly increasing",
                grid.family
            );
        }
    }

    registry
});

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_registry_covers_all_families() {
        for family in GridFamily::ALL {
            let grid = ModelGrid::get(family);
            assert_eq!(grid.family, family);
        }
    }

    #[test]
    fn test_castelli_node_arrays() {
        let grid = ModelGrid::get(GridFamily::CastelliKurucz04);
        let temps = grid.temperature_nodes.as_ref().unwrap();

        // 3000..=13000 by 250 (41 nodes) plus 14000..=50000 by 1000 (37 nodes,
        // the shared 13000 joint deduplicated).
        assert_eq!(temps.len(), 78);
        assert_relative_eq!(temps[0], 3000.0);
        assert_relative_eq!(*temps.last().unwrap(), 50000.0);
        assert_relative_eq!(temps[40], 13000.0);
        assert_relative_eq!(temps[41], 14000.0);

        let gravs = grid.gravity_nodes.as_ref().unwrap();
        assert_eq!(gravs.len(), 7);
        assert_relative_eq!(gravs[0], 2.0);
        assert_relative_eq!(*gravs.last().unwrap(), 5.0);
    }

    #[test]
    fn test_phoenix_v16_node_arrays() {
        let grid = ModelGrid::get(GridFamily::PhoenixV16);
        let temps = grid.temperature_nodes.as_ref().unwrap();

        // 2300..=7000 by 100 (48 nodes) plus 7200..=12000 by 200 (25 nodes).
        assert_eq!(temps.len(), 73);
        assert_relative_eq!(temps[0], 2300.0);
        assert_relative_eq!(temps[47], 7000.0);
        assert_relative_eq!(temps[48], 7200.0);
        assert_relative_eq!(*temps.last().unwrap(), 12000.0);

        let gravs = grid.gravity_nodes.as_ref().unwrap();
        assert_eq!(gravs.len(), 9);
        assert_relative_eq!(gravs[0], 2.0);
        assert_relative_eq!(*gravs.last().unwrap(), 6.0);
    }

    #[test]
    fn test_atlas_phoenix_nodes() {
        let grid = ModelGrid::get(GridFamily::AtlasPhoenix);
        assert_eq!(grid.temperature_nodes.as_ref().unwrap().as_slice(), &[5250.0]);
        assert_eq!(grid.gravity_nodes.as_ref().unwrap().len(), 11);
    }

    #[test]
    fn test_pass_through_families_have_no_nodes() {
        for family in [
            GridFamily::Kurucz93,
            GridFamily::NextGen,
            GridFamily::AmesDusty,
            GridFamily::PhoenixBtSettl,
            GridFamily::CmfgenRot,
            GridFamily::CmfgenNoRot,
        ] {
            let grid = ModelGrid::get(family);
            assert!(grid.temperature_nodes.is_none());
            assert!(grid.gravity_nodes.is_none());
        }
    }

    #[test]
    fn test_snap_is_idempotent_on_grid_nodes() {
        for family in [
            GridFamily::CastelliKurucz04,
            GridFamily::PhoenixV16,
            GridFamily::AtlasPhoenix,
        ] {
            let grid = ModelGrid::get(family);
            for &node in grid.temperature_nodes.as_ref().unwrap() {
                let snap = grid.snap_temperature(node).unwrap();
                assert_relative_eq!(snap.value, node);
                assert_relative_eq!(snap.distance, 0.0);
            }
            for &node in grid.gravity_nodes.as_ref().unwrap() {
                let snap = grid.snap_gravity(node).unwrap();
                assert_relative_eq!(snap.value, node);
                assert_relative_eq!(snap.distance, 0.0);
            }
        }
    }

    #[test]
    fn test_nearest_node_tie_breaks_to_lowest_index() {
        // 3125 is equidistant from the 3000 and 3250 ck04 nodes.
        let grid = ModelGrid::get(GridFamily::CastelliKurucz04);
        let snap = grid.snap_temperature(3125.0).unwrap();
        assert_relative_eq!(snap.value, 3000.0);
        assert_relative_eq!(snap.distance, 125.0);
    }

    #[test]
    fn test_nearest_node_independent_axes() {
        let grid = ModelGrid::get(GridFamily::CastelliKurucz04);
        let t = grid.snap_temperature(21337.0).unwrap();
        let g = grid.snap_gravity(4.9).unwrap();
        assert_relative_eq!(t.value, 21000.0);
        assert_relative_eq!(t.distance, 337.0);
        assert_relative_eq!(g.value, 5.0);
        assert_relative_eq!(g.distance, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_hard_bounds() {
        let pv16 = ModelGrid::get(GridFamily::PhoenixV16);
        assert!(pv16.rejects(&AtmosphereRequest::new(0.0, 2200.0, 4.0)));
        assert!(pv16.rejects(&AtmosphereRequest::new(0.0, 12500.0, 4.0)));
        assert!(pv16.rejects(&AtmosphereRequest::new(0.0, 5000.0, 1.9)));
        assert!(!pv16.rejects(&AtmosphereRequest::new(0.0, 5000.0, 2.0)));

        let ck04 = ModelGrid::get(GridFamily::CastelliKurucz04);
        assert!(ck04.rejects(&AtmosphereRequest::new(0.0, 2999.0, 4.0)));
        assert!(!ck04.rejects(&AtmosphereRequest::new(0.0, 3000.0, 4.0)));
        // Requests above the last node are snapped, not rejected.
        assert!(!ck04.rejects(&AtmosphereRequest::new(0.0, 60000.0, 4.0)));

        let merge = ModelGrid::get(GridFamily::AtlasPhoenix);
        assert!(merge.rejects(&AtmosphereRequest::new(0.0, 4999.0, 4.0)));
        assert!(merge.rejects(&AtmosphereRequest::new(0.0, 5501.0, 4.0)));
        assert!(!merge.rejects(&AtmosphereRequest::new(0.0, 5000.0, 4.0)));
        assert!(!merge.rejects(&AtmosphereRequest::new(0.0, 5500.0, 4.0)));
    }

    #[test]
    fn test_family_defaults() {
        assert_eq!(
            ModelGrid::get(GridFamily::Kurucz93).default_request,
            AtmosphereRequest::new(0.0, 20000.0, 4.0)
        );
        assert_eq!(
            ModelGrid::get(GridFamily::CmfgenRot).default_request,
            AtmosphereRequest::new(0.0, 30000.0, 4.14)
        );
        assert_eq!(
            ModelGrid::get(GridFamily::PhoenixV16).default_request,
            AtmosphereRequest::new(0.0, 4000.0, 4.0)
        );
    }

    #[test]
    fn test_catalog_identifiers() {
        assert_eq!(ModelGrid::get(GridFamily::Kurucz93).catalog, "k93models");
        assert_eq!(
            ModelGrid::get(GridFamily::CastelliKurucz04).catalog,
            "ck04models"
        );
        assert_eq!(
            ModelGrid::get(GridFamily::PhoenixV16).catalog,
            "phoenix_v16_rebin"
        );
        assert_eq!(
            ModelGrid::get(GridFamily::PhoenixV16HiRes).catalog,
            "phoenix_v16"
        );
        assert_eq!(ModelGrid::get(GridFamily::AtlasPhoenix).catalog, "merged");
    }
}
