//! Stellar atmosphere model selection for synthetic photometry.
//!
//! This crate decides which published model-atmosphere grid to query for a
//! requested (metallicity, effective temperature, surface gravity) point,
//! snaps the request onto the nearest defined grid node where a grid has
//! fixed node spacing, and stitches grids with overlapping validity ranges
//! into one continuous temperature axis.
//!
//! The actual flux interpolation is delegated to an external catalog
//! interpolator through the [`CatalogInterpolator`] trait; this crate only
//! implements the selection policy and validates what comes back.
//!
//! # Supported model families
//!
//! Kurucz 1993, Castelli & Kurucz 2004 (ATLAS), NextGen, AMES-Dusty,
//! PHOENIX BT-Settl, PHOENIX v16 (Husser+13), CMFGEN (Fierro+15, rotating
//! and non-rotating), and a linear ATLAS/PHOENIX merge covering the
//! transition region between the two.
//!
//! # Example
//!
//! ```
//! use atmos::{get_merged_atmosphere, AtmosphereRequest, CatalogInterpolator,
//!             ResolvedQuery, Resolution, Spectrum};
//!
//! struct FlatCatalog;
//!
//! impl CatalogInterpolator for FlatCatalog {
//!     fn interpolate(&self, _query: &ResolvedQuery) -> Result<Spectrum, atmos::AtmosError> {
//!         Spectrum::from_vecs(vec![3000.0, 4000.0, 5000.0], vec![1.0, 1.0, 1.0])
//!     }
//! }
//!
//! let request = AtmosphereRequest::new(0.0, 4500.0, 4.0);
//! match get_merged_atmosphere(request, &FlatCatalog).unwrap() {
//!     Resolution::Model(model) => {
//!         // 4500 K routes to the PHOENIX v16 grid
//!         assert_eq!(model.query.catalog, "phoenix_v16_rebin");
//!     }
//!     Resolution::NoModel(rejection) => panic!("unexpected rejection: {rejection}"),
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod resolver;
pub mod spectrum;

pub use catalog::{CatalogInterpolator, ResolvedQuery};
pub use error::AtmosError;
pub use fetch::{get_model_atmosphere, ModelAtmosphere, NoModel, RejectReason, Resolution};
pub use grid::{AtmosphereRequest, GridFamily, ModelGrid};
pub use resolver::{get_merged_atmosphere, BandRange, BandTable, TemperatureBand};
pub use spectrum::Spectrum;
