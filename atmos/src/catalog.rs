//! The seam to the external spectral-catalog interpolator.

use crate::error::AtmosError;
use crate::spectrum::Spectrum;

/// A fully resolved catalog query: the grid to ask and the snapped
/// parameters to ask it at. Produced by the fetcher, consumed by the
/// interpolator, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    /// Catalog identifier, e.g. `ck04models` or `phoenix_v16_rebin`.
    pub catalog: &'static str,
    /// Effective temperature in Kelvin, snapped where the family defines nodes.
    pub temperature: f64,
    /// Metallicity, forwarded from the request unchanged.
    pub metallicity: f64,
    /// Log surface gravity, snapped and clamped where the family requires it.
    pub gravity: f64,
}

/// Interface to the external catalog interpolator.
///
/// Implementations interpolate a pre-built grid of template spectra at the
/// query point. Requests outside the grid's convex hull must come back as an
/// all-zero flux [`Spectrum`] rather than an error; the resolver relies on
/// that sentinel for its degenerate-model diagnostic. Hard faults (missing
/// catalog files, I/O) are the only legitimate `Err` returns.
///
/// Calls may block on disk I/O; implementations are free to cache grid data
/// internally.
pub trait CatalogInterpolator {
    fn interpolate(&self, query: &ResolvedQuery) -> Result<Spectrum, AtmosError>;
}
