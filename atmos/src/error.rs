//! Error types for atmosphere resolution.

use thiserror::Error;

/// Errors that can occur while resolving a model atmosphere.
///
/// Expected-domain rejections (request outside a grid's validity range,
/// snap distance over tolerance, temperature in a band gap) are not errors;
/// they are reported as [`crate::fetch::NoModel`] values. This enum covers
/// genuine faults: interpolator I/O failures and malformed data.
#[derive(Debug, Error)]
pub enum AtmosError {
    /// The external catalog interpolator failed outright (I/O, missing
    /// catalog files). Out-of-domain lookups are not reported this way;
    /// those come back as all-zero flux spectra.
    #[error("catalog lookup failed for '{catalog}': {message}")]
    Catalog { catalog: String, message: String },

    /// Wavelength and flux arrays of a spectrum differ in length.
    #[error("wavelength and flux arrays must have the same length ({wavelengths} vs {fluxes})")]
    MismatchedArrays { wavelengths: usize, fluxes: usize },

    /// The wavelength axis of a spectrum is not strictly increasing.
    #[error("wavelength axis must be strictly increasing (violated at index {index})")]
    NonMonotonicWavelength { index: usize },

    /// A temperature band table failed construction-time validation.
    #[error("invalid temperature band table: {0}")]
    InvalidBandTable(String),
}
