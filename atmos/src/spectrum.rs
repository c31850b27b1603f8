//! Flux-vs-wavelength spectrum as returned by the catalog interpolator.

use ndarray::Array1;

use crate::error::AtmosError;

/// A model atmosphere spectrum: parallel wavelength and flux arrays.
///
/// Wavelengths are in Angstroms and strictly increasing; fluxes are in
/// erg s⁻¹ cm⁻² Å⁻¹ (cdbs FLAM convention). Both constraints are checked at
/// construction so downstream photometry can integrate without re-validating.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelength: Array1<f64>,
    flux: Array1<f64>,
}

impl Spectrum {
    /// Build a spectrum from wavelength and flux arrays.
    ///
    /// # Errors
    ///
    /// Returns [`AtmosError::MismatchedArrays`] if the arrays differ in
    /// length, or [`AtmosError::NonMonotonicWavelength`] if the wavelength
    /// axis is not strictly increasing.
    pub fn new(wavelength: Array1<f64>, flux: Array1<f64>) -> Result<Self, AtmosError> {
        if wavelength.len() != flux.len() {
            return Err(AtmosError::MismatchedArrays {
                wavelengths: wavelength.len(),
                fluxes: flux.len(),
            });
        }
        for i in 1..wavelength.len() {
            if wavelength[i] <= wavelength[i - 1] {
                return Err(AtmosError::NonMonotonicWavelength { index: i });
            }
        }
        Ok(Self { wavelength, flux })
    }

    /// Convenience constructor from plain vectors.
    pub fn from_vecs(wavelength: Vec<f64>, flux: Vec<f64>) -> Result<Self, AtmosError> {
        Self::new(Array1::from_vec(wavelength), Array1::from_vec(flux))
    }

    /// A spectrum with the given wavelength axis and zero flux everywhere.
    ///
    /// This is the sentinel the catalog interpolator returns for requests
    /// outside its grid's convex hull.
    pub fn zero_flux(wavelength: Array1<f64>) -> Result<Self, AtmosError> {
        let flux = Array1::zeros(wavelength.len());
        Self::new(wavelength, flux)
    }

    /// Wavelength axis in Angstroms.
    pub fn wavelength(&self) -> &Array1<f64> {
        &self.wavelength
    }

    /// Flux values parallel to the wavelength axis.
    pub fn flux(&self) -> &Array1<f64> {
        &self.flux
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    /// Whether the spectrum has no samples.
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// True when every flux value is exactly zero.
    ///
    /// The catalog interpolator signals "no model at this grid point" by
    /// returning an all-zero spectrum instead of failing.
    pub fn is_flux_all_zero(&self) -> bool {
        self.flux.iter().all(|&f| f == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_spectrum() {
        let sp = Spectrum::from_vecs(vec![3000.0, 4000.0, 5000.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(sp.len(), 3);
        assert!(!sp.is_flux_all_zero());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = Spectrum::from_vecs(vec![3000.0, 4000.0], vec![1.0]);
        assert!(matches!(
            result,
            Err(AtmosError::MismatchedArrays {
                wavelengths: 2,
                fluxes: 1
            })
        ));
    }

    #[test]
    fn test_non_monotonic_wavelength_rejected() {
        let result = Spectrum::from_vecs(vec![3000.0, 3000.0, 5000.0], vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(AtmosError::NonMonotonicWavelength { index: 1 })
        ));

        let result = Spectrum::from_vecs(vec![3000.0, 2000.0], vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(AtmosError::NonMonotonicWavelength { index: 1 })
        ));
    }

    #[test]
    fn test_zero_flux_sentinel() {
        let sp = Spectrum::zero_flux(Array1::from_vec(vec![3000.0, 4000.0])).unwrap();
        assert!(sp.is_flux_all_zero());
        assert_eq!(sp.len(), 2);
    }

    #[test]
    fn test_empty_spectrum_is_all_zero() {
        let sp = Spectrum::from_vecs(vec![], vec![]).unwrap();
        assert!(sp.is_empty());
        assert!(sp.is_flux_all_zero());
    }
}
