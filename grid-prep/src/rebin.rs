//! Flux-conserving rebinning of spectra onto a coarser wavelength grid.
//!
//! Used to rebin the native-resolution PHOENIX v16 spectra onto the ATLAS
//! ck04 wavelength grid, which makes downstream spectrophotometry much
//! faster. Each target sample is the mean flux density over its bin,
//! integrated with the trapezoid rule on the source sampling, so total flux
//! over any span of whole bins is preserved.

/// Linear interpolation of `flux` at `x`, clamped to the end samples.
fn interpolate(wave: &[f64], flux: &[f64], x: f64) -> f64 {
    if x <= wave[0] {
        return flux[0];
    }
    if x >= wave[wave.len() - 1] {
        return flux[flux.len() - 1];
    }
    let i = wave.partition_point(|&w| w < x);
    let (w0, w1) = (wave[i - 1], wave[i]);
    let (f0, f1) = (flux[i - 1], flux[i]);
    f0 + (f1 - f0) * (x - w0) / (w1 - w0)
}

/// Trapezoid integral of the sampled flux over `[lo, hi]`.
fn integrate(wave: &[f64], flux: &[f64], lo: f64, hi: f64) -> f64 {
    let mut total = 0.0;
    let mut previous_w = lo;
    let mut previous_f = interpolate(wave, flux, lo);

    let start = wave.partition_point(|&w| w <= lo);
    for i in start..wave.len() {
        if wave[i] >= hi {
            break;
        }
        total += 0.5 * (previous_f + flux[i]) * (wave[i] - previous_w);
        previous_w = wave[i];
        previous_f = flux[i];
    }
    total += 0.5 * (previous_f + interpolate(wave, flux, hi)) * (hi - previous_w);
    total
}

/// Rebin a spectrum onto a target wavelength grid.
///
/// Target bins are bounded by midpoints between consecutive target
/// wavelengths; each output value is the bin-averaged flux density over the
/// part of the bin the source spectrum covers. Bins entirely outside the
/// source coverage come back as zero.
///
/// # Panics
///
/// Panics if the source arrays differ in length or either grid has fewer
/// than two points; callers feed whole grid files, never fragments.
pub fn rebin_spec(wave: &[f64], flux: &[f64], target: &[f64]) -> Vec<f64> {
    assert_eq!(wave.len(), flux.len(), "wavelength/flux length mismatch");
    assert!(wave.len() >= 2, "source grid too small to rebin");
    assert!(target.len() >= 2, "target grid too small to rebin");

    let coverage = (wave[0], wave[wave.len() - 1]);
    let mut rebinned = Vec::with_capacity(target.len());

    for i in 0..target.len() {
        let lower = if i == 0 {
            target[0] - 0.5 * (target[1] - target[0])
        } else {
            0.5 * (target[i - 1] + target[i])
        };
        let upper = if i == target.len() - 1 {
            target[i] + 0.5 * (target[i] - target[i - 1])
        } else {
            0.5 * (target[i] + target[i + 1])
        };

        let lo = lower.max(coverage.0);
        let hi = upper.min(coverage.1);
        if lo >= hi {
            rebinned.push(0.0);
            continue;
        }
        rebinned.push(integrate(wave, flux, lo, hi) / (hi - lo));
    }

    rebinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fine_grid(start: f64, end: f64, n: usize) -> Vec<f64> {
        let step = (end - start) / (n - 1) as f64;
        (0..n).map(|i| start + i as f64 * step).collect()
    }

    #[test]
    fn test_constant_flux_preserved() {
        let wave = fine_grid(3000.0, 10000.0, 1000);
        let flux = vec![2.5; wave.len()];
        let target = fine_grid(4000.0, 9000.0, 50);

        for value in rebin_spec(&wave, &flux, &target) {
            assert_relative_eq!(value, 2.5, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_linear_flux_preserved() {
        // Trapezoid integration is exact for linear flux, so bin averages
        // land back on the line at each bin center.
        let wave = fine_grid(1000.0, 2000.0, 2001);
        let flux: Vec<f64> = wave.iter().map(|&w| 3.0 * w + 7.0).collect();
        let target = fine_grid(1200.0, 1800.0, 13);

        let rebinned = rebin_spec(&wave, &flux, &target);
        for (t, value) in target.iter().zip(&rebinned) {
            assert_relative_eq!(*value, 3.0 * t + 7.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_out_of_coverage_bins_are_zero() {
        let wave = fine_grid(5000.0, 6000.0, 100);
        let flux = vec![1.0; wave.len()];
        let target = vec![1000.0, 1100.0, 1200.0, 5500.0, 9000.0, 9100.0];

        let rebinned = rebin_spec(&wave, &flux, &target);
        assert_relative_eq!(rebinned[0], 0.0);
        assert_relative_eq!(rebinned[1], 0.0);
        assert_relative_eq!(rebinned[3], 1.0, epsilon = 1e-10);
        assert_relative_eq!(rebinned[5], 0.0);
    }

    #[test]
    fn test_total_flux_conserved_over_interior_bins() {
        // Integrated flux over a span of whole bins matches the source
        // integral over the same span.
        let wave = fine_grid(4000.0, 8000.0, 4001);
        let flux: Vec<f64> = wave
            .iter()
            .map(|&w| 1.0 + ((w - 4000.0) / 500.0).sin().powi(2))
            .collect();
        let target = fine_grid(5000.0, 7000.0, 21);

        let rebinned = rebin_spec(&wave, &flux, &target);
        let bin_width = target[1] - target[0];

        // Sum over bins 1..n-1 equals the source integral over the same span.
        let binned_total: f64 = rebinned[1..20].iter().map(|f| f * bin_width).sum();
        let direct = integrate(
            &wave,
            &flux,
            target[0] + 0.5 * bin_width,
            target[20] - 0.5 * bin_width,
        );
        assert_relative_eq!(binned_total, direct, max_relative = 1e-9);
    }
}
