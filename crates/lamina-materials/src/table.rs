//! Tabulated optical constants.
//!
//! Measured $(n, k)$ samples are interpolated with natural cubic splines
//! ([`CubicSpline`]) independently for the real and imaginary parts of the
//! refractive index. Wavelengths outside the sampled range are rejected.

use num_complex::Complex64;

use crate::dispersion::{check_range, Dispersion, MaterialError, Parameterisation};
use crate::spline::CubicSpline;

/// Refractive index interpolated from $(\lambda, n, k)$ samples.
#[derive(Debug, Clone)]
pub struct TabulatedIndex {
    name: String,
    range: (f64, f64),
    n: CubicSpline,
    k: CubicSpline,
}

impl TabulatedIndex {
    /// Build from parallel columns. Wavelengths in nm, strictly increasing.
    pub fn new(
        name: impl Into<String>,
        wavelengths_nm: Vec<f64>,
        n: Vec<f64>,
        k: Vec<f64>,
    ) -> Result<Self, MaterialError> {
        let n = CubicSpline::new(wavelengths_nm.clone(), n)?;
        let k = CubicSpline::new(wavelengths_nm, k)?;
        Ok(Self {
            name: name.into(),
            range: n.domain(),
            n,
            k,
        })
    }

    /// Build from `(λ/nm, n, k)` rows.
    pub fn from_rows(name: impl Into<String>, rows: &[(f64, f64, f64)]) -> Result<Self, MaterialError> {
        let wavelengths = rows.iter().map(|&(lam, _, _)| lam).collect();
        let n = rows.iter().map(|&(_, n, _)| n).collect();
        let k = rows.iter().map(|&(_, _, k)| k).collect();
        Self::new(name, wavelengths, n, k)
    }
}

impl Dispersion for TabulatedIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> Option<(f64, f64)> {
        Some(self.range)
    }

    fn parameterisation(&self) -> Parameterisation {
        Parameterisation::Tabulated
    }

    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let n = self.refractive_index(wavelength_nm)?;
        Ok(n * n)
    }

    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        check_range(wavelength_nm, Some(self.range))?;
        // Spline overshoot can push k slightly negative between lossless samples.
        let k = self.k.evaluate(wavelength_nm).max(0.0);
        Ok(Complex64::new(self.n.evaluate(wavelength_nm), k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> TabulatedIndex {
        TabulatedIndex::from_rows(
            "sample",
            &[
                (400.0, 2.10, 0.020),
                (500.0, 2.05, 0.010),
                (600.0, 2.02, 0.000),
                (700.0, 2.00, 0.000),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_table_hits_samples() {
        let table = sample();
        let n = table.refractive_index(500.0).unwrap();
        assert_abs_diff_eq!(n.re, 2.05, epsilon = 1e-12);
        assert_abs_diff_eq!(n.im, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_table_permittivity_is_index_squared() {
        let table = sample();
        let n = table.refractive_index(450.0).unwrap();
        let eps = table.dielectric_function(450.0).unwrap();
        assert_abs_diff_eq!((eps - n * n).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_table_rejects_out_of_range() {
        let table = sample();
        match table.refractive_index(800.0) {
            Err(MaterialError::OutOfRange { min, max, .. }) => {
                assert_eq!(min, 400.0);
                assert_eq!(max, 700.0);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }
}
