//! Closed-form dispersion relations.
//!
//! Wavelength arguments are in nanometres; the Sellmeier and Cauchy
//! coefficients follow the usual catalogue convention of wavelengths in
//! micrometres.

use num_complex::Complex64;

use crate::dispersion::{check_range, Dispersion, MaterialError, Parameterisation};

const NM_PER_UM: f64 = 1000.0;

/// Wavelength-independent refractive index $\tilde{n} = n + ik$.
#[derive(Debug, Clone)]
pub struct ConstantIndex {
    name: String,
    index: Complex64,
}

impl ConstantIndex {
    pub fn new(index: Complex64) -> Self {
        Self {
            name: format!("n = {:.4}{:+.4}i", index.re, index.im),
            index,
        }
    }

    /// Lossless medium with real index `n`.
    pub fn real(n: f64) -> Self {
        Self::new(Complex64::new(n, 0.0))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Dispersion for ConstantIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameterisation(&self) -> Parameterisation {
        Parameterisation::RefractiveIndex
    }

    fn dielectric_function(&self, _wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        Ok(self.index * self.index)
    }

    fn refractive_index(&self, _wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        Ok(self.index)
    }
}

/// One Sellmeier oscillator term $A\lambda^2 / (\lambda^2 - B)$, with $B$ in µm².
#[derive(Debug, Clone, Copy)]
pub struct SellmeierTerm {
    pub amplitude: f64,
    pub resonance_um2: f64,
}

/// Sellmeier dispersion $\epsilon(\lambda) = \epsilon_\infty + \sum_i A_i\lambda^2/(\lambda^2 - B_i)$.
#[derive(Debug, Clone)]
pub struct Sellmeier {
    name: String,
    eps_inf: f64,
    terms: Vec<SellmeierTerm>,
    range: Option<(f64, f64)>,
}

impl Sellmeier {
    /// Empty Sellmeier model with $\epsilon_\infty = 1$.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            eps_inf: 1.0,
            terms: Vec::new(),
            range: None,
        }
    }

    /// Add an oscillator term.
    pub fn term(mut self, amplitude: f64, resonance_um2: f64) -> Self {
        self.terms.push(SellmeierTerm {
            amplitude,
            resonance_um2,
        });
        self
    }

    pub fn eps_inf(mut self, eps_inf: f64) -> Self {
        self.eps_inf = eps_inf;
        self
    }

    /// Restrict the model to its fitted range (nm).
    pub fn valid_between(mut self, min_nm: f64, max_nm: f64) -> Self {
        self.range = Some((min_nm, max_nm));
        self
    }

    pub fn terms(&self) -> &[SellmeierTerm] {
        &self.terms
    }
}

impl Dispersion for Sellmeier {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> Option<(f64, f64)> {
        self.range
    }

    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        check_range(wavelength_nm, self.range)?;
        let lam2 = (wavelength_nm / NM_PER_UM).powi(2);
        let eps = self.eps_inf
            + self
                .terms
                .iter()
                .map(|t| t.amplitude * lam2 / (lam2 - t.resonance_um2))
                .sum::<f64>();
        Ok(Complex64::new(eps, 0.0))
    }
}

/// Cauchy index $n(\lambda) = A + B/\lambda^2 + C/\lambda^4$ (λ in µm), lossless.
#[derive(Debug, Clone)]
pub struct Cauchy {
    name: String,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Cauchy {
    pub fn new(name: impl Into<String>, a: f64, b: f64, c: f64) -> Self {
        Self {
            name: name.into(),
            a,
            b,
            c,
        }
    }
}

impl Dispersion for Cauchy {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameterisation(&self) -> Parameterisation {
        Parameterisation::RefractiveIndex
    }

    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let n = self.refractive_index(wavelength_nm)?;
        Ok(n * n)
    }

    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let lam2 = (wavelength_nm / NM_PER_UM).powi(2);
        Ok(Complex64::new(self.a + self.b / lam2 + self.c / (lam2 * lam2), 0.0))
    }
}
