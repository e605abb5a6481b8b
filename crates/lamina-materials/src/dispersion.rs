//! Dispersion trait and material errors.
//!
//! A [`Dispersion`] maps a vacuum wavelength to a complex relative
//! permittivity $\epsilon(\lambda)$. Materials combine one or more
//! dispersions into a scalar or tensor permittivity.

use std::sync::Arc;

use num_complex::Complex64;
use thiserror::Error;

/// Errors from dispersion models, materials and the catalog.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Wavelength {wavelength_nm} nm is outside the data range [{min}, {max}] nm")]
    OutOfRange {
        wavelength_nm: f64,
        min: f64,
        max: f64,
    },

    #[error("No catalog entry for book '{book}', page '{page}'")]
    NotFound { book: String, page: String },

    #[error("Catalog query for book '{book}', page '{page}' is ambiguous: {matches} entries match")]
    Ambiguous {
        book: String,
        page: String,
        matches: usize,
    },

    #[error("Invalid dispersion data: {0}")]
    DataError(String),

    #[error("{0}")]
    UnsupportedSum(String),
}

/// Quantity a dispersion model is written in. Only dielectric-function
/// models can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameterisation {
    /// Closed-form $\epsilon(\lambda)$.
    DielectricFunction,
    /// Closed-form $\tilde{n}(\lambda)$.
    RefractiveIndex,
    /// Interpolated tables.
    Tabulated,
}

/// Wavelength-dependent dielectric response of a homogeneous medium.
pub trait Dispersion: Send + Sync {
    /// Human-readable name of this dispersion.
    fn name(&self) -> &str;

    /// Wavelength range (nm) over which the model is defined, if bounded.
    fn wavelength_range(&self) -> Option<(f64, f64)> {
        None
    }

    fn parameterisation(&self) -> Parameterisation {
        Parameterisation::DielectricFunction
    }

    /// Members of a [`DispersionSum`](crate::sum::DispersionSum); `None` for
    /// a single model.
    fn summands(&self) -> Option<&[Arc<dyn Dispersion>]> {
        None
    }

    /// Complex relative permittivity $\epsilon(\lambda)$.
    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError>;

    /// Complex refractive index $\tilde{n} = n + ik$.
    ///
    /// Derived from $\epsilon = \tilde{n}^2$ on the branch with $k \geq 0$.
    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        let eps = self.dielectric_function(wavelength_nm)?;
        Ok(absorbing_branch(eps.sqrt()))
    }
}

/// Pick the square-root branch with a non-negative imaginary part.
pub(crate) fn absorbing_branch(n: Complex64) -> Complex64 {
    if n.im < 0.0 {
        -n
    } else {
        n
    }
}

/// Reject wavelengths outside a model's declared range.
pub(crate) fn check_range(
    wavelength_nm: f64,
    range: Option<(f64, f64)>,
) -> Result<(), MaterialError> {
    if let Some((min, max)) = range {
        if wavelength_nm < min || wavelength_nm > max {
            return Err(MaterialError::OutOfRange {
                wavelength_nm,
                min,
                max,
            });
        }
    }
    Ok(())
}
