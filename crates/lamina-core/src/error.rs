//! Error taxonomy of the core.
//!
//! Configuration errors are raised when a geometry, light description or
//! solver choice is invalid; numerical-instability errors when a solve
//! cannot be carried out reliably. Material failures are passed through.

use lamina_materials::MaterialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpticsError {
    #[error("Invalid layer thickness {thickness_m:e} m: thickness must be finite and positive")]
    InvalidThickness { thickness_m: f64 },

    #[error("Invalid repeated block: {0}")]
    InvalidRepeat(String),

    #[error("Partial period count {value} for the {side} of the block is outside [0, {period_len}]")]
    PartialOutOfRange {
        side: &'static str,
        value: usize,
        period_len: usize,
    },

    #[error("Invalid light vector: {0}")]
    InvalidVector(String),

    #[error("Stokes vector is only {degree:.6} polarised; a Jones vector needs fully polarised light")]
    PartiallyPolarized { degree: f64 },

    #[error("Invalid solver type '{name}'. Expected one of: {valid}")]
    UnknownSolver { name: String, valid: String },

    #[error("The {solver} solver requires isotropic media, but '{material}' is anisotropic")]
    AnisotropicMaterial {
        solver: &'static str,
        material: String,
    },

    #[error("Invalid wavelengths: {0}")]
    InvalidWavelengths(String),

    #[error("Invalid angle of incidence {0}°: the angle must be finite")]
    InvalidAngle(f64),

    #[error("Numerical instability at λ={wavelength_nm:.3} nm: {reason}")]
    NumericalInstability { wavelength_nm: f64, reason: String },

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),
}
