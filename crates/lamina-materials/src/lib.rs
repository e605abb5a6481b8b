//! # Lamina Materials
//!
//! Optical material descriptions for the Lamina thin-film framework. A
//! material is built from one or more [`Dispersion`](dispersion::Dispersion)
//! models and exposes either a scalar permittivity (isotropic media) or a full
//! 3×3 permittivity tensor (anisotropic media) at a given wavelength.
//!
//! ## Available dispersion models
//!
//! | Model | Module | Parameterisation |
//! |-------|--------|------------------|
//! | Constant index | [`formulas`] | $\tilde{n} = n + ik$ |
//! | Sellmeier | [`formulas`] | $\epsilon = 1 + \sum_i A_i\lambda^2/(\lambda^2 - B_i)$ |
//! | Cauchy | [`formulas`] | $n = A + B/\lambda^2 + C/\lambda^4$ |
//! | Tabulated $(n, k)$ | [`table`] | natural cubic spline |
//! | Sum | [`sum`] | $\epsilon = \sum_i \epsilon_i$ |
//!
//! Named dispersions can be looked up by `(book, page)` in the
//! [`catalog`].

pub mod catalog;
pub mod dispersion;
pub mod formulas;
pub mod material;
pub mod rotation;
pub mod spline;
pub mod sum;
pub mod table;

pub use dispersion::{Dispersion, MaterialError, Parameterisation};
pub use material::{
    BiaxialMaterial, IsotropicMaterial, OpticalMaterial, Permittivity, UniaxialMaterial,
};
pub use sum::DispersionSum;
