//! Jones, Stokes and Mueller algebra.
//!
//! Conventions: a Jones vector is $(E_p, E_s)$ — index 0 is the p (in-plane)
//! component, index 1 the s component. Stokes parameters are
//!
//! $$S = \bigl(|a|^2 + |b|^2,\; |a|^2 - |b|^2,\; 2\,\mathrm{Re}(a b^*),\; 2\,\mathrm{Im}(a b^*)\bigr)$$
//!
//! for a Jones vector $(a, b)$, so that $b = (U - iV)/(2a)$ inverts the map.

use nalgebra::{Matrix2, Matrix4};
use num_complex::Complex64;

use crate::error::OpticsError;

/// Jones vectors with degree of polarisation below `1 - DOP_TOLERANCE` are
/// treated as partially polarised.
pub const DOP_TOLERANCE: f64 = 1e-9;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Stokes vector of a fully polarised Jones vector.
pub fn jones_to_stokes(jones: &[Complex64; 2]) -> [f64; 4] {
    let [a, b] = *jones;
    let cross = a * b.conj();
    [
        a.norm_sqr() + b.norm_sqr(),
        a.norm_sqr() - b.norm_sqr(),
        2.0 * cross.re,
        2.0 * cross.im,
    ]
}

/// $\sqrt{S_1^2 + S_2^2 + S_3^2} / S_0$.
pub fn degree_of_polarization(stokes: &[f64; 4]) -> f64 {
    (stokes[1].powi(2) + stokes[2].powi(2) + stokes[3].powi(2)).sqrt() / stokes[0]
}

/// Check that a Stokes vector describes physical light.
pub fn validate_stokes(stokes: &[f64; 4]) -> Result<(), OpticsError> {
    if stokes.iter().any(|s| !s.is_finite()) {
        return Err(OpticsError::InvalidVector(format!(
            "Stokes vector {:?} has non-finite entries",
            stokes
        )));
    }
    if stokes[0] <= 0.0 {
        return Err(OpticsError::InvalidVector(format!(
            "Stokes intensity S0 = {} must be positive",
            stokes[0]
        )));
    }
    let dop = degree_of_polarization(stokes);
    if dop > 1.0 + DOP_TOLERANCE {
        return Err(OpticsError::InvalidVector(format!(
            "degree of polarisation {:.6} exceeds 1",
            dop
        )));
    }
    Ok(())
}

/// Jones vector of fully polarised Stokes light, scaled to intensity $S_0$.
///
/// The phase is fixed by making the p component real and non-negative. Pure
/// s polarisation ($Q = -1$) maps to $(0, \sqrt{S_0})$.
pub fn stokes_to_jones(stokes: &[f64; 4]) -> Result<[Complex64; 2], OpticsError> {
    validate_stokes(stokes)?;
    let dop = degree_of_polarization(stokes);
    if dop < 1.0 - DOP_TOLERANCE {
        return Err(OpticsError::PartiallyPolarized { degree: dop });
    }

    let norm = stokes[0] * dop;
    let q = stokes[1] / norm;
    let u = stokes[2] / norm;
    let v = stokes[3] / norm;
    let amplitude = stokes[0].sqrt();

    if 1.0 + q < 1e-12 {
        return Ok([ZERO, Complex64::new(amplitude, 0.0)]);
    }
    let a = ((1.0 + q) / 2.0).sqrt();
    let b = Complex64::new(u, -v) / (2.0 * a);
    Ok([Complex64::new(a * amplitude, 0.0), b * amplitude])
}

/// Stokes transform $A$, mapping $e \otimes e^*$ to $S$.
fn stokes_transform() -> Matrix4<Complex64> {
    Matrix4::new(
        ONE, ZERO, ZERO, ONE, //
        ONE, ZERO, ZERO, -ONE, //
        ZERO, ONE, ONE, ZERO, //
        ZERO, -I, I, ZERO,
    )
}

/// Inverse of [`stokes_transform`].
fn inverse_stokes_transform() -> Matrix4<Complex64> {
    Matrix4::new(
        ONE, ONE, ZERO, ZERO, //
        ZERO, ZERO, ONE, I, //
        ZERO, ZERO, ONE, -I, //
        ONE, -ONE, ZERO, ZERO,
    ) * Complex64::new(0.5, 0.0)
}

/// Mueller matrix of a Jones matrix: $M = A\,(J \otimes J^*)\,A^{-1}$.
pub fn mueller_from_jones(jones: &Matrix2<Complex64>) -> Matrix4<f64> {
    let kron = Matrix4::from_fn(|row, col| {
        let (i, k) = (row / 2, row % 2);
        let (j, l) = (col / 2, col % 2);
        jones[(i, j)] * jones[(k, l)].conj()
    });
    (stokes_transform() * kron * inverse_stokes_transform()).map(|z| z.re)
}

/// Basis change to circular polarisation. Column 0 is the $S_3 = +1$ state
/// $(1, -i)/\sqrt{2}$, column 1 the $S_3 = -1$ state $(1, i)/\sqrt{2}$.
pub fn circular_basis() -> Matrix2<Complex64> {
    Matrix2::new(ONE, ONE, -I, I) * Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0)
}

/// Jones matrix expressed in the circular basis, $C^\dagger J C$.
pub fn to_circular(jones: &Matrix2<Complex64>) -> Matrix2<Complex64> {
    let c = circular_basis();
    c.adjoint() * jones * c
}
