//! Eigenmodes of the half-infinite media bounding a stack.
//!
//! A half-space supports four plane-wave modes for a given $K_x$: two
//! travelling (or decaying) towards $+z$ and two towards $-z$. The mode
//! matrix stores them as columns `[p_fwd, s_fwd, p_bwd, s_bwd]` in the field
//! ordering $(E_x, H_y, E_y, -H_x)$, each scaled to unit electric field.

use faer::complex_native::c64;
use faer::Mat;
use nalgebra::{Matrix3, Matrix4, Vector4};
use num_complex::Complex64;

use super::normal_wavevector;
use crate::error::OpticsError;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Relative tolerance on eigenvalue imaginary parts when deciding direction.
const DIRECTION_TOLERANCE: f64 = 1e-10;
/// Relative eigenvalue separation below which two modes are degenerate.
const DEGENERACY_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone)]
pub(crate) struct HalfSpaceModes {
    /// Columns `[p_fwd, s_fwd, p_bwd, s_bwd]`.
    pub matrix: Matrix4<Complex64>,
    /// Normal wavevector components of the forward p-like and s-like modes.
    pub forward_q: [Complex64; 2],
    /// Time-averaged Poynting flux along +z of the forward modes as stored.
    pub forward_flux: [f64; 2],
}

impl HalfSpaceModes {
    fn new(matrix: Matrix4<Complex64>, forward_q: [Complex64; 2]) -> Self {
        let forward_flux = [0, 1].map(|k| mode_flux(&matrix.column(k).into_owned()));
        Self {
            matrix,
            forward_q,
            forward_flux,
        }
    }
}

/// $S_z \propto \mathrm{Re}(E_x H_y^* - E_y H_x^*)$ of a field vector
/// $(E_x, H_y, E_y, -H_x)$.
pub(crate) fn mode_flux(v: &Vector4<Complex64>) -> f64 {
    (v[0] * v[1].conj() + v[2] * v[3].conj()).re
}

/// Analytic modes of an isotropic medium of index `n`.
pub(crate) fn isotropic_modes(
    n: Complex64,
    kx: Complex64,
    wavelength_nm: f64,
) -> Result<HalfSpaceModes, OpticsError> {
    let q = normal_wavevector(n * n, kx);
    if q.norm() < 1e-12 {
        return Err(OpticsError::NumericalInstability {
            wavelength_nm,
            reason: "grazing incidence: forward and backward modes coincide".into(),
        });
    }
    let matrix = Matrix4::from_columns(&[
        Vector4::new(q / n, n, ZERO, ZERO),
        Vector4::new(ZERO, ZERO, ONE, q),
        Vector4::new(-q / n, n, ZERO, ZERO),
        Vector4::new(ZERO, ZERO, ONE, -q),
    ]);
    Ok(HalfSpaceModes::new(matrix, [q, q]))
}

/// Modes of a general (anisotropic) medium from the eigendecomposition of
/// its Berreman matrix.
pub(crate) fn anisotropic_modes(
    delta: &Matrix4<Complex64>,
    epsilon: &Matrix3<Complex64>,
    kx: Complex64,
    wavelength_nm: f64,
) -> Result<HalfSpaceModes, OpticsError> {
    let instability = |reason: String| OpticsError::NumericalInstability {
        wavelength_nm,
        reason,
    };

    let mat = Mat::<c64>::from_fn(4, 4, |i, j| {
        let z = delta[(i, j)];
        c64::new(z.re, z.im)
    });
    let eigen = mat.eigendecomposition::<c64>();
    let values = eigen.s().column_vector();
    let vectors = eigen.u();

    let mut forward = Vec::with_capacity(2);
    let mut backward = Vec::with_capacity(2);
    for k in 0..4 {
        let v = values.read(k);
        let value = Complex64::new(v.re, v.im);
        let vector = Vector4::from_fn(|i, _| {
            let z = vectors.read(i, k);
            Complex64::new(z.re, z.im)
        });
        let tolerance = DIRECTION_TOLERANCE * value.norm().max(1.0);
        let is_forward = if value.im.abs() > tolerance {
            value.im > 0.0
        } else {
            value.re > 0.0
        };
        if is_forward {
            forward.push((value, vector));
        } else {
            backward.push((value, vector));
        }
    }
    if forward.len() != 2 || backward.len() != 2 {
        return Err(instability(format!(
            "expected 2 forward and 2 backward modes, found {} and {}",
            forward.len(),
            backward.len()
        )));
    }

    let [(q_p, p_fwd), (q_s, s_fwd)] = split_polarisations(&forward, epsilon, kx);
    let [(_, p_bwd), (_, s_bwd)] = split_polarisations(&backward, epsilon, kx);

    let matrix = Matrix4::from_columns(&[p_fwd, s_fwd, p_bwd, s_bwd]);
    if matrix.determinant().norm() < 1e-14 {
        return Err(instability("degenerate half-space eigenmodes".into()));
    }
    Ok(HalfSpaceModes::new(matrix, [q_p, q_s]))
}

/// Order a pair of co-directional modes p-like first, resolving degenerate
/// pairs into pure p ($E_y = 0$) and pure s ($E_x = 0$) combinations.
fn split_polarisations(
    pair: &[(Complex64, Vector4<Complex64>)],
    epsilon: &Matrix3<Complex64>,
    kx: Complex64,
) -> [(Complex64, Vector4<Complex64>); 2] {
    let (q1, v1) = pair[0];
    let (q2, v2) = pair[1];
    let scale = q1.norm().max(q2.norm()).max(1.0);

    let (mut first, mut second) = ((q1, v1), (q2, v2));
    if (q1 - q2).norm() < DEGENERACY_TOLERANCE * scale {
        let p = v1 * v2[2] - v2 * v1[2];
        let s = v1 * v2[0] - v2 * v1[0];
        if p.norm() > 1e-12 && s.norm() > 1e-12 {
            first = (q1, p);
            second = (q2, s);
        }
    }
    if p_fraction(&second.1) > p_fraction(&first.1) {
        std::mem::swap(&mut first, &mut second);
    }
    [
        (first.0, normalise(first.1, epsilon, kx, 0)),
        (second.0, normalise(second.1, epsilon, kx, 2)),
    ]
}

fn p_fraction(v: &Vector4<Complex64>) -> f64 {
    let (ex, ey) = (v[0].norm_sqr(), v[2].norm_sqr());
    if ex + ey == 0.0 {
        0.0
    } else {
        ex / (ex + ey)
    }
}

/// Scale a mode to unit $|E|$ with its dominant transverse component
/// (`reference` index) real and positive.
fn normalise(
    v: Vector4<Complex64>,
    epsilon: &Matrix3<Complex64>,
    kx: Complex64,
    reference: usize,
) -> Vector4<Complex64> {
    // Ez follows from D_z = 0 for a plane wave with in-plane wavevector Kx.
    let ez = -(epsilon[(2, 0)] * v[0] + epsilon[(2, 1)] * v[2] + kx * v[1]) / epsilon[(2, 2)];
    let e_norm = (v[0].norm_sqr() + v[2].norm_sqr() + ez.norm_sqr()).sqrt();
    let anchor = v[reference];
    let phase = if anchor.norm() > 0.0 {
        anchor.conj() / anchor.norm()
    } else {
        ONE
    };
    if e_norm > 0.0 {
        v * (phase / e_norm)
    } else {
        v
    }
}
