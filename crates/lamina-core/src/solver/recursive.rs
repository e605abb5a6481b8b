//! Isotropic 2×2 recursive solver.
//!
//! For each linear polarisation the effective reflection coefficient of the
//! sub-stack behind interface $p$ obeys the Airy recursion
//!
//! $$U_p = \frac{r_{p,p+1} + U_{p+1} e^{2i\beta_{p+1}}}{1 + r_{p,p+1} U_{p+1} e^{2i\beta_{p+1}}},
//!   \qquad \beta_k = k_0 q_k d_k,$$
//!
//! started from the last interface. Transmission follows the matching
//! product $T_p = t_{p,p+1} T_{p+1} e^{i\beta_{p+1}} / (1 + r_{p,p+1} U_{p+1} e^{2i\beta_{p+1}})$.
//! No cross-polarisation: the Jones matrices are diagonal.

use std::f64::consts::PI;

use lamina_materials::OpticalMaterial;
use nalgebra::Matrix2;
use num_complex::Complex64;

use super::modes::isotropic_modes;
use super::{in_plane_wavevector, normal_wavevector, SolvedMatrices, Solver, SolverKind, WavelengthSolution};
use crate::batch::map_wavelengths;
use crate::error::OpticsError;
use crate::structure::Structure;

const SOLVER_NAME: &str = "simple2x2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarisation {
    P,
    S,
}

/// One medium of the flattened stack.
#[derive(Debug, Clone, Copy)]
struct Medium {
    n: Complex64,
    q: Complex64,
    /// Zero for the half-infinite media.
    thickness_nm: f64,
}

/// Fresnel coefficients $(r, t)$ of the interface from medium `a` into `b`.
/// `t` is the ratio of electric field amplitudes.
fn interface(a: &Medium, b: &Medium, polarisation: Polarisation) -> (Complex64, Complex64) {
    match polarisation {
        Polarisation::S => {
            let denom = a.q + b.q;
            ((a.q - b.q) / denom, 2.0 * a.q / denom)
        }
        Polarisation::P => {
            let (na2, nb2) = (a.n * a.n, b.n * b.n);
            let denom = a.q * nb2 + b.q * na2;
            ((a.q * nb2 - b.q * na2) / denom, 2.0 * a.q * a.n * b.n / denom)
        }
    }
}

/// Airy recursion over a flattened stack, returning `(r, t)`.
fn recurse(media: &[Medium], wavelength_nm: f64, polarisation: Polarisation) -> (Complex64, Complex64) {
    let last = media.len() - 2;
    let (mut u, mut t) = interface(&media[last], &media[last + 1], polarisation);
    for p in (0..last).rev() {
        let (r_p, t_p) = interface(&media[p], &media[p + 1], polarisation);
        let inner = &media[p + 1];
        let beta = 2.0 * PI * inner.thickness_nm / wavelength_nm * inner.q;
        let phase = (Complex64::i() * beta).exp();
        let phase2 = phase * phase;
        let denom = 1.0 + r_p * u * phase2;
        t = t_p * t * phase / denom;
        u = (r_p + u * phase2) / denom;
    }
    (u, t)
}

/// Isotropic-only solver based on the Airy recursion.
#[derive(Debug, Clone)]
pub struct RecursiveSolver {
    parallel: bool,
}

impl RecursiveSolver {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    fn solve_wavelength(
        &self,
        structure: &Structure,
        wavelength_nm: f64,
        angle_deg: f64,
    ) -> Result<WavelengthSolution, OpticsError> {
        let n_front = structure.front_index(wavelength_nm)?;
        let kx = in_plane_wavevector(n_front, angle_deg);

        let medium = |material: &dyn OpticalMaterial, thickness_nm: f64| -> Result<Medium, OpticsError> {
            let n = material
                .refractive_index(wavelength_nm)?
                .ok_or_else(|| anisotropic(material.name()))?;
            Ok(Medium {
                n,
                q: normal_wavevector(n * n, kx),
                thickness_nm,
            })
        };

        let mut media = Vec::with_capacity(structure.elementary_layer_count() + 2);
        media.push(medium(structure.front().as_ref(), 0.0)?);
        for layer in structure.elementary_layers() {
            media.push(medium(layer.material().as_ref(), layer.thickness().nanometres())?);
        }
        media.push(medium(structure.back().as_ref(), 0.0)?);

        // Same half-space modes as the 4×4 path: rejects grazing incidence
        // and gives the flux normalisation of t.
        let front = isotropic_modes(media[0].n, kx, wavelength_nm)?;
        let back = isotropic_modes(media[media.len() - 1].n, kx, wavelength_nm)?;

        let (r_p, t_p) = recurse(&media, wavelength_nm, Polarisation::P);
        let (r_s, t_s) = recurse(&media, wavelength_nm, Polarisation::S);
        if [r_p, t_p, r_s, t_s].iter().any(|z| !z.is_finite()) {
            return Err(OpticsError::NumericalInstability {
                wavelength_nm,
                reason: "vanishing interface denominator (grazing incidence)".into(),
            });
        }

        let zero = Complex64::new(0.0, 0.0);
        Ok(WavelengthSolution {
            r: Matrix2::new(r_p, zero, zero, r_s),
            t: Matrix2::new(t_p, zero, zero, t_s),
            kz_front: front.forward_q[0],
            kz_back: back.forward_q,
            flux_front: front.forward_flux,
            flux_back: back.forward_flux,
            transfer: None,
        })
    }
}

fn anisotropic(material: &str) -> OpticsError {
    OpticsError::AnisotropicMaterial {
        solver: SOLVER_NAME,
        material: material.to_string(),
    }
}

impl Solver for RecursiveSolver {
    fn solve(
        &self,
        structure: &Structure,
        wavelengths_nm: &[f64],
        angle_deg: f64,
    ) -> Result<SolvedMatrices, OpticsError> {
        if let Some(material) = structure.materials().find(|m| !m.is_isotropic()) {
            return Err(anisotropic(material.name()));
        }
        let solutions = map_wavelengths(wavelengths_nm, self.parallel, |wl| {
            self.solve_wavelength(structure, wl, angle_deg)
        })?;
        log::debug!(
            "Simple 2x2: solved {} wavelengths, {} layers, θ = {}°",
            wavelengths_nm.len(),
            structure.elementary_layer_count(),
            angle_deg
        );
        Ok(SolvedMatrices::from_solutions(&solutions))
    }

    fn kind(&self) -> SolverKind {
        SolverKind::Simple2x2
    }

    fn method_name(&self) -> &str {
        "Simple 2x2 (Airy recursion)"
    }
}
