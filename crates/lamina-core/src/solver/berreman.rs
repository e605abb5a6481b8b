//! Berreman 4×4 transfer-matrix solver.
//!
//! For a homogeneous layer the tangential field vector
//! $\psi = (E_x, H_y, E_y, -H_x)$ ($H$ scaled by the vacuum impedance)
//! obeys
//!
//! $$\frac{d\psi}{dz} = i k_0 \, \Delta(\varepsilon, K_x) \, \psi,$$
//!
//! so a layer of thickness $d$ propagates the field by
//! $T = \exp(i k_0 d \, \Delta)$. The stack matrix is the ordered product of
//! the layer matrices, front to back. A repeated block computes its period
//! once and raises it to the repeat count: a single-layer period through
//! $\exp(N A)$, a longer period by binary powering of its product.
//!
//! The Jones matrices follow from matching the stack to the eigenmodes of the
//! half-infinite media (see [`super::modes`]):
//!
//! $$M = B^{-1} \, T_\text{stack} \, F, \quad
//!   r = -M_{22}^{-1} M_{21}, \quad t = M_{11} + M_{12} r.$$
//!
//! Reference: D. W. Berreman, "Optics in Stratified and Anisotropic Media:
//! 4×4-Matrix Formulation", J. Opt. Soc. Am. 62, 502 (1972).

use std::f64::consts::PI;

use lamina_materials::OpticalMaterial;
use nalgebra::{Matrix2, Matrix3, Matrix4};
use num_complex::Complex64;

use super::expm::{exponential, power};
use super::modes::{anisotropic_modes, isotropic_modes, HalfSpaceModes};
use super::{in_plane_wavevector, SolvedMatrices, Solver, SolverKind, WavelengthSolution};
use crate::batch::map_wavelengths;
use crate::config::ExpmAlgorithm;
use crate::error::OpticsError;
use crate::layer::{Layer, RepeatedLayers, StackElement};
use crate::structure::Structure;

/// General anisotropic solver based on the matrix exponential of $\Delta$.
#[derive(Debug, Clone)]
pub struct BerremanSolver {
    expm: ExpmAlgorithm,
    parallel: bool,
}

impl BerremanSolver {
    pub fn new(expm: ExpmAlgorithm, parallel: bool) -> Self {
        Self { expm, parallel }
    }

    fn solve_wavelength(
        &self,
        structure: &Structure,
        wavelength_nm: f64,
        angle_deg: f64,
    ) -> Result<WavelengthSolution, OpticsError> {
        let n_front = structure.front_index(wavelength_nm)?;
        let kx = in_plane_wavevector(n_front, angle_deg);

        let transfer = self.stack_matrix(structure.layers(), wavelength_nm, kx)?;
        let front = isotropic_modes(n_front, kx, wavelength_nm)?;
        let back = exit_modes(structure.back().as_ref(), wavelength_nm, kx)?;
        let (r, t) = match_boundaries(&front, &transfer, &back, wavelength_nm)?;

        Ok(WavelengthSolution {
            r,
            t,
            kz_front: front.forward_q[0],
            kz_back: back.forward_q,
            flux_front: front.forward_flux,
            flux_back: back.forward_flux,
            transfer: Some(transfer),
        })
    }

    /// Ordered product of every layer matrix, front to back.
    fn stack_matrix(
        &self,
        elements: &[StackElement],
        wavelength_nm: f64,
        kx: Complex64,
    ) -> Result<Matrix4<Complex64>, OpticsError> {
        let mut m = Matrix4::identity();
        for element in elements {
            m = match element {
                StackElement::Layer(layer) => self.layer_matrix(layer, wavelength_nm, kx)? * m,
                StackElement::Repeated(block) => self.apply_block(block, m, wavelength_nm, kx)?,
            };
        }
        Ok(m)
    }

    fn apply_block(
        &self,
        block: &RepeatedLayers,
        mut m: Matrix4<Complex64>,
        wavelength_nm: f64,
        kx: Complex64,
    ) -> Result<Matrix4<Complex64>, OpticsError> {
        for layer in block.front_layers() {
            m = self.layer_matrix(layer, wavelength_nm, kx)? * m;
        }

        let period = block.period();
        match block.repeat_count() {
            0 => {}
            // Same operation order as an expanded stack.
            1 => {
                for layer in period {
                    m = self.layer_matrix(layer, wavelength_nm, kx)? * m;
                }
            }
            count => {
                let repeated = if let [layer] = period {
                    let generator = layer_generator(layer, wavelength_nm, kx)?;
                    exponential(&(generator * Complex64::new(count as f64, 0.0)), self.expm)
                } else {
                    let mut product = Matrix4::identity();
                    for layer in period {
                        product = self.layer_matrix(layer, wavelength_nm, kx)? * product;
                    }
                    power(&product, count)
                };
                m = repeated * m;
            }
        }

        for layer in block.back_layers() {
            m = self.layer_matrix(layer, wavelength_nm, kx)? * m;
        }
        Ok(m)
    }

    fn layer_matrix(
        &self,
        layer: &Layer,
        wavelength_nm: f64,
        kx: Complex64,
    ) -> Result<Matrix4<Complex64>, OpticsError> {
        Ok(exponential(&layer_generator(layer, wavelength_nm, kx)?, self.expm))
    }
}

impl Solver for BerremanSolver {
    fn solve(
        &self,
        structure: &Structure,
        wavelengths_nm: &[f64],
        angle_deg: f64,
    ) -> Result<SolvedMatrices, OpticsError> {
        let solutions = map_wavelengths(wavelengths_nm, self.parallel, |wl| {
            self.solve_wavelength(structure, wl, angle_deg)
        })?;
        log::debug!(
            "Berreman 4x4: solved {} wavelengths, {} layers, θ = {}°",
            wavelengths_nm.len(),
            structure.elementary_layer_count(),
            angle_deg
        );
        Ok(SolvedMatrices::from_solutions(&solutions))
    }

    fn kind(&self) -> SolverKind {
        SolverKind::Berreman4x4
    }

    fn method_name(&self) -> &str {
        "Berreman 4x4 (matrix exponential)"
    }
}

/// Berreman differential matrix $\Delta$ for permittivity tensor $\varepsilon$
/// and in-plane wavevector $K_x$ (units of $k_0$).
pub fn delta_matrix(eps: &Matrix3<Complex64>, kx: Complex64) -> Matrix4<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let e33 = eps[(2, 2)];
    let (e11, e12, e13) = (eps[(0, 0)], eps[(0, 1)], eps[(0, 2)]);
    let (e21, e22, e23) = (eps[(1, 0)], eps[(1, 1)], eps[(1, 2)]);
    let (e31, e32) = (eps[(2, 0)], eps[(2, 1)]);

    Matrix4::new(
        -kx * e31 / e33,
        one - kx * kx / e33,
        -kx * e32 / e33,
        zero,
        //
        e11 - e13 * e31 / e33,
        -kx * e13 / e33,
        e12 - e13 * e32 / e33,
        zero,
        //
        zero,
        zero,
        zero,
        one,
        //
        e21 - e23 * e31 / e33,
        -kx * e23 / e33,
        e22 - kx * kx - e23 * e32 / e33,
        zero,
    )
}

/// $A = i k_0 d \, \Delta$, so that the layer matrix is $e^A$.
fn layer_generator(
    layer: &Layer,
    wavelength_nm: f64,
    kx: Complex64,
) -> Result<Matrix4<Complex64>, OpticsError> {
    let eps = layer.material().permittivity(wavelength_nm)?.tensor();
    let phase = 2.0 * PI * layer.thickness().nanometres() / wavelength_nm;
    Ok(delta_matrix(&eps, kx) * Complex64::new(0.0, phase))
}

fn exit_modes(
    material: &dyn OpticalMaterial,
    wavelength_nm: f64,
    kx: Complex64,
) -> Result<HalfSpaceModes, OpticsError> {
    if let Some(n) = material.refractive_index(wavelength_nm)? {
        return isotropic_modes(n, kx, wavelength_nm);
    }
    let eps = material.permittivity(wavelength_nm)?.tensor();
    anisotropic_modes(&delta_matrix(&eps, kx), &eps, kx, wavelength_nm)
}

type JonesPair = (Matrix2<Complex64>, Matrix2<Complex64>);

fn match_boundaries(
    front: &HalfSpaceModes,
    transfer: &Matrix4<Complex64>,
    back: &HalfSpaceModes,
    wavelength_nm: f64,
) -> Result<JonesPair, OpticsError> {
    let instability = |reason: &str| OpticsError::NumericalInstability {
        wavelength_nm,
        reason: reason.to_string(),
    };

    let back_inv = back
        .matrix
        .try_inverse()
        .ok_or_else(|| instability("singular exit-medium mode matrix"))?;
    let m = back_inv * transfer * front.matrix;

    let m11: Matrix2<Complex64> = m.fixed_view::<2, 2>(0, 0).into_owned();
    let m12: Matrix2<Complex64> = m.fixed_view::<2, 2>(0, 2).into_owned();
    let m21: Matrix2<Complex64> = m.fixed_view::<2, 2>(2, 0).into_owned();
    let m22: Matrix2<Complex64> = m.fixed_view::<2, 2>(2, 2).into_owned();

    let m22_inv = m22
        .try_inverse()
        .ok_or_else(|| instability("singular boundary-matching system"))?;
    let r = -(m22_inv * m21);
    let t = m11 + m12 * r;

    if r.iter().chain(t.iter()).any(|z| !z.is_finite()) {
        return Err(instability("non-finite Jones matrix"));
    }
    Ok((r, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lamina_materials::formulas::ConstantIndex;
    use lamina_materials::IsotropicMaterial;
    use std::sync::Arc;

    use crate::units::Length;

    fn material(n: f64) -> Arc<dyn OpticalMaterial> {
        Arc::new(IsotropicMaterial::from_dispersion(ConstantIndex::real(n)))
    }

    #[test]
    fn test_delta_of_isotropic_medium() {
        let eps = Matrix3::from_diagonal_element(Complex64::new(2.25, 0.0));
        let kx = Complex64::new(0.5, 0.0);
        let d = delta_matrix(&eps, kx);
        assert_abs_diff_eq!(d[(0, 1)].re, 1.0 - 0.25 / 2.25, epsilon = 1e-15);
        assert_abs_diff_eq!(d[(1, 0)].re, 2.25, epsilon = 1e-15);
        assert_abs_diff_eq!(d[(3, 2)].re, 2.25 - 0.25, epsilon = 1e-15);
        assert_eq!(d[(2, 3)], Complex64::new(1.0, 0.0));
        assert_eq!(d[(0, 0)], Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_single_layer_period_uses_exponential_identity() {
        let solver = BerremanSolver::new(ExpmAlgorithm::Pade, false);
        let layer = Layer::new(material(1.8), Length::nm(73.0)).unwrap();
        let kx = Complex64::new(0.3, 0.0);

        let block = RepeatedLayers::new(vec![layer.clone()], 5, 0, 0).unwrap();
        let repeated = solver
            .apply_block(&block, Matrix4::identity(), 600.0, kx)
            .unwrap();

        let mut expanded = Matrix4::identity();
        for _ in 0..5 {
            expanded = solver.layer_matrix(&layer, 600.0, kx).unwrap() * expanded;
        }
        assert_abs_diff_eq!((repeated - expanded).norm(), 0.0, epsilon = 1e-11);
    }

    #[test]
    fn test_layer_matrix_is_unimodular_for_lossless_layer() {
        let solver = BerremanSolver::new(ExpmAlgorithm::Pade, false);
        let layer = Layer::new(material(2.0), Length::nm(150.0)).unwrap();
        let t = solver
            .layer_matrix(&layer, 500.0, Complex64::new(0.6, 0.0))
            .unwrap();
        // det exp(A) = exp(tr A) and tr Δ = 0.
        assert_abs_diff_eq!((t.determinant() - Complex64::new(1.0, 0.0)).norm(), 0.0, epsilon = 1e-12);
    }
}
