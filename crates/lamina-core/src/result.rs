//! Observables derived from solved Jones matrices.
//!
//! Every accessor recomputes its quantity from the stored matrices; the
//! result itself is immutable. All arrays are indexed by wavelength along
//! axis 0, in the order the wavelengths were supplied.
//!
//! | Quantity | Definition |
//! |----------|------------|
//! | $R_{ij}$ | $\lvert r_{ij} \rvert^2$ |
//! | $T_{ij}$ | $\lvert t_{ij} \rvert^2 \, S_{z,\text{exit},i} / S_{z,\text{front},j}$ |
//! | $\rho$ | $r_{pp} / r_{ss} = \tan\psi \, e^{i\Delta}$ |
//! | Mueller | $A (J \otimes J^*) A^{-1}$ of the reflection matrix |

use nalgebra::{Matrix2, Vector4};
use ndarray::{Array1, Array2, Array3};
use num_complex::Complex64;

use crate::experiment::IncidentLight;
use crate::polarization::{mueller_from_jones, to_circular};
use crate::solver::{SolvedMatrices, SolverKind};

/// Complex ratios of generalized ellipsometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralizedEllipsometry {
    /// $r_{pp} / r_{ss}$
    pub rho_pp: Array1<Complex64>,
    /// $r_{ps} / r_{pp}$
    pub rho_ps: Array1<Complex64>,
    /// $r_{sp} / r_{ss}$
    pub rho_sp: Array1<Complex64>,
}

#[derive(Debug, Clone)]
pub struct ExperimentResult {
    solved: SolvedMatrices,
    wavelengths_nm: Vec<f64>,
    angle_deg: f64,
    light: IncidentLight,
    solver: SolverKind,
}

impl ExperimentResult {
    pub fn new(
        solved: SolvedMatrices,
        wavelengths_nm: Vec<f64>,
        angle_deg: f64,
        light: IncidentLight,
        solver: SolverKind,
    ) -> Self {
        Self {
            solved,
            wavelengths_nm,
            angle_deg,
            light,
            solver,
        }
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths_nm
    }

    pub fn incidence_angle(&self) -> f64 {
        self.angle_deg
    }

    pub fn incident_light(&self) -> &IncidentLight {
        &self.light
    }

    pub fn solver(&self) -> SolverKind {
        self.solver
    }

    pub fn solved(&self) -> &SolvedMatrices {
        &self.solved
    }

    /// Global 4×4 transfer matrices, when the solver built them.
    pub fn transfer_matrices(&self) -> Option<&Array3<Complex64>> {
        self.solved.transfer.as_ref()
    }

    /// Jones reflection matrices, shape `(n, 2, 2)`.
    pub fn r(&self) -> &Array3<Complex64> {
        &self.solved.jones_r
    }

    /// Jones transmission matrices, shape `(n, 2, 2)`.
    pub fn t(&self) -> &Array3<Complex64> {
        &self.solved.jones_t
    }

    pub fn reflectance(&self) -> Array3<f64> {
        self.solved.jones_r.mapv(|z| z.norm_sqr())
    }

    /// Transmittance: Poynting flux of transmitted mode `i` over that of
    /// incident mode `j`, both from the mode field vectors.
    pub fn transmittance(&self) -> Array3<f64> {
        let front = &self.solved.flux_front;
        let back = &self.solved.flux_back;
        Array3::from_shape_fn(self.solved.jones_t.dim(), |(k, i, j)| {
            self.solved.jones_t[[k, i, j]].norm_sqr() * back[[k, i]] / front[[k, j]]
        })
    }

    /// Reflectance in the circular basis (index 0: $S_3 = +1$).
    pub fn reflectance_circular(&self) -> Array3<f64> {
        let n = self.len();
        let circular: Vec<Matrix2<Complex64>> =
            (0..n).map(|k| to_circular(&self.solved.r_at(k))).collect();
        Array3::from_shape_fn((n, 2, 2), |(k, i, j)| circular[k][(i, j)].norm_sqr())
    }

    /// Transmittance in the circular basis. Each circular mode mixes p and
    /// s, so the flux correction uses the mean mode fluxes.
    pub fn transmittance_circular(&self) -> Array3<f64> {
        let n = self.len();
        let circular: Vec<Matrix2<Complex64>> =
            (0..n).map(|k| to_circular(&self.solved.t_at(k))).collect();
        Array3::from_shape_fn((n, 2, 2), |(k, i, j)| {
            let flux = |f: &Array2<f64>| 0.5 * (f[[k, 0]] + f[[k, 1]]);
            circular[k][(i, j)].norm_sqr() * flux(&self.solved.flux_back)
                / flux(&self.solved.flux_front)
        })
    }

    /// $\rho = r_{pp} / r_{ss}$.
    pub fn rho(&self) -> Array1<Complex64> {
        let r = &self.solved.jones_r;
        Array1::from_shape_fn(self.len(), |k| r[[k, 0, 0]] / r[[k, 1, 1]])
    }

    /// Ellipsometric angle $\psi = \arctan\lvert\rho\rvert$ in degrees.
    pub fn psi(&self) -> Array1<f64> {
        self.rho().mapv(|rho| rho.norm().atan().to_degrees())
    }

    /// Ellipsometric angle $\Delta = \arg\rho$ in degrees, in $(-180°, 180°]$.
    pub fn delta(&self) -> Array1<f64> {
        self.rho().mapv(|rho| {
            let delta = rho.arg().to_degrees();
            if delta <= -180.0 {
                delta + 360.0
            } else {
                delta
            }
        })
    }

    pub fn psi_delta(&self) -> (Array1<f64>, Array1<f64>) {
        (self.psi(), self.delta())
    }

    pub fn generalized_ellipsometry(&self) -> GeneralizedEllipsometry {
        let r = &self.solved.jones_r;
        let n = self.len();
        GeneralizedEllipsometry {
            rho_pp: Array1::from_shape_fn(n, |k| r[[k, 0, 0]] / r[[k, 1, 1]]),
            rho_ps: Array1::from_shape_fn(n, |k| r[[k, 0, 1]] / r[[k, 0, 0]]),
            rho_sp: Array1::from_shape_fn(n, |k| r[[k, 1, 0]] / r[[k, 1, 1]]),
        }
    }

    /// Reflection Mueller matrices, shape `(n, 4, 4)`.
    pub fn mueller_matrix(&self) -> Array3<f64> {
        let n = self.len();
        let mueller: Vec<_> = (0..n)
            .map(|k| mueller_from_jones(&self.solved.r_at(k)))
            .collect();
        Array3::from_shape_fn((n, 4, 4), |(k, i, j)| mueller[k][(i, j)])
    }

    /// Mueller matrices divided by their $M_{00}$ element.
    pub fn mueller_matrix_normalized(&self) -> Array3<f64> {
        let mut mueller = self.mueller_matrix();
        for mut block in mueller.outer_iter_mut() {
            let m00 = block[[0, 0]];
            block.mapv_inplace(|m| m / m00);
        }
        mueller
    }

    /// Reflected intensity $(M S_\text{inc})_0$ for the incident light.
    pub fn reflected_intensity(&self) -> Array1<f64> {
        let stokes = Vector4::from(self.light.stokes());
        Array1::from_shape_fn(self.len(), |k| {
            (mueller_from_jones(&self.solved.r_at(k)) * stokes)[0]
        })
    }

    fn len(&self) -> usize {
        self.solved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::WavelengthSolution;
    use approx::assert_abs_diff_eq;

    fn result_with(r: Matrix2<Complex64>) -> ExperimentResult {
        let solution = WavelengthSolution {
            r,
            t: Matrix2::identity(),
            kz_front: Complex64::new(1.0, 0.0),
            kz_back: [Complex64::new(1.0, 0.0); 2],
            flux_front: [1.0; 2],
            flux_back: [1.0; 2],
            transfer: None,
        };
        ExperimentResult::new(
            SolvedMatrices::from_solutions(&[solution]),
            vec![500.0],
            0.0,
            IncidentLight::default(),
            SolverKind::Simple2x2,
        )
    }

    fn diag(p: Complex64, s: Complex64) -> Matrix2<Complex64> {
        let zero = Complex64::new(0.0, 0.0);
        Matrix2::new(p, zero, zero, s)
    }

    #[test]
    fn test_psi_delta_from_rho() {
        let r_ss = Complex64::new(-0.5, 0.0);
        let r_pp = r_ss * Complex64::from_polar(0.3f64.tan(), 1.0);
        let result = result_with(diag(r_pp, r_ss));
        let (psi, delta) = result.psi_delta();
        assert_abs_diff_eq!(psi[0], 0.3f64.to_degrees(), epsilon = 1e-12);
        assert_abs_diff_eq!(delta[0], 1.0f64.to_degrees(), epsilon = 1e-12);
    }

    #[test]
    fn test_delta_interval_is_half_open() {
        // arg(-1) may come out as ±180°; the result is always +180°.
        let result = result_with(diag(Complex64::new(-1.0, -0.0), Complex64::new(1.0, 0.0)));
        assert_abs_diff_eq!(result.delta()[0], 180.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ideal_mirror_mueller() {
        let r = 0.6;
        let result = result_with(diag(Complex64::new(r, 0.0), Complex64::new(-r, 0.0)));
        let m = result.mueller_matrix();
        let expected = [r * r, r * r, -r * r, -r * r];
        for i in 0..4 {
            for j in 0..4 {
                let want = if i == j { expected[i] } else { 0.0 };
                assert_abs_diff_eq!(m[[0, i, j]], want, epsilon = 1e-14);
            }
        }
        let normalized = result.mueller_matrix_normalized();
        assert_abs_diff_eq!(normalized[[0, 3, 3]], -1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(result.reflected_intensity()[0], r * r, epsilon = 1e-14);
    }

    #[test]
    fn test_circular_reflectance_of_mirror_flips_handedness() {
        let result = result_with(diag(Complex64::new(1.0, 0.0), Complex64::new(-1.0, 0.0)));
        let rc = result.reflectance_circular();
        assert_abs_diff_eq!(rc[[0, 0, 0]], 0.0, epsilon = 1e-14);
        assert_abs_diff_eq!(rc[[0, 1, 0]], 1.0, epsilon = 1e-14);
    }
}
