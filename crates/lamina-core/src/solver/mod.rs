//! Solver abstraction and implementations.
//!
//! The [`Solver`] trait is the interface every transfer-matrix method
//! implements: it turns a [`Structure`], a wavelength batch and an angle of
//! incidence into the per-wavelength Jones reflection and transmission
//! matrices. Implementations are selected by [`SolverKind`], never by
//! free-form names.
//!
//! All normal wavevector components in this module are expressed in units of
//! the vacuum wavenumber $k_0 = 2\pi/\lambda$, so that the in-plane component
//! is the Snell invariant $K_x = n_\text{front} \sin\theta$ and the normal
//! component in an isotropic medium is $q = \sqrt{n^2 - K_x^2}$.

pub mod berreman;
pub(crate) mod expm;
pub(crate) mod modes;
pub mod recursive;

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix2, Matrix4};
use ndarray::{Array1, Array2, Array3};
use num_complex::Complex64;
use serde::Deserialize;

use crate::config::SolverConfig;
use crate::error::OpticsError;
use crate::structure::Structure;

use self::berreman::BerremanSolver;
use self::recursive::RecursiveSolver;

/// The core trait that all layer-stack solvers implement.
///
/// `solve` is a pure function of its inputs: the structure is only read, and
/// the wavelengths are processed independently of each other.
pub trait Solver: Send + Sync {
    /// Solve the structure for every wavelength (nm) at one angle of
    /// incidence (degrees, measured in the front medium).
    fn solve(
        &self,
        structure: &Structure,
        wavelengths_nm: &[f64],
        angle_deg: f64,
    ) -> Result<SolvedMatrices, OpticsError>;

    fn kind(&self) -> SolverKind;

    /// Human-readable name of the solver method.
    fn method_name(&self) -> &str;
}

/// Enumerated solver selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum SolverKind {
    /// General anisotropic 4×4 Berreman formalism.
    #[serde(rename = "berreman4x4")]
    Berreman4x4,
    /// Isotropic 2×2 recursive formalism.
    #[serde(rename = "simple2x2")]
    Simple2x2,
}

impl SolverKind {
    pub const ALL: [SolverKind; 2] = [SolverKind::Berreman4x4, SolverKind::Simple2x2];

    /// Name used in configuration files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Berreman4x4 => "berreman4x4",
            SolverKind::Simple2x2 => "simple2x2",
        }
    }

    /// Comma-separated list of every valid solver name.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Instantiate the solver with the given configuration.
    pub fn solver(self, config: &SolverConfig) -> Box<dyn Solver> {
        match self {
            SolverKind::Berreman4x4 => Box::new(BerremanSolver::new(config.expm, config.parallel)),
            SolverKind::Simple2x2 => Box::new(RecursiveSolver::new(config.parallel)),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverKind {
    type Err = OpticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| OpticsError::UnknownSolver {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

/// Solution of a single wavelength.
#[derive(Debug, Clone)]
pub struct WavelengthSolution {
    pub r: Matrix2<Complex64>,
    pub t: Matrix2<Complex64>,
    /// Normal wavevector component in the front medium.
    pub kz_front: Complex64,
    /// Normal wavevector components of the transmitted (p-like, s-like) modes.
    pub kz_back: [Complex64; 2],
    /// Poynting flux along +z carried by the incident (p, s) modes.
    pub flux_front: [f64; 2],
    /// Poynting flux along +z carried by the transmitted (p-like, s-like) modes.
    pub flux_back: [f64; 2],
    /// Global 4×4 field transfer matrix, when the solver builds one.
    pub transfer: Option<Matrix4<Complex64>>,
}

/// Per-wavelength solved matrices for a whole batch.
///
/// Axis 0 of every array follows the order of the wavelength batch. Jones
/// index 0 is p, index 1 is s; `jones_r[[k, i, j]]` maps incident
/// polarisation `j` to reflected polarisation `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedMatrices {
    pub jones_r: Array3<Complex64>,
    pub jones_t: Array3<Complex64>,
    /// Normal wavevector component in the front medium, in units of $k_0$.
    pub kz_front: Array1<Complex64>,
    /// Normal wavevector components of the transmitted (p, s) modes.
    pub kz_back: Array2<Complex64>,
    /// Flux of the unit-amplitude incident modes, shape `(n, 2)`.
    pub flux_front: Array2<f64>,
    /// Flux of the unit-amplitude transmitted modes, shape `(n, 2)`.
    pub flux_back: Array2<f64>,
    /// Global 4×4 transfer matrices (Berreman solver only).
    pub transfer: Option<Array3<Complex64>>,
}

impl SolvedMatrices {
    /// Stack per-wavelength solutions into batch arrays.
    pub fn from_solutions(solutions: &[WavelengthSolution]) -> Self {
        let n = solutions.len();
        let jones_r = Array3::from_shape_fn((n, 2, 2), |(k, i, j)| solutions[k].r[(i, j)]);
        let jones_t = Array3::from_shape_fn((n, 2, 2), |(k, i, j)| solutions[k].t[(i, j)]);
        let kz_front = solutions.iter().map(|s| s.kz_front).collect();
        let kz_back = Array2::from_shape_fn((n, 2), |(k, i)| solutions[k].kz_back[i]);
        let flux_front = Array2::from_shape_fn((n, 2), |(k, i)| solutions[k].flux_front[i]);
        let flux_back = Array2::from_shape_fn((n, 2), |(k, i)| solutions[k].flux_back[i]);
        let transfer = if n > 0 && solutions.iter().all(|s| s.transfer.is_some()) {
            Some(Array3::from_shape_fn((n, 4, 4), |(k, i, j)| {
                solutions[k]
                    .transfer
                    .map_or(Complex64::new(0.0, 0.0), |m| m[(i, j)])
            }))
        } else {
            None
        };
        Self {
            jones_r,
            jones_t,
            kz_front,
            kz_back,
            flux_front,
            flux_back,
            transfer,
        }
    }

    pub fn len(&self) -> usize {
        self.kz_front.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kz_front.is_empty()
    }

    /// Round every stored value through `f32`.
    pub fn round_to_single(&mut self) {
        let round = |z: &mut Complex64| {
            *z = Complex64::new(z.re as f32 as f64, z.im as f32 as f64);
        };
        self.jones_r.iter_mut().for_each(round);
        self.jones_t.iter_mut().for_each(round);
        self.kz_front.iter_mut().for_each(round);
        self.kz_back.iter_mut().for_each(round);
        for flux in self.flux_front.iter_mut().chain(self.flux_back.iter_mut()) {
            *flux = *flux as f32 as f64;
        }
        if let Some(transfer) = self.transfer.as_mut() {
            transfer.iter_mut().for_each(round);
        }
    }

    /// Reflection Jones matrix at batch index `k`.
    pub fn r_at(&self, k: usize) -> Matrix2<Complex64> {
        Matrix2::from_fn(|i, j| self.jones_r[[k, i, j]])
    }

    /// Transmission Jones matrix at batch index `k`.
    pub fn t_at(&self, k: usize) -> Matrix2<Complex64> {
        Matrix2::from_fn(|i, j| self.jones_t[[k, i, j]])
    }
}

/// Snell invariant $K_x = n_\text{front} \sin\theta$.
pub(crate) fn in_plane_wavevector(n_front: Complex64, angle_deg: f64) -> Complex64 {
    n_front * angle_deg.to_radians().sin()
}

/// Normal component $q = \sqrt{\varepsilon - K_x^2}$ on the causal branch:
/// $\mathrm{Im}\,q \ge 0$, and $\mathrm{Re}\,q \ge 0$ when $q$ is real.
pub(crate) fn normal_wavevector(epsilon: Complex64, kx: Complex64) -> Complex64 {
    let q = (epsilon - kx * kx).sqrt();
    if q.im < 0.0 || (q.im == 0.0 && q.re < 0.0) {
        -q
    } else {
        q
    }
}
