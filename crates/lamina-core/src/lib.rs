//! # Lamina Core
//!
//! Light propagation through stacks of planar, homogeneous, possibly
//! anisotropic layers. A [`Structure`](structure::Structure) (entry medium,
//! layers, exit medium) is handed to a [`Solver`](solver::Solver) together with
//! a wavelength batch and an angle of incidence; the solved Jones matrices are
//! wrapped in an [`ExperimentResult`](result::ExperimentResult) that derives
//! reflectance, transmittance, ellipsometric angles and Mueller matrices.
//!
//! ## Solvers
//!
//! - [`solver::berreman::BerremanSolver`] — general 4×4 Berreman formalism
//!   based on the matrix exponential of the differential propagation matrix.
//!   Handles anisotropic layers and cross-polarisation.
//! - [`solver::recursive::RecursiveSolver`] — isotropic 2×2 Airy recursion.
//!   Faster, and a closed-form reference for the 4×4 path.
//!
//! ## Modules
//!
//! - [`units`] — Length units; lengths are stored in metres.
//! - [`layer`] — Layers and periodic layer blocks.
//! - [`structure`] — The ordered stack between two half-infinite media.
//! - [`solver`] — Solver trait, solver selection and implementations.
//! - [`polarization`] — Jones/Stokes/Mueller algebra.
//! - [`experiment`] — Incident light, wavelengths, angle and solver selection.
//! - [`result`] — Observables derived from the solved matrices.
//! - [`config`] — Solver configuration record.

pub mod batch;
pub mod config;
pub mod error;
pub mod experiment;
pub mod layer;
pub mod polarization;
pub mod result;
pub mod solver;
pub mod structure;
pub mod units;

pub use config::{ExpmAlgorithm, Precision, SolverConfig};
pub use error::OpticsError;
pub use experiment::{Experiment, IncidentLight, DEFAULT_SOLVER};
pub use layer::{quarter_wave_thickness, Layer, RepeatedLayers, StackElement};
pub use result::{ExperimentResult, GeneralizedEllipsometry};
pub use solver::{SolvedMatrices, Solver, SolverKind};
pub use structure::Structure;
pub use units::{Length, LengthUnit};
