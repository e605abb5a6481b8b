//! Solver configuration record.
//!
//! Passed explicitly to every evaluation; there is no process-wide mutable
//! state. The defaults match what most callers want: double precision, the
//! 4×4 solver, Padé matrix exponential and parallel wavelength batches.

use serde::Deserialize;

use crate::solver::SolverKind;

/// Numeric precision of the solved matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Computed and stored in `f64`.
    #[default]
    Double,
    /// Computed in `f64`, stored rounded through `f32`.
    Single,
}

/// Algorithm used for the layer matrix exponential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpmAlgorithm {
    /// Padé approximant with scaling and squaring.
    #[default]
    Pade,
    /// Truncated Taylor series with scaling and squaring.
    Taylor,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub precision: Precision,
    /// Solver used when a caller asks for `"default"`.
    pub default_solver: SolverKind,
    pub expm: ExpmAlgorithm,
    /// Evaluate wavelengths on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            precision: Precision::Double,
            default_solver: SolverKind::Berreman4x4,
            expm: ExpmAlgorithm::Pade,
            parallel: true,
        }
    }
}
