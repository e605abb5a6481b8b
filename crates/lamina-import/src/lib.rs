//! # Lamina Import
//!
//! Readers for measured ellipsometry data, for comparison against solved
//! structures.
//!
//! Supported formats:
//! - [SpectraRay](spectraray) ASCII exports: ψ/Δ tables (one or more angles
//!   of incidence) and Mueller-matrix tables.

pub mod spectraray;

use num_complex::Complex64;
use serde::Serialize;
use thiserror::Error;

/// Errors during measurement file parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Format { line: usize, message: String },
}

/// Field and decimal separators of a delimited text export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Field separator. `None` splits on any run of whitespace.
    pub separator: Option<char>,
    pub decimal: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            separator: None,
            decimal: '.',
        }
    }
}

impl Delimiters {
    pub fn with_separator(separator: char) -> Self {
        Self {
            separator: Some(separator),
            ..Self::default()
        }
    }

    /// Non-empty fields of one line.
    pub(crate) fn fields<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self.separator {
            None => line.split_whitespace().collect(),
            Some(sep) => line.split(sep).map(str::trim).filter(|f| !f.is_empty()).collect(),
        }
    }

    pub(crate) fn number(&self, field: &str, line: usize) -> Result<f64, ParseError> {
        let normalised;
        let text = if self.decimal == '.' {
            field
        } else {
            normalised = field.replace(self.decimal, ".");
            &normalised
        };
        text.trim().parse().map_err(|_| ParseError::Format {
            line,
            message: format!("Invalid number '{}'", field),
        })
    }
}

/// One measured (ψ, Δ) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PsiDeltaRecord {
    pub angle_deg: f64,
    pub wavelength_nm: f64,
    pub psi_deg: f64,
    /// In $(-180°, 180°]$.
    pub delta_deg: f64,
}

impl PsiDeltaRecord {
    /// $\rho = \tan\psi \, e^{i\Delta}$.
    pub fn rho(&self) -> Complex64 {
        Complex64::from_polar(self.psi_deg.to_radians().tan(), self.delta_deg.to_radians())
    }
}

/// One measured ellipsometric ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhoRecord {
    pub angle_deg: f64,
    pub wavelength_nm: f64,
    pub rho: Complex64,
}

/// One measured Mueller matrix, rows `M11..M14` to `M41..M44`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MuellerRecord {
    pub wavelength_nm: f64,
    pub elements: [[f64; 4]; 4],
}

/// Distinct angles of incidence in a ψ/Δ table, in ascending order.
pub fn angles(records: &[PsiDeltaRecord]) -> Vec<f64> {
    let mut angles: Vec<f64> = records.iter().map(|r| r.angle_deg).collect();
    angles.sort_by(f64::total_cmp);
    angles.dedup();
    angles
}

/// Records measured at `angle_deg` (within `tolerance`), ordered by wavelength.
pub fn at_angle(records: &[PsiDeltaRecord], angle_deg: f64, tolerance: f64) -> Vec<PsiDeltaRecord> {
    records
        .iter()
        .filter(|r| (r.angle_deg - angle_deg).abs() <= tolerance)
        .copied()
        .collect()
}
