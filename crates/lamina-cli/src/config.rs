//! TOML deserialisation of simulation jobs.
//!
//! ```toml
//! [simulation]
//! wavelengths = { range = [400.0, 800.0], points = 201 }
//! angle = 45.0
//! solver = "berreman4x4"
//! light = [[1.0, 0.0], [0.0, 0.0]]
//!
//! [materials.air]
//! type = "constant"
//! n = 1.0
//!
//! [materials.tio2]
//! type = "constant"
//! n = 2.23
//! k = 5.2e-4
//!
//! [materials.glass]
//! type = "catalog"
//! book = "SCHOTT-BK"
//! page = "N-BK7"
//!
//! [stack]
//! front = "air"
//! back = "glass"
//!
//! [[stack.layer]]
//! material = "tio2"
//! thickness = 80.0
//!
//! [[stack.layer]]
//! repeat = 4
//! period = [{ material = "tio2", quarter_wave = 1550.0 }, { material = "air", thickness = 0.3, unit = "um" }]
//! ```

use std::collections::BTreeMap;

use lamina_core::{LengthUnit, SolverConfig};
use lamina_materials::rotation::EulerRotation;
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialConfig>,
    pub stack: StackConfig,
    pub measurement: Option<MeasurementConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Ignored when a measurement file supplies the wavelengths.
    pub wavelengths: Option<WavelengthSpec>,
    /// Angle of incidence in degrees.
    #[serde(default)]
    pub angle: f64,
    /// Solver name, or "default" for the `[solver]` default.
    #[serde(default = "default_solver")]
    pub solver: String,
    /// Incident Jones (2 entries) or Stokes (4 entries) vector.
    pub light: Option<Vec<Component>>,
}

fn default_solver() -> String {
    lamina_core::DEFAULT_SOLVER.into()
}

/// Wavelength specification in nm: either a range or explicit list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WavelengthSpec {
    Range { range: [f64; 2], points: usize },
    List { values: Vec<f64> },
}

/// A light-vector entry: a real number or a `[re, im]` pair.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum Component {
    Real(f64),
    Complex([f64; 2]),
}

/// Scalar dispersion model.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DispersionConfig {
    Constant {
        n: f64,
        #[serde(default)]
        k: f64,
    },
    Sellmeier {
        /// `[A, B]` pairs, B in µm².
        terms: Vec<[f64; 2]>,
        #[serde(default = "default_eps_inf")]
        eps_inf: f64,
        /// Validity range in nm.
        range: Option<[f64; 2]>,
    },
    Cauchy {
        a: f64,
        #[serde(default)]
        b: f64,
        #[serde(default)]
        c: f64,
    },
    /// `(book, page)` entry of the built-in catalog.
    Catalog { book: String, page: String },
    /// `[λ/nm, n, k]` rows.
    Tabulated { rows: Vec<[f64; 3]> },
    /// Sum of dielectric-function models, added in ε.
    Sum { members: Vec<DispersionConfig> },
}

fn default_eps_inf() -> f64 {
    1.0
}

/// A material: isotropic from one dispersion, or a rotated crystal.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MaterialConfig {
    Uniaxial {
        ordinary: DispersionConfig,
        extraordinary: DispersionConfig,
        #[serde(default)]
        orientation: EulerRotation,
    },
    Biaxial {
        x: DispersionConfig,
        y: DispersionConfig,
        z: DispersionConfig,
        #[serde(default)]
        orientation: EulerRotation,
    },
    Isotropic(DispersionConfig),
}

#[derive(Debug, Deserialize)]
pub struct StackConfig {
    /// Material id of the entry medium.
    pub front: String,
    /// Material id of the exit medium.
    pub back: String,
    #[serde(default)]
    pub layer: Vec<ElementConfig>,
}

/// One entry of the layer sequence.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ElementConfig {
    Repeated {
        repeat: usize,
        #[serde(default)]
        front_partial: usize,
        #[serde(default)]
        back_partial: usize,
        period: Vec<LayerConfig>,
    },
    Layer(LayerConfig),
}

#[derive(Debug, Deserialize)]
pub struct LayerConfig {
    pub material: String,
    /// Physical thickness in `unit`.
    pub thickness: Option<f64>,
    #[serde(default)]
    pub unit: LengthUnit,
    /// Design wavelength (nm) of a quarter-wave layer, instead of a thickness.
    pub quarter_wave: Option<f64>,
}

/// Measured ψ/Δ data to compare against; its wavelengths replace
/// `simulation.wavelengths`.
#[derive(Debug, Deserialize)]
pub struct MeasurementConfig {
    /// SpectraRay ψ/Δ export, relative to the job file.
    pub file: String,
    /// Field separator; whitespace when omitted.
    pub separator: Option<char>,
    #[serde(default = "default_decimal")]
    pub decimal: char,
}

fn default_decimal() -> char {
    '.'
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub save_csv: bool,
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_csv: true,
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Load and parse a TOML job file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: JobConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::{Precision, SolverKind};

    const JOB: &str = r#"
[simulation]
wavelengths = { range = [400.0, 800.0], points = 5 }
angle = 70.0
light = [1.0, 0.0, 1.0, 0.0]

[solver]
precision = "single"
default_solver = "simple2x2"

[materials.air]
type = "constant"
n = 1.0

[materials.glass]
type = "catalog"
book = "SCHOTT-BK"
page = "N-BK7"

[materials.calcite]
ordinary = { type = "constant", n = 1.658 }
extraordinary = { type = "constant", n = 1.486 }
orientation = { theta = 45.0 }

[stack]
front = "air"
back = "glass"

[[stack.layer]]
material = "calcite"
thickness = 1.2
unit = "um"

[[stack.layer]]
repeat = 3
back_partial = 1
period = [{ material = "glass", quarter_wave = 600.0 }, { material = "air", thickness = 50.0 }]
"#;

    #[test]
    fn test_parse_full_job() {
        let job: JobConfig = toml::from_str(JOB).unwrap();
        assert_eq!(job.simulation.angle, 70.0);
        assert_eq!(job.simulation.solver, "default");
        assert_eq!(job.solver.precision, Precision::Single);
        assert_eq!(job.solver.default_solver, SolverKind::Simple2x2);
        assert!(job.solver.parallel);
        assert_eq!(job.simulation.light.as_ref().map(Vec::len), Some(4));

        assert!(matches!(
            job.materials["calcite"],
            MaterialConfig::Uniaxial { .. }
        ));
        assert!(matches!(
            job.materials["glass"],
            MaterialConfig::Isotropic(DispersionConfig::Catalog { .. })
        ));

        assert_eq!(job.stack.layer.len(), 2);
        match &job.stack.layer[0] {
            ElementConfig::Layer(layer) => assert_eq!(layer.unit, LengthUnit::Micrometre),
            other => panic!("expected a plain layer, got {other:?}"),
        }
        match &job.stack.layer[1] {
            ElementConfig::Repeated { repeat, back_partial, period, .. } => {
                assert_eq!((*repeat, *back_partial, period.len()), (3, 1, 2));
                assert_eq!(period[0].quarter_wave, Some(600.0));
            }
            other => panic!("expected a repeated block, got {other:?}"),
        }
        assert!(job.output.save_csv);
        assert!(job.measurement.is_none());
    }

    #[test]
    fn test_complex_light_components() {
        let job: JobConfig = toml::from_str(
            r#"
[simulation]
wavelengths = { values = [500.0] }
light = [[0.7071, 0.0], [0.0, 0.7071]]

[stack]
front = "a"
back = "b"
"#,
        )
        .unwrap();
        let light = job.simulation.light.unwrap();
        assert!(matches!(light[1], Component::Complex([re, im]) if re == 0.0 && im == 0.7071));
    }
}
