//! Simulation runner: ties together materials, stack and solver.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use num_complex::Complex64;
use serde::Serialize;

use lamina_core::{
    quarter_wave_thickness, Experiment, ExperimentResult, IncidentLight, Layer, Length,
    RepeatedLayers, StackElement, Structure,
};
use lamina_import::spectraray::read_psi_delta_file;
use lamina_import::{angles, at_angle, Delimiters, PsiDeltaRecord};
use lamina_materials::catalog::Catalog;
use lamina_materials::formulas::{Cauchy, ConstantIndex, Sellmeier};
use lamina_materials::table::TabulatedIndex;
use lamina_materials::{
    BiaxialMaterial, Dispersion, DispersionSum, IsotropicMaterial, OpticalMaterial,
    UniaxialMaterial,
};

use crate::config::{
    Component, DispersionConfig, ElementConfig, JobConfig, LayerConfig, MaterialConfig,
    WavelengthSpec,
};

/// Angles in a measurement file closer than this are the same angle.
const ANGLE_TOLERANCE_DEG: f64 = 1e-6;

/// Everything needed to solve a job.
pub struct Setup {
    pub structure: Structure,
    pub wavelengths: Vec<f64>,
    pub light: Option<IncidentLight>,
    pub measurement: Option<Vec<PsiDeltaRecord>>,
}

/// Results from a simulation run.
pub struct SimulationOutput {
    pub result: ExperimentResult,
    /// Measured ψ/Δ at the simulated wavelengths, if a measurement was given.
    pub measurement: Option<Vec<PsiDeltaRecord>>,
}

/// Build materials, structure, wavelengths and light from a job.
pub fn build_setup(job: &JobConfig, base_dir: Option<&Path>) -> Result<Setup> {
    let catalog = Catalog::builtin();
    let mut materials: BTreeMap<&str, Arc<dyn OpticalMaterial>> = BTreeMap::new();
    for (id, config) in &job.materials {
        materials.insert(id.as_str(), build_material(id, config, &catalog)?);
    }

    let lookup = |id: &str| -> Result<Arc<dyn OpticalMaterial>> {
        materials.get(id).cloned().with_context(|| {
            format!(
                "Unknown material '{}'. Defined materials: {}",
                id,
                materials.keys().copied().collect::<Vec<_>>().join(", ")
            )
        })
    };

    let mut elements = Vec::with_capacity(job.stack.layer.len());
    for (idx, element) in job.stack.layer.iter().enumerate() {
        let element = match element {
            ElementConfig::Layer(layer) => StackElement::Layer(build_layer(layer, &lookup)?),
            ElementConfig::Repeated {
                repeat,
                front_partial,
                back_partial,
                period,
            } => {
                let period = period
                    .iter()
                    .map(|layer| build_layer(layer, &lookup))
                    .collect::<Result<Vec<_>>>()?;
                let block = RepeatedLayers::new(period, *repeat, *front_partial, *back_partial)
                    .with_context(|| format!("Stack entry {}", idx + 1))?;
                StackElement::Repeated(block)
            }
        };
        elements.push(element);
    }

    let structure = Structure::new(lookup(&job.stack.front)?, elements, lookup(&job.stack.back)?)
        .context("Invalid structure")?;

    let measurement = match &job.measurement {
        Some(config) => {
            let path = match base_dir {
                Some(dir) => dir.join(&config.file),
                None => config.file.clone().into(),
            };
            let delimiters = Delimiters {
                separator: config.separator,
                decimal: config.decimal,
            };
            let records = read_psi_delta_file(&path, delimiters)
                .with_context(|| format!("Reading measurement {}", path.display()))?;
            let selected = at_angle(&records, job.simulation.angle, ANGLE_TOLERANCE_DEG);
            if selected.is_empty() {
                anyhow::bail!(
                    "Measurement {} has no data at {}°. Measured angles: {:?}",
                    path.display(),
                    job.simulation.angle,
                    angles(&records)
                );
            }
            log::info!(
                "Loaded {} of {} measured points at {}° from {}",
                selected.len(),
                records.len(),
                job.simulation.angle,
                path.display()
            );
            Some(selected)
        }
        None => None,
    };

    let wavelengths = match (&measurement, &job.simulation.wavelengths) {
        (Some(records), _) => records.iter().map(|r| r.wavelength_nm).collect(),
        (None, Some(WavelengthSpec::Range { range, points })) => {
            let (start, end) = (range[0], range[1]);
            (0..*points)
                .map(|i| start + (end - start) * i as f64 / points.saturating_sub(1).max(1) as f64)
                .collect()
        }
        (None, Some(WavelengthSpec::List { values })) => values.clone(),
        (None, None) => anyhow::bail!("simulation.wavelengths is required without a measurement"),
    };

    let light = job
        .simulation
        .light
        .as_ref()
        .map(|components| {
            let vector: Vec<Complex64> = components
                .iter()
                .map(|c| match *c {
                    Component::Real(re) => Complex64::new(re, 0.0),
                    Component::Complex([re, im]) => Complex64::new(re, im),
                })
                .collect();
            IncidentLight::from_vector(&vector).context("Invalid simulation.light")
        })
        .transpose()?;

    Ok(Setup {
        structure,
        wavelengths,
        light,
        measurement,
    })
}

/// Run a full simulation from a parsed job configuration.
pub fn run_simulation(job: &JobConfig, base_dir: Option<&Path>) -> Result<SimulationOutput> {
    let setup = build_setup(job, base_dir)?;
    println!(
        "Structure: {} layers between '{}' and '{}'",
        setup.structure.elementary_layer_count(),
        setup.structure.front().name(),
        setup.structure.back().name()
    );
    println!(
        "Wavelengths: {} points, {:.1}–{:.1} nm, θ = {}°",
        setup.wavelengths.len(),
        setup.wavelengths.first().copied().unwrap_or_default(),
        setup.wavelengths.last().copied().unwrap_or_default(),
        job.simulation.angle
    );

    let mut experiment = Experiment::new(setup.structure, setup.wavelengths, job.simulation.angle)
        .with_config(job.solver.clone());
    if let Some(light) = setup.light {
        experiment.set_light(light);
    }

    let result = experiment
        .evaluate(&job.simulation.solver)
        .with_context(|| format!("Solver '{}' failed", job.simulation.solver))?;
    println!("Solved with {}", result.solver());

    if let Some(records) = &setup.measurement {
        let (psi, delta) = result.psi_delta();
        let n = records.len() as f64;
        let rms_psi = (records.iter().zip(psi.iter()).map(|(m, s)| (m.psi_deg - s).powi(2)).sum::<f64>() / n).sqrt();
        let rms_delta = (records
            .iter()
            .zip(delta.iter())
            .map(|(m, s)| wrap_degrees(m.delta_deg - s).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();
        println!("Measurement RMS deviation: ψ {rms_psi:.4}°, Δ {rms_delta:.4}°");
    }

    Ok(SimulationOutput {
        result,
        measurement: setup.measurement,
    })
}

/// Map an angle difference to $(-180°, 180°]$.
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

fn build_dispersion(
    id: &str,
    config: &DispersionConfig,
    catalog: &Catalog,
) -> Result<Arc<dyn Dispersion>> {
    Ok(match config {
        DispersionConfig::Constant { n, k } => {
            Arc::new(ConstantIndex::new(Complex64::new(*n, *k)).with_name(id))
        }
        DispersionConfig::Sellmeier {
            terms,
            eps_inf,
            range,
        } => {
            let mut sellmeier = terms
                .iter()
                .fold(Sellmeier::new(id), |s, [a, b]| s.term(*a, *b))
                .eps_inf(*eps_inf);
            if let Some([min, max]) = range {
                sellmeier = sellmeier.valid_between(*min, *max);
            }
            Arc::new(sellmeier)
        }
        DispersionConfig::Cauchy { a, b, c } => Arc::new(Cauchy::new(id, *a, *b, *c)),
        DispersionConfig::Catalog { book, page } => catalog
            .load_dispersion(book, page)
            .with_context(|| format!("Material '{}'", id))?,
        DispersionConfig::Tabulated { rows } => {
            let rows: Vec<(f64, f64, f64)> = rows.iter().map(|&[wl, n, k]| (wl, n, k)).collect();
            Arc::new(
                TabulatedIndex::from_rows(id, &rows)
                    .with_context(|| format!("Material '{}'", id))?,
            )
        }
        DispersionConfig::Sum { members } => {
            let members = members
                .iter()
                .map(|member| build_dispersion(id, member, catalog))
                .collect::<Result<Vec<_>>>()?;
            Arc::new(
                DispersionSum::new(members)
                    .with_context(|| format!("Material '{}'", id))?
                    .with_name(id),
            )
        }
    })
}

fn build_material(
    id: &str,
    config: &MaterialConfig,
    catalog: &Catalog,
) -> Result<Arc<dyn OpticalMaterial>> {
    Ok(match config {
        MaterialConfig::Isotropic(dispersion) => Arc::new(IsotropicMaterial::new(
            build_dispersion(id, dispersion, catalog)?,
        )),
        MaterialConfig::Uniaxial {
            ordinary,
            extraordinary,
            orientation,
        } => Arc::new(
            UniaxialMaterial::new(
                build_dispersion(&format!("{id} (o)"), ordinary, catalog)?,
                build_dispersion(&format!("{id} (e)"), extraordinary, catalog)?,
            )
            .rotated(*orientation)
            .with_name(id),
        ),
        MaterialConfig::Biaxial { x, y, z, orientation } => Arc::new(
            BiaxialMaterial::new(
                build_dispersion(&format!("{id} (x)"), x, catalog)?,
                build_dispersion(&format!("{id} (y)"), y, catalog)?,
                build_dispersion(&format!("{id} (z)"), z, catalog)?,
            )
            .rotated(*orientation),
        ),
    })
}

fn build_layer(
    config: &LayerConfig,
    lookup: &dyn Fn(&str) -> Result<Arc<dyn OpticalMaterial>>,
) -> Result<Layer> {
    let material = lookup(&config.material)?;
    let thickness = match (config.thickness, config.quarter_wave) {
        (Some(thickness), None) => Length::new(thickness, config.unit),
        (None, Some(lambda0)) => quarter_wave_thickness(material.as_ref(), lambda0)
            .with_context(|| format!("Quarter-wave layer of '{}'", config.material))?,
        (Some(_), Some(_)) => anyhow::bail!(
            "Layer of '{}' sets both 'thickness' and 'quarter_wave'",
            config.material
        ),
        (None, None) => anyhow::bail!(
            "Layer of '{}' requires 'thickness' or 'quarter_wave'",
            config.material
        ),
    };
    Layer::new(material, thickness).with_context(|| format!("Layer of '{}'", config.material))
}

/// One row of the observables table.
#[derive(Debug, Serialize)]
struct ObservableRow {
    wavelength_nm: f64,
    psi_deg: f64,
    delta_deg: f64,
    r_pp: f64,
    r_ss: f64,
    t_pp: f64,
    t_ss: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    measured_psi_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    measured_delta_deg: Option<f64>,
}

fn observable_rows(output: &SimulationOutput) -> Vec<ObservableRow> {
    let result = &output.result;
    let (psi, delta) = result.psi_delta();
    let r = result.reflectance();
    let t = result.transmittance();
    result
        .wavelengths()
        .iter()
        .enumerate()
        .map(|(k, &wavelength_nm)| {
            let measured = output.measurement.as_ref().and_then(|m| m.get(k));
            ObservableRow {
                wavelength_nm,
                psi_deg: psi[k],
                delta_deg: delta[k],
                r_pp: r[[k, 0, 0]],
                r_ss: r[[k, 1, 1]],
                t_pp: t[[k, 0, 0]],
                t_ss: t[[k, 1, 1]],
                measured_psi_deg: measured.map(|m| m.psi_deg),
                measured_delta_deg: measured.map(|m| m.delta_deg),
            }
        })
        .collect()
}

/// Write the observables to a CSV file with a metadata header.
pub fn write_observables_csv(output: &SimulationOutput, path: &Path, job: &JobConfig) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Creating {}", path.display()))?;

    writeln!(file, "# Lamina Transfer-Matrix Solver — Observables")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# solver: {}", output.result.solver())?;
    writeln!(file, "# angle_deg: {}", output.result.incidence_angle())?;
    writeln!(file, "# stack: {} | {} layer entries | {}", job.stack.front, job.stack.layer.len(), job.stack.back)?;
    writeln!(file, "#")?;

    let has_measurement = output.measurement.is_some();
    if has_measurement {
        writeln!(file, "wavelength_nm,psi_deg,delta_deg,R_pp,R_ss,T_pp,T_ss,measured_psi_deg,measured_delta_deg")?;
    } else {
        writeln!(file, "wavelength_nm,psi_deg,delta_deg,R_pp,R_ss,T_pp,T_ss")?;
    }

    for row in observable_rows(output) {
        write!(
            file,
            "{:.3},{:.6},{:.6},{:.8e},{:.8e},{:.8e},{:.8e}",
            row.wavelength_nm, row.psi_deg, row.delta_deg, row.r_pp, row.r_ss, row.t_pp, row.t_ss
        )?;
        if has_measurement {
            write!(
                file,
                ",{:.6},{:.6}",
                row.measured_psi_deg.unwrap_or(f64::NAN),
                row.measured_delta_deg.unwrap_or(f64::NAN)
            )?;
        }
        writeln!(file)?;
    }

    println!("Observables written to: {}", path.display());
    Ok(())
}

/// Write the observables to a JSON file.
pub fn write_observables_json(output: &SimulationOutput, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&observable_rows(output))
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Observables (JSON) written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn job(extra: &str) -> JobConfig {
        let content = format!(
            r#"
[simulation]
wavelengths = {{ values = [500.0, 600.0] }}
angle = 0.0
solver = "simple2x2"

[materials.air]
type = "constant"
n = 1.0

[materials.glass]
type = "constant"
n = 1.5

[stack]
front = "air"
back = "glass"
{extra}
"#
        );
        toml::from_str(&content).unwrap()
    }

    #[test]
    fn test_bare_interface_run() {
        let output = run_simulation(&job(""), None).unwrap();
        let r = output.result.reflectance();
        assert_relative_eq!(r[[0, 1, 1]], 0.04, max_relative = 1e-10);
        assert_eq!(observable_rows(&output).len(), 2);
    }

    #[test]
    fn test_quarter_wave_layer_and_unknown_material() {
        let setup = build_setup(
            &job("[[stack.layer]]\nmaterial = \"glass\"\nquarter_wave = 600.0\n"),
            None,
        )
        .unwrap();
        let layer = setup.structure.elementary_layers().next().unwrap();
        assert_relative_eq!(layer.thickness().nanometres(), 100.0, max_relative = 1e-12);

        let err = build_setup(
            &job("[[stack.layer]]\nmaterial = \"unobtainium\"\nthickness = 10.0\n"),
            None,
        )
        .err()
        .unwrap();
        assert!(format!("{err:#}").contains("unobtainium"));
    }

    #[test]
    fn test_sum_dispersion_from_config() {
        let catalog = Catalog::builtin();
        let config: DispersionConfig = toml::from_str(
            r#"
type = "sum"
members = [
    { type = "sellmeier", terms = [[0.5, 0.0]] },
    { type = "sellmeier", terms = [[0.75, 0.0]], eps_inf = 0.0 },
]
"#,
        )
        .unwrap();
        let film = build_dispersion("film", &config, &catalog).unwrap();
        assert_eq!(film.name(), "film");
        assert_relative_eq!(film.refractive_index(600.0).unwrap().re, 1.5, max_relative = 1e-12);

        let config: DispersionConfig = toml::from_str(
            "type = \"sum\"\nmembers = [{ type = \"constant\", n = 1.5 }, { type = \"cauchy\", a = 1.4 }]\n",
        )
        .unwrap();
        let err = build_dispersion("film", &config, &catalog).err().unwrap();
        assert!(format!("{err:#}").contains("index based"));
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(350.0), -10.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
    }
}
