//! Experiment façade: structure, incident light, wavelengths, angle and
//! solver selection.

use num_complex::Complex64;

use crate::config::SolverConfig;
use crate::error::OpticsError;
use crate::polarization::{jones_to_stokes, stokes_to_jones, validate_stokes};
use crate::result::ExperimentResult;
use crate::solver::SolverKind;
use crate::structure::Structure;
use crate::units::Length;

/// Name that selects [`SolverConfig::default_solver`].
pub const DEFAULT_SOLVER: &str = "default";

/// Polarisation state of the incident light.
///
/// Whichever representation was supplied is kept as the source of truth;
/// the other is derived on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IncidentLight {
    /// Complex amplitudes $(E_p, E_s)$.
    Jones([Complex64; 2]),
    /// Stokes parameters $(S_0, S_1, S_2, S_3)$.
    Stokes([f64; 4]),
}

impl Default for IncidentLight {
    /// Unpolarised light of unit intensity.
    fn default() -> Self {
        IncidentLight::Stokes([1.0, 0.0, 0.0, 0.0])
    }
}

impl IncidentLight {
    pub fn from_jones(jones: [Complex64; 2]) -> Result<Self, OpticsError> {
        if jones.iter().any(|z| !z.is_finite()) {
            return Err(OpticsError::InvalidVector(format!(
                "Jones vector {:?} has non-finite entries",
                jones
            )));
        }
        if jones[0].norm_sqr() + jones[1].norm_sqr() == 0.0 {
            return Err(OpticsError::InvalidVector("Jones vector is zero".into()));
        }
        Ok(IncidentLight::Jones(jones))
    }

    pub fn from_stokes(stokes: [f64; 4]) -> Result<Self, OpticsError> {
        validate_stokes(&stokes)?;
        Ok(IncidentLight::Stokes(stokes))
    }

    /// A 2-component vector is a Jones vector, a 4-component one a Stokes
    /// vector (which must be real). Any other length is rejected.
    pub fn from_vector(vector: &[Complex64]) -> Result<Self, OpticsError> {
        match *vector {
            [p, s] => Self::from_jones([p, s]),
            [s0, s1, s2, s3] => {
                let components = [s0, s1, s2, s3];
                if components.iter().any(|z| z.im != 0.0) {
                    return Err(OpticsError::InvalidVector(
                        "Stokes parameters must be real".into(),
                    ));
                }
                Self::from_stokes(components.map(|z| z.re))
            }
            _ => Err(OpticsError::InvalidVector(format!(
                "expected 2 (Jones) or 4 (Stokes) components, got {}",
                vector.len()
            ))),
        }
    }

    pub fn stokes(&self) -> [f64; 4] {
        match self {
            IncidentLight::Jones(jones) => jones_to_stokes(jones),
            IncidentLight::Stokes(stokes) => *stokes,
        }
    }

    /// Fails for partially polarised Stokes light.
    pub fn jones(&self) -> Result<[Complex64; 2], OpticsError> {
        match self {
            IncidentLight::Jones(jones) => Ok(*jones),
            IncidentLight::Stokes(stokes) => stokes_to_jones(stokes),
        }
    }
}

/// A structure probed by light of known polarisation over a wavelength
/// batch at one angle of incidence.
#[derive(Debug, Clone)]
pub struct Experiment {
    structure: Structure,
    wavelengths_nm: Vec<f64>,
    angle_deg: f64,
    light: IncidentLight,
    config: SolverConfig,
}

impl Experiment {
    /// Unpolarised light and the default solver configuration.
    pub fn new(structure: Structure, wavelengths_nm: Vec<f64>, angle_deg: f64) -> Self {
        Self {
            structure,
            wavelengths_nm,
            angle_deg,
            light: IncidentLight::default(),
            config: SolverConfig::default(),
        }
    }

    /// Same as [`Experiment::new`] with wavelengths in arbitrary units.
    pub fn from_lengths(structure: Structure, wavelengths: &[Length], angle_deg: f64) -> Self {
        let wavelengths_nm = wavelengths.iter().map(|wl| wl.nanometres()).collect();
        Self::new(structure, wavelengths_nm, angle_deg)
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_light(mut self, light: IncidentLight) -> Self {
        self.light = light;
        self
    }

    /// Replace the incident light from a Jones or Stokes vector. On error
    /// the previous light is kept.
    pub fn set_vector(&mut self, vector: &[Complex64]) -> Result<(), OpticsError> {
        self.light = IncidentLight::from_vector(vector)?;
        Ok(())
    }

    pub fn set_light(&mut self, light: IncidentLight) {
        self.light = light;
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn structure_mut(&mut self) -> &mut Structure {
        &mut self.structure
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths_nm
    }

    pub fn angle(&self) -> f64 {
        self.angle_deg
    }

    pub fn light(&self) -> &IncidentLight {
        &self.light
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Evaluate with the solver called `name`, or the configured default
    /// for `"default"`.
    pub fn evaluate(&self, name: &str) -> Result<ExperimentResult, OpticsError> {
        let kind = if name == DEFAULT_SOLVER {
            self.config.default_solver
        } else {
            name.parse()?
        };
        self.evaluate_with(kind)
    }

    pub fn evaluate_with(&self, kind: SolverKind) -> Result<ExperimentResult, OpticsError> {
        log::debug!(
            "Evaluating {} wavelengths at {}° with {}",
            self.wavelengths_nm.len(),
            self.angle_deg,
            kind
        );
        self.structure.evaluate_with_light(
            &self.wavelengths_nm,
            self.angle_deg,
            kind,
            &self.config,
            self.light,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_materials::formulas::ConstantIndex;
    use lamina_materials::IsotropicMaterial;
    use std::sync::Arc;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn experiment() -> Experiment {
        let air = Arc::new(IsotropicMaterial::from_dispersion(ConstantIndex::real(1.0)));
        let glass = Arc::new(IsotropicMaterial::from_dispersion(ConstantIndex::real(1.5)));
        let structure = Structure::new(air, Vec::new(), glass).unwrap();
        Experiment::new(structure, vec![500.0, 600.0], 30.0)
    }

    #[test]
    fn test_vector_length_selects_representation() {
        let light = IncidentLight::from_vector(&[c(1.0), Complex64::new(0.0, 1.0)]).unwrap();
        assert!(matches!(light, IncidentLight::Jones(_)));
        assert_eq!(light.stokes()[0], 2.0);

        let light = IncidentLight::from_vector(&[c(1.0), c(0.0), c(1.0), c(0.0)]).unwrap();
        assert!(matches!(light, IncidentLight::Stokes(_)));
    }

    #[test]
    fn test_bad_vector_keeps_previous_light() {
        let mut experiment = experiment();
        experiment.set_vector(&[c(1.0), c(0.0)]).unwrap();
        let before = *experiment.light();

        let err = experiment.set_vector(&[c(1.0), c(0.0), c(0.0)]).unwrap_err();
        assert!(matches!(err, OpticsError::InvalidVector(_)));
        assert_eq!(*experiment.light(), before);

        assert!(experiment
            .set_vector(&[c(1.0), Complex64::new(0.0, 0.5), c(0.0), c(0.0)])
            .is_err());
        assert_eq!(*experiment.light(), before);
    }

    #[test]
    fn test_unpolarised_light_has_no_jones_vector() {
        let err = IncidentLight::default().jones().unwrap_err();
        assert!(matches!(err, OpticsError::PartiallyPolarized { .. }));
    }

    #[test]
    fn test_default_solver_name() {
        let experiment = experiment();
        let result = experiment.evaluate(DEFAULT_SOLVER).unwrap();
        assert_eq!(result.solver(), SolverKind::Berreman4x4);

        let mut config = SolverConfig::default();
        config.default_solver = SolverKind::Simple2x2;
        let result = experiment.with_config(config).evaluate("default").unwrap();
        assert_eq!(result.solver(), SolverKind::Simple2x2);
    }

    #[test]
    fn test_unknown_solver_name_fails() {
        let err = experiment().evaluate("tmatrix").unwrap_err();
        assert!(matches!(err, OpticsError::UnknownSolver { .. }));
    }
}
