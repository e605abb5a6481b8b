//! The ordered stack between two half-infinite media.

use std::sync::Arc;

use lamina_materials::OpticalMaterial;
use num_complex::Complex64;

use crate::config::{Precision, SolverConfig};
use crate::error::OpticsError;
use crate::experiment::IncidentLight;
use crate::layer::{Layer, StackElement};
use crate::result::ExperimentResult;
use crate::solver::SolverKind;

/// Front medium, layers (in propagation order) and back medium.
///
/// The front medium must be isotropic: it fixes the Snell invariant and the
/// s/p basis of the Jones matrices.
#[derive(Clone)]
pub struct Structure {
    front: Arc<dyn OpticalMaterial>,
    layers: Vec<StackElement>,
    back: Arc<dyn OpticalMaterial>,
}

impl Structure {
    pub fn new(
        front: Arc<dyn OpticalMaterial>,
        layers: Vec<StackElement>,
        back: Arc<dyn OpticalMaterial>,
    ) -> Result<Self, OpticsError> {
        if !front.is_isotropic() {
            return Err(OpticsError::AnisotropicMaterial {
                solver: "front medium",
                material: front.name().to_string(),
            });
        }
        Ok(Self {
            front,
            layers,
            back,
        })
    }

    pub fn front(&self) -> &Arc<dyn OpticalMaterial> {
        &self.front
    }

    pub fn back(&self) -> &Arc<dyn OpticalMaterial> {
        &self.back
    }

    pub fn layers(&self) -> &[StackElement] {
        &self.layers
    }

    /// Mutable access to the layer sequence between evaluations.
    pub fn layers_mut(&mut self) -> &mut Vec<StackElement> {
        &mut self.layers
    }

    pub fn push(&mut self, element: impl Into<StackElement>) {
        self.layers.push(element.into());
    }

    /// Total number of elementary layers once every block is expanded.
    pub fn elementary_layer_count(&self) -> usize {
        self.layers.iter().map(StackElement::layer_count).sum()
    }

    /// Elementary layers in propagation order.
    pub fn elementary_layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().flat_map(|element| element.layers())
    }

    /// Every material light meets, front to back.
    pub fn materials(&self) -> impl Iterator<Item = &dyn OpticalMaterial> + '_ {
        std::iter::once(self.front.as_ref())
            .chain(self.elementary_layers().map(|layer| layer.material().as_ref()))
            .chain(std::iter::once(self.back.as_ref()))
    }

    /// Complex refractive index of the front medium.
    pub fn front_index(&self, wavelength_nm: f64) -> Result<Complex64, OpticsError> {
        self.front
            .refractive_index(wavelength_nm)?
            .ok_or_else(|| OpticsError::AnisotropicMaterial {
                solver: "front medium",
                material: self.front.name().to_string(),
            })
    }

    /// Solve the structure with the given solver and wrap the outcome.
    ///
    /// The incident light of the result is unpolarised; use
    /// [`Experiment`](crate::experiment::Experiment) to choose another.
    pub fn evaluate(
        &self,
        wavelengths_nm: &[f64],
        angle_deg: f64,
        kind: SolverKind,
        config: &SolverConfig,
    ) -> Result<ExperimentResult, OpticsError> {
        self.evaluate_with_light(
            wavelengths_nm,
            angle_deg,
            kind,
            config,
            IncidentLight::default(),
        )
    }

    pub(crate) fn evaluate_with_light(
        &self,
        wavelengths_nm: &[f64],
        angle_deg: f64,
        kind: SolverKind,
        config: &SolverConfig,
        light: IncidentLight,
    ) -> Result<ExperimentResult, OpticsError> {
        validate_wavelengths(wavelengths_nm)?;
        if !angle_deg.is_finite() {
            return Err(OpticsError::InvalidAngle(angle_deg));
        }
        if !(0.0..90.0).contains(&angle_deg) {
            log::warn!("Angle of incidence {angle_deg}° lies outside [0°, 90°)");
        }

        let solver = kind.solver(config);
        let mut solved = solver.solve(self, wavelengths_nm, angle_deg)?;
        if config.precision == Precision::Single {
            log::warn!("Single precision requested: solved matrices are rounded through f32");
            solved.round_to_single();
        }
        Ok(ExperimentResult::new(
            solved,
            wavelengths_nm.to_vec(),
            angle_deg,
            light,
            kind,
        ))
    }
}

impl std::fmt::Debug for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Structure")
            .field("front", &self.front.name())
            .field("layers", &self.layers)
            .field("back", &self.back.name())
            .finish()
    }
}

fn validate_wavelengths(wavelengths_nm: &[f64]) -> Result<(), OpticsError> {
    if wavelengths_nm.is_empty() {
        return Err(OpticsError::InvalidWavelengths("no wavelengths given".into()));
    }
    if let Some(bad) = wavelengths_nm.iter().find(|wl| !wl.is_finite() || **wl <= 0.0) {
        return Err(OpticsError::InvalidWavelengths(format!(
            "wavelength {bad} nm is not a finite positive length"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::RepeatedLayers;
    use crate::units::Length;
    use lamina_materials::formulas::ConstantIndex;
    use lamina_materials::{IsotropicMaterial, UniaxialMaterial};

    fn material(n: f64) -> Arc<dyn OpticalMaterial> {
        Arc::new(IsotropicMaterial::from_dispersion(ConstantIndex::real(n)))
    }

    fn uniaxial() -> Arc<dyn OpticalMaterial> {
        Arc::new(
            UniaxialMaterial::new(
                Arc::new(ConstantIndex::real(1.5)),
                Arc::new(ConstantIndex::real(1.6)),
            )
            .with_name("calcite-like"),
        )
    }

    #[test]
    fn test_anisotropic_front_is_rejected() {
        let err = Structure::new(uniaxial(), Vec::new(), material(1.5)).unwrap_err();
        assert!(matches!(err, OpticsError::AnisotropicMaterial { .. }));
    }

    #[test]
    fn test_counts_and_material_walk() {
        let a = Layer::new(material(1.4), Length::nm(100.0)).unwrap();
        let b = Layer::new(uniaxial(), Length::nm(50.0)).unwrap();
        let block = RepeatedLayers::new(vec![a.clone(), b], 3, 0, 1).unwrap();
        let structure = Structure::new(
            material(1.0),
            vec![a.into(), block.into()],
            material(1.5),
        )
        .unwrap();
        assert_eq!(structure.elementary_layer_count(), 1 + 6 + 1);
        assert_eq!(structure.materials().count(), 10);
        assert_eq!(
            structure.materials().filter(|m| !m.is_isotropic()).count(),
            3
        );
    }

    #[test]
    fn test_wavelengths_are_validated() {
        let structure = Structure::new(material(1.0), Vec::new(), material(1.5)).unwrap();
        let config = SolverConfig::default();
        for bad in [&[][..], &[500.0, -1.0][..], &[f64::NAN][..]] {
            let err = structure
                .evaluate(bad, 0.0, SolverKind::Berreman4x4, &config)
                .unwrap_err();
            assert!(matches!(err, OpticsError::InvalidWavelengths(_)));
        }
    }
}
