//! Optical materials: isotropic, uniaxial and biaxial media.
//!
//! Every material answers [`OpticalMaterial::permittivity`] with either a
//! scalar (isotropic) or a full laboratory-frame tensor (anisotropic). The
//! solvers in `lamina-core` only ever talk to this trait.

use std::sync::Arc;

use nalgebra::{Matrix3, Vector3};
use num_complex::Complex64;

use crate::dispersion::{absorbing_branch, Dispersion, MaterialError};
use crate::rotation::EulerRotation;

/// Relative permittivity of a medium at one wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Permittivity {
    Scalar(Complex64),
    Tensor(Matrix3<Complex64>),
}

impl Permittivity {
    /// Full 3×3 tensor (scalars become diagonal).
    pub fn tensor(&self) -> Matrix3<Complex64> {
        match self {
            Permittivity::Scalar(eps) => Matrix3::from_diagonal_element(*eps),
            Permittivity::Tensor(t) => *t,
        }
    }

    pub fn scalar(&self) -> Option<Complex64> {
        match self {
            Permittivity::Scalar(eps) => Some(*eps),
            Permittivity::Tensor(_) => None,
        }
    }
}

/// A homogeneous optical medium.
pub trait OpticalMaterial: Send + Sync {
    fn name(&self) -> &str;

    /// Permittivity in the laboratory frame at `wavelength_nm`.
    fn permittivity(&self, wavelength_nm: f64) -> Result<Permittivity, MaterialError>;

    /// Whether the permittivity is a scalar at every wavelength.
    fn is_isotropic(&self) -> bool;

    /// Scalar refractive index; `None` for anisotropic media.
    fn refractive_index(&self, wavelength_nm: f64) -> Result<Option<Complex64>, MaterialError> {
        Ok(self
            .permittivity(wavelength_nm)?
            .scalar()
            .map(|eps| absorbing_branch(eps.sqrt())))
    }
}

/// Isotropic medium described by a single dispersion.
#[derive(Clone)]
pub struct IsotropicMaterial {
    dispersion: Arc<dyn Dispersion>,
}

impl IsotropicMaterial {
    pub fn new(dispersion: Arc<dyn Dispersion>) -> Self {
        Self { dispersion }
    }

    pub fn from_dispersion(dispersion: impl Dispersion + 'static) -> Self {
        Self::new(Arc::new(dispersion))
    }

    pub fn dispersion(&self) -> &Arc<dyn Dispersion> {
        &self.dispersion
    }
}

impl std::fmt::Debug for IsotropicMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsotropicMaterial")
            .field("dispersion", &self.dispersion.name())
            .finish()
    }
}

impl OpticalMaterial for IsotropicMaterial {
    fn name(&self) -> &str {
        self.dispersion.name()
    }

    fn permittivity(&self, wavelength_nm: f64) -> Result<Permittivity, MaterialError> {
        Ok(Permittivity::Scalar(
            self.dispersion.dielectric_function(wavelength_nm)?,
        ))
    }

    fn is_isotropic(&self) -> bool {
        true
    }

    fn refractive_index(&self, wavelength_nm: f64) -> Result<Option<Complex64>, MaterialError> {
        self.dispersion.refractive_index(wavelength_nm).map(Some)
    }
}

/// Uniaxial crystal; the optic axis is the principal $z$ axis before rotation.
#[derive(Clone)]
pub struct UniaxialMaterial {
    name: String,
    ordinary: Arc<dyn Dispersion>,
    extraordinary: Arc<dyn Dispersion>,
    orientation: EulerRotation,
}

impl UniaxialMaterial {
    pub fn new(ordinary: Arc<dyn Dispersion>, extraordinary: Arc<dyn Dispersion>) -> Self {
        Self {
            name: format!("uniaxial({}, {})", ordinary.name(), extraordinary.name()),
            ordinary,
            extraordinary,
            orientation: EulerRotation::default(),
        }
    }

    pub fn rotated(mut self, orientation: EulerRotation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl OpticalMaterial for UniaxialMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn permittivity(&self, wavelength_nm: f64) -> Result<Permittivity, MaterialError> {
        let eo = self.ordinary.dielectric_function(wavelength_nm)?;
        let ee = self.extraordinary.dielectric_function(wavelength_nm)?;
        let principal = Matrix3::from_diagonal(&Vector3::new(eo, eo, ee));
        Ok(Permittivity::Tensor(self.orientation.apply(&principal)))
    }

    fn is_isotropic(&self) -> bool {
        false
    }
}

/// Biaxial crystal with three principal dispersions $(x, y, z)$.
#[derive(Clone)]
pub struct BiaxialMaterial {
    name: String,
    principal: [Arc<dyn Dispersion>; 3],
    orientation: EulerRotation,
}

impl BiaxialMaterial {
    pub fn new(
        x: Arc<dyn Dispersion>,
        y: Arc<dyn Dispersion>,
        z: Arc<dyn Dispersion>,
    ) -> Self {
        Self {
            name: format!("biaxial({}, {}, {})", x.name(), y.name(), z.name()),
            principal: [x, y, z],
            orientation: EulerRotation::default(),
        }
    }

    pub fn rotated(mut self, orientation: EulerRotation) -> Self {
        self.orientation = orientation;
        self
    }
}

impl OpticalMaterial for BiaxialMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn permittivity(&self, wavelength_nm: f64) -> Result<Permittivity, MaterialError> {
        let [x, y, z] = &self.principal;
        let principal = Matrix3::from_diagonal(&Vector3::new(
            x.dielectric_function(wavelength_nm)?,
            y.dielectric_function(wavelength_nm)?,
            z.dielectric_function(wavelength_nm)?,
        ));
        Ok(Permittivity::Tensor(self.orientation.apply(&principal)))
    }

    fn is_isotropic(&self) -> bool {
        false
    }
}
