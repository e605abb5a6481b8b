//! Orientation of anisotropic media.
//!
//! The principal axes of a uniaxial or biaxial crystal are placed in the
//! laboratory frame by a z-x-z Euler rotation
//! $R = R_z(\phi)\,R_x(\theta)\,R_z(\psi)$; the laboratory permittivity is
//! $\epsilon_{\text{lab}} = R\,\epsilon_{\text{principal}}\,R^T$.
//!
//! Laboratory frame: $z$ is the stack normal, the plane of incidence is $x$-$z$.

use nalgebra::Matrix3;
use num_complex::Complex64;
use serde::Deserialize;

/// z-x-z Euler angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct EulerRotation {
    #[serde(default)]
    pub phi: f64,
    #[serde(default)]
    pub theta: f64,
    #[serde(default)]
    pub psi: f64,
}

impl EulerRotation {
    pub fn new(phi: f64, theta: f64, psi: f64) -> Self {
        Self { phi, theta, psi }
    }

    pub fn is_identity(&self) -> bool {
        self.phi == 0.0 && self.theta == 0.0 && self.psi == 0.0
    }

    /// Real rotation matrix $R_z(\phi) R_x(\theta) R_z(\psi)$.
    pub fn matrix(&self) -> Matrix3<f64> {
        rot_z(self.phi.to_radians()) * rot_x(self.theta.to_radians()) * rot_z(self.psi.to_radians())
    }

    /// Rotate a principal-frame tensor into the laboratory frame.
    pub fn apply(&self, tensor: &Matrix3<Complex64>) -> Matrix3<Complex64> {
        if self.is_identity() {
            return *tensor;
        }
        let r = self.matrix().map(|x| Complex64::new(x, 0.0));
        r * tensor * r.transpose()
    }
}

fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

fn rot_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}
