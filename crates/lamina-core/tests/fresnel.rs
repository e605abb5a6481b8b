//! Integration test: both solvers against closed-form Fresnel and Airy
//! results for simple isotropic structures.

use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use lamina_core::{Layer, Length, OpticsError, SolverConfig, SolverKind, Structure};
use lamina_materials::formulas::ConstantIndex;
use lamina_materials::{IsotropicMaterial, OpticalMaterial};
use num_complex::Complex64;

fn constant(n: Complex64) -> Arc<dyn OpticalMaterial> {
    Arc::new(IsotropicMaterial::from_dispersion(ConstantIndex::new(n)))
}

fn real(n: f64) -> Arc<dyn OpticalMaterial> {
    constant(Complex64::new(n, 0.0))
}

fn serial() -> SolverConfig {
    SolverConfig {
        parallel: false,
        ..SolverConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Single interface
// ---------------------------------------------------------------------------

#[test]
fn test_normal_incidence_interface_matches_fresnel() {
    let wavelengths = [400.0, 550.0, 800.0];
    for (n1, n2) in [(1.0, 1.5), (1.5, 1.0), (1.33, 2.4)] {
        let structure = Structure::new(real(n1), Vec::new(), real(n2)).unwrap();
        let expected = ((n1 - n2) / (n1 + n2)).powi(2);
        for kind in SolverKind::ALL {
            let result = structure
                .evaluate(&wavelengths, 0.0, kind, &SolverConfig::default())
                .unwrap();
            let r = result.reflectance();
            for k in 0..wavelengths.len() {
                assert_relative_eq!(r[[k, 0, 0]], expected, max_relative = 1e-10);
                assert_relative_eq!(r[[k, 1, 1]], expected, max_relative = 1e-10);
                assert_abs_diff_eq!(r[[k, 0, 1]], 0.0, epsilon = 1e-20);
                assert_abs_diff_eq!(r[[k, 1, 0]], 0.0, epsilon = 1e-20);
            }
        }
    }
}

#[test]
fn test_oblique_interface_matches_fresnel_equations() {
    let (n1, n2) = (1.0, 1.5);
    let structure = Structure::new(real(n1), Vec::new(), real(n2)).unwrap();
    let theta = 50.0f64;
    let (cos_i, sin_i) = (theta.to_radians().cos(), theta.to_radians().sin());
    let cos_t = (1.0 - (n1 * sin_i / n2).powi(2)).sqrt();
    let r_s = (n1 * cos_i - n2 * cos_t) / (n1 * cos_i + n2 * cos_t);
    let r_p = (n2 * cos_i - n1 * cos_t) / (n2 * cos_i + n1 * cos_t);

    for kind in SolverKind::ALL {
        let result = structure.evaluate(&[633.0], theta, kind, &serial()).unwrap();
        let r = result.reflectance();
        assert_relative_eq!(r[[0, 1, 1]], r_s * r_s, max_relative = 1e-10);
        assert_relative_eq!(r[[0, 0, 0]], r_p * r_p, max_relative = 1e-10);

        let t = result.transmittance();
        assert_relative_eq!(t[[0, 1, 1]], 1.0 - r_s * r_s, max_relative = 1e-10);
        assert_relative_eq!(t[[0, 0, 0]], 1.0 - r_p * r_p, max_relative = 1e-10);
    }
}

#[test]
fn test_total_internal_reflection() {
    let structure = Structure::new(real(1.5), Vec::new(), real(1.0)).unwrap();
    for kind in SolverKind::ALL {
        let result = structure.evaluate(&[600.0], 60.0, kind, &serial()).unwrap();
        let r = result.reflectance();
        assert_relative_eq!(r[[0, 0, 0]], 1.0, max_relative = 1e-10);
        assert_relative_eq!(r[[0, 1, 1]], 1.0, max_relative = 1e-10);
        assert_abs_diff_eq!(result.transmittance()[[0, 1, 1]], 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_grazing_incidence_is_reported_by_both_solvers() {
    let structure = Structure::new(real(1.0), Vec::new(), real(1.5)).unwrap();
    for kind in SolverKind::ALL {
        let err = structure.evaluate(&[600.0], 90.0, kind, &serial()).unwrap_err();
        assert!(
            matches!(err, OpticsError::NumericalInstability { .. }),
            "{kind}: expected NumericalInstability, got {err}"
        );
    }
}

// ---------------------------------------------------------------------------
// Thin films
// ---------------------------------------------------------------------------

#[test]
fn test_thin_film_matches_airy_formula() {
    let (n0, n1, n2) = (1.0, 2.0, 1.5);
    let d = 120.0;
    let film = Layer::new(real(n1), Length::nm(d)).unwrap();
    let structure = Structure::new(real(n0), vec![film.into()], real(n2)).unwrap();

    let wavelengths: Vec<f64> = (0..50).map(|i| 400.0 + 10.0 * i as f64).collect();
    let result = structure
        .evaluate(&wavelengths, 0.0, SolverKind::Berreman4x4, &SolverConfig::default())
        .unwrap();
    let r = result.reflectance();

    let r01 = (n0 - n1) / (n0 + n1);
    let r12 = (n1 - n2) / (n1 + n2);
    for (k, &wl) in wavelengths.iter().enumerate() {
        let phase = Complex64::new(0.0, 4.0 * std::f64::consts::PI * n1 * d / wl).exp();
        let airy = (r01 + r12 * phase) / (1.0 + r01 * r12 * phase);
        assert_relative_eq!(r[[k, 1, 1]], airy.norm_sqr(), max_relative = 1e-10);
    }
}

#[test]
fn test_solvers_agree_for_absorbing_stack() {
    let metal = constant(Complex64::new(0.2, 3.4));
    let dielectric = real(1.46);
    let layers = vec![
        Layer::new(dielectric.clone(), Length::nm(80.0)).unwrap().into(),
        Layer::new(metal, Length::nm(15.0)).unwrap().into(),
        Layer::new(dielectric, Length::nm(200.0)).unwrap().into(),
    ];
    let structure = Structure::new(real(1.0), layers, constant(Complex64::new(3.9, 0.02))).unwrap();
    let wavelengths: Vec<f64> = (0..30).map(|i| 450.0 + 12.5 * i as f64).collect();

    for angle in [0.0, 35.0, 70.0] {
        let config = SolverConfig::default();
        let full = structure
            .evaluate(&wavelengths, angle, SolverKind::Berreman4x4, &config)
            .unwrap();
        let simple = structure
            .evaluate(&wavelengths, angle, SolverKind::Simple2x2, &config)
            .unwrap();
        for (a, b) in full.r().iter().zip(simple.r().iter()) {
            assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1e-10);
        }
        for (a, b) in full.t().iter().zip(simple.t().iter()) {
            assert_abs_diff_eq!((a - b).norm(), 0.0, epsilon = 1e-10);
        }
    }
}
