//! Matrix exponential and integer powers of 4×4 transfer matrices.

use nalgebra::Matrix4;
use num_complex::Complex64;

use crate::config::ExpmAlgorithm;

/// Norm below which the Taylor series is summed directly.
const TAYLOR_NORM_BOUND: f64 = 0.5;
const TAYLOR_MAX_TERMS: usize = 30;

/// $e^A$ with the configured algorithm.
pub(crate) fn exponential(a: &Matrix4<Complex64>, algorithm: ExpmAlgorithm) -> Matrix4<Complex64> {
    match algorithm {
        ExpmAlgorithm::Pade => a.exp(),
        ExpmAlgorithm::Taylor => taylor_exponential(a),
    }
}

/// Truncated Taylor series with scaling and squaring.
fn taylor_exponential(a: &Matrix4<Complex64>) -> Matrix4<Complex64> {
    let norm = a.norm();
    let squarings = if norm > TAYLOR_NORM_BOUND {
        (norm / TAYLOR_NORM_BOUND).log2().ceil() as i32
    } else {
        0
    };
    let scaled = a * Complex64::new(0.5f64.powi(squarings), 0.0);

    let mut sum = Matrix4::identity();
    let mut term = Matrix4::identity();
    for k in 1..=TAYLOR_MAX_TERMS {
        term = term * scaled * Complex64::new(1.0 / k as f64, 0.0);
        sum += term;
        if term.norm() <= f64::EPSILON * sum.norm() {
            break;
        }
    }

    for _ in 0..squarings {
        sum = sum * sum;
    }
    sum
}

/// $M^n$ by binary exponentiation.
pub(crate) fn power(m: &Matrix4<Complex64>, mut n: usize) -> Matrix4<Complex64> {
    let mut result = Matrix4::identity();
    let mut base = *m;
    while n > 0 {
        if n & 1 == 1 {
            result = base * result;
        }
        n >>= 1;
        if n > 0 {
            base = base * base;
        }
    }
    result
}
