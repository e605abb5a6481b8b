//! Natural cubic spline interpolation for tabulated optical constants.
//!
//! Tabulated $(n, k)$ data is sampled at discrete wavelengths; a natural
//! cubic spline gives a $C^2$-continuous curve between the samples so that
//! thin-film interference fringes are not distorted by kinks.

use crate::dispersion::MaterialError;

/// A natural cubic spline over strictly increasing knots.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    /// Second derivatives at each knot.
    curvature: Vec<f64>,
}

impl CubicSpline {
    /// Fit a natural spline (zero curvature at both ends).
    ///
    /// Fails if the inputs differ in length, hold fewer than two points, or
    /// the knots are not strictly increasing.
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> Result<Self, MaterialError> {
        if knots.len() != values.len() {
            return Err(MaterialError::DataError(format!(
                "{} knots but {} values",
                knots.len(),
                values.len()
            )));
        }
        if knots.len() < 2 {
            return Err(MaterialError::DataError(
                "a spline needs at least 2 points".into(),
            ));
        }
        if let Some(i) = knots.windows(2).position(|w| w[1] <= w[0]) {
            return Err(MaterialError::DataError(format!(
                "knots must be strictly increasing (index {})",
                i + 1
            )));
        }

        let n = knots.len();
        let mut curvature = vec![0.0; n];
        let mut rhs = vec![0.0; n];

        // Tridiagonal forward elimination.
        for i in 1..n - 1 {
            let h_lo = knots[i] - knots[i - 1];
            let h_hi = knots[i + 1] - knots[i];
            let sig = h_lo / (h_hi + h_lo);
            let pivot = sig * curvature[i - 1] + 2.0;
            curvature[i] = (sig - 1.0) / pivot;
            let slope_jump = (values[i + 1] - values[i]) / h_hi - (values[i] - values[i - 1]) / h_lo;
            rhs[i] = (6.0 * slope_jump / (h_hi + h_lo) - sig * rhs[i - 1]) / pivot;
        }

        curvature[n - 1] = 0.0;
        for i in (1..n - 1).rev() {
            curvature[i] = curvature[i] * curvature[i + 1] + rhs[i];
        }
        curvature[0] = 0.0;

        Ok(Self {
            knots,
            values,
            curvature,
        })
    }

    /// First and last knot.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Evaluate the spline. Outside the knots the boundary cubic is extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let hi = self
            .knots
            .partition_point(|&k| k <= x)
            .clamp(1, self.knots.len() - 1);
        let lo = hi - 1;

        let h = self.knots[hi] - self.knots[lo];
        let a = (self.knots[hi] - x) / h;
        let b = (x - self.knots[lo]) / h;

        a * self.values[lo]
            + b * self.values[hi]
            + ((a.powi(3) - a) * self.curvature[lo] + (b.powi(3) - b) * self.curvature[hi]) * h * h
                / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_spline_passes_through_knots() {
        let xs = vec![1.0, 2.0, 3.5, 4.0, 6.0];
        let ys = vec![2.0, 3.0, 5.0, 4.0, 1.0];
        let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();

        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_abs_diff_eq!(spline.evaluate(*x), *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spline_reproduces_straight_line() {
        // A natural spline through collinear points is that line.
        let xs = vec![0.0, 1.0, 2.5, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x - 1.0).collect();
        let spline = CubicSpline::new(xs, ys).unwrap();
        assert_abs_diff_eq!(spline.evaluate(1.7), 3.0 * 1.7 - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.evaluate(3.3), 3.0 * 3.3 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_spline_rejects_unsorted_knots() {
        let err = CubicSpline::new(vec![1.0, 3.0, 2.0], vec![0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, MaterialError::DataError(_)));
    }
}
