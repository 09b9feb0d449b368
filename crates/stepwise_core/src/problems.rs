//! Ready-made problem instances with known answers.

use crate::traits::{ClosedForm, DerivativeFunction, JacobianFunction, ResidualFunction, Scalar};
use nalgebra::{DMatrix, DVector};

/// dy/dx = x - y, solved by y = (y0 - x0 + 1) e^{-(x - x0)} + x - 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRelaxation;

impl<T: Scalar> DerivativeFunction<T> for LinearRelaxation {
    fn derivative(&self, x: T, y: T) -> T {
        x - y
    }
}

impl<T: Scalar> ClosedForm<T> for LinearRelaxation {
    fn evaluate(&self, x: T, x0: T, y0: T) -> T {
        let one = T::one();
        (y0 - x0 + one) * (-(x - x0)).exp() + x - one
    }
}

/// dy/dx = -rate * y, solved by y = y0 e^{-rate (x - x0)}.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialDecay {
    pub rate: f64,
}

impl DerivativeFunction<f64> for ExponentialDecay {
    fn derivative(&self, _x: f64, y: f64) -> f64 {
        -self.rate * y
    }
}

impl ClosedForm<f64> for ExponentialDecay {
    fn evaluate(&self, x: f64, x0: f64, y0: f64) -> f64 {
        y0 * (-self.rate * (x - x0)).exp()
    }
}

/// Intersection of the circle x² + y² = 4 with the hyperbola xy = 1.
///
/// The Jacobian `[[2x, 2y], [y, x]]` has determinant 2(x² - y²), so it is
/// singular everywhere on the diagonal x = ±y.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleHyperbola;

impl CircleHyperbola {
    pub const DIMENSION: usize = 2;

    /// Wrong-length inputs map to NaN so callers see a shape error, not a panic.
    fn coordinates(v: &DVector<f64>) -> (f64, f64) {
        match v.as_slice() {
            [x, y] => (*x, *y),
            _ => (f64::NAN, f64::NAN),
        }
    }
}

impl ResidualFunction for CircleHyperbola {
    fn residual(&self, v: &DVector<f64>) -> DVector<f64> {
        let (x, y) = Self::coordinates(v);
        DVector::from_vec(vec![x * x + y * y - 4.0, x * y - 1.0])
    }
}

impl JacobianFunction for CircleHyperbola {
    fn jacobian(&self, v: &DVector<f64>) -> DMatrix<f64> {
        let (x, y) = Self::coordinates(v);
        DMatrix::from_row_slice(2, 2, &[2.0 * x, 2.0 * y, y, x])
    }
}
