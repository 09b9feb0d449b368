use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars by the integrators.
/// Must support basic arithmetic, debug printing, and conversion from primitives.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Right-hand side of a first-order initial-value problem dy/dx = f(x, y).
pub trait DerivativeFunction<T: Scalar> {
    fn derivative(&self, x: T, y: T) -> T;
}

impl<T: Scalar, F> DerivativeFunction<T> for F
where
    F: Fn(T, T) -> T,
{
    fn derivative(&self, x: T, y: T) -> T {
        self(x, y)
    }
}

/// A single-step integration formula.
pub trait StepIntegrator<T: Scalar> {
    /// Order of accuracy of the global error.
    fn order(&self) -> u32;

    /// Advances y from x to x + h.
    /// The result depends only on the arguments; non-finite values are not trapped.
    fn step(&self, f: &impl DerivativeFunction<T>, x: T, y: T, h: T) -> T;
}

/// Analytic solution of an initial-value problem, parameterised by its initial condition.
pub trait ClosedForm<T: Scalar> {
    fn evaluate(&self, x: T, x0: T, y0: T) -> T;
}

impl<T: Scalar, F> ClosedForm<T> for F
where
    F: Fn(T, T, T) -> T,
{
    fn evaluate(&self, x: T, x0: T, y0: T) -> T {
        self(x, x0, y0)
    }
}

/// A square system of equations F(v) = 0.
pub trait ResidualFunction {
    fn residual(&self, v: &DVector<f64>) -> DVector<f64>;
}

impl<F> ResidualFunction for F
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    fn residual(&self, v: &DVector<f64>) -> DVector<f64> {
        self(v)
    }
}

/// Jacobian of a [`ResidualFunction`]; must be consistent with the residual it belongs to.
pub trait JacobianFunction {
    fn jacobian(&self, v: &DVector<f64>) -> DMatrix<f64>;
}

impl<F> JacobianFunction for F
where
    F: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    fn jacobian(&self, v: &DVector<f64>) -> DMatrix<f64> {
        self(v)
    }
}
