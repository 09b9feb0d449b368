use crate::traits::{DerivativeFunction, Scalar, StepIntegrator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn two<T: Scalar>() -> T {
    T::one() + T::one()
}

/// Explicit (forward) Euler method.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euler;

impl<T: Scalar> StepIntegrator<T> for Euler {
    fn order(&self) -> u32 {
        1
    }

    fn step(&self, f: &impl DerivativeFunction<T>, x: T, y: T, h: T) -> T {
        y + h * f.derivative(x, y)
    }
}

/// Improved Euler (Heun) predictor-corrector.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heun;

impl<T: Scalar> StepIntegrator<T> for Heun {
    fn order(&self) -> u32 {
        2
    }

    fn step(&self, f: &impl DerivativeFunction<T>, x: T, y: T, h: T) -> T {
        let slope = f.derivative(x, y);
        let predicted = y + h * slope;
        y + h / two::<T>() * (slope + f.derivative(x + h, predicted))
    }
}

/// Classic Runge-Kutta 4th Order Solver
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4;

impl<T: Scalar> StepIntegrator<T> for RK4 {
    fn order(&self) -> u32 {
        4
    }

    fn step(&self, f: &impl DerivativeFunction<T>, x: T, y: T, h: T) -> T {
        let two = two::<T>();
        let six = two + two + two;
        let half_h = h / two;

        // k1 = h f(x, y)
        let k1 = h * f.derivative(x, y);
        // k2 = h f(x + h/2, y + k1/2)
        let k2 = h * f.derivative(x + half_h, y + k1 / two);
        // k3 = h f(x + h/2, y + k2/2)
        let k3 = h * f.derivative(x + half_h, y + k2 / two);
        // k4 = h f(x + h, y + k3)
        let k4 = h * f.derivative(x + h, y + k3);

        y + (k1 + two * k2 + two * k3 + k4) / six
    }
}

/// Runtime choice of integration formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Euler,
    Heun,
    Rk4,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Euler, Method::Heun, Method::Rk4];

    pub fn name(self) -> &'static str {
        match self {
            Method::Euler => "euler",
            Method::Heun => "heun",
            Method::Rk4 => "rk4",
        }
    }

    pub fn order(self) -> u32 {
        match self {
            Method::Euler => StepIntegrator::<f64>::order(&Euler),
            Method::Heun => StepIntegrator::<f64>::order(&Heun),
            Method::Rk4 => StepIntegrator::<f64>::order(&RK4),
        }
    }

    pub fn step<T: Scalar>(self, f: &impl DerivativeFunction<T>, x: T, y: T, h: T) -> T {
        match self {
            Method::Euler => Euler.step(f, x, y, h),
            Method::Heun => Heun.step(f, x, y, h),
            Method::Rk4 => RK4.step(f, x, y, h),
        }
    }
}

impl<T: Scalar> StepIntegrator<T> for Method {
    fn order(&self) -> u32 {
        Method::order(*self)
    }

    fn step(&self, f: &impl DerivativeFunction<T>, x: T, y: T, h: T) -> T {
        Method::step(*self, f, x, y, h)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(Method::Euler),
            "heun" | "improved-euler" => Ok(Method::Heun),
            "rk4" | "runge-kutta" => Ok(Method::Rk4),
            other => Err(format!(
                "Unknown method `{other}`. Supported: euler, heun, rk4"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Euler, Heun, Method, RK4};
    use crate::traits::StepIntegrator;

    fn relax(x: f64, y: f64) -> f64 {
        x - y
    }

    #[test]
    fn euler_step_matches_hand_computation() {
        let y = Euler.step(&relax, 0.0, 1.0, 0.1);
        assert_eq!(y, 1.0 + 0.1 * (0.0 - 1.0));
    }

    #[test]
    fn heun_step_averages_endpoint_slopes() {
        // slope at start: -1, predictor: 0.9, slope at end: 0.1 - 0.9 = -0.8
        let y = Heun.step(&relax, 0.0, 1.0, 0.1);
        assert!((y - (1.0 + 0.05 * (-1.0 - 0.8))).abs() < 1e-15);
    }

    #[test]
    fn rk4_is_exact_for_cubic_quadrature() {
        // dy/dx = 3x^2 integrates exactly under Simpson weights.
        let f = |x: f64, _y: f64| 3.0 * x * x;
        let y = RK4.step(&f, 1.0, 1.0, 0.5);
        assert!((y - 1.5_f64.powi(3)).abs() < 1e-14);
    }

    #[test]
    fn non_finite_slopes_propagate() {
        let f = |_x: f64, y: f64| 1.0 / (y - 1.0);
        let y = RK4.step(&f, 0.0, 1.0, 0.1);
        assert!(!y.is_finite());
    }

    #[test]
    fn method_dispatch_matches_concrete_steppers() {
        for (method, expected) in [
            (Method::Euler, Euler.step(&relax, 0.3, 2.0, 0.2)),
            (Method::Heun, Heun.step(&relax, 0.3, 2.0, 0.2)),
            (Method::Rk4, RK4.step(&relax, 0.3, 2.0, 0.2)),
        ] {
            assert_eq!(method.step(&relax, 0.3, 2.0, 0.2), expected);
        }
    }

    #[test]
    fn method_orders_and_names() {
        let orders: Vec<u32> = Method::ALL.iter().map(|&m| m.order()).collect();
        assert_eq!(orders, vec![1, 2, 4]);
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>(), Ok(method));
        }
        assert!("midpoint".parse::<Method>().is_err());
    }

    #[test]
    fn integrators_work_in_single_precision() {
        let f = |x: f32, y: f32| x - y;
        let y: f32 = RK4.step(&f, 0.0, 1.0, 0.1);
        assert!(y.is_finite());
    }
}
