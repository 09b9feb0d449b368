//! Comparison of numerical trajectories against a known analytic solution.
//!
//! The closed form is supplied by the caller and must solve the same ODE that
//! was integrated; nothing here can detect a mismatch.

use crate::integrate::Trajectory;
use crate::traits::{ClosedForm, Scalar};
use serde::Serialize;

/// Evaluates `closed_form` at `x` for the initial condition `y(x0) = y0`.
pub fn exact<T: Scalar, C: ClosedForm<T>>(closed_form: &C, x: T, x0: T, y0: T) -> T {
    closed_form.evaluate(x, x0, y0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorSample<T = f64> {
    pub x: T,
    pub approx: T,
    pub exact: T,
    pub abs_error: T,
}

/// Pairs every trajectory point with the analytic value.
/// The initial condition is read from the first point of the trajectory.
pub fn compare<T: Scalar, C: ClosedForm<T>>(
    trajectory: &Trajectory<T>,
    closed_form: &C,
) -> Vec<ErrorSample<T>> {
    let Some((x0, y0)) = trajectory.first() else {
        return Vec::new();
    };
    trajectory
        .points()
        .map(|(x, approx)| {
            let exact = closed_form.evaluate(x, x0, y0);
            ErrorSample {
                x,
                approx,
                exact,
                abs_error: (approx - exact).abs(),
            }
        })
        .collect()
}

/// Largest absolute deviation along the trajectory; NaN if any sample is NaN.
pub fn max_abs_error<T: Scalar, C: ClosedForm<T>>(
    trajectory: &Trajectory<T>,
    closed_form: &C,
) -> T {
    compare(trajectory, closed_form)
        .into_iter()
        .fold(T::zero(), |acc, s| {
            if s.abs_error.is_nan() || acc.is_nan() {
                T::nan()
            } else {
                acc.max(s.abs_error)
            }
        })
}

/// Absolute error at the last trajectory point.
pub fn endpoint_error<T: Scalar, C: ClosedForm<T>>(
    trajectory: &Trajectory<T>,
    closed_form: &C,
) -> Option<T> {
    let (x0, y0) = trajectory.first()?;
    let (x, y) = trajectory.last()?;
    Some((y - closed_form.evaluate(x, x0, y0)).abs())
}

#[cfg(test)]
mod tests {
    use super::{compare, endpoint_error, exact, max_abs_error};
    use crate::integrate::integrate_steps;
    use crate::solvers::Method;

    fn relax_exact(x: f64, x0: f64, y0: f64) -> f64 {
        (y0 - x0 + 1.0) * (-(x - x0)).exp() + x - 1.0
    }

    #[test]
    fn closed_form_reproduces_initial_condition() {
        assert!((exact(&relax_exact, 0.0, 0.0, 1.0) - 1.0).abs() < 1e-15);
        assert!((exact(&relax_exact, 3.0, 3.0, -2.0) + 2.0).abs() < 1e-15);
    }

    #[test]
    fn compare_reports_zero_error_at_start() {
        let traj = integrate_steps(Method::Euler, &|x: f64, y: f64| x - y, 0.0, 1.0, 0.1, 10)
            .expect("integrate");
        let samples = compare(&traj, &relax_exact);
        assert_eq!(samples.len(), traj.len());
        assert_eq!(samples[0].abs_error, 0.0);
        assert!(samples[10].abs_error > 0.0);
        assert_eq!(samples[10].x, traj.xs()[10]);
    }

    #[test]
    fn endpoint_and_max_error_agree_for_monotone_drift() {
        let traj = integrate_steps(Method::Rk4, &|x: f64, y: f64| x - y, 0.0, 1.0, 0.1, 20)
            .expect("integrate");
        let end = endpoint_error(&traj, &relax_exact).expect("non-empty");
        let max = max_abs_error(&traj, &relax_exact);
        assert!(end < 1e-4);
        assert!(max >= end);
    }

    #[test]
    fn mismatched_closed_form_goes_undetected() {
        // Wrong sign on the transient: the comparison silently reports a large error.
        let wrong = |x: f64, x0: f64, y0: f64| (x0 - y0 - 1.0) * (-(x - x0)).exp() + x - 1.0;
        let traj = integrate_steps(Method::Rk4, &|x: f64, y: f64| x - y, 0.0, 1.0, 0.1, 20)
            .expect("integrate");
        let end = endpoint_error(&traj, &wrong).expect("non-empty");
        assert!(end > 0.5);
    }
}
