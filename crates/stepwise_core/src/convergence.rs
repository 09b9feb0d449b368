//! Empirical order-of-accuracy measurement by repeated step halving.

use crate::error::{Result, SolverError};
use crate::exact::endpoint_error;
use crate::integrate::integrate_steps;
use crate::solvers::Method;
use crate::traits::{ClosedForm, DerivativeFunction};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RefinementLevel {
    pub step_size: f64,
    pub steps: usize,
    pub endpoint_error: f64,
    /// log2 of the error ratio against the previous (coarser) level.
    pub observed_order: Option<f64>,
}

/// Order implied by two errors whose step sizes differ by `refinement`.
pub fn observed_order(coarse_error: f64, fine_error: f64, refinement: f64) -> f64 {
    (coarse_error / fine_error).ln() / refinement.ln()
}

/// Integrates `[x0, xn]` with `base_steps · 2^k` steps for each `k < levels`
/// and reports the endpoint error at every level.
#[allow(clippy::too_many_arguments)]
pub fn refinement_study<F, C>(
    method: Method,
    f: &F,
    closed_form: &C,
    x0: f64,
    y0: f64,
    xn: f64,
    base_steps: usize,
    levels: usize,
) -> Result<Vec<RefinementLevel>>
where
    F: DerivativeFunction<f64>,
    C: ClosedForm<f64>,
{
    if levels == 0 {
        return Err(SolverError::invalid(
            "levels",
            "at least one refinement level is required",
        ));
    }
    if base_steps == 0 {
        return Err(SolverError::invalid(
            "n",
            "step count must be greater than zero",
        ));
    }
    if !xn.is_finite() || !x0.is_finite() || xn <= x0 {
        return Err(SolverError::invalid(
            "xn",
            format!("endpoint must be finite and greater than x0, got {xn}"),
        ));
    }

    let mut rows: Vec<RefinementLevel> = Vec::with_capacity(levels);
    let mut steps = base_steps;
    for _ in 0..levels {
        let h = (xn - x0) / steps as f64;
        let trajectory = integrate_steps(method, f, x0, y0, h, steps)?;
        let error = endpoint_error(&trajectory, closed_form).unwrap_or(f64::NAN);
        let order = rows
            .last()
            .map(|prev| observed_order(prev.endpoint_error, error, 2.0));
        rows.push(RefinementLevel {
            step_size: h,
            steps,
            endpoint_error: error,
            observed_order: order,
        });
        steps = steps.checked_mul(2).ok_or_else(|| {
            SolverError::invalid("levels", "too many refinement levels for the step count")
        })?;
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{observed_order, refinement_study};
    use crate::problems::{ExponentialDecay, LinearRelaxation};
    use crate::solvers::Method;

    fn error_ratio(method: Method) -> f64 {
        let rows =
            refinement_study(method, &LinearRelaxation, &LinearRelaxation, 0.0, 1.0, 2.0, 20, 2)
                .expect("study");
        rows[0].endpoint_error / rows[1].endpoint_error
    }

    #[test]
    fn halving_h_halves_euler_error() {
        let ratio = error_ratio(Method::Euler);
        assert!((1.8..2.3).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn halving_h_quarters_heun_error() {
        let ratio = error_ratio(Method::Heun);
        assert!((3.5..4.6).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn halving_h_divides_rk4_error_by_sixteen() {
        let ratio = error_ratio(Method::Rk4);
        assert!((14.0..19.0).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn observed_orders_approach_method_order() {
        let decay = ExponentialDecay { rate: 1.5 };
        for method in Method::ALL {
            let rows = refinement_study(method, &decay, &decay, 0.0, 2.0, 1.0, 16, 3)
                .expect("study");
            assert_eq!(rows.len(), 3);
            assert!(rows[0].observed_order.is_none());
            let order = rows[2].observed_order.expect("refined level");
            assert!(
                (order - method.order() as f64).abs() < 0.3,
                "{method}: observed {order}"
            );
        }
    }

    #[test]
    fn step_counts_double_per_level() {
        let problem = LinearRelaxation;
        let rows = refinement_study(Method::Heun, &problem, &problem, 0.0, 1.0, 1.0, 5, 3)
            .expect("study");
        let steps: Vec<usize> = rows.iter().map(|r| r.steps).collect();
        assert_eq!(steps, vec![5, 10, 20]);
        assert!((rows[2].step_size - 0.05).abs() < 1e-15);
    }

    #[test]
    fn observed_order_of_exact_ratio() {
        assert!((observed_order(16.0, 1.0, 2.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_empty_studies() {
        assert!(
            refinement_study(Method::Rk4, &LinearRelaxation, &LinearRelaxation, 0.0, 1.0, 1.0, 5, 0)
                .is_err()
        );
        assert!(
            refinement_study(Method::Rk4, &LinearRelaxation, &LinearRelaxation, 0.0, 1.0, 1.0, 0, 2)
                .is_err()
        );
    }
}
