use crate::error::{Result, SolverError};
use crate::traits::{JacobianFunction, ResidualFunction};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stopping rule for [`newton_raphson`]. Convergence is judged on the size of
/// the update ‖Δ‖₂, not on the residual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    pub tolerance: f64,
    pub max_steps: usize,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_steps: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtonResult {
    pub state: Vec<f64>,
    pub iterations: usize,
    /// Norm of the final accepted update.
    pub step_norm: f64,
    /// ‖F(state)‖₂ at the returned point.
    pub residual_norm: f64,
}

impl NewtonResult {
    pub fn solution(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.state)
    }
}

/// Solves F(v) = 0 by Newton-Raphson, starting from a copy of `initial_guess`.
///
/// Each iteration solves J(v)·Δ = -F(v) and sets v += Δ; the iterate is
/// returned as soon as ‖Δ‖₂ < `tolerance`. A residual with non-finite entries
/// ends the run with [`SolverError::Convergence`] and a NaN step norm.
pub fn newton_raphson<F, J>(
    residual: &F,
    jacobian: &J,
    initial_guess: &[f64],
    settings: NewtonSettings,
) -> Result<NewtonResult>
where
    F: ResidualFunction,
    J: JacobianFunction,
{
    let dim = initial_guess.len();
    if dim == 0 {
        return Err(SolverError::invalid(
            "initial_guess",
            "system has zero dimension",
        ));
    }
    if settings.max_steps == 0 {
        return Err(SolverError::invalid(
            "max_steps",
            "max_steps must be greater than zero",
        ));
    }
    if !settings.tolerance.is_finite() || settings.tolerance <= 0.0 {
        return Err(SolverError::invalid(
            "tolerance",
            format!("tolerance must be positive, got {}", settings.tolerance),
        ));
    }

    let mut state = DVector::from_column_slice(initial_guess);
    let mut step_norm = f64::INFINITY;

    for iteration in 1..=settings.max_steps {
        let f = evaluate_residual(residual, &state)?;
        if f.iter().any(|v| !v.is_finite()) {
            // A non-finite residual can only produce a non-finite update.
            debug!(iteration, "non-finite residual");
            return Err(SolverError::Convergence {
                max_steps: settings.max_steps,
                step_norm: f64::NAN,
            });
        }
        let j = evaluate_jacobian(jacobian, &state)?;
        let delta =
            solve_linear_system(j, -f).ok_or(SolverError::SingularJacobian { iteration })?;

        state += &delta;
        step_norm = delta.norm();
        debug!(iteration, step_norm, "newton step");

        if step_norm < settings.tolerance {
            let residual_norm = evaluate_residual(residual, &state)?.norm();
            return Ok(NewtonResult {
                state: state.iter().copied().collect(),
                iterations: iteration,
                step_norm,
                residual_norm,
            });
        }
    }

    Err(SolverError::Convergence {
        max_steps: settings.max_steps,
        step_norm,
    })
}

fn evaluate_residual<F: ResidualFunction>(
    residual: &F,
    state: &DVector<f64>,
) -> Result<DVector<f64>> {
    let out = residual.residual(state);
    if out.len() != state.len() {
        return Err(SolverError::DimensionMismatch {
            what: "residual",
            expected: state.len(),
            got: out.len(),
        });
    }
    Ok(out)
}

fn evaluate_jacobian<J: JacobianFunction>(
    jacobian: &J,
    state: &DVector<f64>,
) -> Result<DMatrix<f64>> {
    let dim = state.len();
    let out = jacobian.jacobian(state);
    if out.nrows() != dim {
        return Err(SolverError::DimensionMismatch {
            what: "jacobian rows",
            expected: dim,
            got: out.nrows(),
        });
    }
    if out.ncols() != dim {
        return Err(SolverError::DimensionMismatch {
            what: "jacobian columns",
            expected: dim,
            got: out.ncols(),
        });
    }
    Ok(out)
}

/// LU solve with partial pivoting. Returns `None` when the matrix is
/// numerically singular: a zero or negligible pivot relative to the largest
/// one, or any non-finite entry in the matrix or the solution.
fn solve_linear_system(matrix: DMatrix<f64>, rhs: DVector<f64>) -> Option<DVector<f64>> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let dim = matrix.nrows();
    let lu = matrix.lu();

    let u = lu.u();
    let pivots = (0..dim).map(|i| u[(i, i)].abs());
    let (min_pivot, max_pivot) = pivots.fold((f64::INFINITY, 0.0_f64), |(lo, hi), p| {
        (lo.min(p), hi.max(p))
    });
    if max_pivot == 0.0 || min_pivot <= max_pivot * f64::EPSILON * dim as f64 {
        return None;
    }

    lu.solve(&rhs).filter(|x| x.iter().all(|v| v.is_finite()))
}

/// Forward-difference approximation of the Jacobian of `residual`.
///
/// Column j uses the step `step * max(1, |v_j|)`.
#[derive(Debug, Clone, Copy)]
pub struct ForwardDifference<'a, F> {
    residual: &'a F,
    step: f64,
}

impl<'a, F: ResidualFunction> ForwardDifference<'a, F> {
    pub const DEFAULT_STEP: f64 = 1e-7;

    pub fn new(residual: &'a F) -> Self {
        Self {
            residual,
            step: Self::DEFAULT_STEP,
        }
    }

    pub fn with_step(residual: &'a F, step: f64) -> Self {
        Self { residual, step }
    }
}

impl<F: ResidualFunction> JacobianFunction for ForwardDifference<'_, F> {
    fn jacobian(&self, v: &DVector<f64>) -> DMatrix<f64> {
        let dim = v.len();
        let f0 = self.residual.residual(v);
        let mut jacobian = DMatrix::zeros(f0.len(), dim);
        let mut perturbed = v.clone();

        for j in 0..dim {
            let h = self.step * v[j].abs().max(1.0);
            perturbed[j] = v[j] + h;
            let f1 = self.residual.residual(&perturbed);
            for i in 0..f0.len().min(f1.len()) {
                jacobian[(i, j)] = (f1[i] - f0[i]) / h;
            }
            perturbed[j] = v[j];
        }

        jacobian
    }
}
