//! Fixed-grid integration of dy/dx = f(x, y).
//!
//! Grid points are computed from the integer step index, `x_i = x0 + i·h`,
//! so long runs do not accumulate drift from repeated addition. In the
//! endpoint form the final point is pinned to `xn` and the last transition
//! uses the (possibly shorter) remaining step.

use crate::error::{Result, SolverError};
use crate::solvers::Method;
use crate::traits::{DerivativeFunction, Scalar, StepIntegrator};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fraction of a step below which a remainder of `(xn - x0) / h` is treated
/// as rounding noise rather than an extra short step.
pub const GRID_SNAP: f64 = 1e-9;

/// How far to integrate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grid<T> {
    /// Take exactly `n` steps of size `h`.
    Steps(usize),
    /// Integrate up to and including `xn`.
    Endpoint(T),
}

/// Ordered (x, y) samples from one integration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory<T = f64> {
    xs: Vec<T>,
    ys: Vec<T>,
    step_size: T,
}

impl<T: Scalar> Trajectory<T> {
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    pub fn ys(&self) -> &[T] {
        &self.ys
    }

    /// Nominal step size the run was requested with.
    pub fn step_size(&self) -> T {
        self.step_size
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Number of transitions (`len() - 1`).
    pub fn steps(&self) -> usize {
        self.xs.len().saturating_sub(1)
    }

    pub fn points(&self) -> impl Iterator<Item = (T, T)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    pub fn first(&self) -> Option<(T, T)> {
        self.points().next()
    }

    pub fn last(&self) -> Option<(T, T)> {
        match (self.xs.last(), self.ys.last()) {
            (Some(&x), Some(&y)) => Some((x, y)),
            _ => None,
        }
    }
}

/// Integrates with the chosen method over the requested grid.
pub fn integrate<T, F>(
    method: Method,
    f: &F,
    x0: T,
    y0: T,
    h: T,
    grid: Grid<T>,
) -> Result<Trajectory<T>>
where
    T: Scalar,
    F: DerivativeFunction<T>,
{
    let trajectory = integrate_with(&method, f, x0, y0, h, grid)?;
    debug!(
        method = %method,
        steps = trajectory.steps(),
        "integrated trajectory"
    );
    Ok(trajectory)
}

/// Step-count form: `n + 1` points `x0, x0 + h, ..., x0 + n·h`.
pub fn integrate_steps<T, F>(
    method: Method,
    f: &F,
    x0: T,
    y0: T,
    h: T,
    n: usize,
) -> Result<Trajectory<T>>
where
    T: Scalar,
    F: DerivativeFunction<T>,
{
    integrate(method, f, x0, y0, h, Grid::Steps(n))
}

/// Endpoint form: points from `x0` up to and including `xn`.
pub fn integrate_to<T, F>(
    method: Method,
    f: &F,
    x0: T,
    y0: T,
    h: T,
    xn: T,
) -> Result<Trajectory<T>>
where
    T: Scalar,
    F: DerivativeFunction<T>,
{
    integrate(method, f, x0, y0, h, Grid::Endpoint(xn))
}

/// Drives any [`StepIntegrator`] across the grid, one call per transition.
pub fn integrate_with<T, S, F>(
    stepper: &S,
    f: &F,
    x0: T,
    y0: T,
    h: T,
    grid: Grid<T>,
) -> Result<Trajectory<T>>
where
    T: Scalar,
    S: StepIntegrator<T>,
    F: DerivativeFunction<T>,
{
    if !x0.is_finite() {
        return Err(SolverError::invalid("x0", "initial x must be finite"));
    }
    if !h.is_finite() || h <= T::zero() {
        return Err(SolverError::invalid(
            "h",
            format!("step size must be positive and finite, got {:?}", h),
        ));
    }

    let (steps, endpoint) = plan_grid(x0, h, grid)?;

    let mut xs = grid_buffer(steps)?;
    for i in 0..steps {
        xs.push(x0 + index_to_scalar::<T>(i)? * h);
    }
    xs.push(match endpoint {
        Some(xn) => xn,
        None => x0 + index_to_scalar::<T>(steps)? * h,
    });

    let mut ys = grid_buffer(steps)?;
    ys.push(y0);
    let mut y = y0;
    for i in 0..steps {
        let x = xs[i];
        let dx = if endpoint.is_some() && i + 1 == steps {
            xs[i + 1] - x
        } else {
            h
        };
        y = stepper.step(f, x, y, dx);
        ys.push(y);
    }

    Ok(Trajectory {
        xs,
        ys,
        step_size: h,
    })
}

/// Returns the number of steps and, for the endpoint form, the pinned final x.
fn plan_grid<T: Scalar>(x0: T, h: T, grid: Grid<T>) -> Result<(usize, Option<T>)> {
    match grid {
        Grid::Steps(0) => Err(SolverError::invalid(
            "n",
            "step count must be greater than zero",
        )),
        Grid::Steps(n) => Ok((n, None)),
        Grid::Endpoint(xn) => {
            if !xn.is_finite() || xn <= x0 {
                return Err(SolverError::invalid(
                    "xn",
                    format!("endpoint must be finite and greater than x0, got {:?}", xn),
                ));
            }
            let snap = T::from_f64(GRID_SNAP).unwrap_or_else(T::epsilon);
            let ratio = (xn - x0) / h;
            let steps = (ratio - snap)
                .ceil()
                .to_usize()
                .ok_or_else(|| {
                    SolverError::invalid(
                        "h",
                        format!("step size {:?} yields an unrepresentable step count", h),
                    )
                })?
                .max(1);
            Ok((steps, Some(xn)))
        }
    }
}

/// Empty buffer with room for `steps + 1` samples, or an error when that many
/// cannot be allocated.
fn grid_buffer<T>(steps: usize) -> Result<Vec<T>> {
    let points = steps.checked_add(1).ok_or_else(|| {
        SolverError::invalid("n", format!("step count {steps} is too large"))
    })?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(points).map_err(|_| {
        SolverError::invalid("n", format!("cannot allocate a grid of {points} points"))
    })?;
    Ok(buffer)
}

fn index_to_scalar<T: Scalar>(i: usize) -> Result<T> {
    T::from_usize(i).ok_or_else(|| {
        SolverError::invalid("n", format!("step index {i} is not representable"))
    })
}
