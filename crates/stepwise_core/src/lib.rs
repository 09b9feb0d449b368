pub mod convergence;
pub mod error;
pub mod exact;
pub mod integrate;
pub mod newton;
pub mod problems;
pub mod solvers;
/// The `stepwise_core` crate provides the numerical engine behind the `stepwise` CLI.
/// Every entry point is a pure function of its inputs; callers inject the
/// equations as closures or as types implementing the capability traits.
///
/// Key components:
/// - **Traits**: `Scalar`, `DerivativeFunction`, `StepIntegrator`, `ClosedForm`,
///   `ResidualFunction`, `JacobianFunction`.
/// - **Solvers**: Fixed-step integrators (Euler, Heun, RK4) and the `Method` selector.
/// - **Integrate**: Drives a stepper across a fixed grid and returns a `Trajectory`.
/// - **Exact / Convergence**: Error against closed-form solutions and empirical order checks.
/// - **Newton**: Newton-Raphson for small nonlinear systems with LU-based updates.
pub mod traits;

pub use error::{Result, SolverError};
pub use integrate::{integrate, integrate_steps, integrate_to, Grid, Trajectory};
pub use newton::{newton_raphson, NewtonResult, NewtonSettings};
pub use solvers::Method;
