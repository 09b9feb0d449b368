//! `stepwise newton`: Newton-Raphson on the circle/hyperbola system.

use super::print_json;
use crate::config::NewtonConfig;
use crate::OutputFormat;
use anyhow::{bail, Context, Result};
use clap::Args;
use stepwise_core::newton::ForwardDifference;
use stepwise_core::problems::CircleHyperbola;
use stepwise_core::{newton_raphson, NewtonResult};
use tracing::info;

#[derive(Args, Debug, Default)]
pub struct NewtonArgs {
    /// Starting point, e.g. `--guess 2.0,0.5`
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    pub guess: Vec<f64>,

    /// Stop when the Newton update is shorter than this
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Iteration budget
    #[arg(short, long)]
    pub max_steps: Option<usize>,

    /// Use a forward-difference Jacobian instead of the analytic one
    #[arg(long)]
    pub fd_jacobian: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl NewtonArgs {
    pub fn apply(&self, config: &mut NewtonConfig) {
        if !self.guess.is_empty() {
            config.initial_guess = self.guess.clone();
        }
        if let Some(tolerance) = self.tolerance {
            config.settings.tolerance = tolerance;
        }
        if let Some(max_steps) = self.max_steps {
            config.settings.max_steps = max_steps;
        }
        if self.fd_jacobian {
            config.fd_jacobian = true;
        }
    }
}

pub fn run(args: &NewtonArgs, mut config: NewtonConfig) -> Result<()> {
    args.apply(&mut config);
    let result = solve(&config)?;

    match args.format {
        OutputFormat::Table => {
            println!(
                "Solution: x = {:.6}, y = {:.6}",
                result.state[0], result.state[1]
            );
            println!(
                "iterations = {}, |step| = {:.3e}, |F| = {:.3e}",
                result.iterations, result.step_norm, result.residual_norm
            );
        }
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}

fn solve(config: &NewtonConfig) -> Result<NewtonResult> {
    if config.initial_guess.len() != CircleHyperbola::DIMENSION {
        bail!(
            "Initial guess dimension mismatch. Expected {}, got {}.",
            CircleHyperbola::DIMENSION,
            config.initial_guess.len()
        );
    }
    if config.initial_guess.iter().any(|v| !v.is_finite()) {
        bail!("Initial guess must be finite.");
    }

    let problem = CircleHyperbola;
    let result = if config.fd_jacobian {
        let jacobian = ForwardDifference::new(&problem);
        newton_raphson(&problem, &jacobian, &config.initial_guess, config.settings)
    } else {
        newton_raphson(&problem, &problem, &config.initial_guess, config.settings)
    }
    .context("Newton-Raphson failed")?;

    info!(
        iterations = result.iterations,
        residual_norm = result.residual_norm,
        "newton converged"
    );
    Ok(result)
}
