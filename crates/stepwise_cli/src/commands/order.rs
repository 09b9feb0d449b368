//! `stepwise order`: empirical order of accuracy for each method.

use super::{print_json, problem_label, validate, IvpArgs};
use crate::config::{OdeConfig, ProblemKind};
use crate::OutputFormat;
use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use stepwise_core::convergence::{refinement_study, RefinementLevel};
use stepwise_core::integrate::GRID_SNAP;
use stepwise_core::problems::{ExponentialDecay, LinearRelaxation};
use stepwise_core::traits::{ClosedForm, DerivativeFunction};
use stepwise_core::Method;
use tracing::warn;

#[derive(Args, Debug)]
pub struct OrderArgs {
    #[command(flatten)]
    pub ivp: IvpArgs,

    /// Number of refinement levels (each halves h)
    #[arg(short, long, default_value_t = 4)]
    pub levels: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct MethodStudy {
    method: Method,
    expected_order: u32,
    levels: Vec<RefinementLevel>,
}

pub fn run(args: &OrderArgs, mut config: OdeConfig) -> Result<()> {
    args.ivp.apply(&mut config);
    validate(&config)?;

    let studies = match config.problem {
        ProblemKind::Linear => study(&LinearRelaxation, &config, args.levels)?,
        ProblemKind::Decay => {
            study(&ExponentialDecay { rate: config.rate }, &config, args.levels)?
        }
    };

    match args.format {
        OutputFormat::Table => {
            println!(
                "Order study for {} on [{}, {}]",
                problem_label(&config),
                config.x0,
                config.endpoint()
            );
            println!(
                "{:>6} {:>12} {:>8} {:>14} {:>8}",
                "method", "h", "steps", "error", "order"
            );
            for entry in &studies {
                for level in &entry.levels {
                    let order = level
                        .observed_order
                        .map(|p| format!("{p:.3}"))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>6} {:>12.6} {:>8} {:>14.6e} {:>8}",
                        entry.method.name(),
                        level.step_size,
                        level.steps,
                        level.endpoint_error,
                        order
                    );
                }
            }
        }
        OutputFormat::Json => print_json(&studies)?,
    }
    Ok(())
}

/// Starts from the configured number of steps over `[x0, endpoint]` and halves h per level.
fn study<P>(problem: &P, config: &OdeConfig, levels: usize) -> Result<Vec<MethodStudy>>
where
    P: DerivativeFunction<f64> + ClosedForm<f64>,
{
    let xn = config.endpoint();
    let base_steps = base_step_count(config)?;

    config
        .methods
        .iter()
        .map(|&method| -> Result<MethodStudy> {
            let rows = refinement_study(
                method, problem, problem, config.x0, config.y0, xn, base_steps, levels,
            )
            .with_context(|| format!("{method} order study failed"))?;
            Ok(MethodStudy {
                method,
                expected_order: method.order(),
                levels: rows,
            })
        })
        .collect()
}

/// Steps for the coarsest level. In endpoint form `h` is shrunk, never grown,
/// until it divides `[x0, xn]` evenly.
fn base_step_count(config: &OdeConfig) -> Result<usize> {
    let Some(xn) = config.xn else {
        return Ok(config.steps);
    };
    if !config.h.is_finite() || config.h <= 0.0 {
        bail!("Step size must be positive and finite, got {}.", config.h);
    }
    let span = xn - config.x0;
    let steps = (span / config.h - GRID_SNAP).ceil().max(1.0) as usize;
    let effective = span / steps as f64;
    if (effective - config.h).abs() > GRID_SNAP * config.h {
        warn!(
            requested = config.h,
            effective,
            steps,
            "step size adjusted to divide the interval evenly"
        );
    }
    Ok(steps)
}
