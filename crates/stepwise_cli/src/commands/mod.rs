//! Subcommand implementations.

pub mod newton;
pub mod ode;
pub mod order;

use crate::config::{OdeConfig, ProblemKind};
use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use stepwise_core::Method;

/// Initial-value problem flags shared by `ode` and `order`; each overrides the config file.
#[derive(Args, Debug, Default)]
pub struct IvpArgs {
    /// Built-in problem to integrate
    #[arg(long, value_enum)]
    pub problem: Option<ProblemKind>,

    /// Decay rate for `--problem decay`
    #[arg(long)]
    pub rate: Option<f64>,

    /// Initial x
    #[arg(long, allow_negative_numbers = true)]
    pub x0: Option<f64>,

    /// Initial y
    #[arg(long, allow_negative_numbers = true)]
    pub y0: Option<f64>,

    /// Step size
    #[arg(long)]
    pub h: Option<f64>,

    /// Number of steps (step-count form)
    #[arg(short = 'n', long, conflicts_with = "xn")]
    pub steps: Option<usize>,

    /// Final x (endpoint form)
    #[arg(long, allow_negative_numbers = true)]
    pub xn: Option<f64>,

    /// Methods to run, e.g. `-m euler,rk4` (default: all)
    #[arg(short, long = "method", value_delimiter = ',')]
    pub methods: Vec<Method>,
}

impl IvpArgs {
    pub fn apply(&self, config: &mut OdeConfig) {
        if let Some(problem) = self.problem {
            config.problem = problem;
        }
        if let Some(rate) = self.rate {
            config.rate = rate;
        }
        if let Some(x0) = self.x0 {
            config.x0 = x0;
        }
        if let Some(y0) = self.y0 {
            config.y0 = y0;
        }
        if let Some(h) = self.h {
            config.h = h;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
            config.xn = None;
        }
        if let Some(xn) = self.xn {
            config.xn = Some(xn);
        }
        if !self.methods.is_empty() {
            config.methods = self.methods.clone();
        }
    }
}

/// Checks the values the core does not own (problem parameters, the method list)
/// and rejects a non-positive step size before any command derives a grid from it.
pub fn validate(config: &OdeConfig) -> Result<()> {
    if config.methods.is_empty() {
        bail!("At least one integration method is required.");
    }
    if config.problem == ProblemKind::Decay && !config.rate.is_finite() {
        bail!("Decay rate must be finite, got {}.", config.rate);
    }
    if !config.h.is_finite() || config.h <= 0.0 {
        bail!("Step size must be positive and finite, got {}.", config.h);
    }
    if !config.y0.is_finite() {
        bail!("Initial y must be finite, got {}.", config.y0);
    }
    Ok(())
}

pub fn problem_label(config: &OdeConfig) -> String {
    match config.problem {
        ProblemKind::Linear => "dy/dx = x - y".to_string(),
        ProblemKind::Decay => format!("dy/dx = -{} * y", config.rate),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate, IvpArgs};
    use crate::config::{OdeConfig, ProblemKind};
    use stepwise_core::{Grid, Method};

    #[test]
    fn flags_override_config_values() {
        let mut config = OdeConfig {
            xn: Some(3.0),
            ..OdeConfig::default()
        };
        let args = IvpArgs {
            problem: Some(ProblemKind::Decay),
            h: Some(0.05),
            steps: Some(40),
            methods: vec![Method::Rk4],
            ..IvpArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.problem, ProblemKind::Decay);
        assert_eq!(config.h, 0.05);
        assert_eq!(config.grid(), Grid::Steps(40));
        assert_eq!(config.methods, vec![Method::Rk4]);
        assert_eq!(config.x0, 0.0);
    }

    #[test]
    fn empty_method_list_is_rejected() {
        let config = OdeConfig {
            methods: Vec::new(),
            ..OdeConfig::default()
        };
        assert!(validate(&config).is_err());
        assert!(validate(&OdeConfig::default()).is_ok());
    }

    #[test]
    fn non_positive_step_size_is_rejected_in_endpoint_form() {
        for h in [-0.1, 0.0, f64::NAN] {
            let config = OdeConfig {
                xn: Some(2.0),
                h,
                ..OdeConfig::default()
            };
            let err = validate(&config).expect_err("bad h must fail");
            assert!(err.to_string().contains("Step size"), "{err}");
        }
    }
}
