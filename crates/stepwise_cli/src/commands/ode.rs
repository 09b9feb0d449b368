//! `stepwise ode`: integrate one problem with several methods side by side.

use super::{print_json, problem_label, validate, IvpArgs};
use crate::config::{OdeConfig, ProblemKind};
use crate::OutputFormat;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use stepwise_core::exact::{compare, endpoint_error, ErrorSample};
use stepwise_core::problems::{ExponentialDecay, LinearRelaxation};
use stepwise_core::traits::{ClosedForm, DerivativeFunction};
use stepwise_core::{integrate, Method, Trajectory};
use tracing::info;

#[derive(Args, Debug)]
pub struct OdeArgs {
    #[command(flatten)]
    pub ivp: IvpArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct MethodRun {
    method: Method,
    endpoint_error: f64,
    trajectory: Trajectory,
    errors: Vec<ErrorSample>,
}

#[derive(Debug, Serialize)]
struct OdeReport {
    problem: String,
    x0: f64,
    y0: f64,
    h: f64,
    runs: Vec<MethodRun>,
}

pub fn run(args: &OdeArgs, mut config: OdeConfig) -> Result<()> {
    args.ivp.apply(&mut config);
    validate(&config)?;

    let report = match config.problem {
        ProblemKind::Linear => solve(&LinearRelaxation, &config)?,
        ProblemKind::Decay => solve(&ExponentialDecay { rate: config.rate }, &config)?,
    };

    match args.format {
        OutputFormat::Table => print_table(&report),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn solve<P>(problem: &P, config: &OdeConfig) -> Result<OdeReport>
where
    P: DerivativeFunction<f64> + ClosedForm<f64>,
{
    let mut runs = Vec::with_capacity(config.methods.len());
    for &method in &config.methods {
        let trajectory = integrate(method, problem, config.x0, config.y0, config.h, config.grid())
            .with_context(|| format!("{method} integration failed"))?;
        let endpoint_error = endpoint_error(&trajectory, problem).unwrap_or(f64::NAN);
        info!(%method, steps = trajectory.steps(), endpoint_error, "integration finished");
        runs.push(MethodRun {
            method,
            endpoint_error,
            errors: compare(&trajectory, problem),
            trajectory,
        });
    }

    Ok(OdeReport {
        problem: problem_label(config),
        x0: config.x0,
        y0: config.y0,
        h: config.h,
        runs,
    })
}

fn print_table(report: &OdeReport) {
    println!(
        "Solution of {} with y({}) = {}, h = {}",
        report.problem, report.x0, report.y0, report.h
    );

    let mut header = format!("{:>10}", "x");
    for run in &report.runs {
        header.push_str(&format!(" {:>14}", run.method.name()));
    }
    header.push_str(&format!(" {:>14}", "exact"));
    for run in &report.runs {
        header.push_str(&format!(" {:>12}", format!("|e| {}", run.method.name())));
    }
    println!("{header}");

    let Some(first) = report.runs.first() else {
        return;
    };
    for (i, sample) in first.errors.iter().enumerate() {
        let mut line = format!("{:>10.4}", sample.x);
        for run in &report.runs {
            line.push_str(&format!(" {:>14.8}", run.errors[i].approx));
        }
        line.push_str(&format!(" {:>14.8}", sample.exact));
        for run in &report.runs {
            line.push_str(&format!(" {:>12.3e}", run.errors[i].abs_error));
        }
        println!("{line}");
    }

    println!();
    for run in &report.runs {
        println!(
            "{:>6} (order {}): endpoint error {:.3e}",
            run.method.name(),
            run.method.order(),
            run.endpoint_error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::solve;
    use crate::config::OdeConfig;
    use stepwise_core::problems::LinearRelaxation;
    use stepwise_core::Method;

    #[test]
    fn default_run_orders_methods_by_accuracy() {
        let report = solve(&LinearRelaxation, &OdeConfig::default()).expect("solve");
        assert_eq!(report.runs.len(), 3);
        let errors: Vec<(Method, f64)> = report
            .runs
            .iter()
            .map(|r| (r.method, r.endpoint_error))
            .collect();
        assert!(errors[0].1 > errors[1].1 && errors[1].1 > errors[2].1);
        assert!(report.runs.iter().all(|r| r.trajectory.len() == 21));
    }

    #[test]
    fn invalid_step_size_surfaces_as_error() {
        let config = OdeConfig {
            h: 0.0,
            ..OdeConfig::default()
        };
        let err = solve(&LinearRelaxation, &config).expect_err("h = 0 must fail");
        assert!(format!("{err:#}").contains("step size must be positive"));
    }
}
