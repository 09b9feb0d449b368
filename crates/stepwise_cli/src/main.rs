//! stepwise - command-line driver for the `stepwise_core` solvers.
//!
//! # Commands
//!
//! - `stepwise ode` - integrate a built-in ODE with Euler, Heun and RK4 and
//!   compare against its closed-form solution
//! - `stepwise newton` - solve the circle/hyperbola system with Newton-Raphson
//! - `stepwise order` - measure the empirical order of accuracy by step halving
//!
//! Results go to stdout; logs go to stderr and honour `RUST_LOG`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "stepwise")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (per-step solver diagnostics)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Integrate dy/dx = f(x, y) and compare the methods against the exact solution
    Ode(commands::ode::OdeArgs),

    /// Solve x² + y² = 4, xy = 1 with Newton-Raphson
    Newton(commands::newton::NewtonArgs),

    /// Estimate each method's order of accuracy by repeatedly halving h
    Order(commands::order::OrderArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load(cli.config.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Ode(args) => commands::ode::run(&args, config.ode),
        Commands::Newton(args) => commands::newton::run(&args, config.newton),
        Commands::Order(args) => commands::order::run(&args, config.ode),
    }
}
