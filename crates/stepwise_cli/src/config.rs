//! Run configuration: built-in defaults, optionally overlaid by a TOML file,
//! then by command-line flags.
//!
//! ```toml
//! [ode]
//! problem = "decay"
//! rate = 0.5
//! h = 0.05
//! xn = 4.0
//! methods = ["heun", "rk4"]
//!
//! [newton]
//! initial_guess = [2.0, 0.5]
//! tolerance = 1e-8
//! max_steps = 30
//! ```

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stepwise_core::{Grid, Method, NewtonSettings};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ode: OdeConfig,
    pub newton: NewtonConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    /// dy/dx = x - y
    Linear,
    /// dy/dx = -rate * y
    Decay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdeConfig {
    pub problem: ProblemKind,
    pub rate: f64,
    pub x0: f64,
    pub y0: f64,
    pub h: f64,
    pub steps: usize,
    /// When set, integrate up to this endpoint instead of taking `steps` steps.
    pub xn: Option<f64>,
    pub methods: Vec<Method>,
}

impl Default for OdeConfig {
    fn default() -> Self {
        Self {
            problem: ProblemKind::Linear,
            rate: 1.0,
            x0: 0.0,
            y0: 1.0,
            h: 0.1,
            steps: 20,
            xn: None,
            methods: Method::ALL.to_vec(),
        }
    }
}

impl OdeConfig {
    pub fn grid(&self) -> Grid<f64> {
        match self.xn {
            Some(xn) => Grid::Endpoint(xn),
            None => Grid::Steps(self.steps),
        }
    }

    /// Right end of the integration interval.
    pub fn endpoint(&self) -> f64 {
        self.xn
            .unwrap_or(self.x0 + self.steps as f64 * self.h)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    pub initial_guess: Vec<f64>,
    /// Use a forward-difference Jacobian instead of the analytic one.
    pub fd_jacobian: bool,
    #[serde(flatten)]
    pub settings: NewtonSettings,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            initial_guess: vec![2.0, 0.5],
            fd_jacobian: false,
            settings: NewtonSettings::default(),
        }
    }
}

/// Loads `path` if given; a named file that cannot be read is an error.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn parse(text: &str) -> Result<Config> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::{load, parse, Config, ProblemKind};
    use std::path::Path;
    use stepwise_core::{Grid, Method};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty config parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.ode.grid(), Grid::Steps(20));
        assert_eq!(config.newton.settings.max_steps, 20);
        assert_eq!(config.newton.settings.tolerance, 1e-6);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = parse(
            r#"
            [ode]
            problem = "decay"
            rate = 0.5
            xn = 4.0
            methods = ["heun", "rk4"]

            [newton]
            tolerance = 1e-8
            "#,
        )
        .expect("config parses");
        assert_eq!(config.ode.problem, ProblemKind::Decay);
        assert_eq!(config.ode.h, 0.1);
        assert_eq!(config.ode.grid(), Grid::Endpoint(4.0));
        assert_eq!(config.ode.endpoint(), 4.0);
        assert_eq!(config.ode.methods, vec![Method::Heun, Method::Rk4]);
        assert_eq!(config.newton.settings.tolerance, 1e-8);
        assert_eq!(config.newton.settings.max_steps, 20);
        assert_eq!(config.newton.initial_guess, vec![2.0, 0.5]);
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(parse("[ode]\nmethods = [\"leapfrog\"]").is_err());
    }

    #[test]
    fn missing_named_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/stepwise.toml"))).expect_err("missing file");
        assert!(format!("{err}").contains("Failed to read config file"));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(load(None).expect("defaults"), Config::default());
    }
}
