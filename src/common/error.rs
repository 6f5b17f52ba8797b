//! Setup-time errors.
//!
//! These only ever surface while the app is being built. The simulation itself
//! never returns errors for expected control flow (missed targets, expired
//! effects, full budgets); those are explicit outcomes on the engine types.

use thiserror::Error;

/// A tunable value that makes the simulation meaningless.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("tunable `{name}` must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("tunable `{name}` must lie in [0, 1], got {value}")]
    NotUnit { name: &'static str, value: f32 },

    #[error("instance budget for {kind} is zero; nothing of that kind could ever spawn")]
    EmptyBudget { kind: &'static str },
}

/// A row of a built-in data table is unusable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("data table `{table}` is empty")]
    Empty { table: &'static str },

    #[error("{table} row `{row}`: field `{field}` is invalid ({value})")]
    InvalidField {
        table: &'static str,
        row: &'static str,
        field: &'static str,
        value: f32,
    },
}

/// Any error that aborts initialization.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Reject zero, negative and NaN values.
pub fn ensure_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

/// Reject values outside `[0, 1]`.
pub fn ensure_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotUnit { name, value })
    }
}
