//! # Errors Module
//!
//! Top-level error aggregation: a thin `errors.rs` that wraps each
//! subsystem's own error enum rather than flattening everything into one
//! type. [`game::error::GameError`] and [`solver::error::SolverError`] are
//! programmer errors raised by pure functions, while storage failures (the
//! chunked reachability and strategy stores, `progress.json`,
//! `analysis-config.json`) are I/O-shaped and are carried as
//! [`anyhow::Error`] contexts instead of a dedicated enum.

use std::fmt;

use crate::game::error::GameError;
use crate::solver::error::SolverError;

/// The crate's top-level error type. CLI entry points match on this to pick
/// an [`exitcode`] constant; library callers that only care about the
/// underlying cause can match through to the wrapped variant.
#[derive(Debug)]
pub enum AnalyzerError {
    /// A programmer error from the state codec or rule engine.
    Game(GameError),

    /// A fatal error from the equilibrium solver: an oracle miss or an LP
    /// failure. Both abort the current state rather than write a partial
    /// result.
    Solver(SolverError),

    /// A failure reading or writing a chunked store, `progress.json`, or
    /// the configuration document. Rolls the driver back to its last
    /// committed checkpoint rather than corrupting partially-written
    /// output.
    Storage(anyhow::Error),

    /// A malformed or out-of-range CLI argument.
    Usage(String),
}

impl std::error::Error for AnalyzerError {}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Game(e) => write!(f, "{e}"),
            Self::Solver(e) => write!(f, "{e}"),
            Self::Storage(e) => write!(f, "storage error: {e:#}"),
            Self::Usage(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<GameError> for AnalyzerError {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}

impl From<SolverError> for AnalyzerError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}

impl From<anyhow::Error> for AnalyzerError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e)
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(anyhow::Error::new(e))
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(anyhow::Error::new(e))
    }
}

/// Maps an [`AnalyzerError`] to the [`exitcode`] constant the CLI exits with.
pub fn exit_code(err: &AnalyzerError) -> exitcode::ExitCode {
    match err {
        AnalyzerError::Game(_) => exitcode::DATAERR,
        AnalyzerError::Solver(_) => exitcode::SOFTWARE,
        AnalyzerError::Storage(_) => exitcode::IOERR,
        AnalyzerError::Usage(_) => exitcode::USAGE,
    }
}
