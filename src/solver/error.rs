//! # Solver Error Module
//!
//! Errors raised by [`crate::solver`]. Both variants are fatal: they
//! indicate either a driver ordering bug (a successor referenced before it
//! was solved) or a bug in the payoff matrix construction (since the
//! underlying matrix game is always feasible and bounded by construction,
//! an LP failure here can only mean the matrix fed to it was malformed).

use std::fmt;

use crate::model::Encoding;

#[derive(Debug)]
pub enum SolverError {
    /// The oracle had no value for a referenced successor. This means the
    /// analysis driver solved states out of turn order.
    SuccessorNotSolved { state: Encoding },

    /// The LP solver could not find a feasible or bounded optimum. Theory
    /// guarantees every matrix game LP is feasible and bounded, so this
    /// indicates a bug in matrix construction, not a property of the game.
    LPInfeasible { reason: String },

    /// The LP solver itself reported an internal error (e.g. exceeded its
    /// iteration budget without converging).
    LPError { reason: String },
}

impl std::error::Error for SolverError {}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuccessorNotSolved { state } => {
                write!(
                    f,
                    "successor {state:x} has no stored strategy; the \
                    analysis driver must solve every turn in strictly \
                    decreasing order before referencing its successors"
                )
            },
            Self::LPInfeasible { reason } => {
                write!(
                    f,
                    "payoff matrix LP is infeasible or unbounded ({reason}); \
                    this should never happen for a well-formed matrix game \
                    and indicates a bug in matrix construction"
                )
            },
            Self::LPError { reason } => {
                write!(f, "LP solver error: {reason}")
            },
        }
    }
}
