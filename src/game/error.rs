//! # Game Error Module
//!
//! Errors raised by the state codec and rule engine. Both are considered
//! programmer errors: violating their preconditions indicates a bug in a
//! caller (the reachability enumerator or analysis driver), not bad input
//! from an end user, so these are propagated to abort the process with a
//! diagnostic rather than recovered from.

use std::fmt;

use crate::game::GameState;
use crate::model::Chair;

/// Errors raised by [`crate::game::codec`] and [`crate::game::rules`].
#[derive(Debug)]
pub enum GameError {
    /// A chair choice was out of the `1..=12` range or not present in the
    /// state's chair mask.
    InvalidChoice {
        state: GameState,
        choice: Chair,
        hint: String,
    },

    /// [`crate::game::rules::step`] was invoked on a state whose status is
    /// not [`crate::game::Status::InProgress`].
    TerminalStep { state: GameState },

    /// A field value exceeded the number of bits allotted to it in the
    /// 32-bit encoding.
    EncodingOverflow { field: &'static str, value: u32 },
}

impl std::error::Error for GameError {}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChoice {
                state,
                choice,
                hint,
            } => {
                write!(
                    f,
                    "Invalid chair choice {choice} at state {state:?}: {hint}"
                )
            },
            Self::TerminalStep { state } => {
                write!(
                    f,
                    "step() was called on a terminal state: {state:?}. The \
                    caller should have checked `status(state) == InProgress` \
                    first."
                )
            },
            Self::EncodingOverflow { field, value } => {
                write!(
                    f,
                    "Field '{field}' has value {value}, which does not fit \
                    in the bits allotted to it in the 32-bit encoding."
                )
            },
        }
    }
}
