//! # Strategy Module
//!
//! The output of the [`crate::solver`] for a single in-progress state: both
//! players' mixed strategies over chair choices and the game's value from
//! Player A's perspective. This is the unit the analysis driver persists to
//! the chunked strategy store (`crate::driver::store`) and the one the query
//! interface (`crate::query`) reads back.

use serde::{Deserialize, Serialize};

use crate::game::{Role, Status};
use crate::model::CHAIR_COUNT;

/// A computed equilibrium for one in-progress state, or the intrinsic
/// value of a terminal one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// Mass assigned to each chair `i + 1` by Player A. Zero on removed
    /// chairs; sums to 1 within tolerance.
    pub p1_probs: [f64; CHAIR_COUNT],
    /// As [`Strategy::p1_probs`], for Player B.
    pub p2_probs: [f64; CHAIR_COUNT],
    /// Expected payoff under optimal play, Player-1 perspective, in `[-1, 1]`.
    pub value: f64,
    #[serde(default = "is_calculated_default")]
    pub is_calculated: bool,
}

fn is_calculated_default() -> bool {
    true
}

impl Strategy {
    /// Builds the strategy stored for a terminal state: zero vectors and
    /// the intrinsic terminal value. `status` must be terminal.
    pub fn terminal(status: Status, draw_value: f64) -> Self {
        let value = status
            .terminal_value(draw_value)
            .expect("terminal() requires a terminal status");
        Strategy {
            p1_probs: [0.0; CHAIR_COUNT],
            p2_probs: [0.0; CHAIR_COUNT],
            value,
            is_calculated: true,
        }
    }

    /// Returns the probability vector the chair-selector on `role`'s turn
    /// samples from: `p1_probs` when Player A is the chair-selector, else
    /// `p2_probs`.
    pub fn selector_vector(&self, role: Role) -> &[f64; CHAIR_COUNT] {
        match role {
            Role::A => &self.p1_probs,
            Role::B => &self.p2_probs,
        }
    }
}
