//! # Rule Engine Module
//!
//! The pure transition function that maps a position and a pair of chair
//! choices to the next position. Deterministic and total over its
//! preconditions: no randomness, no time dependence, and applying it twice
//! to the same inputs yields bit-identical output, which is what lets the
//! reachability enumerator collide distinct trajectories into one stored
//! state.

use crate::game::error::GameError;
use crate::game::{chair_selector, GameState, Role, Status};
use crate::model::{Chair, Encoding};

/// The diagnostic bundle accompanying a [`step`] outcome. Only
/// [`TurnResult::state`] is required by the reachability enumerator and
/// analysis driver; the rest is for observers (tests, CLI introspection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnResult {
    pub state: Encoding,
    pub matched: bool,
    pub points_gained: u8,
    pub shocked: bool,
    pub chair_removed: Option<Chair>,
}

/// Advances `state` given the chair-selector's `selector_choice` and the
/// electric-setter's `setter_choice`, both chair numbers `1..=12`.
///
/// # Errors
///
/// Returns [`GameError::InvalidChoice`] if either choice is out of range or
/// not currently present in `state`'s chairs, and
/// [`GameError::TerminalStep`] if `state` is already terminal.
pub fn step(
    state: GameState,
    selector_choice: Chair,
    setter_choice: Chair,
) -> Result<TurnResult, GameError> {
    if state.status().is_terminal() {
        return Err(GameError::TerminalStep { state });
    }

    validate_choice(&state, selector_choice)?;
    validate_choice(&state, setter_choice)?;

    let role = chair_selector(state.turn);
    let matched = selector_choice == setter_choice;

    let mut next = state;
    let mut points_gained = 0;
    let mut shocked = false;
    let mut chair_removed = None;

    if matched {
        shocked = true;
        match role {
            Role::A => {
                next.score_a = 0;
                next.shock_a += 1;
            },
            Role::B => {
                next.score_b = 0;
                next.shock_b += 1;
            },
        }
    } else {
        points_gained = selector_choice;
        match role {
            Role::A => {
                next.score_a = next.score_a.saturating_add(selector_choice)
            },
            Role::B => {
                next.score_b = next.score_b.saturating_add(selector_choice)
            },
        }
        next.chairs &= !(1 << (selector_choice - 1));
        chair_removed = Some(selector_choice);
    }

    if next.status() == Status::InProgress {
        next.turn += 1;
    }

    Ok(TurnResult {
        state: crate::game::codec::encode(&next),
        matched,
        points_gained,
        shocked,
        chair_removed,
    })
}

fn validate_choice(
    state: &GameState,
    choice: Chair,
) -> Result<(), GameError> {
    if !(1..=12).contains(&choice) {
        return Err(GameError::InvalidChoice {
            state: *state,
            choice,
            hint: format!(
                "chair choices must be in 1..=12, got {choice}"
            ),
        });
    }
    if state.chairs & (1 << (choice - 1)) == 0 {
        return Err(GameError::InvalidChoice {
            state: *state,
            choice,
            hint: format!("chair {choice} is not present in this state"),
        });
    }
    Ok(())
}
