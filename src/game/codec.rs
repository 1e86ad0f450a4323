//! # State Codec Module
//!
//! Bijective encoding of a [`GameState`] into a 32-bit integer, its inverse,
//! and the pure derivation of a state's terminal [`Status`] from the encoded
//! fields alone.
//!
//! ```text
//! bit:   31..28   27..16    15..10    9..4      3..2     1..0
//! field: turn(4)  chairs(12) scoreA(6) scoreB(6) shockA(2) shockB(2)
//! ```
//!
//! Encoding and decoding are total over the reachable domain and panic (via
//! [`GameError::EncodingOverflow`]) if a field does not fit in its bits;
//! there is no allocation and no branching beyond the status derivation.

use crate::game::error::GameError;
use crate::game::{GameState, Status};
use crate::model::{Encoding, CHAIR_COUNT, LOSING_SHOCKS, MAX_TURN, WINNING_SCORE};

/* BIT LAYOUT */

const TURN_BITS: u32 = 4;
const CHAIRS_BITS: u32 = 12;
const SCORE_BITS: u32 = 6;
const SHOCK_BITS: u32 = 2;

const SHOCK_B_SHIFT: u32 = 0;
const SHOCK_A_SHIFT: u32 = SHOCK_B_SHIFT + SHOCK_BITS;
const SCORE_B_SHIFT: u32 = SHOCK_A_SHIFT + SHOCK_BITS;
const SCORE_A_SHIFT: u32 = SCORE_B_SHIFT + SCORE_BITS;
const CHAIRS_SHIFT: u32 = SCORE_A_SHIFT + SCORE_BITS;
const TURN_SHIFT: u32 = CHAIRS_SHIFT + CHAIRS_BITS;

const CHAIRS_MASK: u32 = (1 << CHAIRS_BITS) - 1;
const SCORE_MASK: u32 = (1 << SCORE_BITS) - 1;
const SHOCK_MASK: u32 = (1 << SHOCK_BITS) - 1;
const TURN_MASK: u32 = (1 << TURN_BITS) - 1;

/// Packs `state` into its 32-bit encoding. Fields are assumed to already be
/// within range (callers that construct states from raw user/file input
/// should call [`encode_checked`] instead).
pub fn encode(state: &GameState) -> Encoding {
    ((state.turn as u32 & TURN_MASK) << TURN_SHIFT)
        | ((state.chairs as u32 & CHAIRS_MASK) << CHAIRS_SHIFT)
        | ((state.score_a as u32 & SCORE_MASK) << SCORE_A_SHIFT)
        | ((state.score_b as u32 & SCORE_MASK) << SCORE_B_SHIFT)
        | ((state.shock_a as u32 & SHOCK_MASK) << SHOCK_A_SHIFT)
        | ((state.shock_b as u32 & SHOCK_MASK) << SHOCK_B_SHIFT)
}

/// As [`encode`], but rejects fields that exceed their bit width or the
/// ruleset's semantic bounds (scores capped at 40; the 6-bit score field
/// has headroom to 63, which a correct state should never use).
pub fn encode_checked(state: &GameState) -> Result<Encoding, GameError> {
    if state.turn as u32 > TURN_MASK {
        return Err(GameError::EncodingOverflow {
            field: "turn",
            value: state.turn as u32,
        });
    }
    if state.chairs as u32 > CHAIRS_MASK {
        return Err(GameError::EncodingOverflow {
            field: "chairs",
            value: state.chairs as u32,
        });
    }
    if state.score_a > WINNING_SCORE || state.score_b > WINNING_SCORE {
        return Err(GameError::EncodingOverflow {
            field: "score",
            value: state.score_a.max(state.score_b) as u32,
        });
    }
    if state.shock_a as u32 > SHOCK_MASK || state.shock_b as u32 > SHOCK_MASK {
        return Err(GameError::EncodingOverflow {
            field: "shock",
            value: state.shock_a.max(state.shock_b) as u32,
        });
    }
    Ok(encode(state))
}

/// Unpacks `encoding` into a [`GameState`]. Total and infallible: every bit
/// pattern decodes to some state, though not every decoded state is
/// reachable under legal play.
pub fn decode(encoding: Encoding) -> GameState {
    GameState {
        turn: ((encoding >> TURN_SHIFT) & TURN_MASK) as u8,
        chairs: ((encoding >> CHAIRS_SHIFT) & CHAIRS_MASK) as u16,
        score_a: ((encoding >> SCORE_A_SHIFT) & SCORE_MASK) as u8,
        score_b: ((encoding >> SCORE_B_SHIFT) & SCORE_MASK) as u8,
        shock_a: ((encoding >> SHOCK_A_SHIFT) & SHOCK_MASK) as u8,
        shock_b: ((encoding >> SHOCK_B_SHIFT) & SHOCK_MASK) as u8,
    }
}

/// Returns `true` iff `encoding`'s status is not [`Status::InProgress`].
pub fn is_terminal(encoding: Encoding) -> bool {
    status(encoding).is_terminal()
}

/// Derives the [`Status`] of an encoded state without fully decoding it,
/// though in practice this just decodes and delegates to [`status_of`].
pub fn status(encoding: Encoding) -> Status {
    status_of(&decode(encoding))
}

/// Derives `state`'s [`Status`] per the priority order:
///
/// 1. `shock_a == 3` → B wins.
/// 2. `shock_b == 3` → A wins.
/// 3. `score_a == 40` → A wins.
/// 4. `score_b == 40` → B wins.
/// 5. One chair left, or `turn >= 15` → higher score wins, ties draw.
/// 6. Otherwise in progress.
pub fn status_of(state: &GameState) -> Status {
    if state.shock_a >= LOSING_SHOCKS {
        return Status::BWins;
    }
    if state.shock_b >= LOSING_SHOCKS {
        return Status::AWins;
    }
    if state.score_a >= WINNING_SCORE {
        return Status::AWins;
    }
    if state.score_b >= WINNING_SCORE {
        return Status::BWins;
    }
    let remaining = state.chairs.count_ones();
    if remaining <= 1 || state.turn >= MAX_TURN {
        return match state.score_a.cmp(&state.score_b) {
            std::cmp::Ordering::Greater => Status::AWins,
            std::cmp::Ordering::Less => Status::BWins,
            std::cmp::Ordering::Equal => Status::Draw,
        };
    }
    Status::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_encodes_to_documented_constant() {
        assert_eq!(encode(&GameState::INITIAL), 0x0FFF_0000);
    }

    #[test]
    fn top_four_bits_equal_turn() {
        let state = GameState {
            turn: 9,
            chairs: 0b0000_0001_0001,
            score_a: 12,
            score_b: 7,
            shock_a: 1,
            shock_b: 2,
        };
        let enc = encode(&state);
        assert_eq!((enc >> 28) & 0xF, 9);
    }

    #[test]
    fn encode_decode_round_trip() {
        let state = GameState {
            turn: 5,
            chairs: 0b1010_1100_0011,
            score_a: 33,
            score_b: 19,
            shock_a: 2,
            shock_b: 0,
        };
        let enc = encode(&state);
        assert_eq!(decode(enc), state);
    }

    #[test]
    fn decode_encode_round_trip_over_enumerated_range() {
        for enc in (0u32..=0xFFFF_FFFF).step_by(104_729) {
            assert_eq!(encode(&decode(enc)), enc);
        }
    }

    #[test]
    fn shock_three_dominates_all_other_fields() {
        let state = GameState {
            turn: 3,
            chairs: 0x0FFF,
            score_a: 0,
            score_b: 40, // would otherwise be a B-win
            shock_a: 3,
            shock_b: 0,
        };
        assert_eq!(status_of(&state), Status::BWins);
    }

    #[test]
    fn score_forty_wins_when_no_shocks_are_terminal() {
        let mut state = GameState::INITIAL;
        state.score_a = 40;
        assert_eq!(status_of(&state), Status::AWins);
        state.score_a = 0;
        state.score_b = 40;
        assert_eq!(status_of(&state), Status::BWins);
    }

    #[test]
    fn one_chair_left_compares_scores() {
        let mut state = GameState::INITIAL;
        state.chairs = 1 << 6; // chair 7
        state.score_a = 20;
        state.score_b = 20;
        assert_eq!(status_of(&state), Status::Draw);
        state.score_a = 21;
        assert_eq!(status_of(&state), Status::AWins);
    }

    #[test]
    fn turn_fifteen_forces_termination_even_with_many_chairs() {
        let mut state = GameState::INITIAL;
        state.turn = 15;
        state.score_a = 10;
        state.score_b = 3;
        assert_eq!(status_of(&state), Status::AWins);
    }

    #[test]
    fn turn_fourteen_does_not_force_termination() {
        let mut state = GameState::INITIAL;
        state.turn = 14;
        state.score_a = 10;
        state.score_b = 3;
        assert_eq!(status_of(&state), Status::InProgress);
    }

    #[test]
    fn status_is_a_pure_function_of_fields() {
        let a = GameState {
            turn: 4,
            chairs: 0x0F0,
            score_a: 11,
            score_b: 9,
            shock_a: 1,
            shock_b: 1,
        };
        let b = a;
        assert_eq!(status_of(&a), status_of(&b));
    }

    #[test]
    fn encode_checked_rejects_score_above_forty() {
        let mut state = GameState::INITIAL;
        state.score_a = 41;
        assert!(encode_checked(&state).is_err());
    }
}
