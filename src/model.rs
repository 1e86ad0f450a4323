//! # Data Models Module
//!
//! Centralized definitions for the data types shared across this crate's
//! modules, following the convention of keeping primary and attribute type
//! aliases in one place rather than scattering newtypes per module.

/* PRIMARY TYPES */

/// The bit-packed 32-bit encoding of a [`crate::game::GameState`]. See
/// `crate::game::codec` for the exact bit layout.
pub type Encoding = u32;

/// Half-moves played so far, in `0..=15`.
pub type Turn = u8;

/// Per-player accumulated score, in `0..=40`.
pub type Score = u8;

/// Per-player accumulated electric shocks, in `0..=3`.
pub type Shock = u8;

/// A 12-bit mask of which chairs remain present. Bit `k` (0-indexed) set
/// means chair `k + 1` is still present.
pub type ChairMask = u16;

/// A chair number, in `1..=12`.
pub type Chair = u8;

/* SECONDARY TYPES */

/// Number of states discovered at a given turn, or within a chunk.
pub type StateCount = u64;

/// Index of a chunk within a turn's partition, or within the strategy store.
pub type ChunkIndex = u32;

/// Total count of chairs in the game.
pub const CHAIR_COUNT: usize = 12;

/// Inclusive maximum turn index representable in the 4-bit `turn` field.
pub const MAX_TURN: Turn = 15;

/// Winning score sentinel; reaching it ends the game.
pub const WINNING_SCORE: Score = 40;

/// Shock count sentinel; reaching it ends the game.
pub const LOSING_SHOCKS: Shock = 3;
