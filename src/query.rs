//! # Query Interface Module
//!
//! The consumer-facing read path: given a state encoding, return its
//! equilibrium strategy. Everything outside the core (the gameplay UI, its
//! CPU opponent, score tables) is expected to go through this thin,
//! read-only wrapper over the chunked strategy store rather than touching
//! [`crate::driver::store`] directly.

use std::path::Path;

use crate::config::Config;
use crate::driver::store::TurnStore;
use crate::game::{chair_selector, codec};
use crate::model::{Encoding, CHAIR_COUNT};
use crate::strategy::Strategy;

/// Looks up the stored (or trivially terminal) strategy for `encoding`
/// under the results directory described by `config`. Returns `None` if
/// the state's turn has not been analyzed at all, or if that turn has been
/// analyzed but does not yet include this particular state (the UI side is
/// expected to treat this as "strategy not found" and fall back to a
/// uniform-random choice).
pub fn lookup(config: &Config, encoding: Encoding) -> anyhow::Result<Option<Strategy>> {
    let state = codec::decode(encoding);
    let status = state.status();
    if status.is_terminal() {
        return Ok(Some(Strategy::terminal(status, config.evaluation.draw)));
    }

    let dir = config
        .results_directory()
        .join(format!("turn-{}", state.turn));
    if !dir.join("index.json").exists() {
        return Ok(None);
    }
    let mut store = TurnStore::open(&dir, crate::reachability::DEFAULT_CHUNK_SIZE)?;
    store.get(encoding)
}

/// As [`lookup`], reading directly from a results directory rather than
/// going through [`Config`]. Useful for tooling that only has a path.
pub fn lookup_in(results_root: &Path, encoding: Encoding) -> anyhow::Result<Option<Strategy>> {
    let state = codec::decode(encoding);
    let status = state.status();
    if status.is_terminal() {
        return Ok(Some(Strategy::terminal(status, 0.0)));
    }
    let dir = results_root.join(format!("turn-{}", state.turn));
    if !dir.join("index.json").exists() {
        return Ok(None);
    }
    let mut store = TurnStore::open(&dir, crate::reachability::DEFAULT_CHUNK_SIZE)?;
    store.get(encoding)
}

/// Returns the probability vector the chair-selector on `encoding`'s turn
/// should sample from: `p1Probs` if Player A is the chair-selector that
/// turn, else `p2Probs`. The external gameplay UI's CPU opponent is the
/// intended caller.
pub fn sample_role_vector(strategy: &Strategy, encoding: Encoding) -> &[f64; CHAIR_COUNT] {
    let turn = codec::decode(encoding).turn;
    strategy.selector_vector(chair_selector(turn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    #[test]
    fn lookup_returns_terminal_strategy_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.analysis.output_directory = dir.path().join("analysis-results").display().to_string();

        let mut state = GameState::INITIAL;
        state.score_a = 40;
        let encoding = codec::encode(&state);

        let result = lookup(&config, encoding).unwrap().unwrap();
        assert_eq!(result.value, 1.0);
    }

    #[test]
    fn lookup_returns_none_for_unanalyzed_turn() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.analysis.output_directory = dir.path().join("analysis-results").display().to_string();

        let encoding = codec::encode(&GameState::INITIAL);
        assert!(lookup(&config, encoding).unwrap().is_none());
    }

    #[test]
    fn sample_role_vector_picks_p1_on_even_turns() {
        let mut strategy = Strategy::terminal(crate::game::Status::Draw, 0.0);
        strategy.p1_probs[0] = 1.0;
        strategy.p2_probs[1] = 1.0;
        let encoding = codec::encode(&GameState::INITIAL); // turn 0, even -> A selects
        assert_eq!(sample_role_vector(&strategy, encoding), &strategy.p1_probs);
    }
}
