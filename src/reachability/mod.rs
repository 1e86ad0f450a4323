//! # Reachability Enumerator Module
//!
//! Breadth-first expansion from the initial state, partitioned by turn,
//! producing for each turn a deduplicated, sorted set of state encodings
//! persisted as fixed-size chunks on disk.
//!
//! Each turn's encodings are only ever written into by the previous turn's
//! expansion (non-terminal successors, `turn' = turn + 1`) or by the turn's
//! own expansion (terminal successors, `turn' = turn`), so a turn is
//! complete the moment its own expansion pass finishes -- see [`enumerate`].

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::game::{codec, rules, GameState, Status};
use crate::model::{Encoding, StateCount, MAX_TURN};
use crate::util::{decode_hex, encode_hex};

/// Default number of states per persisted chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// On-disk metadata for one turn's partition (`turn-<t>/meta.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnMeta {
    pub turn: u8,
    #[serde(rename = "totalCount")]
    pub total_count: StateCount,
    #[serde(rename = "chunkSize")]
    pub chunk_size: usize,
    pub chunks: u32,
}

/// On-disk content for one chunk file (`turn-<t>/chunk-<k>.json`): a count
/// and the chunk's encodings, sorted ascending, rendered as lowercase hex
/// with no leading zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub count: usize,
    pub states: Vec<String>,
}

/// A read-only summary of one turn's partition, used by `--status`/`--init`
/// and to seed the analysis driver's `progress.json`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnSummary {
    pub turn: u8,
    pub total_count: StateCount,
    pub chunks: u32,
}

/// Enumerates every reachable state across turns `0..=15`, writing each
/// turn's partition to `root/turn-<t>/` once it is complete. Turns whose
/// `meta.json` already reports a positive `totalCount` are loaded back from
/// disk (not recomputed) so that later turns can still be expanded from
/// them -- no partial-turn resume is offered; a turn with no `meta.json`, or
/// one reporting zero states, is recomputed from scratch.
pub fn enumerate(root: &Path) -> anyhow::Result<Vec<TurnSummary>> {
    fs::create_dir_all(root)?;
    let mut sets: Vec<BTreeSet<Encoding>> = vec![BTreeSet::new(); MAX_TURN as usize + 1];
    sets[0].insert(codec::encode(&GameState::INITIAL));

    let mut summaries = Vec::with_capacity(sets.len());
    for t in 0..=MAX_TURN {
        let dir = turn_dir(root, t);
        let loaded = read_meta(&dir)?.filter(|meta| meta.total_count > 0);
        if let Some(meta) = &loaded {
            sets[t as usize] = load_chunks(&dir, meta)?;
        }

        // Expansion always runs, even for a turn loaded back from disk:
        // later turns' sets are seeded only by this loop, so skipping it on
        // a resumed turn would silently truncate every turn after it.
        let current: Vec<Encoding> = sets[t as usize].iter().copied().collect();
        for &enc in &current {
            let state = codec::decode(enc);
            if state.status() != Status::InProgress {
                continue;
            }
            for &outcome in &expand(&state) {
                let next_turn = codec::decode(outcome).turn;
                sets[next_turn as usize].insert(outcome);
            }
        }

        let meta = match loaded {
            Some(meta) => meta,
            None => write_turn(&dir, t, &sets[t as usize])?,
        };
        summaries.push(TurnSummary {
            turn: t,
            total_count: meta.total_count,
            chunks: meta.chunks,
        });
    }
    Ok(summaries)
}

/// Returns every encoded successor of `state` over all ordered
/// `(selectorChoice, setterChoice)` pairs of currently-present chairs.
/// `state` must be in-progress.
fn expand(state: &GameState) -> Vec<Encoding> {
    let chairs = state.available_chairs();
    let mut out = Vec::with_capacity(chairs.len() * chairs.len());
    for &selector_choice in &chairs {
        for &setter_choice in &chairs {
            let result = rules::step(*state, selector_choice, setter_choice)
                .expect("chairs drawn from available_chairs() are always legal");
            out.push(result.state);
        }
    }
    out
}

/// Reads the summary of every turn already persisted under `root`, without
/// loading chunk contents. Used by `--status`/`--init` and by the driver to
/// populate `progress.json`'s `totalStates`.
pub fn read_summaries(root: &Path) -> anyhow::Result<Vec<TurnSummary>> {
    let mut out = Vec::new();
    for t in 0..=MAX_TURN {
        let dir = turn_dir(root, t);
        if let Some(meta) = read_meta(&dir)? {
            out.push(TurnSummary {
                turn: t,
                total_count: meta.total_count,
                chunks: meta.chunks,
            });
        }
    }
    Ok(out)
}

/// Loads the full set of encodings persisted for turn `t`, in ascending
/// order. Used by the analysis driver to iterate a turn's states for
/// solving.
pub fn load_turn(root: &Path, t: u8) -> anyhow::Result<Vec<Encoding>> {
    let dir = turn_dir(root, t);
    let Some(meta) = read_meta(&dir)? else {
        return Ok(Vec::new());
    };
    Ok(load_chunks(&dir, &meta)?.into_iter().collect())
}

fn turn_dir(root: &Path, t: u8) -> PathBuf {
    root.join(format!("turn-{t}"))
}

fn read_meta(dir: &Path) -> anyhow::Result<Option<TurnMeta>> {
    let path = dir.join("meta.json");
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

fn load_chunks(dir: &Path, meta: &TurnMeta) -> anyhow::Result<BTreeSet<Encoding>> {
    let mut set = BTreeSet::new();
    for k in 0..meta.chunks {
        let path = dir.join(format!("chunk-{k}.json"));
        let contents = fs::read_to_string(&path)?;
        let chunk: Chunk = serde_json::from_str(&contents)?;
        for hex in &chunk.states {
            set.insert(decode_hex(hex)?);
        }
    }
    Ok(set)
}

/// Writes `states` to `dir` as ordered, fixed-size chunks plus `meta.json`,
/// overwriting any previous (necessarily empty or partial) content.
fn write_turn(
    dir: &Path,
    turn: u8,
    states: &BTreeSet<Encoding>,
) -> anyhow::Result<TurnMeta> {
    fs::create_dir_all(dir)?;
    let ordered: Vec<Encoding> = states.iter().copied().collect();
    let chunk_size = DEFAULT_CHUNK_SIZE;
    let mut chunks = 0u32;
    for (k, slice) in ordered.chunks(chunk_size).enumerate() {
        let chunk = Chunk {
            count: slice.len(),
            states: slice.iter().map(|&e| encode_hex(e)).collect(),
        };
        let path = dir.join(format!("chunk-{k}.json"));
        fs::write(&path, serde_json::to_string(&chunk)?)?;
        chunks = k as u32 + 1;
    }
    let meta = TurnMeta {
        turn,
        total_count: ordered.len() as StateCount,
        chunk_size,
        chunks,
    };
    fs::write(dir.join("meta.json"), serde_json::to_string(&meta)?)?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_one_is_nonempty_after_enumerating_initial_state() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = enumerate(dir.path()).unwrap();
        let turn1 = summaries.iter().find(|s| s.turn == 1).unwrap();
        assert!(turn1.total_count > 0);
    }

    #[test]
    fn turn_zero_contains_exactly_the_initial_state() {
        let dir = tempfile::tempdir().unwrap();
        enumerate(dir.path()).unwrap();
        let states = load_turn(dir.path(), 0).unwrap();
        assert_eq!(states, vec![codec::encode(&GameState::INITIAL)]);
    }

    #[test]
    fn resumption_skips_turns_with_positive_total_count() {
        let dir = tempfile::tempdir().unwrap();
        enumerate(dir.path()).unwrap();
        let turn_zero_dir = turn_dir(dir.path(), 0);
        let before = fs::read_to_string(turn_zero_dir.join("meta.json")).unwrap();

        // Re-running should not touch turn 0's files since its meta reports
        // a positive total_count already.
        enumerate(dir.path()).unwrap();
        let after = fs::read_to_string(turn_zero_dir.join("meta.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn resuming_from_a_persisted_turn_still_seeds_the_next_turn() {
        let dir = tempfile::tempdir().unwrap();

        // Simulate a crash immediately after turn 0 was committed: only
        // `turn-0/` exists on disk, every later turn has no `meta.json` yet.
        enumerate(dir.path()).unwrap();
        for t in 1..=MAX_TURN {
            let _ = fs::remove_dir_all(turn_dir(dir.path(), t));
        }

        // Turn 0 is loaded back from disk (not recomputed) on this
        // resumed run; it must still be expanded so turn 1 is seeded
        // instead of being written out empty.
        let summaries = enumerate(dir.path()).unwrap();
        let turn1 = summaries.iter().find(|s| s.turn == 1).unwrap();
        assert!(turn1.total_count > 0);
        assert_eq!(load_turn(dir.path(), 1).unwrap().len(), turn1.total_count as usize);
    }

    #[test]
    fn chunk_states_are_sorted_ascending() {
        let dir = tempfile::tempdir().unwrap();
        enumerate(dir.path()).unwrap();
        let states = load_turn(dir.path(), 1).unwrap();
        let mut sorted = states.clone();
        sorted.sort_unstable();
        assert_eq!(states, sorted);
    }

    #[test]
    fn every_successor_of_turn_zero_is_one_turn_later_or_terminal() {
        let dir = tempfile::tempdir().unwrap();
        enumerate(dir.path()).unwrap();
        for enc in load_turn(dir.path(), 1).unwrap() {
            let decoded = codec::decode(enc);
            assert!(decoded.turn == 1 || decoded.status().is_terminal());
        }
    }

    #[test]
    fn terminal_successors_are_recorded_in_their_own_turn_partition() {
        // Force a single-chair near-endgame so turn t's expansion produces
        // a terminal successor recorded back into turn t itself.
        let mut state = GameState::INITIAL;
        state.chairs = 1 << 4; // chair 5
        state.turn = 6;
        let outcome = rules::step(state, 5, 5).unwrap();
        let decoded = codec::decode(outcome.state);
        assert_eq!(decoded.turn, 6);
        assert!(decoded.status().is_terminal());
    }

    #[test]
    fn read_summaries_matches_enumerate_output() {
        let dir = tempfile::tempdir().unwrap();
        let summaries = enumerate(dir.path()).unwrap();
        let reread = read_summaries(dir.path()).unwrap();
        assert_eq!(summaries, reread);
    }
}
