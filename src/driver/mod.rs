//! # Analysis Driver Module
//!
//! Coordinates backward-induction order (turns processed from terminal
//! depth toward the initial state), batches states, persists per-state
//! strategies in the chunked strategy store, and resumes from crash by
//! consulting the progress record.

pub mod progress;
pub mod store;

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::config::Config;
use crate::errors::AnalyzerError;
use crate::game::codec;
use crate::model::{Encoding, StateCount, MAX_TURN};
use crate::reachability;
use crate::solver::{self, SuccessorOracle};
use crate::strategy::Strategy;
use progress::Progress;
use store::TurnStore;

/// Default chunk size for the strategy store, reusing the reachability
/// enumerator's default (there is no reason for the two to diverge).
const STRATEGY_CHUNK_SIZE: usize = reachability::DEFAULT_CHUNK_SIZE;

/// A flat map of `turn + 1`'s computed values, read once per turn and
/// handed to the solver as its [`SuccessorOracle`].
struct MapOracle(HashMap<Encoding, f64>);

impl SuccessorOracle for MapOracle {
    fn value(&self, state: Encoding) -> Option<f64> {
        self.0.get(&state).copied()
    }
}

/// Coordinates the full backward-induction pass. Holds no mutable state of
/// its own beyond the [`Config`] it was built from: a plain value threaded
/// by the caller (CLI `main`) rather than a static.
pub struct Driver {
    config: Config,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        Driver { config }
    }

    fn progress_path(&self) -> std::path::PathBuf {
        self.config.results_directory().join("progress.json")
    }

    fn turn_dir(&self, turn: u8) -> std::path::PathBuf {
        self.config.results_directory().join(format!("turn-{turn}"))
    }

    /// `--init`: runs (or resumes) the reachability enumerator and (re)
    /// initializes `progress.json` from its summaries.
    pub fn init(&self) -> Result<Progress, AnalyzerError> {
        let summaries = reachability::enumerate(&self.config.reachability_directory())?;
        let progress = Progress::init(&summaries);
        progress.save(&self.progress_path())?;
        Ok(progress)
    }

    /// `--status`: reads the current progress record without modifying it.
    pub fn status(&self) -> Result<Progress, AnalyzerError> {
        Progress::load(&self.progress_path())
            .map_err(AnalyzerError::from)
    }

    /// `--clear`: deletes every strategy output and resets progress. Does
    /// not touch the reachability state-hashes store, which is independent
    /// and reusable across analysis runs.
    pub fn clear(&self) -> Result<(), AnalyzerError> {
        let dir = self.config.results_directory();
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Solves up to `max_states` in strictly decreasing turn order,
    /// checkpointing every `analysis.saveInterval` states and stopping
    /// early (after flushing) if `stop` is set. Returns the number of
    /// states actually solved. Idempotent: re-running on a complete store
    /// solves and reports 0.
    pub fn solve(
        &self,
        max_states: usize,
        stop: &AtomicBool,
    ) -> Result<StateCount, AnalyzerError> {
        let mut progress = Progress::load(&self.progress_path())?;
        if progress.total_states.is_empty() {
            return Err(AnalyzerError::Usage(
                "no reachability data found; run with --init first".into(),
            ));
        }

        let Some(mut turn) = first_incomplete_turn(&progress) else {
            return Ok(0);
        };

        let draw_value = self.config.evaluation.draw;
        let precision = self.config.analysis.precision_digits;
        let max_batch = self.config.analysis.max_batch_size.max(1);
        let save_interval = self.config.analysis.save_interval.max(1);

        let mut solved: StateCount = 0;
        'turns: loop {
            if solved as usize >= max_states || stop.load(Ordering::Relaxed) {
                break;
            }
            if progress.is_turn_complete(turn) {
                match turn.checked_sub(1) {
                    Some(prev) => {
                        turn = prev;
                        continue;
                    },
                    None => break,
                }
            }

            let oracle = self.preload_oracle(turn)?;
            let mut store = TurnStore::open(&self.turn_dir(turn), STRATEGY_CHUNK_SIZE)?;
            let all_states = reachability::load_turn(&self.config.reachability_directory(), turn)?;
            let pending: Vec<Encoding> = all_states
                .into_iter()
                .filter(|&e| !store.contains(e))
                .collect();

            for batch in pending.chunks(max_batch) {
                if stop.load(Ordering::Relaxed) {
                    break 'turns;
                }
                let remaining_budget = max_states.saturating_sub(solved as usize);
                if remaining_budget == 0 {
                    break 'turns;
                }
                let take = remaining_budget.min(batch.len());
                let slice = &batch[..take];

                for sub in slice.chunks(save_interval) {
                    if stop.load(Ordering::Relaxed) {
                        break 'turns;
                    }
                    let results: Vec<(Encoding, Strategy)> = sub
                        .par_iter()
                        .map(|&enc| solve_one(enc, &oracle, draw_value, precision))
                        .collect::<Result<_, solver::error::SolverError>>()?;

                    for (enc, strat) in results {
                        store.put(enc, strat)?;
                    }
                    store.flush()?;
                    solved += sub.len() as StateCount;
                    progress.record_progress(turn, sub.len() as StateCount);
                    progress.save(&self.progress_path())?;
                }
            }
        }

        Ok(solved)
    }

    /// Bulk-loads turn `turn + 1`'s computed values as the successor
    /// oracle, or an empty map if `turn` is the final representable turn
    /// (whose states are always terminal by construction: no state at
    /// `turn >= 15` is ever in-progress).
    fn preload_oracle(&self, turn: u8) -> Result<MapOracle, AnalyzerError> {
        if turn >= MAX_TURN {
            return Ok(MapOracle(HashMap::new()));
        }
        let next = TurnStore::open(&self.turn_dir(turn + 1), STRATEGY_CHUNK_SIZE)?;
        let loaded = next.load_all()?;
        Ok(MapOracle(
            loaded.into_iter().map(|(enc, strat)| (enc, strat.value)).collect(),
        ))
    }
}

/// Solves a single state: trivially for a terminal one, via the
/// equilibrium solver otherwise.
fn solve_one(
    enc: Encoding,
    oracle: &MapOracle,
    draw_value: f64,
    precision: u32,
) -> Result<(Encoding, Strategy), solver::error::SolverError> {
    let state = codec::decode(enc);
    let status = state.status();
    let strategy = if status.is_terminal() {
        Strategy::terminal(status, draw_value)
    } else {
        solver::solve_state(state, oracle, draw_value, precision)?
    };
    Ok((enc, strategy))
}

fn first_incomplete_turn(progress: &Progress) -> Option<u8> {
    let max_turn = progress.max_known_turn()?;
    (0..=max_turn).rev().find(|&t| !progress.is_turn_complete(t))
}
