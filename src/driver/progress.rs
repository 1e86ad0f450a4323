//! # Progress Record Module
//!
//! The single `progress.json` file at the analysis results root the driver
//! consults to resume after a crash or a cooperative stop, and that
//! `--status` reads to print a summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::StateCount;
use crate::reachability::TurnSummary;

/// `progress.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Turn number (as a string, since JSON object keys are strings) to the
    /// count of states solved so far at that turn.
    pub analyzed_states: BTreeMap<String, StateCount>,
    /// Turn number to the total reachable state count at that turn, as
    /// reported by the reachability enumerator's `meta.json` files.
    pub total_states: BTreeMap<String, StateCount>,
    pub last_updated: String,
    pub is_complete: bool,
}

impl Progress {
    /// Builds a fresh progress record from the reachability enumerator's
    /// summaries: `totalStates` populated, `analyzedStates` all zero.
    pub fn init(summaries: &[TurnSummary]) -> Self {
        let mut total_states = BTreeMap::new();
        let mut analyzed_states = BTreeMap::new();
        for s in summaries {
            total_states.insert(s.turn.to_string(), s.total_count);
            analyzed_states.insert(s.turn.to_string(), 0);
        }
        let mut progress = Progress {
            analyzed_states,
            total_states,
            last_updated: Utc::now().to_rfc3339(),
            is_complete: false,
        };
        progress.recompute_complete();
        progress
    }

    /// Loads `progress.json` from `path`, or builds a fresh empty record
    /// (no turns known yet) if the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Progress {
                analyzed_states: BTreeMap::new(),
                total_states: BTreeMap::new(),
                last_updated: Utc::now().to_rfc3339(),
                is_complete: false,
            });
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Records that `count` additional states were solved at `turn`, bumps
    /// `lastUpdated`, and recomputes `isComplete`.
    pub fn record_progress(&mut self, turn: u8, count: StateCount) {
        let key = turn.to_string();
        *self.analyzed_states.entry(key).or_insert(0) += count;
        self.last_updated = Utc::now().to_rfc3339();
        self.recompute_complete();
    }

    /// `isComplete` is true iff every turn with nonzero `totalStates` has
    /// `analyzedStates == totalStates`.
    fn recompute_complete(&mut self) {
        self.is_complete = self.total_states.iter().all(|(turn, &total)| {
            total == 0 || self.analyzed_states.get(turn).copied().unwrap_or(0) >= total
        });
    }

    /// The count of states already solved at `turn`.
    pub fn analyzed(&self, turn: u8) -> StateCount {
        self.analyzed_states
            .get(&turn.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// The total reachable state count at `turn`, per the reachability
    /// enumerator.
    pub fn total(&self, turn: u8) -> StateCount {
        self.total_states
            .get(&turn.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// `true` iff `turn` has no unsolved states remaining.
    pub fn is_turn_complete(&self, turn: u8) -> bool {
        self.analyzed(turn) >= self.total(turn)
    }

    /// The largest turn with a nonzero total state count, i.e. `T_max` in
    /// the backward-induction ordering ("start from the largest turn for
    /// which any in-progress state exists").
    pub fn max_known_turn(&self) -> Option<u8> {
        self.total_states
            .iter()
            .filter(|(_, &total)| total > 0)
            .filter_map(|(turn, _)| turn.parse::<u8>().ok())
            .max()
    }
}
