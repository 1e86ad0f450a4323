//! # Equilibrium Solver Module
//!
//! Given one in-progress [`GameState`] and an oracle returning the already-
//! computed equilibrium value of any strictly later successor, builds the
//! Player-1-perspective payoff matrix over available chairs and solves the
//! resulting zero-sum matrix game for both players' mixed strategies and
//! the shared game value.
//!
//! The two LP objectives -- Player A's primal, Player B's dual -- are exact
//! duals of each other (see [`simplex`]), so this module issues a single
//! [`simplex::solve`] call per state and recovers both players' strategies
//! from its primal point and its shadow prices.

pub mod error;
pub mod simplex;

use ndarray::{Array1, Array2};

use crate::game::{chair_selector, codec, rules, GameState, Role};
use crate::model::{Chair, Encoding, CHAIR_COUNT};
use crate::solver::error::SolverError;
use crate::strategy::Strategy;
use crate::util::round_to;

/// The successor-value lookup the driver preloads before solving a turn.
/// Implementors need only answer for states at strictly later turns than
/// the one being solved.
pub trait SuccessorOracle {
    /// Returns the already-stored equilibrium value of `state`, or `None`
    /// if it has not been solved yet.
    fn value(&self, state: Encoding) -> Option<f64>;
}

/// Tolerance for the primal/dual value cross-check:
/// `5e-8 * max(1, |shift| + 1)`.
fn eps_value(shift: f64) -> f64 {
    5e-8 * (1.0f64).max(shift.abs() + 1.0)
}

/// Solves `state`, an in-progress position, against `oracle`. `draw_value`
/// is the configured Player-1-perspective payoff for draws; `precision`
/// is the number of decimal digits stored probabilities and the value are
/// rounded to.
///
/// # Errors
///
/// [`SolverError::SuccessorNotSolved`] if a referenced successor is
/// in-progress but absent from `oracle`; [`SolverError::LPInfeasible`] /
/// [`SolverError::LPError`] if the simplex solver fails, which theory says
/// should never happen for a well-formed matrix game.
pub fn solve_state(
    state: GameState,
    oracle: &dyn SuccessorOracle,
    draw_value: f64,
    precision: u32,
) -> Result<Strategy, SolverError> {
    debug_assert!(
        !state.status().is_terminal(),
        "solve_state called on a terminal state"
    );

    let chairs = state.available_chairs();
    let n = chairs.len();
    let matrix = build_payoff_matrix(state, &chairs, oracle, draw_value)?;

    if n == 1 {
        let value = round_to(matrix[0][0], precision);
        return Ok(Strategy {
            p1_probs: scatter(&chairs, &[1.0]),
            p2_probs: scatter(&chairs, &[1.0]),
            value,
            is_calculated: true,
        });
    }

    let min_entry = matrix
        .iter()
        .flatten()
        .copied()
        .fold(f64::INFINITY, f64::min);
    // Strictly positive, not merely non-negative: a matrix game where every
    // outcome is a loss for the row player (e.g. a chair-selector already
    // behind by more than the largest remaining chair's value) has
    // `min_entry` equal to its (negative) constant value throughout, and
    // shifting only up to 0 would leave `shifted` entirely zero, making
    // "maximize sum z_j s.t. 0*z <= 1" unbounded. The extra `+ 1.0` keeps
    // every entry of `shifted` strictly above zero so the LP stays bounded
    // regardless of how degenerate the underlying game is.
    let shift = (-min_entry).max(0.0) + 1.0;
    let shifted = Array2::from_shape_fn((n, n), |(i, j)| matrix[i][j] + shift);

    // maximize sum_j z_j  s.t.  shifted * z <= 1 (row-wise),  z >= 0.
    // This is Player B's problem in the classical reduction; its dual,
    // read off the same tableau, is Player A's problem.
    let lp = simplex::LinearProgram {
        c: Array1::ones(n),
        a: shifted.clone(),
        b: Array1::ones(n),
    };
    let solution = simplex::solve(&lp)?;

    let z_sum = solution.x.sum();
    let w_sum = solution.dual.sum();
    if z_sum < 1e-8 || w_sum < 1e-8 {
        return Err(SolverError::LPInfeasible {
            reason: "degenerate solution: strategy mass collapsed to zero".into(),
        });
    }
    let u = 1.0 / z_sum;
    let v = 1.0 / w_sum;
    let y: Vec<f64> = solution.x.iter().map(|&z| z * u).collect();
    let x: Vec<f64> = solution.dual.iter().map(|&w| w * v).collect();

    let v_check = (0..n)
        .map(|j| (0..n).map(|i| x[i] * shifted[[i, j]]).sum::<f64>())
        .fold(f64::INFINITY, f64::min);
    let u_check = (0..n)
        .map(|i| (0..n).map(|j| y[j] * shifted[[i, j]]).sum::<f64>())
        .fold(f64::NEG_INFINITY, f64::max);
    if (v_check - u_check).abs() > eps_value(shift) {
        eprintln!(
            "{}",
            colored::Colorize::yellow(format!(
                "warning: Nash tolerance exceeded solving state {:x} \
                (v={v_check:.9}, u={u_check:.9}, shift={shift:.9})",
                codec::encode(&state)
            )
            .as_str())
        );
    }

    let value = round_to((v + u) / 2.0 - shift, precision);
    let p1 = postprocess(&chairs, x, precision);
    let p2 = postprocess(&chairs, y, precision);

    Ok(Strategy {
        p1_probs: p1,
        p2_probs: p2,
        value,
        is_calculated: true,
    })
}

/// Builds the `|chairs| x |chairs|` payoff matrix, row `i` Player A's
/// choice of `chairs[i]`, column `j` Player B's choice of `chairs[j]`,
/// applying the chair-selector/setter role mapping before stepping the rule
/// engine.
fn build_payoff_matrix(
    state: GameState,
    chairs: &[Chair],
    oracle: &dyn SuccessorOracle,
    draw_value: f64,
) -> Result<Vec<Vec<f64>>, SolverError> {
    let n = chairs.len();
    let role = chair_selector(state.turn);
    let mut matrix = vec![vec![0.0; n]; n];

    for (i, &a) in chairs.iter().enumerate() {
        for (j, &b) in chairs.iter().enumerate() {
            let (selector_choice, setter_choice) = match role {
                Role::A => (a, b),
                Role::B => (b, a),
            };
            let outcome = rules::step(state, selector_choice, setter_choice)
                .expect("chairs drawn from available_chairs() are always legal");
            let status = codec::status(outcome.state);
            matrix[i][j] = match status.terminal_value(draw_value) {
                Some(terminal) => terminal,
                None => oracle.value(outcome.state).ok_or(SolverError::SuccessorNotSolved {
                    state: outcome.state,
                })?,
            };
        }
    }
    Ok(matrix)
}

/// Clips negatives from LP noise, renormalizes to sum 1 (falling back to
/// uniform if the mass collapsed below `1e-8`), rounds to `precision`
/// digits, then scatters the `|chairs|`-length vector back out to the full
/// length-12 vector indexed by `chair - 1`.
fn postprocess(chairs: &[Chair], raw: Vec<f64>, precision: u32) -> [f64; CHAIR_COUNT] {
    let clipped: Vec<f64> = raw.iter().map(|&p| p.max(0.0).min(1.0)).collect();
    let sum: f64 = clipped.iter().sum();
    let normalized: Vec<f64> = if sum < 1e-8 {
        let uniform = 1.0 / chairs.len() as f64;
        vec![uniform; chairs.len()]
    } else {
        clipped.iter().map(|&p| p / sum).collect()
    };
    let rounded: Vec<f64> = normalized.iter().map(|&p| round_to(p, precision)).collect();
    scatter(chairs, &rounded)
}

fn scatter(chairs: &[Chair], values: &[f64]) -> [f64; CHAIR_COUNT] {
    let mut out = [0.0; CHAIR_COUNT];
    for (&chair, &value) in chairs.iter().zip(values.iter()) {
        out[chair as usize - 1] = value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{rules, GameState};

    struct EmptyOracle;
    impl SuccessorOracle for EmptyOracle {
        fn value(&self, _state: Encoding) -> Option<f64> {
            None
        }
    }

    #[test]
    fn oracle_miss_on_in_progress_successor_is_fatal() {
        let state = GameState::INITIAL;
        let err = solve_state(state, &EmptyOracle, 0.0, 6).unwrap_err();
        assert!(matches!(err, SolverError::SuccessorNotSolved { .. }));
    }

    #[test]
    fn probability_vectors_sum_to_one_on_a_midgame_state() {
        let mut state = GameState::INITIAL;
        state.chairs = (1 << 2) | (1 << 8); // chairs 3 and 9
        state.turn = 14; // next move is terminal regardless of outcome
        state.score_a = 10;
        state.score_b = 10;
        let strategy = solve_state(state, &EmptyOracle, 0.0, 6).unwrap();
        let sum_a: f64 = strategy.p1_probs.iter().sum();
        let sum_b: f64 = strategy.p2_probs.iter().sum();
        assert!((sum_a - 1.0).abs() < 1e-6);
        assert!((sum_b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn probability_vectors_are_zero_on_removed_chairs() {
        let mut state = GameState::INITIAL;
        state.chairs = (1 << 0) | (1 << 1) | (1 << 2); // chairs 1, 2, 3
        state.turn = 14; // forces termination next move regardless of chair count
        let strategy = solve_state(state, &EmptyOracle, 0.0, 6).unwrap();
        for (i, &p) in strategy.p1_probs.iter().enumerate() {
            if ![0, 1, 2].contains(&i) {
                assert_eq!(p, 0.0, "chair {} should carry no mass", i + 1);
            }
        }
    }

    #[test]
    fn constant_losing_matrix_is_bounded_not_infeasible() {
        // turn=14, chairs={1,2}, shockA=2, shockB=2, scoreA=0, scoreB=5: A
        // is the chair-selector (turn 14 is even) and is already too far
        // behind to catch up with either remaining chair, and a match
        // shocks A to a loss too, so every entry of the payoff matrix is a
        // B-win (-1.0). A shift that only reaches 0 (not strictly
        // positive) turns this into the zero matrix and the LP becomes
        // unbounded; this must still solve successfully.
        let mut state = GameState::INITIAL;
        state.turn = 14;
        state.chairs = (1 << 0) | (1 << 1); // chairs 1 and 2
        state.shock_a = 2;
        state.shock_b = 2;
        state.score_a = 0;
        state.score_b = 5;
        let strategy = solve_state(state, &EmptyOracle, 0.0, 6).unwrap();
        assert_eq!(strategy.value, -1.0);
        let sum_a: f64 = strategy.p1_probs.iter().sum();
        let sum_b: f64 = strategy.p2_probs.iter().sum();
        assert!((sum_a - 1.0).abs() < 1e-6);
        assert!((sum_b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn best_response_property_holds_for_a_small_matrix() {
        // A hand-built 2x2 matrix game with known equilibrium: matching
        // pennies scaled to this crate's payoff convention.
        let mut state = GameState::INITIAL;
        state.chairs = (1 << 0) | (1 << 1); // chairs 1 and 2
        state.turn = 14;
        state.score_a = 0;
        state.score_b = 0;
        let strategy = rules_solve_and_verify(state);
        assert!(strategy.value.abs() <= 1.0);
    }

    fn rules_solve_and_verify(state: GameState) -> Strategy {
        let strategy = solve_state(state, &EmptyOracle, 0.0, 6).unwrap();
        let chairs = state.available_chairs();
        let role = chair_selector(state.turn);
        for &a in &chairs {
            let mut payoff = 0.0;
            for &b in &chairs {
                let (sel, set) = match role {
                    Role::A => (a, b),
                    Role::B => (b, a),
                };
                let outcome = rules::step(state, sel, set).unwrap();
                let terminal = codec::status(outcome.state).terminal_value(0.0).unwrap();
                payoff += strategy.p2_probs[b as usize - 1] * terminal;
            }
            assert!(
                payoff <= strategy.value + 5e-8,
                "pure choice {a} beats the equilibrium value"
            );
        }
        strategy
    }
}
