//! # Simplex Module
//!
//! A dense tableau implementation of the primal simplex method, restricted
//! to the standard form this crate ever needs to solve:
//!
//! ```text
//! maximize   c^T x
//! subject to A x <= b.   x >= 0.   b >= 0.
//! ```
//!
//! `b >= 0` means the all-slack basis is already feasible, so no two-phase
//! method or artificial variables are needed to find a starting point.
//!
//! [`crate::solver`] uses a single call to [`solve`] per matrix game: Player
//! A's primal and Player B's dual are exact duals of each other, so one
//! simplex solve over Player B's side yields Player A's strategy for free,
//! read off the final tableau's shadow prices.

use ndarray::{Array1, Array2};
use ordered_float::OrderedFloat;

use crate::solver::error::SolverError;

const MAX_ITERATIONS: usize = 10_000;
const EPS: f64 = 1e-9;

/// A linear program in the restricted standard form this module solves.
pub struct LinearProgram {
    pub c: Array1<f64>,
    pub a: Array2<f64>,
    pub b: Array1<f64>,
}

/// The optimal primal point, the objective value at that point, and the
/// dual values (shadow prices) of each constraint, read off the tableau
/// once no further improving pivot exists.
#[derive(Debug, Clone)]
pub struct Solution {
    pub x: Array1<f64>,
    pub objective: f64,
    pub dual: Array1<f64>,
}

/// Solves `lp` via the tableau simplex method. Returns
/// [`SolverError::LPInfeasible`] if an entering column never admits a
/// limiting ratio (an unbounded direction), which cannot happen for the
/// bounded matrix-game LPs this crate constructs and would indicate a bug
/// upstream. Returns [`SolverError::LPError`] if the pivot count exceeds
/// [`MAX_ITERATIONS`] without reaching optimality (cycling).
pub fn solve(lp: &LinearProgram) -> Result<Solution, SolverError> {
    let m = lp.a.nrows();
    let n = lp.a.ncols();
    assert_eq!(lp.b.len(), m, "constraint count mismatch");
    assert_eq!(lp.c.len(), n, "variable count mismatch");

    let total_cols = n + m + 1;
    let rhs_col = total_cols - 1;
    let mut tableau = Array2::<f64>::zeros((m + 1, total_cols));
    for i in 0..m {
        for j in 0..n {
            tableau[[i, j]] = lp.a[[i, j]];
        }
        tableau[[i, n + i]] = 1.0;
        tableau[[i, rhs_col]] = lp.b[i];
    }
    for j in 0..n {
        tableau[[m, j]] = -lp.c[j];
    }

    let mut basis: Vec<usize> = (n..n + m).collect();

    for _ in 0..MAX_ITERATIONS {
        let pivot_col = (0..n + m)
            .filter(|&j| tableau[[m, j]] < -EPS)
            .min_by_key(|&j| OrderedFloat(tableau[[m, j]]));
        let Some(pivot_col) = pivot_col else {
            return Ok(extract(&tableau, &basis, lp, n, m, rhs_col));
        };

        let mut pivot_row = None;
        let mut best_ratio = f64::INFINITY;
        for i in 0..m {
            let a_ij = tableau[[i, pivot_col]];
            if a_ij > EPS {
                let ratio = tableau[[i, rhs_col]] / a_ij;
                if ratio < best_ratio - EPS {
                    best_ratio = ratio;
                    pivot_row = Some(i);
                }
            }
        }
        let Some(pivot_row) = pivot_row else {
            return Err(SolverError::LPInfeasible {
                reason: "no limiting ratio; unbounded direction".into(),
            });
        };

        let pivot_val = tableau[[pivot_row, pivot_col]];
        for j in 0..total_cols {
            tableau[[pivot_row, j]] /= pivot_val;
        }
        for i in 0..=m {
            if i == pivot_row {
                continue;
            }
            let factor = tableau[[i, pivot_col]];
            if factor.abs() > EPS {
                for j in 0..total_cols {
                    let v = tableau[[pivot_row, j]];
                    tableau[[i, j]] -= factor * v;
                }
            }
        }
        basis[pivot_row] = pivot_col;
    }

    Err(SolverError::LPError {
        reason: format!("did not converge within {MAX_ITERATIONS} pivots"),
    })
}

fn extract(
    tableau: &Array2<f64>,
    basis: &[usize],
    lp: &LinearProgram,
    n: usize,
    m: usize,
    rhs_col: usize,
) -> Solution {
    let mut x = Array1::zeros(n);
    for (row, &col) in basis.iter().enumerate() {
        if col < n {
            x[col] = tableau[[row, rhs_col]].max(0.0);
        }
    }
    let objective = (0..n).map(|j| lp.c[j] * x[j]).sum();
    let dual = Array1::from_iter((0..m).map(|i| tableau[[m, n + i]].max(0.0)));
    Solution { x, objective, dual }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_single_variable_program() {
        // maximize 3x s.t. x <= 4 -> x = 4, objective = 12.
        let lp = LinearProgram {
            c: Array1::from(vec![3.0]),
            a: Array2::from_shape_vec((1, 1), vec![1.0]).unwrap(),
            b: Array1::from(vec![4.0]),
        };
        let sol = solve(&lp).unwrap();
        assert!((sol.objective - 12.0).abs() < 1e-6);
        assert!((sol.x[0] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn matching_pennies_value_is_one_half() {
        // Payoff matrix [[1, -1], [-1, 1]] shifted by 1 -> [[2, 0], [0, 2]].
        // maximize z1+z2 s.t. 2z1 <= 1, 2z2 <= 1 -> z1=z2=0.5, objective=1,
        // so u = 1/1 = 1, minus shift 1 = 0: the symmetric game's value.
        let lp = LinearProgram {
            c: Array1::from(vec![1.0, 1.0]),
            a: Array2::from_shape_vec((2, 2), vec![2.0, 0.0, 0.0, 2.0]).unwrap(),
            b: Array1::from(vec![1.0, 1.0]),
        };
        let sol = solve(&lp).unwrap();
        assert!((sol.objective - 1.0).abs() < 1e-6);
        assert!((sol.x[0] - 0.5).abs() < 1e-6);
        assert!((sol.x[1] - 0.5).abs() < 1e-6);
        assert!((sol.dual[0] - 0.5).abs() < 1e-6);
        assert!((sol.dual[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn two_constraint_program_matches_hand_solution() {
        // maximize x + y s.t. x <= 2, y <= 3 -> x=2, y=3, objective=5.
        let lp = LinearProgram {
            c: Array1::from(vec![1.0, 1.0]),
            a: Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap(),
            b: Array1::from(vec![2.0, 3.0]),
        };
        let sol = solve(&lp).unwrap();
        assert!((sol.objective - 5.0).abs() < 1e-6);
    }
}
