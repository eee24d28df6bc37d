use log::{debug, warn};
use ndarray::s;

use std::cmp::Ordering;

use crate::error::Result;
use crate::tableau::{Tableau, TableauIx};
use crate::trace::{Phase, StepKind, TraceStep};
use crate::var::VarKind;

pub const DEFAULT_MAX_ITERATIONS: usize = 50;
pub const DEFAULT_EPS: f64 = 1e-9;

/// How a single run of the pivot loop ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhaseStatus {
    Optimal,
    Unbounded,
    /// The iteration cap was hit before optimality; callers report it as unbounded.
    IterationLimit,
}

/// Outcome of one pivot loop: its status and the steps it recorded. `steps` holds one
/// entry per pivot followed by exactly one terminal step.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseRun {
    pub status: PhaseStatus,
    pub steps: Vec<TraceStep>,
}

/// The pivot engine: Dantzig's most-negative reduced cost rule with a minimum-ratio test,
/// ties going to the first column or row found.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Simplex {
    max_iterations: usize,
    eps: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS, DEFAULT_EPS)
    }
}

impl Simplex {
    pub fn new(max_iterations: usize, eps: f64) -> Self {
        Self {
            max_iterations,
            eps,
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Column with the most negative objective coefficient below `-eps`. Artificial columns
    /// may not re-enter during phase two.
    ///
    /// With a Big-M penalty row the choice is lexicographic: columns that lower the artificial
    /// sum come first, ranked by their priced coefficient `c + M·p`; only when none is left do
    /// columns with a zero penalty coefficient compete on the true objective.
    fn entering(&self, tbl: &Tableau, phase: Phase) -> Option<usize> {
        let obj = tbl.obj_row();
        let candidates = (1..tbl.rhs_col())
            .filter(|&j| !(phase == Phase::Two && tbl.column_kind(j) == VarKind::Artificial));

        let penalty = match tbl.penalty() {
            Some(penalty) => penalty,
            None => return Self::most_negative(candidates.map(|j| (j, obj[j])), self.eps),
        };
        let (big_m, pen) = (penalty.big_m(), penalty.row());

        let clearing = candidates
            .clone()
            .filter(|&j| pen[j] < -self.eps)
            .map(|j| (j, obj[j] + big_m * pen[j]))
            .min_by(|(_, v1), (_, v2)| v1.partial_cmp(v2).unwrap_or(Ordering::Equal));
        if let Some((j, _)) = clearing {
            return Some(j);
        }
        let free = candidates
            .filter(|&j| pen[j].abs() <= self.eps)
            .map(|j| (j, obj[j]));
        Self::most_negative(free, self.eps)
    }

    fn most_negative(coeffs: impl Iterator<Item = (usize, f64)>, eps: f64) -> Option<usize> {
        coeffs
            .filter(|(_, v)| *v < -eps)
            .min_by(|(_, v1), (_, v2)| v1.partial_cmp(v2).unwrap_or(Ordering::Equal))
            .map(|(j, _)| j)
    }

    /// Row minimising `rhs / coefficient` over strictly positive entries of column `j`.
    fn leaving(&self, tbl: &Tableau, j: usize) -> Option<usize> {
        let rhs_col = tbl.rhs_col();
        tbl.tbl()
            .slice(s![1.., j])
            .iter()
            .zip(tbl.tbl().slice(s![1.., rhs_col]))
            .enumerate()
            .filter(|(_, (a, _))| **a > self.eps)
            .map(|(i, (a, b))| (i + 1, *b / *a))
            .min_by(|(_, r1), (_, r2)| r1.partial_cmp(r2).unwrap_or(Ordering::Equal))
            .map(|(i, _)| i)
    }

    /// Runs pivots on `tableau` until it is optimal, unbounded or the iteration cap is hit.
    /// Recorded steps are numbered from `first_step`.
    pub fn run(&self, tableau: &mut Tableau, phase: Phase, first_step: usize) -> Result<PhaseRun> {
        let mut steps = Vec::new();
        let mut step = first_step;

        for iteration in 0..self.max_iterations {
            let j = match self.entering(tableau, phase) {
                Some(j) => j,
                None => {
                    debug!("{}: optimal after {} pivots", phase, iteration);
                    steps.push(TraceStep::new(
                        step,
                        format!(
                            "Optimal: no negative coefficient in the {} row",
                            phase.objective_label()
                        ),
                        phase,
                        StepKind::Optimal,
                        tableau,
                    ));
                    return Ok(PhaseRun {
                        status: PhaseStatus::Optimal,
                        steps,
                    });
                }
            };
            let entering = tableau.columns()[j].name().to_string();

            let i = match self.leaving(tableau, j) {
                Some(i) => i,
                None => {
                    debug!("{}: column {} has no positive entry", phase, entering);
                    steps.push(TraceStep::new(
                        step,
                        format!(
                            "Unbounded: {} can increase without limit (no positive entry in its column)",
                            entering
                        ),
                        phase,
                        StepKind::Unbounded { entering },
                        tableau,
                    ));
                    return Ok(PhaseRun {
                        status: PhaseStatus::Unbounded,
                        steps,
                    });
                }
            };
            let leaving = tableau.columns()[tableau.basic_vars()[i - 1]].name().to_string();
            let pivot = TableauIx::new(i, j);

            debug!(
                "{}: iteration {}, {} enters, {} leaves, pivot {} at ({}, {})",
                phase,
                iteration + 1,
                entering,
                leaving,
                tableau.tbl()[[i, j]],
                i,
                j
            );
            steps.push(TraceStep::new(
                step,
                format!(
                    "Iteration {}: {} enters, {} leaves (pivot row {}, column {})",
                    iteration + 1,
                    entering,
                    leaving,
                    i,
                    j
                ),
                phase,
                StepKind::Pivot {
                    pivot,
                    entering,
                    leaving,
                },
                tableau,
            ));
            step += 1;

            tableau.pivot(&pivot, self.eps)?;
        }

        warn!(
            "{}: iteration limit of {} reached, treating the problem as unbounded",
            phase, self.max_iterations
        );
        steps.push(TraceStep::new(
            step,
            format!(
                "Iteration limit of {} reached; treating the problem as unbounded",
                self.max_iterations
            ),
            phase,
            StepKind::IterationLimit,
            tableau,
        ));
        Ok(PhaseRun {
            status: PhaseStatus::IterationLimit,
            steps,
        })
    }
}
