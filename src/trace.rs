use ndarray::{Array2, ArrayView1};

use std::fmt;

use crate::print_table::{format_value, PrintTable, PrintTableCell};
use crate::tableau::{Tableau, TableauIx};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Standard simplex or Big-M: a single run on the true objective.
    Single,
    /// Two-phase, minimising the sum of artificials.
    One,
    /// Two-phase, optimising the true objective.
    Two,
}

impl Phase {
    pub fn objective_label(&self) -> &'static str {
        match self {
            Phase::One => "W",
            Phase::Single | Phase::Two => "Z",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Phase::Single => write!(f, "Simplex"),
            Phase::One => write!(f, "Phase 1"),
            Phase::Two => write!(f, "Phase 2"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepKind {
    Pivot {
        pivot: TableauIx,
        entering: String,
        leaving: String,
    },
    Optimal,
    Unbounded {
        entering: String,
    },
    IterationLimit,
}

/// Snapshot of the tableau at one point of a solve. The matrix is copied, so later pivots
/// never alter a recorded step.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceStep {
    step: usize,
    description: String,
    phase: Phase,
    kind: StepKind,
    tableau: Array2<f64>,
    headers: Vec<String>,
    basis: Vec<usize>,
    basis_names: Vec<String>,
}

impl TraceStep {
    pub(crate) fn new(
        step: usize,
        description: String,
        phase: Phase,
        kind: StepKind,
        tableau: &Tableau,
    ) -> Self {
        Self {
            step,
            description,
            phase,
            kind,
            tableau: tableau.snapshot(),
            headers: tableau.columns().iter().map(|c| c.name().to_string()).collect(),
            basis: tableau.basic_vars().to_vec(),
            basis_names: tableau.basic_names(),
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn tableau(&self) -> &Array2<f64> {
        &self.tableau
    }

    pub fn row(&self, i: usize) -> ArrayView1<f64> {
        self.tableau.row(i)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Column index basic in each constraint row.
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn basis_names(&self) -> &[String] {
        &self.basis_names
    }

    /// Label of every tableau row: the objective label followed by the basic variables.
    pub fn row_labels(&self) -> Vec<&str> {
        std::iter::once(self.phase.objective_label())
            .chain(self.basis_names.iter().map(|s| s.as_str()))
            .collect()
    }

    pub fn pivot(&self) -> Option<TableauIx> {
        match &self.kind {
            StepKind::Pivot { pivot, .. } => Some(*pivot),
            _ => None,
        }
    }

    pub fn entering(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Pivot { entering, .. } | StepKind::Unbounded { entering } => {
                Some(entering.as_str())
            }
            _ => None,
        }
    }

    pub fn leaving(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Pivot { leaving, .. } => Some(leaving.as_str()),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, StepKind::Pivot { .. })
    }

    pub fn as_print_table(&self) -> PrintTable {
        let labels = self.row_labels();
        let (rows, cols) = (self.tableau.nrows(), self.tableau.ncols());
        let pivot = self.pivot();

        let cells = Array2::from_shape_fn((rows + 1, cols + 1), |(i, j)| match (i, j) {
            (0, 0) => PrintTableCell::new("Basis".to_string()),
            (0, j) => PrintTableCell::new(self.headers[j - 1].clone()),
            (i, 0) => PrintTableCell::new(labels[i - 1].to_string()),
            (i, j) => {
                let cell = PrintTableCell::new(format_value(self.tableau[[i - 1, j - 1]]));
                match pivot {
                    Some(ix) if ix.i() == i - 1 && ix.j() == j - 1 => cell.highlighted(),
                    _ => cell,
                }
            }
        });
        PrintTable::new(cells).with_rule_after(0).with_rule_after(1)
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Step {} [{}]: {}", self.step, self.phase, self.description)?;
        write!(f, "{}", self.as_print_table())
    }
}
