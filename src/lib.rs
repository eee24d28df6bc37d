//! Tableau simplex solver for small linear programs.
//!
//! A [`Model`] is converted to an initial tableau ([`standard_form`]), pivoted to optimality
//! by the [`Simplex`] engine, and solved end to end by a [`Solver`] using one of three
//! [`Method`]s: plain simplex, Big-M or two-phase. Every intermediate tableau is kept as a
//! [`TraceStep`] in the returned [`Solution`].
//!
//! ```
//! use tableau_simplex::{solve, Comp, Constraint, Method, OptDir, SolveStatus};
//!
//! let constraints = [
//!     Constraint::new([1.0, 0.0], Comp::Le, 4.0),
//!     Constraint::new([0.0, 2.0], Comp::Le, 12.0),
//!     Constraint::new([3.0, 2.0], Comp::Le, 18.0),
//! ];
//! let sol = solve(Method::Simplex, OptDir::Max, &[3.0, 5.0], &constraints);
//! assert_eq!(sol.status(), SolveStatus::Optimal);
//! assert!((sol.objective_value() - 36.0).abs() < 1e-9);
//! ```

pub mod constraint;
pub mod error;
pub mod model;
pub mod parse;
pub mod print_table;
pub mod simplex;
pub mod solver;
pub mod standard_form;
pub mod tableau;
pub mod trace;
pub mod var;

pub use constraint::{Comp, Constraint};
pub use error::SimplexError;
pub use model::{Model, OptDir};
pub use simplex::{PhaseRun, PhaseStatus, Simplex};
pub use solver::{solve, BigM, Method, SolveStatus, Solution, Solver, SolverConfig};
pub use tableau::{Penalty, Tableau, TableauIx};
pub use trace::{Phase, StepKind, TraceStep};
pub use var::{Column, VarKind};
