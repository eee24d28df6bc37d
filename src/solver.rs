use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use tabular::{Row, Table};

use std::fmt;

use crate::constraint::Constraint;
use crate::error::Result;
use crate::model::{Model, OptDir};
use crate::simplex::{PhaseRun, PhaseStatus, Simplex, DEFAULT_EPS, DEFAULT_MAX_ITERATIONS};
use crate::standard_form;
use crate::tableau::Tableau;
use crate::trace::{Phase, TraceStep};

pub const DEFAULT_FEASIBILITY_TOL: f64 = 1e-5;
pub const DEFAULT_BIG_M_FACTOR: f64 = 1e6;

/// Penalty placed on artificial variables by the Big-M method.
///
/// `Scaled(factor)` uses `factor × max(1, largest absolute input value)`, so the penalty
/// grows with the input instead of being a fixed magic number. `Fixed(m)` uses `m` as given.
///
/// Tolerance contract: the tableau keeps the coefficients of M in a penalty row of their own
/// and row 0 holds only the true objective. Columns that lower the artificial sum are always
/// pivoted in first, ranked by `c + M·p`; the rest compete on the true objective alone. M
/// therefore only orders the first group and prices row 0 in the trace. No pivot decision
/// and no reported value reads a quantity carrying an `M × b` term, so the result keeps full
/// precision whatever the size of M or of the input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BigM {
    Scaled(f64),
    Fixed(f64),
}

impl Default for BigM {
    fn default() -> Self {
        BigM::Scaled(DEFAULT_BIG_M_FACTOR)
    }
}

impl BigM {
    pub fn penalty(&self, mdl: &Model) -> f64 {
        match self {
            BigM::Scaled(factor) => factor * mdl.coefficient_scale(),
            BigM::Fixed(m) => *m,
        }
    }
}

/// Tolerances and limits of a solve.
///
/// `eps` guards entering selection (reduced cost `< -eps`), the ratio test (entries
/// `> eps`), row elimination and the minimum pivot magnitude. `feasibility_tol` bounds the
/// phase-one optimum and the value of artificials left in a Big-M basis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverConfig {
    max_iterations: usize,
    eps: f64,
    feasibility_tol: f64,
    big_m: BigM,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            eps: DEFAULT_EPS,
            feasibility_tol: DEFAULT_FEASIBILITY_TOL,
            big_m: BigM::default(),
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pivot limit per phase.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn with_feasibility_tol(mut self, feasibility_tol: f64) -> Self {
        self.feasibility_tol = feasibility_tol;
        self
    }

    pub fn with_big_m(mut self, big_m: BigM) -> Self {
        self.big_m = big_m;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn feasibility_tol(&self) -> f64 {
        self.feasibility_tol
    }

    pub fn big_m(&self) -> BigM {
        self.big_m
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Plain simplex from the slack basis. Only meaningful when every constraint is `<=`
    /// with a non-negative right-hand side.
    Simplex,
    BigM,
    TwoPhase,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Simplex => write!(f, "Simplex"),
            Method::BigM => write!(f, "Big-M"),
            Method::TwoPhase => write!(f, "Two-Phase"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    /// Also reported when the iteration cap is reached.
    Unbounded,
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::Error => write!(f, "Error"),
        }
    }
}

impl From<PhaseStatus> for SolveStatus {
    fn from(status: PhaseStatus) -> Self {
        match status {
            PhaseStatus::Optimal => SolveStatus::Optimal,
            PhaseStatus::Unbounded | PhaseStatus::IterationLimit => SolveStatus::Unbounded,
        }
    }
}

/// Result of a solve. Variable values and the objective value are only filled in for
/// `Optimal`; otherwise the map is empty and the objective is 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    status: SolveStatus,
    steps: Vec<TraceStep>,
    var_names: Vec<String>,
    var_values: FxHashMap<String, f64>,
    obj_fn_val: f64,
    message: Option<String>,
}

impl Solution {
    fn new(status: SolveStatus, steps: Vec<TraceStep>) -> Self {
        Self {
            status,
            steps,
            var_names: Vec::new(),
            var_values: FxHashMap::default(),
            obj_fn_val: 0.0_f64,
            message: None,
        }
    }

    fn error(message: String) -> Self {
        let mut sol = Self::new(SolveStatus::Error, Vec::new());
        sol.message = Some(message);
        sol
    }

    fn optimal(steps: Vec<TraceStep>, tableau: &Tableau, opt_dir: OptDir) -> Self {
        let mut sol = Self::new(SolveStatus::Optimal, steps);
        for (col, value) in tableau.basic_solution() {
            sol.var_names.push(col.name().to_string());
            sol.var_values.insert(col.name().to_string(), value);
        }

        //the tableau always maximises, min problems were solved as max -f
        let obj_fn_val = tableau.objective_value();
        sol.obj_fn_val = match opt_dir {
            OptDir::Max => obj_fn_val,
            OptDir::Min => -obj_fn_val + 0.0_f64,
        };
        sol
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn values(&self) -> &FxHashMap<String, f64> {
        &self.var_values
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.var_values.get(name).copied()
    }

    /// Variable names in column order.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    pub fn objective_value(&self) -> f64 {
        self.obj_fn_val
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        if let Some(message) = &self.message {
            writeln!(f, "{}", message)?;
        }
        if !self.is_optimal() {
            return Ok(());
        }
        writeln!(f, "Objective value: {}", self.obj_fn_val)?;

        let mut table = Table::new("{:<}  {:>}");
        table.add_row(Row::new().with_cell("Variable").with_cell("Value"));
        for name in &self.var_names {
            table.add_row(Row::new().with_cell(name).with_cell(self.var_values[name]));
        }
        write!(f, "{}", table)
    }
}

/// Runs a method end to end: normalisation, one or two pivot loops, and extraction.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn engine(&self) -> Simplex {
        Simplex::new(self.config.max_iterations, self.config.eps)
    }

    /// Never fails: internal faults come back as `SolveStatus::Error` with an empty trace.
    pub fn solve(&self, mdl: &Model, method: Method) -> Solution {
        info!(
            "solving {} problem with {} variables and {} constraints using {}",
            mdl.opt_dir(),
            mdl.n_vars(),
            mdl.n_constraints(),
            method
        );
        let sol = match self.try_solve(mdl, method) {
            Ok(sol) => sol,
            Err(err) => {
                warn!("solve failed: {}", err);
                Solution::error(format!("Unable to solve the problem: {}", err))
            }
        };
        info!("{} after {} steps", sol.status(), sol.steps().len());
        sol
    }

    fn try_solve(&self, mdl: &Model, method: Method) -> Result<Solution> {
        let form = standard_form::build(mdl)?;

        if !form.has_artificials() || method == Method::Simplex {
            if form.has_artificials() {
                warn!("standard simplex started from a basis with artificial variables; result is not guaranteed");
            }
            let mut tableau = form.tableau;
            let run = self.engine().run(&mut tableau, Phase::Single, 0)?;
            return Ok(self.finish(mdl, run, &tableau));
        }

        match method {
            Method::BigM => self.solve_big_m(mdl, form),
            _ => self.solve_two_phase(mdl, form),
        }
    }

    fn solve_big_m(&self, mdl: &Model, form: standard_form::StandardForm) -> Result<Solution> {
        let penalty = self.config.big_m.penalty(mdl);
        debug!("big-M penalty {}", penalty);
        let form = standard_form::with_big_m(form, penalty)?;

        let mut tableau = form.tableau;
        let run = self.engine().run(&mut tableau, Phase::Single, 0)?;

        //an artificial still carrying value means the penalty could not remove it
        let residual = tableau
            .basic_vars()
            .iter()
            .enumerate()
            .find(|(k, col)| {
                tableau.columns()[**col].is_artificial()
                    && tableau.rhs(*k + 1) > self.config.feasibility_tol
            })
            .map(|(_, col)| tableau.columns()[*col].name().to_string());

        if run.status != PhaseStatus::Optimal {
            //a ray found while an artificial is still positive says nothing about the
            //original problem, which may have no feasible point at all
            if let Some(name) = residual {
                if self.is_infeasible(mdl)? {
                    info!(
                        "Big-M run ended {:?} with {} positive and phase 1 finds no feasible point",
                        run.status, name
                    );
                    return Ok(Solution::new(SolveStatus::Infeasible, run.steps));
                }
            }
            return Ok(self.finish(mdl, run, &tableau));
        }
        if let Some(name) = residual {
            info!("artificial {} remains positive in the Big-M optimum", name);
            return Ok(Solution::new(SolveStatus::Infeasible, run.steps));
        }
        Ok(self.finish(mdl, run, &tableau))
    }

    fn solve_two_phase(&self, mdl: &Model, form: standard_form::StandardForm) -> Result<Solution> {
        let eps = self.config.eps;
        let (form, objective) = standard_form::phase_one(form)?;

        let mut tableau = form.tableau;
        let run = self.engine().run(&mut tableau, Phase::One, 0)?;
        let mut steps = run.steps;
        if run.status != PhaseStatus::Optimal {
            return Ok(Solution::new(run.status.into(), steps));
        }

        let infeasibility = tableau.objective_value();
        if infeasibility.abs() > self.config.feasibility_tol {
            info!("phase 1 optimum {} is non-zero", infeasibility);
            return Ok(Solution::new(SolveStatus::Infeasible, steps));
        }

        debug!("phase 1 feasible, starting phase 2");
        let mut tableau = standard_form::phase_two(&tableau, &objective, eps)?;
        let run = self.engine().run(&mut tableau, Phase::Two, steps.len())?;
        steps.extend(run.steps);
        Ok(self.finish(
            mdl,
            PhaseRun {
                status: run.status,
                steps,
            },
            &tableau,
        ))
    }

    /// Phase-one check run without recording a trace: whether the auxiliary optimum proves
    /// that no feasible point exists.
    fn is_infeasible(&self, mdl: &Model) -> Result<bool> {
        let (form, _) = standard_form::phase_one(standard_form::build(mdl)?)?;
        let mut tableau = form.tableau;
        let run = self.engine().run(&mut tableau, Phase::One, 0)?;
        Ok(run.status == PhaseStatus::Optimal
            && tableau.objective_value().abs() > self.config.feasibility_tol)
    }

    fn finish(&self, mdl: &Model, run: PhaseRun, tableau: &Tableau) -> Solution {
        match run.status {
            PhaseStatus::Optimal => Solution::optimal(run.steps, tableau, mdl.opt_dir()),
            status => Solution::new(status.into(), run.steps),
        }
    }
}

/// Solves `opt_dir c·x` subject to `constraints` and `x >= 0` with the given method.
pub fn solve(method: Method, opt_dir: OptDir, obj_fn: &[f64], constraints: &[Constraint]) -> Solution {
    let mut mdl = Model::new(opt_dir, obj_fn.iter().copied());
    mdl.set_constraints(constraints.to_vec());
    Solver::new().solve(&mdl, method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Comp;
    use approx::assert_abs_diff_eq;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn wyndor() -> Model {
        Model::new(OptDir::Max, [3.0, 5.0])
            .with_constraint(Constraint::new([1.0, 0.0], Comp::Le, 4.0))
            .with_constraint(Constraint::new([0.0, 2.0], Comp::Le, 12.0))
            .with_constraint(Constraint::new([3.0, 2.0], Comp::Le, 18.0))
    }

    #[test]
    fn config_builder() {
        let config = SolverConfig::new()
            .with_max_iterations(10)
            .with_eps(1e-7)
            .with_feasibility_tol(1e-4)
            .with_big_m(BigM::Fixed(1e3));
        assert_eq!(config.max_iterations(), 10);
        assert_eq!(config.eps(), 1e-7);
        assert_eq!(config.feasibility_tol(), 1e-4);
        assert_eq!(config.big_m(), BigM::Fixed(1e3));

        let default = SolverConfig::default();
        assert_eq!(default.max_iterations(), 50);
        assert_eq!(default.eps(), 1e-9);
        assert_eq!(default.feasibility_tol(), 1e-5);
    }

    #[test]
    fn big_m_scales_with_input() {
        let mdl = wyndor();
        assert_eq!(BigM::Scaled(10.0).penalty(&mdl), 180.0);
        assert_eq!(BigM::Fixed(5.0).penalty(&mdl), 5.0);
        assert_eq!(BigM::default().penalty(&mdl), 18.0 * DEFAULT_BIG_M_FACTOR);
    }

    #[test]
    fn optimal_values() {
        init();
        let sol = Solver::new().solve(&wyndor(), Method::Simplex);
        assert!(sol.is_optimal());
        assert_abs_diff_eq!(sol.objective_value(), 36.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.value("x1").unwrap(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.value("x2").unwrap(), 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.value("s1").unwrap(), 2.0, epsilon = 1e-9);
        assert_eq!(sol.value("s2"), Some(0.0));
        assert_eq!(sol.value("Z"), None);
        assert_eq!(sol.var_names(), &["x1", "x2", "s1", "s2", "s3"]);
        assert_eq!(sol.values().len(), 5);
        assert_eq!(sol.message(), None);
    }

    #[test]
    fn errors_are_reported_not_raised() {
        init();
        let mdl = wyndor().with_constraint(Constraint::new([1.0], Comp::Le, 1.0));
        let sol = Solver::new().solve(&mdl, Method::TwoPhase);
        assert_eq!(sol.status(), SolveStatus::Error);
        assert!(sol.steps().is_empty());
        assert!(sol.values().is_empty());
        assert_eq!(sol.objective_value(), 0.0);
        assert!(sol.message().unwrap().starts_with("Unable to solve the problem"));
    }

    #[test]
    fn iteration_cap_is_unbounded() {
        let solver = Solver::with_config(SolverConfig::new().with_max_iterations(1));
        let sol = solver.solve(&wyndor(), Method::Simplex);
        assert_eq!(sol.status(), SolveStatus::Unbounded);
        assert!(sol.values().is_empty());
        assert!(sol.steps().last().unwrap().description().contains("unbounded"));
    }

    #[test]
    fn min_objective_is_negated_back() {
        // min x1 + x2, x1 + x2 >= 2
        let mdl = Model::new(OptDir::Min, [1.0, 1.0])
            .with_constraint(Constraint::new([1.0, 1.0], Comp::Ge, 2.0));
        for method in [Method::BigM, Method::TwoPhase] {
            let sol = Solver::new().solve(&mdl, method);
            assert_eq!(sol.status(), SolveStatus::Optimal);
            assert_abs_diff_eq!(sol.objective_value(), 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn display() {
        let text = Solver::new().solve(&wyndor(), Method::Simplex).to_string();
        assert!(text.starts_with("Status: Optimal"));
        assert!(text.contains("Objective value: 36"));
        assert!(text.contains("Variable"));
        assert!(text.contains("x2"));

        let text = Solver::new()
            .solve(&Model::new(OptDir::Max, Vec::<f64>::new()), Method::Simplex)
            .to_string();
        assert!(text.starts_with("Status: Error"));
        assert!(text.contains("no decision variables"));
    }

    #[test]
    fn free_function() {
        let constraints = [Constraint::new([1.0], Comp::Le, 7.0)];
        let sol = solve(Method::Simplex, OptDir::Max, &[2.0], &constraints);
        assert_abs_diff_eq!(sol.objective_value(), 14.0);
        assert_eq!(sol.value("x1"), Some(7.0));
    }
}
