//! Conversion of a [`Model`] into an initial simplex tableau, plus the objective-row
//! rewrites used by the Big-M and two-phase methods.

use log::debug;
use ndarray::{s, Array1, Array2, ArrayView};

use crate::constraint::{Comp, Constraint};
use crate::error::{Result, SimplexError};
use crate::model::{Model, OptDir};
use crate::tableau::{Tableau, TableauIx};
use crate::var::{Column, VarKind};

/// Initial tableau together with the columns of its artificial variables.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardForm {
    pub tableau: Tableau,
    pub artificial_vars: Vec<usize>,
}

impl StandardForm {
    pub fn has_artificials(&self) -> bool {
        !self.artificial_vars.is_empty()
    }
}

/// Builds the tableau `[Z, x.., s.., e.., a.., RHS]` with the slack or artificial of each
/// row as its initial basic variable.
///
/// The objective row always encodes a maximisation: for `Max` it stores `-c`, for `Min`
/// it stores `c` (maximising `-f`), so the caller negates the optimum for `Min`.
pub fn build(mdl: &Model) -> Result<StandardForm> {
    mdl.validate()?;

    //ensure positive rhs so the initial basis is feasible
    let constraints: Vec<Constraint> = mdl
        .constraints()
        .iter()
        .map(|c| c.as_standard_form())
        .collect();

    let n = mdl.n_vars();
    let m = constraints.len();
    let count = |f: fn(Comp) -> bool| constraints.iter().filter(|c| f(c.comp())).count();
    let n_slack = count(|c| c == Comp::Le);
    let n_surplus = count(|c| c == Comp::Ge);
    let n_artificial = count(|c| c != Comp::Le);

    let slack_start = 1 + n;
    let surplus_start = slack_start + n_slack;
    let artificial_start = surplus_start + n_surplus;
    let rhs_col = artificial_start + n_artificial;

    let mut columns = Vec::with_capacity(rhs_col + 1);
    columns.push(Column::objective());
    columns.extend((1..=n).map(|k| Column::indexed(VarKind::Decision, k)));
    for kind in [VarKind::Slack, VarKind::Surplus, VarKind::Artificial] {
        for (k, cons) in constraints.iter().enumerate() {
            let wanted = match kind {
                VarKind::Slack => cons.comp() == Comp::Le,
                VarKind::Surplus => cons.comp() == Comp::Ge,
                _ => cons.comp() != Comp::Le,
            };
            if wanted {
                columns.push(Column::indexed(kind, k + 1));
            }
        }
    }
    columns.push(Column::rhs());

    let mut tbl = Array2::<f64>::zeros((m + 1, rhs_col + 1));
    let mut basic_vars = Vec::with_capacity(m);
    let mut artificial_vars = Vec::with_capacity(n_artificial);
    let (mut next_slack, mut next_surplus, mut next_artificial) =
        (slack_start, surplus_start, artificial_start);

    //populate constraint rows
    for (k, cons) in constraints.iter().enumerate() {
        let r = k + 1;
        tbl.slice_mut(s![r, 1..n + 1])
            .assign(&ArrayView::from(cons.coeffs()));
        tbl[[r, rhs_col]] = cons.rhs();

        match cons.comp() {
            Comp::Le => {
                tbl[[r, next_slack]] = 1.0_f64;
                basic_vars.push(next_slack);
                next_slack += 1;
            }
            Comp::Ge => {
                tbl[[r, next_surplus]] = -1.0_f64;
                tbl[[r, next_artificial]] = 1.0_f64;
                basic_vars.push(next_artificial);
                artificial_vars.push(next_artificial);
                next_surplus += 1;
                next_artificial += 1;
            }
            Comp::Eq => {
                tbl[[r, next_artificial]] = 1.0_f64;
                basic_vars.push(next_artificial);
                artificial_vars.push(next_artificial);
                next_artificial += 1;
            }
        }
    }

    //populate obj_fn
    tbl[[0, 0]] = 1.0_f64;
    for (j, coeff) in mdl.obj_fn().iter().enumerate() {
        tbl[[0, j + 1]] = match mdl.opt_dir() {
            OptDir::Max => -coeff,
            OptDir::Min => *coeff,
        };
    }

    debug!(
        "standard form: {} rows, {} columns, {} artificial",
        m + 1,
        rhs_col + 1,
        artificial_vars.len()
    );

    Ok(StandardForm {
        tableau: Tableau::new(tbl, columns, basic_vars),
        artificial_vars,
    })
}

/// Objective `Σa` over the artificial columns, priced out against the rows they are basic in.
fn artificial_sum_row(form: &StandardForm) -> Result<Array1<f64>> {
    let tableau = &form.tableau;
    let mut row = Array1::<f64>::zeros(tableau.n_cols());
    for &col in &form.artificial_vars {
        row[col] = 1.0_f64;
    }
    for &col in &form.artificial_vars {
        let r = tableau
            .basic_row(col)
            .ok_or(SimplexError::MissingBasicRow { column: col })?;
        row.scaled_add(-1.0_f64, &tableau.tbl().row(r));
        row[col] = 0.0_f64;
    }
    Ok(row)
}

/// Attaches the Big-M penalty: every artificial costs `big_m`, priced out against its basic
/// row. The penalty is stored as its own row of M coefficients, so row 0 keeps the true
/// objective and the engine can compare the two parts without mixing their magnitudes.
pub fn with_big_m(form: StandardForm, big_m: f64) -> Result<StandardForm> {
    let mut form = form;
    let penalty = artificial_sum_row(&form)?;
    form.tableau.set_penalty(big_m, penalty);
    Ok(form)
}

/// Replaces the objective with the phase-one auxiliary objective `W + Σa = 0`, eliminated
/// against the basis. Returns the new form and the true objective row it replaced.
pub fn phase_one(form: StandardForm) -> Result<(StandardForm, Array1<f64>)> {
    let mut form = form;
    let objective = form.tableau.obj_row().to_owned();

    let mut aux = artificial_sum_row(&form)?;
    aux[0] = 1.0_f64;
    form.tableau.set_obj_row(&aux);
    Ok((form, objective))
}

/// Derives the phase-two tableau from the final phase-one tableau: zero-level artificials
/// leave the basis, then the true objective is restored and re-expressed in terms of it.
pub fn phase_two(phase_one: &Tableau, objective: &Array1<f64>, eps: f64) -> Result<Tableau> {
    let mut tableau = phase_one.clone();
    drive_out_artificials(&mut tableau, eps)?;
    tableau.set_obj_row(objective);
    tableau.zero_obj_on_basis(eps);
    Ok(tableau)
}

/// After a feasible phase one every basic artificial sits at zero, but one left in the basis
/// could grow again in phase two through a negative entry in its row. Each is pivoted out
/// on the first non-artificial column with a non-zero entry in its row. A row without one
/// is a redundant constraint; its artificial stays basic and can never move.
fn drive_out_artificials(tableau: &mut Tableau, eps: f64) -> Result<()> {
    let rhs_col = tableau.rhs_col();
    for row in 1..tableau.n_rows() {
        let basic = tableau.basic_vars()[row - 1];
        if !tableau.columns()[basic].is_artificial() {
            continue;
        }
        let entering = (1..rhs_col).find(|&j| {
            let kind = tableau.column_kind(j);
            kind.is_variable() && kind != VarKind::Artificial && tableau.tbl()[[row, j]].abs() > eps
        });
        match entering {
            Some(j) => {
                debug!(
                    "driving {} out of the basis, {} enters at zero level",
                    tableau.columns()[basic],
                    tableau.columns()[j]
                );
                //its value is phase-one residue below the feasibility tolerance
                tableau.tbl[[row, rhs_col]] = 0.0_f64;
                tableau.pivot(&TableauIx::new(row, j), eps)?;
            }
            None => debug!("row {} is redundant, {} stays basic", row, tableau.columns()[basic]),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-9;

    // min 2x1 + 3x2, x1 + x2 >= 4, x1 + 3x2 <= 12, x1 - x2 = 1
    fn mixed() -> Model {
        Model::new(OptDir::Min, [2.0, 3.0])
            .with_constraint(Constraint::new([1.0, 1.0], Comp::Ge, 4.0))
            .with_constraint(Constraint::new([1.0, 3.0], Comp::Le, 12.0))
            .with_constraint(Constraint::new([1.0, -1.0], Comp::Eq, 1.0))
    }

    fn names(tableau: &Tableau) -> Vec<&str> {
        tableau.columns().iter().map(|c| c.name()).collect()
    }

    #[test]
    fn header_order() {
        let form = build(&mixed()).unwrap();
        assert_eq!(
            names(&form.tableau),
            vec!["Z", "x1", "x2", "s2", "e1", "a1", "a3", "RHS"]
        );
        assert_eq!(form.artificial_vars, vec![5, 6]);
        assert_eq!(form.tableau.artificial_cols(), form.artificial_vars);
        assert_eq!(form.tableau.basic_vars(), &[5, 3, 6]);
        assert_eq!(form.tableau.tbl().dim(), (4, 8));
        // artificials start with a zero objective coefficient
        assert!(form.tableau.is_canonical(EPS));
    }

    #[test]
    fn rows_and_objective() {
        let form = build(&mixed()).unwrap();
        let tbl = form.tableau.tbl();
        assert_eq!(tbl.row(0).to_vec(), vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(tbl.row(1).to_vec(), vec![0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0, 4.0]);
        assert_eq!(tbl.row(2).to_vec(), vec![0.0, 1.0, 3.0, 1.0, 0.0, 0.0, 0.0, 12.0]);
        assert_eq!(tbl.row(3).to_vec(), vec![0.0, 1.0, -1.0, 0.0, 0.0, 0.0, 1.0, 1.0]);

        let max = Model::new(OptDir::Max, [3.0, 5.0])
            .with_constraint(Constraint::new([1.0, 0.0], Comp::Le, 4.0));
        let form = build(&max).unwrap();
        assert_eq!(form.tableau.obj_row().to_vec(), vec![1.0, -3.0, -5.0, 0.0, 0.0]);
        assert!(!form.has_artificials());
        assert!(form.tableau.is_canonical(EPS));
    }

    #[test]
    fn negative_rhs_is_flipped() {
        let mdl = Model::new(OptDir::Max, [1.0])
            .with_constraint(Constraint::new([-1.0], Comp::Le, -2.0));
        let form = build(&mdl).unwrap();
        assert_eq!(names(&form.tableau), vec!["Z", "x1", "e1", "a1", "RHS"]);
        assert_eq!(form.tableau.tbl().row(1).to_vec(), vec![0.0, 1.0, -1.0, 1.0, 2.0]);
        // the caller's model is untouched
        assert_eq!(mdl.constraints()[0].comp(), Comp::Le);
    }

    #[test]
    fn invalid_model() {
        let mdl = mixed().with_constraint(Constraint::new([1.0, 2.0, 3.0], Comp::Le, 1.0));
        assert!(matches!(build(&mdl), Err(SimplexError::ShapeMismatch { .. })));
    }

    #[test]
    fn big_m_objective_is_canonical() {
        let form = with_big_m(build(&mixed()).unwrap(), 100.0).unwrap();
        let obj = form.tableau.priced_obj_row();
        assert!(form.tableau.is_canonical(EPS));
        // 2 - 100*(1 + 1), 3 - 100*(1 - 1)
        assert_abs_diff_eq!(obj[1], -198.0);
        assert_abs_diff_eq!(obj[2], 3.0);
        assert_abs_diff_eq!(obj[4], 100.0);
        assert_abs_diff_eq!(obj[7], -500.0);

        // row 0 keeps the true objective, the penalty sits in its own row
        assert_eq!(
            form.tableau.obj_row().to_vec(),
            vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        let penalty = form.tableau.penalty().unwrap();
        assert_eq!(penalty.big_m(), 100.0);
        assert_eq!(
            penalty.row().to_vec(),
            vec![0.0, -2.0, 0.0, 0.0, 1.0, 0.0, 0.0, -5.0]
        );
    }

    #[test]
    fn phase_one_objective() {
        let (form, objective) = phase_one(build(&mixed()).unwrap()).unwrap();
        assert_eq!(objective.to_vec(), vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(form.tableau.is_canonical(EPS));
        assert_eq!(
            form.tableau.obj_row().to_vec(),
            vec![1.0, -2.0, 0.0, 0.0, 1.0, 0.0, 0.0, -5.0]
        );
    }

    #[test]
    fn phase_two_restores_objective() {
        let (form, objective) = phase_one(build(&mixed()).unwrap()).unwrap();
        let tableau = phase_two(&form.tableau, &objective, EPS).unwrap();
        assert!(tableau.is_canonical(EPS));
        // phase-one tableau is left as it was
        assert_abs_diff_eq!(form.tableau.objective_value(), -5.0);
        assert_eq!(form.tableau.basic_vars(), &[5, 3, 6]);
        assert!(tableau.penalty().is_none());
    }

    #[test]
    fn phase_two_drives_out_degenerate_artificial() {
        // max 5x1 + 3x2, x1 + x2 <= 9, -x1 >= 0: phase one ends at once with a2 basic at 0,
        // but a2 would grow with x1 if it stayed in the basis
        let mdl = Model::new(OptDir::Max, [5.0, 3.0])
            .with_constraint(Constraint::new([1.0, 1.0], Comp::Le, 9.0))
            .with_constraint(Constraint::new([-1.0, 0.0], Comp::Ge, 0.0));
        let (form, objective) = phase_one(build(&mdl).unwrap()).unwrap();
        assert_eq!(names(&form.tableau), vec!["Z", "x1", "x2", "s1", "e2", "a2", "RHS"]);
        assert_eq!(form.tableau.basic_vars(), &[3, 5]);
        assert_abs_diff_eq!(form.tableau.objective_value(), 0.0);

        let tableau = phase_two(&form.tableau, &objective, EPS).unwrap();
        assert!(tableau.is_canonical(EPS));
        assert_eq!(tableau.basic_names(), vec!["s1", "x1"]);
        assert_abs_diff_eq!(tableau.rhs(2), 0.0);
        // x1 <= 0 now binds through the x1 row, not through a2
        assert_eq!(tableau.tbl().row(2).to_vec(), vec![0.0, 1.0, 0.0, 0.0, 1.0, -1.0, 0.0]);
    }

    #[test]
    fn phase_two_keeps_artificial_of_redundant_row() {
        // second row is the first one doubled: after pivoting x1 in, row 2 is a2 - 2a1 = 0
        let mdl = Model::new(OptDir::Max, [1.0, 2.0])
            .with_constraint(Constraint::new([1.0, 1.0], Comp::Eq, 2.0))
            .with_constraint(Constraint::new([2.0, 2.0], Comp::Eq, 4.0));
        let (mut form, objective) = phase_one(build(&mdl).unwrap()).unwrap();
        form.tableau.pivot(&TableauIx::new(1, 1), EPS).unwrap();
        assert_abs_diff_eq!(form.tableau.objective_value(), 0.0);

        let tableau = phase_two(&form.tableau, &objective, EPS).unwrap();
        assert_eq!(tableau.basic_names(), vec!["x1", "a2"]);
        assert!(tableau.is_canonical(EPS));
    }
}
