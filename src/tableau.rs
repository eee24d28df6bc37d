use ndarray::{s, Array1, Array2, ArrayView1};

use crate::error::{Result, SimplexError};
use crate::var::{Column, VarKind};

/// Cell of the tableau, `i` is the row (0 is the objective row) and `j` the column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableauIx {
    i: usize,
    j: usize,
}

impl TableauIx {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    pub fn i(&self) -> usize {
        self.i
    }

    pub fn j(&self) -> usize {
        self.j
    }
}

/// Big-M part of the objective: the coefficient of M in every column, pivoted along with
/// the tableau but kept out of row 0 so the true objective never carries `M × b` terms.
#[derive(Clone, Debug, PartialEq)]
pub struct Penalty {
    big_m: f64,
    row: Array1<f64>,
}

impl Penalty {
    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    pub fn row(&self) -> ArrayView1<f64> {
        self.row.view()
    }
}

/// Simplex tableau in canonical form relative to `basic_vars`.
///
/// Row 0 is the objective row, rows `1..=m` are constraints. The first column is the
/// objective variable's own column and the last column is the right-hand side.
/// `basic_vars[k]` is the column basic in row `k + 1`. A Big-M tableau also carries a
/// [`Penalty`] row; row 0 then holds only the true objective.
#[derive(Clone, Debug, PartialEq)]
pub struct Tableau {
    pub(crate) tbl: Array2<f64>,
    pub(crate) columns: Vec<Column>,
    pub(crate) basic_vars: Vec<usize>,
    pub(crate) penalty: Option<Penalty>,
}

impl Tableau {
    //constructor
    pub fn new(tbl: Array2<f64>, columns: Vec<Column>, basic_vars: Vec<usize>) -> Self {
        debug_assert_eq!(tbl.ncols(), columns.len());
        debug_assert_eq!(tbl.nrows(), basic_vars.len() + 1);
        Self {
            tbl,
            columns,
            basic_vars,
            penalty: None,
        }
    }

    pub fn tbl(&self) -> &Array2<f64> {
        &self.tbl
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn basic_vars(&self) -> &[usize] {
        &self.basic_vars
    }

    pub fn n_rows(&self) -> usize {
        self.tbl.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.tbl.ncols()
    }

    pub fn rhs_col(&self) -> usize {
        self.n_cols() - 1
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.tbl[[row, self.rhs_col()]]
    }

    /// Right-hand side of the objective row.
    pub fn objective_value(&self) -> f64 {
        self.rhs(0)
    }

    pub fn obj_row(&self) -> ArrayView1<f64> {
        self.tbl.row(0)
    }

    pub fn set_obj_row(&mut self, row: &Array1<f64>) {
        self.tbl.row_mut(0).assign(row);
    }

    pub fn penalty(&self) -> Option<&Penalty> {
        self.penalty.as_ref()
    }

    pub(crate) fn set_penalty(&mut self, big_m: f64, row: Array1<f64>) {
        debug_assert_eq!(row.len(), self.n_cols());
        self.penalty = Some(Penalty { big_m, row });
    }

    /// Row 0 as the textbook Big-M tableau shows it: `objective + M × penalty`.
    pub fn priced_obj_row(&self) -> Array1<f64> {
        let mut row = self.obj_row().to_owned();
        if let Some(penalty) = &self.penalty {
            row.scaled_add(penalty.big_m, &penalty.row);
        }
        row
    }

    /// Copy of the matrix with row 0 priced, as recorded in a trace.
    pub fn snapshot(&self) -> Array2<f64> {
        let mut tbl = self.tbl.clone();
        if self.penalty.is_some() {
            tbl.row_mut(0).assign(&self.priced_obj_row());
        }
        tbl
    }

    pub fn artificial_cols(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.is_artificial())
            .map(|(j, _)| j)
            .collect()
    }

    /// Tableau row in which column `col` is basic.
    pub fn basic_row(&self, col: usize) -> Option<usize> {
        self.basic_vars.iter().position(|&b| b == col).map(|k| k + 1)
    }

    pub fn basic_names(&self) -> Vec<String> {
        self.basic_vars
            .iter()
            .map(|&j| self.columns[j].name().to_string())
            .collect()
    }

    /// Value of every variable column at the current basic solution. Non-basic variables are 0.
    pub fn basic_solution(&self) -> Vec<(Column, f64)> {
        let mut values = vec![0.0_f64; self.n_cols()];
        for (k, &j) in self.basic_vars.iter().enumerate() {
            values[j] = self.rhs(k + 1);
        }
        self.columns
            .iter()
            .zip(values)
            .filter(|(col, _)| col.kind().is_variable())
            .map(|(col, v)| (col.clone(), v))
            .collect()
    }

    /// Subtracts `factor × row` from the objective row when the factor is not negligible.
    pub(crate) fn eliminate_from_obj(&mut self, row: usize, factor: f64, eps: f64) {
        if factor.abs() <= eps {
            return;
        }
        let src = self.tbl.row(row).to_owned();
        let mut obj = self.tbl.row_mut(0);
        obj.scaled_add(-factor, &src);
    }

    /// Brings the objective row back to canonical form: every basic column gets a zero
    /// objective coefficient.
    pub(crate) fn zero_obj_on_basis(&mut self, eps: f64) {
        for k in 0..self.basic_vars.len() {
            let col = self.basic_vars[k];
            let factor = self.tbl[[0, col]];
            self.eliminate_from_obj(k + 1, factor, eps);
            if factor.abs() > eps {
                self.tbl[[0, col]] = 0.0_f64;
            }
        }
    }

    //pivot
    #[inline(always)]
    pub fn pivot(&mut self, pivot_ind: &TableauIx, eps: f64) -> Result<()> {
        let (i, j) = (pivot_ind.i(), pivot_ind.j());
        debug_assert!(i >= 1 && i < self.n_rows());
        debug_assert!(j < self.rhs_col());

        let div = self.tbl[[i, j]];
        if div.abs() <= eps || !div.is_finite() {
            return Err(SimplexError::PivotTooSmall {
                row: i,
                col: j,
                value: div,
            });
        }

        //normalize pivot row
        let mut row_i = self.tbl.row_mut(i);
        row_i /= div;
        let pivot_row = self.tbl.row(i).to_owned();

        //eliminate column from every other row, objective included
        for r in 0..self.n_rows() {
            if r == i {
                continue;
            }
            let factor = self.tbl[[r, j]];
            if factor.abs() > eps {
                let mut row_r = self.tbl.row_mut(r);
                row_r.scaled_add(-factor, &pivot_row);
            }
        }

        if let Some(penalty) = self.penalty.as_mut() {
            let factor = penalty.row[j];
            if factor.abs() > eps {
                penalty.row.scaled_add(-factor, &pivot_row);
            }
            penalty.row[j] = 0.0_f64;
        }

        //entering column becomes an exact unit vector
        self.tbl.slice_mut(s![.., j]).fill(0.0_f64);
        self.tbl[[i, j]] = 1.0_f64;

        self.basic_vars[i - 1] = j;
        Ok(())
    }

    /// Whether every basic column is a unit vector with its 1 in the row it is basic in,
    /// with a zero penalty coefficient when there is one.
    pub fn is_canonical(&self, eps: f64) -> bool {
        self.basic_vars.iter().enumerate().all(|(k, &col)| {
            let priced_out = self
                .penalty
                .as_ref()
                .map_or(true, |penalty| penalty.row[col].abs() <= eps);
            priced_out
                && self.tbl.column(col).iter().enumerate().all(|(r, v)| {
                    let expected = if r == k + 1 { 1.0_f64 } else { 0.0_f64 };
                    (v - expected).abs() <= eps
                })
        })
    }

    pub(crate) fn column_kind(&self, col: usize) -> VarKind {
        self.columns[col].kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // max 3x1 + 5x2, x1 <= 4, 2x2 <= 12, 3x1 + 2x2 <= 18
    fn wyndor() -> Tableau {
        let tbl = array![
            [1.0, -3.0, -5.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 4.0],
            [0.0, 0.0, 2.0, 0.0, 1.0, 0.0, 12.0],
            [0.0, 3.0, 2.0, 0.0, 0.0, 1.0, 18.0],
        ];
        let columns = vec![
            Column::objective(),
            Column::indexed(VarKind::Decision, 1),
            Column::indexed(VarKind::Decision, 2),
            Column::indexed(VarKind::Slack, 1),
            Column::indexed(VarKind::Slack, 2),
            Column::indexed(VarKind::Slack, 3),
            Column::rhs(),
        ];
        Tableau::new(tbl, columns, vec![3, 4, 5])
    }

    #[test]
    fn initial_tableau_is_canonical() {
        let tbl = wyndor();
        assert!(tbl.is_canonical(1e-9));
        assert_eq!(tbl.basic_names(), vec!["s1", "s2", "s3"]);
        assert_eq!(tbl.basic_row(4), Some(2));
        assert_eq!(tbl.basic_row(1), None);
        assert_eq!(tbl.objective_value(), 0.0);
    }

    #[test]
    fn pivot_keeps_canonical_form() {
        let mut tbl = wyndor();
        tbl.pivot(&TableauIx::new(2, 2), 1e-9).unwrap();
        assert!(tbl.is_canonical(1e-9));
        assert_eq!(tbl.basic_vars(), &[3, 2, 5]);
        assert_abs_diff_eq!(tbl.objective_value(), 30.0);
        assert_abs_diff_eq!(tbl.rhs(2), 6.0);
        assert_abs_diff_eq!(tbl.rhs(3), 6.0);

        tbl.pivot(&TableauIx::new(3, 1), 1e-9).unwrap();
        assert!(tbl.is_canonical(1e-9));
        assert_abs_diff_eq!(tbl.objective_value(), 36.0);
        assert_abs_diff_eq!(tbl.rhs(3), 2.0);
        // objective's own column is untouched
        assert_eq!(tbl.tbl()[[0, 0]], 1.0);
    }

    #[test]
    fn pivot_on_zero_is_an_error() {
        let mut tbl = wyndor();
        let err = tbl.pivot(&TableauIx::new(1, 2), 1e-9).unwrap_err();
        assert_eq!(
            err,
            SimplexError::PivotTooSmall {
                row: 1,
                col: 2,
                value: 0.0
            }
        );
        // nothing was changed
        assert_eq!(tbl, wyndor());
    }

    #[test]
    fn basic_solution_reads_rhs() {
        let mut tbl = wyndor();
        tbl.pivot(&TableauIx::new(2, 2), 1e-9).unwrap();
        let values = tbl.basic_solution();
        let get = |name: &str| values.iter().find(|(c, _)| c.name() == name).map(|(_, v)| *v);
        assert_eq!(values.len(), 5);
        assert_eq!(get("x1"), Some(0.0));
        assert_abs_diff_eq!(get("x2").unwrap(), 6.0);
        assert_abs_diff_eq!(get("s1").unwrap(), 4.0);
        assert_eq!(get("Z"), None);
        assert_eq!(get("RHS"), None);
    }

    #[test]
    fn penalty_row_follows_pivots() {
        // x1 + s1 = 4 with penalty -x1 (as if x1 had to grow to clear an artificial)
        let mut tbl = wyndor();
        tbl.set_penalty(10.0, array![0.0, -1.0, 0.0, 0.0, 0.0, 0.0, -4.0]);
        assert!(tbl.is_canonical(1e-9));
        assert_eq!(tbl.priced_obj_row().to_vec(), vec![1.0, -13.0, -5.0, 0.0, 0.0, 0.0, -40.0]);
        assert_eq!(tbl.snapshot().row(0), tbl.priced_obj_row());
        // the true objective row is not touched by the penalty
        assert_eq!(tbl.obj_row()[1], -3.0);

        tbl.pivot(&TableauIx::new(1, 1), 1e-9).unwrap();
        assert!(tbl.is_canonical(1e-9));
        let penalty = tbl.penalty().unwrap();
        assert_eq!(penalty.big_m(), 10.0);
        assert_eq!(penalty.row().to_vec(), vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(tbl.objective_value(), 12.0);
    }

    #[test]
    fn zero_obj_on_basis() {
        let mut tbl = wyndor();
        // put a cost on a basic column and restore canonical form
        tbl.tbl[[0, 3]] = 2.0;
        assert!(!tbl.is_canonical(1e-9));
        tbl.zero_obj_on_basis(1e-9);
        assert!(tbl.is_canonical(1e-9));
        assert_abs_diff_eq!(tbl.objective_value(), -8.0);
        assert_abs_diff_eq!(tbl.tbl()[[0, 1]], -5.0);
    }
}
