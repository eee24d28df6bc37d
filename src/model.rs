use num::ToPrimitive;
use tabular::{Row, Table};

use std::fmt;

use crate::constraint::Constraint;
use crate::error::{Result, SimplexError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OptDir {
    Max,
    Min,
}

impl fmt::Display for OptDir {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptDir::Max => write!(f, "Max"),
            OptDir::Min => write!(f, "Min"),
        }
    }
}

/// A linear program over `n` non-negative decision variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub(crate) opt_dir: OptDir,
    pub(crate) obj_fn: Vec<f64>,
    pub(crate) constraints: Vec<Constraint>,
}

impl Model {
    pub fn new<I, T>(opt_dir: OptDir, obj_fn: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToPrimitive,
    {
        let mut mdl = Self {
            opt_dir,
            obj_fn: Vec::new(),
            constraints: Vec::new(),
        };
        mdl.set_obj_fn(opt_dir, obj_fn);
        mdl
    }

    //set objective function and optimization direction
    pub fn set_obj_fn<I, T>(&mut self, opt_dir: OptDir, obj_fn: I)
    where
        I: IntoIterator<Item = T>,
        T: ToPrimitive,
    {
        self.opt_dir = opt_dir;
        self.obj_fn = obj_fn
            .into_iter()
            .map(|c| c.to_f64().unwrap_or(0.0_f64))
            .collect();
    }

    //set constraints
    pub fn set_constraints(&mut self, constraints: Vec<Constraint>) {
        self.constraints.clear();
        constraints.into_iter().for_each(|c| self.add_constraint(c));
    }

    //add a constraint to model, unnamed constraints are labelled by position
    pub fn add_constraint(&mut self, constraint: Constraint) {
        let mut constraint = constraint;
        if constraint.name.is_empty() {
            constraint.name = format!("c{}", self.constraints.len() + 1);
        }
        self.constraints.push(constraint);
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    pub fn opt_dir(&self) -> OptDir {
        self.opt_dir
    }

    pub fn obj_fn(&self) -> &[f64] {
        &self.obj_fn
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn n_vars(&self) -> usize {
        self.obj_fn.len()
    }

    pub fn n_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Checks that every constraint spans exactly the decision variables and that all inputs are finite.
    pub fn validate(&self) -> Result<()> {
        if self.obj_fn.is_empty() {
            return Err(SimplexError::NoVariables);
        }
        if let Some(i) = self.obj_fn.iter().position(|c| !c.is_finite()) {
            return Err(SimplexError::NonFinite {
                location: format!("objective coefficient {}", i + 1),
            });
        }
        for cons in &self.constraints {
            if cons.n_vars() != self.n_vars() {
                return Err(SimplexError::ShapeMismatch {
                    constraint: cons.name().to_string(),
                    expected: self.n_vars(),
                    found: cons.n_vars(),
                });
            }
            if cons.coeffs().iter().any(|c| !c.is_finite()) || !cons.rhs().is_finite() {
                return Err(SimplexError::NonFinite {
                    location: format!("constraint {}", cons.name()),
                });
            }
        }
        Ok(())
    }

    /// Largest absolute input value, never below 1.
    pub fn coefficient_scale(&self) -> f64 {
        self.obj_fn
            .iter()
            .chain(self.constraints.iter().flat_map(|c| c.coeffs().iter()))
            .chain(self.constraints.iter().map(|c| &c.rhs))
            .fold(1.0_f64, |m, v| m.max(v.abs()))
    }

    pub(crate) fn table_column_string(&self) -> String {
        let mut columns = "{:<}{:^}".to_string(); //label, colon
        columns += &"{:>}{:<}".repeat(self.n_vars()); //sign, term
        columns += "{:^}{:>}"; //comp, rhs
        columns
    }

    fn term_cells(&self, coeffs: &[f64]) -> Vec<String> {
        let mut cells = Vec::with_capacity(2 * coeffs.len());
        let mut first = true;
        for (i, coeff) in coeffs.iter().enumerate() {
            if *coeff == 0.0_f64 {
                cells.push(String::new());
                cells.push(String::new());
                continue;
            }
            let sign = match (first, *coeff < 0.0) {
                (true, false) => "",
                (true, true) => "-",
                (false, false) => " + ",
                (false, true) => " - ",
            };
            cells.push(sign.to_string());
            cells.push(format!("{}x{}", coeff.abs(), i + 1));
            first = false;
        }
        cells
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        //  OptDir: ObjFn
        //  Subject to:
        //      C1
        //      ...
        let columns = self.table_column_string();
        let mut table = Table::new(columns.as_str());

        let mut row = Row::new();
        row.add_cell(self.opt_dir);
        row.add_cell(":");
        self.term_cells(&self.obj_fn).iter().for_each(|cell| {
            row.add_cell(cell);
        });
        row.add_cell("");
        row.add_cell("");
        table.add_row(row);

        let mut header = vec![String::new(); 2 * self.n_vars() + 4];
        header[0] = "Subject to".to_string();
        header[1] = ":".to_string();
        table.add_row(Row::from_cells(header));

        for cons in &self.constraints {
            let mut cells = vec![format!("  {}", cons.name()), ":".to_string()];
            //constraints of the wrong width are shown truncated or padded
            let mut coeffs = cons.coeffs().to_vec();
            coeffs.resize(self.n_vars(), 0.0);
            cells.extend(self.term_cells(&coeffs));
            cells.push(format!(" {} ", cons.comp()));
            cells.push(format!("{}", cons.rhs()));
            table.add_row(Row::from_cells(cells));
        }

        write!(f, "{}", table)
    }
}
