use num::ToPrimitive;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Le, // <=
    Ge, // >=
    Eq, // ==
}

impl Comp {
    /// Relation obtained by multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            Comp::Le => Comp::Ge,
            Comp::Eq => Comp::Eq,
            Comp::Ge => Comp::Le,
        }
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Comp::Le => write!(f, "\u{2264}"),
            Comp::Eq => write!(f, "="),
            Comp::Ge => write!(f, "\u{2265}"),
        }
    }
}

/// A single row `coeffs · x (comp) rhs` over the decision variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub(crate) name: String,
    pub(crate) coeffs: Vec<f64>,
    pub(crate) comp: Comp,
    pub(crate) rhs: f64,
}

fn to_f64_or_zero<T: ToPrimitive>(num: T) -> f64 {
    num.to_f64().unwrap_or(0.0_f64)
}

impl Constraint {
    /// Values that cannot be represented as `f64` become 0.
    pub fn new<I, T, U>(coeffs: I, comp: Comp, rhs: U) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToPrimitive,
        U: ToPrimitive,
    {
        Self {
            name: String::new(),
            coeffs: coeffs.into_iter().map(to_f64_or_zero).collect(),
            comp,
            rhs: to_f64_or_zero(rhs),
        }
    }

    pub fn with_name<T: ToString>(mut self, name: T) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn comp(&self) -> Comp {
        self.comp
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn n_vars(&self) -> usize {
        self.coeffs.len()
    }

    /// Pads with zero coefficients or truncates to exactly `n` variables.
    pub fn with_n_vars(mut self, n: usize) -> Self {
        self.coeffs.resize(n, 0.0_f64);
        self
    }

    /// Copy of the constraint with a non-negative right-hand side.
    pub fn as_standard_form(&self) -> Constraint {
        let mut cons = self.clone();

        //ensure positive rhs
        if cons.rhs < 0.0_f64 {
            cons.coeffs.iter_mut().for_each(|c| *c = -*c);
            cons.rhs = -cons.rhs;
            cons.comp = cons.comp.flipped();
        }
        cons
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (i, coeff) in self.coeffs.iter().enumerate() {
            if *coeff == 0.0_f64 {
                continue;
            }
            if first {
                if *coeff < 0.0 {
                    write!(f, "-")?;
                }
            } else if *coeff < 0.0 {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            write!(f, "{}x{}", coeff.abs(), i + 1)?;
            first = false;
        }
        if first {
            write!(f, "0")?;
        }
        write!(f, " {} {}", self.comp, self.rhs)
    }
}
