//! Text input as it arrives from a form: anything that is not a finite number counts as 0.

use std::str::FromStr;

use crate::constraint::{Comp, Constraint};
use crate::model::OptDir;
use crate::solver::Method;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no relation (<=, >= or =) in constraint `{0}`")]
    MissingRelation(String),

    #[error("unknown relation `{0}`")]
    UnknownRelation(String),

    #[error("unknown method `{0}`, expected simplex, big-m or two-phase")]
    UnknownMethod(String),

    #[error("unknown direction `{0}`, expected max or min")]
    UnknownDirection(String),
}

//two-character relations first so `<=` is not read as `=`
const RELATIONS: [(&str, Comp); 6] = [
    ("<=", Comp::Le),
    (">=", Comp::Ge),
    ("==", Comp::Eq),
    ("\u{2264}", Comp::Le),
    ("\u{2265}", Comp::Ge),
    ("=", Comp::Eq),
];

pub fn parse_coefficient(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0_f64)
}

/// Comma or whitespace separated list, e.g. `"3, 5"` or `"3 5"`.
pub fn parse_coefficients(text: &str) -> Vec<f64> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(parse_coefficient)
        .collect()
}

/// Parses `"<coefficients> <relation> <rhs>"`, e.g. `"3, 2 <= 18"`.
pub fn parse_constraint(text: &str) -> Result<Constraint, ParseError> {
    for (token, comp) in RELATIONS {
        if let Some(pos) = text.find(token) {
            let lhs = &text[..pos];
            let rhs = &text[pos + token.len()..];
            return Ok(Constraint::new(parse_coefficients(lhs), comp, parse_coefficient(rhs)));
        }
    }
    Err(ParseError::MissingRelation(text.to_string()))
}

impl FromStr for Comp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RELATIONS
            .iter()
            .find(|(token, _)| *token == s)
            .map(|(_, comp)| *comp)
            .ok_or_else(|| ParseError::UnknownRelation(s.to_string()))
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simplex" | "standard" => Ok(Method::Simplex),
            "big-m" | "bigm" | "big_m" => Ok(Method::BigM),
            "two-phase" | "twophase" | "two_phase" => Ok(Method::TwoPhase),
            _ => Err(ParseError::UnknownMethod(s.to_string())),
        }
    }
}

impl FromStr for OptDir {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "max" | "maximize" | "maximise" => Ok(OptDir::Max),
            "min" | "minimize" | "minimise" => Ok(OptDir::Min),
            _ => Err(ParseError::UnknownDirection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficient_defaults_to_zero() {
        assert_eq!(parse_coefficient(" 2.5 "), 2.5);
        assert_eq!(parse_coefficient("-3"), -3.0);
        assert_eq!(parse_coefficient(""), 0.0);
        assert_eq!(parse_coefficient("abc"), 0.0);
        assert_eq!(parse_coefficient("inf"), 0.0);
        assert_eq!(parse_coefficient("NaN"), 0.0);
    }

    #[test]
    fn coefficient_lists() {
        assert_eq!(parse_coefficients("3, 5"), vec![3.0, 5.0]);
        assert_eq!(parse_coefficients("3 5 -1"), vec![3.0, 5.0, -1.0]);
        assert_eq!(parse_coefficients("1,,x, 2"), vec![1.0, 0.0, 2.0]);
        assert!(parse_coefficients("  ").is_empty());
    }

    #[test]
    fn constraints() {
        let cons = parse_constraint("3, 2 <= 18").unwrap();
        assert_eq!(cons.coeffs(), &[3.0, 2.0]);
        assert_eq!(cons.comp(), Comp::Le);
        assert_eq!(cons.rhs(), 18.0);

        let cons = parse_constraint("1 1 >= 4").unwrap();
        assert_eq!(cons.comp(), Comp::Ge);

        let cons = parse_constraint("1, -1 = 1").unwrap();
        assert_eq!(cons.comp(), Comp::Eq);
        assert_eq!(cons.coeffs(), &[1.0, -1.0]);

        let cons = parse_constraint("2 \u{2265} x").unwrap();
        assert_eq!(cons.comp(), Comp::Ge);
        assert_eq!(cons.rhs(), 0.0);

        assert_eq!(
            parse_constraint("1, 2"),
            Err(ParseError::MissingRelation("1, 2".to_string()))
        );
    }

    #[test]
    fn identifiers() {
        assert_eq!("Big-M".parse::<Method>(), Ok(Method::BigM));
        assert_eq!("two_phase".parse::<Method>(), Ok(Method::TwoPhase));
        assert_eq!("standard".parse::<Method>(), Ok(Method::Simplex));
        assert!("dual".parse::<Method>().is_err());

        assert_eq!("MAX".parse::<OptDir>(), Ok(OptDir::Max));
        assert_eq!("minimize".parse::<OptDir>(), Ok(OptDir::Min));
        assert!("up".parse::<OptDir>().is_err());

        assert_eq!(">=".parse::<Comp>(), Ok(Comp::Ge));
        assert_eq!("==".parse::<Comp>(), Ok(Comp::Eq));
        assert!("<".parse::<Comp>().is_err());
    }
}
