/// Faults raised while building or pivoting a tableau. `solve` turns these into an ERROR status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimplexError {
    #[error("the objective has no decision variables")]
    NoVariables,

    #[error("constraint {constraint} has {found} coefficients, expected {expected}")]
    ShapeMismatch {
        constraint: String,
        expected: usize,
        found: usize,
    },

    #[error("non-finite value in {location}")]
    NonFinite { location: String },

    #[error("pivot value {value} at row {row}, column {col} is too small")]
    PivotTooSmall { row: usize, col: usize, value: f64 },

    #[error("artificial column {column} is not basic in any row")]
    MissingBasicRow { column: usize },
}

pub type Result<T> = std::result::Result<T, SimplexError>;
