use thiserror::Error;

/// Structurally invalid problem data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Corner-point method supports two variables, found x{0}")]
    TooManyVariables(usize),
    #[error("Distance matrix is empty")]
    EmptyDistanceMatrix,
    #[error("Distance matrix row {row} has {found} entries, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Got {labels} city labels for {cities} cities")]
    LabelCountMismatch { labels: usize, cities: usize },
    #[error("Cost matrix has {found} rows, expected one per source ({expected})")]
    CostRowCount { expected: usize, found: usize },
    #[error("Cost matrix row {row} has {found} entries, expected one per destination ({expected})")]
    CostColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{field} contains a negative value: {value}")]
    NegativeValue { field: &'static str, value: f64 },
    #[error("{field} contains a non-finite value")]
    NonFiniteValue { field: &'static str },
}

/// Reject NaN and infinities, and optionally negative entries
pub(crate) fn check_values<'a>(
    field: &'static str,
    values: impl IntoIterator<Item = &'a f64>,
    allow_negative: bool,
) -> Result<(), SolveError> {
    for &value in values {
        if !value.is_finite() {
            return Err(SolveError::NonFiniteValue { field });
        }
        if !allow_negative && value < 0.0 {
            return Err(SolveError::NegativeValue { field, value });
        }
    }
    Ok(())
}
