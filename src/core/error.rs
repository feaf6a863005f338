use thiserror::Error;

/// Failures of the projection engine. All of them are raised before or
/// instead of returning a result, the engine never hands back partial series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("invalid input `{field}`: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("invalid loan terms: {0}")]
    InvalidTerm(String),

    #[error("numeric overflow: {0}")]
    NumericOverflow(String),
}

impl ProjectionError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ProjectionError::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Fails with `NumericOverflow` on the first non-finite value in `values`.
pub(crate) fn ensure_finite(series: &str, values: &[f64]) -> ProjectionResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(period) => Err(ProjectionError::NumericOverflow(format!(
            "{series} is not finite at period {period}"
        ))),
        None => Ok(()),
    }
}
