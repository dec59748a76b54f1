//! Reasons a conversion produced no result.

use thiserror::Error;

use crate::model::expr::FieldRef;

/// Result type for conversions.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Why a question or metric could not be converted.
///
/// None of these are exceptional: callers treat any of them as
/// "cannot convert" and fall back to their own messaging.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("no question given")]
    MissingQuestion,

    #[error("question is not a structured query")]
    NotStructured,

    #[error("expected exactly one aggregation, found {0}")]
    AggregationCount(usize),

    #[error("question has no date dimension")]
    NoDateDimension,

    /// The date dimension is an aggregation output, not a column.
    #[error("date dimension {0} refers to an aggregation output")]
    AggregationReference(FieldRef),

    #[error("metric has no dimension")]
    MissingDimension,

    /// The metric's stored reference does not resolve against the question.
    #[error("cannot resolve {0} against the question's metadata")]
    UnresolvableReference(FieldRef),
}
