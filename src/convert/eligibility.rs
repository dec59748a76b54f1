//! Whether a question can become a metric.
//!
//! A metric is one measure over a time axis. The question must be structured
//! with a single aggregation, and must reach at least one date column
//! (joined tables included).

use super::error::{ConvertError, ConvertResult};
use crate::model::expr::Aggregation;
use crate::query::{Dimension, Question, StructuredQuery};

/// A question that passed the eligibility check, with what the check found.
#[derive(Debug, Clone)]
pub struct EligibleQuestion<'q> {
    pub question: &'q Question,
    pub query: &'q StructuredQuery,
    /// The single aggregation.
    pub aggregation: &'q Aggregation,
    /// First date dimension in enumeration order.
    pub date_dimension: Dimension,
}

/// Run the eligibility check, keeping the findings on success.
pub fn check_eligibility(question: Option<&Question>) -> ConvertResult<EligibleQuestion<'_>> {
    let question = question.ok_or(ConvertError::MissingQuestion)?;
    let query = question
        .structured_query()
        .ok_or(ConvertError::NotStructured)?;

    let aggregation = match query.aggregations() {
        [single] => single,
        other => return Err(ConvertError::AggregationCount(other.len())),
    };

    let date_dimension = find_date_dimension(query).ok_or(ConvertError::NoDateDimension)?;

    Ok(EligibleQuestion {
        question,
        query,
        aggregation,
        date_dimension,
    })
}

/// Whether `question` can be drafted into a metric.
pub fn can_be_used_as_metric(question: Option<&Question>) -> bool {
    check_eligibility(question).is_ok()
}

/// The first dimension option whose column is date-typed.
///
/// Searches `dimension_options()` rather than `dimensions()` so that a time
/// axis on a joined table is found.
pub fn find_date_dimension(query: &StructuredQuery) -> Option<Dimension> {
    query
        .dimension_options()
        .into_iter()
        .find(|dimension| dimension.field().is_date())
}
