//! Question → metric draft.

use tracing::{debug, info};

use super::eligibility::check_eligibility;
use super::error::{ConvertError, ConvertResult};
use crate::model::metric::{Metric, MetricDimension};
use crate::model::types::TemporalUnit;
use crate::query::Question;

/// Granularity every draft starts with.
pub const DEFAULT_GRANULARITY: TemporalUnit = TemporalUnit::Month;

/// Draft a metric from `question`, or `None` if it cannot be one.
pub fn draft_metric(question: &Question) -> Option<Metric> {
    match try_draft_metric(question) {
        Ok(metric) => Some(metric),
        Err(reason) => {
            debug!(question_id = question.id(), %reason, "question cannot be drafted into a metric");
            None
        }
    }
}

/// Like [`draft_metric`], reporting why drafting failed.
pub fn try_draft_metric(question: &Question) -> ConvertResult<Metric> {
    let eligible = check_eligibility(Some(question))?;

    let date_field = eligible.date_dimension.field();
    let date_ref = eligible.date_dimension.field_ref();
    if date_ref.is_aggregation() {
        return Err(ConvertError::AggregationReference(date_ref.clone()));
    }

    let metric = Metric {
        id: None,
        name: format!("{}_metric", question.id()),
        display_name: format!("{} Metric", question.display_name()),
        description: String::new(),
        archived: false,
        card_id: question.id(),
        measure: eligible.aggregation.clone(),
        dimensions: vec![MetricDimension::new(date_field.name.clone(), date_ref.clone())],
        granularities: Vec::new(),
        default_granularity: DEFAULT_GRANULARITY,
        collection_id: None,
    };

    info!(
        question_id = question.id(),
        metric = %metric.name,
        dimension = %date_ref,
        "drafted metric"
    );
    Ok(metric)
}
