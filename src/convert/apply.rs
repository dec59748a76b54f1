//! (question, metric) → new question.
//!
//! The metric's date dimension is added to the question's query as a
//! breakout. In production the breakout is bucketed by day and restricted to
//! the trailing 30 days; elsewhere it is bucketed by month over all time.

use tracing::{debug, info};

use super::error::{ConvertError, ConvertResult};
use crate::config::{Environment, Settings};
use crate::model::expr::{FieldRef, Filter};
use crate::model::metric::Metric;
use crate::model::types::TemporalUnit;
use crate::query::{Dimension, Question};

/// Length of the production trailing window, in days.
pub const TRAILING_WINDOW_DAYS: i64 = 30;

/// Environment-dependent behavior of [`apply_metric`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    pub environment: Environment,
}

impl ApplyOptions {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn production() -> Self {
        Self::new(Environment::Production)
    }

    pub fn development() -> Self {
        Self::new(Environment::Development)
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.environment)
    }

    /// Bucketing applied to the date breakout.
    pub fn granularity(&self) -> TemporalUnit {
        if self.environment.is_production() {
            TemporalUnit::Day
        } else {
            TemporalUnit::Month
        }
    }

    /// Relative-time filter on `field`, production only.
    pub fn trailing_filter(&self, field: &FieldRef) -> Option<Filter> {
        self.environment.is_production().then(|| {
            Filter::time_interval(field.clone(), -TRAILING_WINDOW_DAYS, TemporalUnit::Day)
        })
    }
}

/// Re-apply `metric` onto `question`, or `None` if its dimension cannot be
/// resolved there. `question` is never modified.
pub fn apply_metric(question: &Question, metric: &Metric, options: &ApplyOptions) -> Option<Question> {
    match try_apply_metric(question, metric, options) {
        Ok(applied) => Some(applied),
        Err(reason) => {
            debug!(
                question_id = question.id(),
                metric = %metric.name,
                %reason,
                "metric cannot be applied to question"
            );
            None
        }
    }
}

/// Like [`apply_metric`], reporting why application failed.
pub fn try_apply_metric(
    question: &Question,
    metric: &Metric,
    options: &ApplyOptions,
) -> ConvertResult<Question> {
    let query = question
        .structured_query()
        .ok_or(ConvertError::NotStructured)?;
    let date_ref = metric
        .date_dimension()
        .ok_or(ConvertError::MissingDimension)?
        .field_ref();

    let date_dimension = Dimension::parse(date_ref, query.metadata(), query)
        .ok_or_else(|| ConvertError::UnresolvableReference(date_ref.clone()))?;

    let granularity = options.granularity();
    let breakout = date_dimension.with_temporal_unit(granularity).to_field_ref();
    let mut metric_query = query.add_breakout(breakout);

    if let Some(filter) = options.trailing_filter(date_ref) {
        metric_query = metric_query.add_filter(filter);
    }

    info!(
        question_id = question.id(),
        metric = %metric.name,
        environment = %options.environment,
        granularity = %granularity,
        "applied metric to question"
    );
    Ok(question.with_query(metric_query))
}
