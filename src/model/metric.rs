//! Metric record - a reusable trend definition.

use serde::{Deserialize, Serialize};

use super::expr::{Aggregation, FieldRef};
use super::types::{CardId, CollectionId, TemporalUnit};

/// A metric: one measure over one temporal dimension.
///
/// Drafts produced from a question carry no `id`; persisted records do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub archived: bool,
    pub card_id: CardId,
    /// The aggregation, verbatim from the source question
    pub measure: Aggregation,
    /// Exactly one `[column_name, field_ref]` pair
    pub dimensions: Vec<MetricDimension>,
    #[serde(default)]
    pub granularities: Vec<TemporalUnit>,
    pub default_granularity: TemporalUnit,
    pub collection_id: Option<CollectionId>,
}

impl Metric {
    /// The temporal dimension. Only the first pair is meaningful.
    pub fn date_dimension(&self) -> Option<&MetricDimension> {
        self.dimensions.first()
    }
}

/// A `[column_name, field_ref]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDimension(pub String, pub FieldRef);

impl MetricDimension {
    pub fn new(column_name: impl Into<String>, field_ref: FieldRef) -> Self {
        Self(column_name.into(), field_ref)
    }

    pub fn column_name(&self) -> &str {
        &self.0
    }

    pub fn field_ref(&self) -> &FieldRef {
        &self.1
    }
}
