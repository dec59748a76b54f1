//! Questions and their serialized card form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::structured::{Join, Source, StructuredQuery};
use crate::model::expr::{Aggregation, FieldRef, Filter};
use crate::model::metadata::Metadata;
use crate::model::types::{CardId, TableId};

/// Errors converting a serialized card into a question.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CardError {
    #[error("query has neither 'source-table' nor 'source-query'")]
    MissingSource,

    #[error("query has both 'source-table' and 'source-query'")]
    AmbiguousSource,

    #[error("unknown source table {0}")]
    UnknownTable(TableId),
}

/// A question: a named query, either structured or native.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: CardId,
    display_name: String,
    database: Option<i64>,
    query: Query,
    /// Card keys this crate does not interpret, written back unchanged.
    extra: BTreeMap<String, Value>,
}

/// The query a question runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Structured(StructuredQuery),
    Native(NativeQuery),
}

/// Literal query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeQuery {
    pub query: String,
    /// `template-tags` and any other keys, kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Question {
    pub fn new(id: CardId, display_name: impl Into<String>, query: Query) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            database: None,
            query,
            extra: BTreeMap::new(),
        }
    }

    pub fn structured(id: CardId, display_name: impl Into<String>, query: StructuredQuery) -> Self {
        Self::new(id, display_name, Query::Structured(query))
    }

    pub fn native(id: CardId, display_name: impl Into<String>, sql: impl Into<String>) -> Self {
        let native = NativeQuery {
            query: sql.into(),
            extra: BTreeMap::new(),
        };
        Self::new(id, display_name, Query::Native(native))
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.query, Query::Structured(_))
    }

    pub fn structured_query(&self) -> Option<&StructuredQuery> {
        match &self.query {
            Query::Structured(query) => Some(query),
            Query::Native(_) => None,
        }
    }

    /// A new question with the same identity running `query`.
    pub fn with_query(&self, query: StructuredQuery) -> Self {
        Self {
            id: self.id,
            display_name: self.display_name.clone(),
            database: self.database,
            query: Query::Structured(query),
            extra: self.extra.clone(),
        }
    }

    /// Build a question from its serialized form, binding it to `metadata`.
    pub fn from_card(card: Card, metadata: Arc<Metadata>) -> Result<Self, CardError> {
        let (database, query) = match card.dataset_query {
            DatasetQuery::Query { database, query } => {
                (database, Query::Structured(inner_to_structured(query, &metadata)?))
            }
            DatasetQuery::Native { database, native } => (database, Query::Native(native)),
        };
        Ok(Self {
            id: card.id,
            display_name: card.name,
            database,
            query,
            extra: card.extra,
        })
    }

    /// The serialized form of this question.
    pub fn to_card(&self) -> Card {
        let dataset_query = match &self.query {
            Query::Structured(query) => DatasetQuery::Query {
                database: self.database,
                query: structured_to_inner(query),
            },
            Query::Native(native) => DatasetQuery::Native {
                database: self.database,
                native: native.clone(),
            },
        };
        Card {
            id: self.id,
            name: self.display_name.clone(),
            dataset_query,
            extra: self.extra.clone(),
        }
    }
}

// =============================================================================
// Serialized form
// =============================================================================

/// A saved question as stored by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub dataset_query: DatasetQuery,
    /// `display`, `visualization_settings`, `collection_id`, ...
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatasetQuery {
    Query {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<i64>,
        query: InnerQuery,
    },
    Native {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<i64>,
        native: NativeQuery,
    },
}

/// Clauses of a structured query, in wire form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InnerQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_table: Option<TableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<Box<InnerQuery>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<Join>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregation: Vec<Aggregation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakout: Vec<FieldRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    /// `order-by`, `limit`, `fields`, `expressions`, ...
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn inner_to_structured(
    inner: InnerQuery,
    metadata: &Arc<Metadata>,
) -> Result<StructuredQuery, CardError> {
    let source = match (inner.source_table, inner.source_query) {
        (Some(_), Some(_)) => return Err(CardError::AmbiguousSource),
        (None, None) => return Err(CardError::MissingSource),
        (Some(table_id), None) => {
            if metadata.table(table_id).is_none() {
                return Err(CardError::UnknownTable(table_id));
            }
            Source::Table(table_id)
        }
        (None, Some(nested)) => Source::Query(Box::new(inner_to_structured(*nested, metadata)?)),
    };

    Ok(StructuredQuery::from_parts(
        source,
        inner.joins,
        inner.aggregation,
        inner.breakout,
        inner.filter,
        inner.extra,
        Arc::clone(metadata),
    ))
}

fn structured_to_inner(query: &StructuredQuery) -> InnerQuery {
    let (source_table, source_query) = match query.source() {
        Source::Table(table_id) => (Some(*table_id), None),
        Source::Query(nested) => (None, Some(Box::new(structured_to_inner(nested)))),
    };
    InnerQuery {
        source_table,
        source_query,
        joins: query.joins().to_vec(),
        aggregation: query.aggregations().to_vec(),
        breakout: query.breakouts().to_vec(),
        filter: query.filter().cloned(),
        extra: query.extra().clone(),
    }
}
