//! Structured (clause-based) queries.
//!
//! `StructuredQuery` is an immutable value: every `add_*` method returns a new
//! query and leaves the receiver untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::dimension::Dimension;
use crate::model::expr::{Aggregation, ExprError, FieldRef, Filter};
use crate::model::metadata::{Field, Metadata};
use crate::model::types::{BaseType, TableId};

/// Where a query reads its rows from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table(TableId),
    /// Results of another structured query.
    Query(Box<StructuredQuery>),
}

/// An explicit join to another table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub alias: String,
    #[serde(rename = "source-table")]
    pub table_id: TableId,
    pub condition: JoinCondition,
    /// Keys this crate does not interpret (`strategy`, `fields`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Join {
    pub fn new(alias: impl Into<String>, table_id: TableId, condition: JoinCondition) -> Self {
        Self {
            alias: alias.into(),
            table_id,
            condition,
            extra: BTreeMap::new(),
        }
    }
}

/// Equality join condition: `["=", <lhs>, <rhs>]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct JoinCondition {
    pub lhs: FieldRef,
    pub rhs: FieldRef,
}

impl JoinCondition {
    pub fn new(lhs: FieldRef, rhs: FieldRef) -> Self {
        Self { lhs, rhs }
    }
}

impl TryFrom<Value> for JoinCondition {
    type Error = ExprError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_array().map(Vec::as_slice) {
            Some([Value::String(op), lhs, rhs]) if op == "=" => Ok(JoinCondition {
                lhs: FieldRef::from_value(lhs)?,
                rhs: FieldRef::from_value(rhs)?,
            }),
            _ => Err(ExprError::InvalidArgument {
                tag: "join".to_string(),
                message: format!("unsupported join condition {value}"),
            }),
        }
    }
}

impl From<JoinCondition> for Value {
    fn from(condition: JoinCondition) -> Self {
        Value::Array(vec![
            "=".into(),
            condition.lhs.to_value(),
            condition.rhs.to_value(),
        ])
    }
}

/// A structured query bound to the metadata it was built against.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    source: Source,
    joins: Vec<Join>,
    aggregations: Vec<Aggregation>,
    breakouts: Vec<FieldRef>,
    filter: Option<Filter>,
    /// Clauses this crate does not interpret (`order-by`, `limit`, ...).
    extra: BTreeMap<String, Value>,
    metadata: Arc<Metadata>,
}

impl StructuredQuery {
    /// A query over a table.
    pub fn new(table_id: TableId, metadata: Arc<Metadata>) -> Self {
        Self {
            source: Source::Table(table_id),
            joins: Vec::new(),
            aggregations: Vec::new(),
            breakouts: Vec::new(),
            filter: None,
            extra: BTreeMap::new(),
            metadata,
        }
    }

    /// A query over the results of `inner`. Metadata is shared with it.
    pub fn nested(inner: StructuredQuery) -> Self {
        let metadata = Arc::clone(&inner.metadata);
        Self {
            source: Source::Query(Box::new(inner)),
            joins: Vec::new(),
            aggregations: Vec::new(),
            breakouts: Vec::new(),
            filter: None,
            extra: BTreeMap::new(),
            metadata,
        }
    }

    pub(crate) fn from_parts(
        source: Source,
        joins: Vec<Join>,
        aggregations: Vec<Aggregation>,
        breakouts: Vec<FieldRef>,
        filter: Option<Filter>,
        extra: BTreeMap<String, Value>,
        metadata: Arc<Metadata>,
    ) -> Self {
        Self {
            source,
            joins,
            aggregations,
            breakouts,
            filter,
            extra,
            metadata,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The source table, when the query reads directly from one.
    pub fn source_table_id(&self) -> Option<TableId> {
        match &self.source {
            Source::Table(id) => Some(*id),
            Source::Query(_) => None,
        }
    }

    /// The nested source query, if any.
    pub fn source_query(&self) -> Option<&StructuredQuery> {
        match &self.source {
            Source::Table(_) => None,
            Source::Query(inner) => Some(inner.as_ref()),
        }
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn join(&self, alias: &str) -> Option<&Join> {
        self.joins.iter().find(|j| j.alias == alias)
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    pub fn breakouts(&self) -> &[FieldRef] {
        &self.breakouts
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Uninterpreted clauses, written back unchanged.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_handle(&self) -> Arc<Metadata> {
        Arc::clone(&self.metadata)
    }

    // =========================================================================
    // Mutators (all return new values)
    // =========================================================================

    pub fn add_aggregation(&self, aggregation: Aggregation) -> Self {
        let mut query = self.clone();
        query.aggregations.push(aggregation);
        query
    }

    pub fn add_breakout(&self, breakout: FieldRef) -> Self {
        let mut query = self.clone();
        query.breakouts.push(breakout);
        query
    }

    /// Add a filter, conjoined with any existing one.
    pub fn add_filter(&self, filter: Filter) -> Self {
        let mut query = self.clone();
        query.filter = Some(match query.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        query
    }

    pub fn add_join(&self, join: Join) -> Self {
        let mut query = self.clone();
        query.joins.push(join);
        query
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    /// Columns read directly from the source: the source table's columns, or
    /// the result columns of a nested source query.
    pub fn dimensions(&self) -> Vec<Dimension> {
        match &self.source {
            Source::Table(table_id) => self
                .metadata
                .table_fields(*table_id)
                .map(|field| Dimension::new(field.reference(), field.clone()))
                .collect(),
            Source::Query(inner) => inner.result_columns(),
        }
    }

    /// Every column a clause of this query could refer to.
    ///
    /// Native dimensions first, then columns reachable through foreign keys,
    /// then columns of explicit joins in join order.
    pub fn dimension_options(&self) -> Vec<Dimension> {
        let native = self.dimensions();

        let implicit: Vec<Dimension> = native
            .iter()
            .filter_map(|dim| {
                let fk = dim.field();
                let fk_id = fk.numeric_id()?;
                let target = self.metadata.field(fk.fk_target_field_id?)?;
                let target_table = target.table_id?;
                Some(
                    self.metadata
                        .table_fields(target_table)
                        .filter_map(move |field| {
                            let id = field.numeric_id()?;
                            Some(Dimension::new(
                                FieldRef::field(id).with_source_field(fk_id),
                                field.clone(),
                            ))
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .flatten()
            .collect();

        let joined = self.joins.iter().flat_map(|join| {
            self.metadata
                .table_fields(join.table_id)
                .filter_map(|field| {
                    let id = field.numeric_id()?;
                    Some(Dimension::new(
                        FieldRef::field(id).with_join_alias(join.alias.clone()),
                        field.clone(),
                    ))
                })
                .collect::<Vec<_>>()
        });

        native.into_iter().chain(implicit).chain(joined).collect()
    }

    /// Columns this query produces, as seen by a query nested on top of it:
    /// breakouts (by name) followed by aggregation outputs.
    ///
    /// Repeated names get a numeric suffix in output order, so a second
    /// `created_at` breakout is `created_at_2`. An extraction unit such as
    /// `day-of-week` yields an integer column.
    pub fn result_columns(&self) -> Vec<Dimension> {
        let mut names = HashMap::new();
        let mut columns = Vec::new();

        for breakout in &self.breakouts {
            let Some(dimension) = Dimension::parse(breakout, &self.metadata, self) else {
                continue;
            };
            let source = dimension.field();
            let base_type = match breakout.temporal_unit() {
                Some(unit) if unit.is_extraction() => BaseType::Integer,
                _ => source.effective_type().clone(),
            };
            let column = Field::result_column(unique_name(&mut names, &source.name), base_type);
            columns.push(Dimension::new(column.reference(), column));
        }

        for (index, aggregation) in self.aggregations.iter().enumerate() {
            let column = Field::result_column(
                unique_name(&mut names, &aggregation.column_name()),
                self.aggregation_type(aggregation),
            );
            columns.push(Dimension::new(FieldRef::aggregation(index), column));
        }

        columns
    }

    /// Result type of an aggregation over this query's columns.
    fn aggregation_type(&self, aggregation: &Aggregation) -> BaseType {
        let field_type = || {
            aggregation
                .field()
                .and_then(|f| Dimension::parse(f, &self.metadata, self))
                .map(|dim| dim.field().effective_type().clone())
        };
        match aggregation {
            Aggregation::Count | Aggregation::CumulativeCount | Aggregation::Distinct(_) => {
                BaseType::BigInteger
            }
            Aggregation::Avg(_) => BaseType::Float,
            Aggregation::Sum(_)
            | Aggregation::CumulativeSum(_)
            | Aggregation::Min(_)
            | Aggregation::Max(_) => {
                field_type().unwrap_or_else(|| BaseType::Other("type/*".to_string()))
            }
            Aggregation::Other(_) => BaseType::Other("type/*".to_string()),
        }
    }
}

/// `name`, or `name_<n>` for its n-th occurrence.
fn unique_name(seen: &mut HashMap<String, usize>, name: &str) -> String {
    let count = seen.entry(name.to_string()).or_insert(0);
    *count += 1;
    if *count == 1 {
        name.to_string()
    } else {
        format!("{name}_{count}")
    }
}
