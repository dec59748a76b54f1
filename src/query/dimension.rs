//! Dimensions - resolved handles over field references.

use inflector::Inflector;

use super::structured::{Source, StructuredQuery};
use crate::model::expr::{FieldId, FieldRef};
use crate::model::metadata::{Field, Metadata};
use crate::model::types::TemporalUnit;

/// A field reference resolved against a query and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    field_ref: FieldRef,
    field: Field,
}

impl Dimension {
    pub(crate) fn new(field_ref: FieldRef, field: Field) -> Self {
        Self { field_ref, field }
    }

    /// Resolve a raw field reference in the context of `query`.
    ///
    /// Returns `None` when the reference does not point at a column the query
    /// can reach:
    /// - a numeric id must exist in `metadata` and belong to the source table,
    ///   the table of the named join, or the target table of the named FK;
    /// - a by-name reference must be a result column of the nested source;
    /// - an aggregation reference must index an aggregation of the nested source.
    pub fn parse(field_ref: &FieldRef, metadata: &Metadata, query: &StructuredQuery) -> Option<Self> {
        match field_ref {
            FieldRef::Field {
                id: FieldId::Id(id),
                options,
            } => {
                let field = metadata.field(*id)?;
                let table_id = field.table_id?;

                let reachable = if let Some(alias) = &options.join_alias {
                    query.join(alias)?.table_id == table_id
                } else if let Some(fk_id) = options.source_field {
                    let fk = metadata.field(fk_id)?;
                    let target = metadata.field(fk.fk_target_field_id?)?;
                    fk.table_id.is_some()
                        && fk.table_id == query.source_table_id()
                        && target.table_id == Some(table_id)
                } else {
                    query.source_table_id() == Some(table_id)
                };

                reachable.then(|| Dimension::new(field_ref.clone(), field.clone()))
            }
            FieldRef::Field {
                id: FieldId::Name(name),
                ..
            } => {
                let inner = nested_source(query)?;
                let column = inner
                    .result_columns()
                    .into_iter()
                    .find(|dim| !dim.field_ref.is_aggregation() && &dim.field.name == name)?;
                Some(Dimension::new(field_ref.clone(), column.field))
            }
            FieldRef::Aggregation(index) => {
                let inner = nested_source(query)?;
                inner.aggregations().get(*index)?;
                let column = inner
                    .result_columns()
                    .into_iter()
                    .find(|dim| dim.field_ref == FieldRef::Aggregation(*index))?;
                Some(column)
            }
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn field_ref(&self) -> &FieldRef {
        &self.field_ref
    }

    pub fn temporal_unit(&self) -> Option<TemporalUnit> {
        self.field_ref.temporal_unit()
    }

    /// A new dimension bucketed by `unit`.
    pub fn with_temporal_unit(&self, unit: TemporalUnit) -> Self {
        Dimension::new(self.field_ref.with_temporal_unit(unit), self.field.clone())
    }

    /// The raw reference, including any bucketing.
    pub fn to_field_ref(&self) -> FieldRef {
        self.field_ref.clone()
    }

    /// Human-readable name, e.g. `People → Created At: Day`.
    pub fn display_name(&self) -> String {
        let mut name = self.field.display_name();
        if let Some(alias) = self.field_ref.join_alias() {
            name = format!("{alias} → {name}");
        }
        if let Some(unit) = self.temporal_unit() {
            name = format!("{name}: {}", unit.as_str().to_title_case());
        }
        name
    }
}

fn nested_source(query: &StructuredQuery) -> Option<&StructuredQuery> {
    match query.source() {
        Source::Query(inner) => Some(inner.as_ref()),
        Source::Table(_) => None,
    }
}
