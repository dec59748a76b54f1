//! Table and column metadata.
//!
//! Metadata is loaded by the hosting application and injected read-only;
//! nothing in this crate fetches or mutates it.

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use super::expr::{FieldId, FieldRef};
use super::types::{BaseType, TableId};

/// All tables and columns visible to a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Metadata {
    pub fn new(tables: Vec<Table>, fields: Vec<Field>) -> Self {
        Self { tables, fields }
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn field(&self, id: i64) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == FieldId::Id(id))
    }

    /// Columns of a table, in declaration order.
    pub fn table_fields(&self, table_id: TableId) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(move |f| f.table_id == Some(table_id))
    }
}

/// A table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl Table {
    pub fn new(id: TableId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: None,
            schema: None,
        }
    }

    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.name.to_title_case())
    }
}

/// A column.
///
/// Physical columns have a numeric id and a table. Result columns of a nested
/// query are identified by name and belong to no table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    #[serde(default)]
    pub table_id: Option<TableId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub base_type: BaseType,
    /// Coerced type, when the column is stored as one type but read as another
    /// (e.g. a UNIX timestamp integer read as a datetime).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_type: Option<BaseType>,
    /// Target column when this is a foreign key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_target_field_id: Option<i64>,
}

impl Field {
    pub fn new(id: i64, table_id: TableId, name: impl Into<String>, base_type: BaseType) -> Self {
        Self {
            id: FieldId::Id(id),
            table_id: Some(table_id),
            name: name.into(),
            display_name: None,
            base_type,
            effective_type: None,
            fk_target_field_id: None,
        }
    }

    /// A result column of a nested query.
    pub fn result_column(name: impl Into<String>, base_type: BaseType) -> Self {
        let name = name.into();
        Self {
            id: FieldId::Name(name.clone()),
            table_id: None,
            name,
            display_name: None,
            base_type,
            effective_type: None,
            fk_target_field_id: None,
        }
    }

    /// Builder: mark as a foreign key to `target`.
    pub fn with_fk_target(mut self, target: i64) -> Self {
        self.fk_target_field_id = Some(target);
        self
    }

    /// Builder: coerce the column to another type.
    pub fn with_effective_type(mut self, effective_type: BaseType) -> Self {
        self.effective_type = Some(effective_type);
        self
    }

    /// The type the column is read as.
    pub fn effective_type(&self) -> &BaseType {
        self.effective_type.as_ref().unwrap_or(&self.base_type)
    }

    pub fn is_date(&self) -> bool {
        self.effective_type().is_date()
    }

    pub fn is_foreign_key(&self) -> bool {
        self.fk_target_field_id.is_some()
    }

    pub fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.name.to_title_case())
    }

    /// Numeric id of a physical column.
    pub fn numeric_id(&self) -> Option<i64> {
        match self.id {
            FieldId::Id(id) => Some(id),
            FieldId::Name(_) => None,
        }
    }

    /// Plain reference to this column, with no join or bucketing options.
    pub fn reference(&self) -> FieldRef {
        match &self.id {
            FieldId::Id(id) => FieldRef::field(*id),
            FieldId::Name(name) => FieldRef::named(name.clone(), self.effective_type().clone()),
        }
    }
}
