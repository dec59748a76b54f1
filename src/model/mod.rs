//! Value types: expressions, metadata and metric records.

pub mod expr;
pub mod loader;
pub mod metadata;
pub mod metric;
pub mod types;

pub use expr::{Aggregation, ExprError, FieldId, FieldOptions, FieldRef, Filter};
pub use loader::LoadError;
pub use metadata::{Field, Metadata, Table};
pub use metric::{Metric, MetricDimension};
pub use types::{BaseType, CardId, CollectionId, TableId, TemporalUnit};
