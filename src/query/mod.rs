//! Questions, structured queries and dimensions.

pub mod dimension;
pub mod question;
pub mod structured;

pub use dimension::Dimension;
pub use question::{Card, CardError, DatasetQuery, InnerQuery, NativeQuery, Query, Question};
pub use structured::{Join, JoinCondition, Source, StructuredQuery};
