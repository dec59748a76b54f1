//! # metricize
//!
//! Converts between ad-hoc structured questions and reusable metric
//! definitions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Question (structured query + metadata)            │
//! └─────────────────────────────────────────────────────────┘
//!           │                                   ▲
//!           ▼ [can_be_used_as_metric]            │ [apply_metric]
//!           ▼ [draft_metric]                     │
//! ┌─────────────────────────────────────────────────────────┐
//! │      Metric (measure + date dimension + granularity)     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! - `model/` - expression trees, metadata, metric records
//! - `query/` - questions, immutable structured queries, dimensions
//! - `convert/` - the eligibility check, drafting and application
//! - `config/` - settings and the deployment environment flag
//!
//! # Example
//!
//! ```ignore
//! use metricize::prelude::*;
//!
//! if can_be_used_as_metric(Some(&question)) {
//!     let metric = draft_metric(&question).expect("eligible");
//!     let trend = apply_metric(&question, &metric, &ApplyOptions::production());
//! }
//! ```

pub mod config;
pub mod convert;
pub mod model;
pub mod query;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{Environment, Settings};
    pub use crate::convert::{
        apply_metric, can_be_used_as_metric, check_eligibility, draft_metric, ApplyOptions,
        ConvertError,
    };
    pub use crate::model::{
        Aggregation, BaseType, Field, FieldRef, Filter, Metadata, Metric, MetricDimension, Table,
        TemporalUnit,
    };
    pub use crate::query::{Dimension, Join, JoinCondition, Question, StructuredQuery};
}

pub use convert::{apply_metric, can_be_used_as_metric, draft_metric, ApplyOptions};
pub use model::{Metric, MetricDimension};
pub use query::Question;
