//! Conversion between questions and metric definitions.
//!
//! Three pure operations:
//!
//! - [`can_be_used_as_metric`] gates the other two;
//! - [`draft_metric`] derives a metric draft from a question;
//! - [`apply_metric`] re-applies a metric onto a question's query.
//!
//! Each has a `try_` variant (or [`check_eligibility`]) that reports the
//! [`ConvertError`] reason instead of collapsing it to `None`/`false`.

mod apply;
mod draft;
mod eligibility;
mod error;

pub use apply::{apply_metric, try_apply_metric, ApplyOptions, TRAILING_WINDOW_DAYS};
pub use draft::{draft_metric, try_draft_metric, DEFAULT_GRANULARITY};
pub use eligibility::{can_be_used_as_metric, check_eligibility, find_date_dimension, EligibleQuestion};
pub use error::{ConvertError, ConvertResult};
