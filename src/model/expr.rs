//! Tagged expression trees for field references, aggregations and filters.
//!
//! On the wire every tree is a tagged array:
//!
//! ```text
//! ["count"]
//! ["field", 7, null]
//! ["field", 7, {"temporal-unit": "day", "join-alias": "People"}]
//! ["field", "created_at", {"base-type": "type/DateTime"}]
//! ["aggregation", 0]
//! ["time-interval", ["field", 7, null], -30, "day"]
//! ```
//!
//! In memory they are enums, so callers match on variants instead of
//! inspecting array shapes. Aggregation and filter clauses this crate does not
//! interpret are kept as `Other(Value)` and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use super::types::{BaseType, TemporalUnit};

/// Errors decoding an expression from its wire form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("expected a tagged array, got {0}")]
    NotTagged(String),

    #[error("unknown {kind} clause '{tag}'")]
    UnknownTag { kind: &'static str, tag: String },

    #[error("'{tag}' expects {expected} argument(s), got {found}")]
    Arity {
        tag: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid argument to '{tag}': {message}")]
    InvalidArgument { tag: String, message: String },
}

/// Result type for expression decoding.
pub type ExprResult<T> = Result<T, ExprError>;

fn split_tag<'a>(value: &'a Value) -> ExprResult<(&'a str, &'a [Value])> {
    let not_tagged = || ExprError::NotTagged(value.to_string());
    let items = value.as_array().ok_or_else(not_tagged)?;
    let (head, rest) = items.split_first().ok_or_else(not_tagged)?;
    let tag = head.as_str().ok_or_else(not_tagged)?;
    Ok((tag, rest))
}

fn expect_arity(tag: &str, args: &[Value], expected: usize) -> ExprResult<()> {
    if args.len() != expected {
        return Err(ExprError::Arity {
            tag: tag.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn invalid(tag: &str, message: impl Into<String>) -> ExprError {
    ExprError::InvalidArgument {
        tag: tag.to_string(),
        message: message.into(),
    }
}

// =============================================================================
// Field references
// =============================================================================

/// The column a `field` clause points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldId {
    /// A physical column, by metadata id.
    Id(i64),
    /// A result column of a nested source query, by name.
    Name(String),
}

impl FieldId {
    fn to_value(&self) -> Value {
        match self {
            FieldId::Id(id) => Value::from(*id),
            FieldId::Name(name) => Value::from(name.as_str()),
        }
    }
}

/// Options map of a `field` clause.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldOptions {
    pub temporal_unit: Option<TemporalUnit>,
    pub join_alias: Option<String>,
    /// FK column through which the field is implicitly joined.
    pub source_field: Option<i64>,
    pub base_type: Option<BaseType>,
    /// Options this crate does not interpret, kept so references round-trip.
    pub extra: BTreeMap<String, Value>,
}

impl FieldOptions {
    pub fn is_empty(&self) -> bool {
        self.temporal_unit.is_none()
            && self.join_alias.is_none()
            && self.source_field.is_none()
            && self.base_type.is_none()
            && self.extra.is_empty()
    }

    fn to_value(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        // Keys are emitted sorted whatever the map implementation.
        let mut entries = self.extra.clone();
        if let Some(unit) = self.temporal_unit {
            entries.insert("temporal-unit".into(), Value::from(unit.as_str()));
        }
        if let Some(alias) = &self.join_alias {
            entries.insert("join-alias".into(), Value::from(alias.as_str()));
        }
        if let Some(fk) = self.source_field {
            entries.insert("source-field".into(), Value::from(fk));
        }
        if let Some(base_type) = &self.base_type {
            entries.insert("base-type".into(), Value::from(base_type.as_str()));
        }
        Value::Object(entries.into_iter().collect::<Map<_, _>>())
    }

    fn from_value(value: &Value) -> ExprResult<Self> {
        let map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => return Err(invalid("field", format!("options must be a map, got {other}"))),
        };

        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "temporal-unit" => {
                    let unit = value
                        .as_str()
                        .and_then(TemporalUnit::from_str)
                        .ok_or_else(|| invalid("field", format!("bad temporal-unit {value}")))?;
                    options.temporal_unit = Some(unit);
                }
                "join-alias" => {
                    let alias = value
                        .as_str()
                        .ok_or_else(|| invalid("field", format!("bad join-alias {value}")))?;
                    options.join_alias = Some(alias.to_string());
                }
                "source-field" => {
                    let fk = value
                        .as_i64()
                        .ok_or_else(|| invalid("field", format!("bad source-field {value}")))?;
                    options.source_field = Some(fk);
                }
                "base-type" => {
                    let base_type = value
                        .as_str()
                        .ok_or_else(|| invalid("field", format!("bad base-type {value}")))?;
                    options.base_type = Some(BaseType::from_str(base_type));
                }
                _ => {
                    options.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(options)
    }
}

/// A reference to a column or to an aggregation output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FieldRef {
    /// `["field", <id-or-name>, <options>]`
    Field { id: FieldId, options: FieldOptions },
    /// `["aggregation", <index>]`: the output of the query's n-th aggregation.
    Aggregation(usize),
}

impl FieldRef {
    /// Reference a physical column by id.
    pub fn field(id: i64) -> Self {
        FieldRef::Field {
            id: FieldId::Id(id),
            options: FieldOptions::default(),
        }
    }

    /// Reference a nested-query result column by name.
    pub fn named(name: impl Into<String>, base_type: BaseType) -> Self {
        FieldRef::Field {
            id: FieldId::Name(name.into()),
            options: FieldOptions {
                base_type: Some(base_type),
                ..FieldOptions::default()
            },
        }
    }

    pub fn aggregation(index: usize) -> Self {
        FieldRef::Aggregation(index)
    }

    /// Builder: qualify the reference with an explicit join alias.
    pub fn with_join_alias(self, alias: impl Into<String>) -> Self {
        self.map_options(|options| options.join_alias = Some(alias.into()))
    }

    /// Builder: reach the column through an implicit foreign-key join.
    pub fn with_source_field(self, fk_field_id: i64) -> Self {
        self.map_options(|options| options.source_field = Some(fk_field_id))
    }

    /// Whether this points at an aggregation output rather than a column.
    pub fn is_aggregation(&self) -> bool {
        matches!(self, FieldRef::Aggregation(_))
    }

    pub fn id(&self) -> Option<&FieldId> {
        match self {
            FieldRef::Field { id, .. } => Some(id),
            FieldRef::Aggregation(_) => None,
        }
    }

    pub fn options(&self) -> Option<&FieldOptions> {
        match self {
            FieldRef::Field { options, .. } => Some(options),
            FieldRef::Aggregation(_) => None,
        }
    }

    pub fn temporal_unit(&self) -> Option<TemporalUnit> {
        self.options().and_then(|options| options.temporal_unit)
    }

    pub fn join_alias(&self) -> Option<&str> {
        self.options().and_then(|options| options.join_alias.as_deref())
    }

    pub fn source_field(&self) -> Option<i64> {
        self.options().and_then(|options| options.source_field)
    }

    /// A copy carrying `unit`. Aggregation references have no options and are
    /// returned unchanged.
    pub fn with_temporal_unit(&self, unit: TemporalUnit) -> Self {
        self.clone()
            .map_options(|options| options.temporal_unit = Some(unit))
    }

    pub fn without_temporal_unit(&self) -> Self {
        self.clone().map_options(|options| options.temporal_unit = None)
    }

    /// Same column, ignoring temporal bucketing.
    pub fn same_column(&self, other: &FieldRef) -> bool {
        self.without_temporal_unit() == other.without_temporal_unit()
    }

    fn map_options(self, f: impl FnOnce(&mut FieldOptions)) -> Self {
        match self {
            FieldRef::Field { id, mut options } => {
                f(&mut options);
                FieldRef::Field { id, options }
            }
            agg @ FieldRef::Aggregation(_) => agg,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            FieldRef::Field { id, options } => {
                Value::Array(vec!["field".into(), id.to_value(), options.to_value()])
            }
            FieldRef::Aggregation(index) => Value::Array(vec!["aggregation".into(), (*index).into()]),
        }
    }

    pub fn from_value(value: &Value) -> ExprResult<Self> {
        let (tag, args) = split_tag(value)?;
        match tag {
            "field" => {
                if args.is_empty() || args.len() > 2 {
                    return Err(ExprError::Arity {
                        tag: tag.to_string(),
                        expected: 2,
                        found: args.len(),
                    });
                }
                let id = match &args[0] {
                    Value::Number(n) => n
                        .as_i64()
                        .map(FieldId::Id)
                        .ok_or_else(|| invalid(tag, format!("bad field id {n}")))?,
                    Value::String(name) => FieldId::Name(name.clone()),
                    other => return Err(invalid(tag, format!("bad field id {other}"))),
                };
                let options = match args.get(1) {
                    Some(value) => FieldOptions::from_value(value)?,
                    None => FieldOptions::default(),
                };
                Ok(FieldRef::Field { id, options })
            }
            "aggregation" => {
                // A trailing options map is tolerated and ignored.
                if args.is_empty() || args.len() > 2 {
                    return Err(ExprError::Arity {
                        tag: tag.to_string(),
                        expected: 1,
                        found: args.len(),
                    });
                }
                let index = args[0]
                    .as_u64()
                    .and_then(|index| usize::try_from(index).ok())
                    .ok_or_else(|| invalid(tag, format!("bad index {}", args[0])))?;
                Ok(FieldRef::Aggregation(index))
            }
            other => Err(ExprError::UnknownTag {
                kind: "field reference",
                tag: other.to_string(),
            }),
        }
    }
}

impl TryFrom<Value> for FieldRef {
    type Error = ExprError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        FieldRef::from_value(&value)
    }
}

impl From<FieldRef> for Value {
    fn from(field_ref: FieldRef) -> Self {
        field_ref.to_value()
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

// =============================================================================
// Aggregations
// =============================================================================

/// An aggregation clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Aggregation {
    Count,
    CumulativeCount,
    Sum(FieldRef),
    Avg(FieldRef),
    Min(FieldRef),
    Max(FieldRef),
    Distinct(FieldRef),
    CumulativeSum(FieldRef),
    /// Any other aggregation clause, verbatim.
    Other(Value),
}

impl Aggregation {
    pub fn tag(&self) -> &str {
        match self {
            Aggregation::Count => "count",
            Aggregation::CumulativeCount => "cum-count",
            Aggregation::Sum(_) => "sum",
            Aggregation::Avg(_) => "avg",
            Aggregation::Min(_) => "min",
            Aggregation::Max(_) => "max",
            Aggregation::Distinct(_) => "distinct",
            Aggregation::CumulativeSum(_) => "cum-sum",
            Aggregation::Other(value) => split_tag(value).map(|(tag, _)| tag).unwrap_or_default(),
        }
    }

    /// Name of the result column this aggregation produces.
    ///
    /// `aggregation-options` may rename its column; otherwise it takes the
    /// name of the wrapped clause.
    pub fn column_name(&self) -> String {
        match self {
            Aggregation::Count | Aggregation::CumulativeCount | Aggregation::Distinct(_) => {
                "count".to_string()
            }
            Aggregation::Sum(_) | Aggregation::CumulativeSum(_) => "sum".to_string(),
            Aggregation::Avg(_) => "avg".to_string(),
            Aggregation::Min(_) => "min".to_string(),
            Aggregation::Max(_) => "max".to_string(),
            Aggregation::Other(value) => match split_tag(value) {
                Ok(("aggregation-options", [inner, rest @ ..])) => rest
                    .first()
                    .and_then(|options| options.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| Aggregation::from_value(inner).ok().map(|a| a.column_name()))
                    .unwrap_or_else(|| "aggregation".to_string()),
                Ok((tag, _)) => tag.to_string(),
                Err(_) => "aggregation".to_string(),
            },
        }
    }

    /// The aggregated column, if any.
    pub fn field(&self) -> Option<&FieldRef> {
        match self {
            Aggregation::Count | Aggregation::CumulativeCount | Aggregation::Other(_) => None,
            Aggregation::Sum(f)
            | Aggregation::Avg(f)
            | Aggregation::Min(f)
            | Aggregation::Max(f)
            | Aggregation::Distinct(f)
            | Aggregation::CumulativeSum(f) => Some(f),
        }
    }

    pub fn to_value(&self) -> Value {
        if let Aggregation::Other(value) = self {
            return value.clone();
        }
        let mut items = vec![Value::from(self.tag())];
        if let Some(field) = self.field() {
            items.push(field.to_value());
        }
        Value::Array(items)
    }

    pub fn from_value(value: &Value) -> ExprResult<Self> {
        let (tag, args) = split_tag(value)?;
        let field_arg = || -> ExprResult<FieldRef> {
            expect_arity(tag, args, 1)?;
            FieldRef::from_value(&args[0])
        };
        match tag {
            "count" => expect_arity(tag, args, 0).map(|_| Aggregation::Count),
            "cum-count" => expect_arity(tag, args, 0).map(|_| Aggregation::CumulativeCount),
            "sum" => field_arg().map(Aggregation::Sum),
            "avg" => field_arg().map(Aggregation::Avg),
            "min" => field_arg().map(Aggregation::Min),
            "max" => field_arg().map(Aggregation::Max),
            "distinct" => field_arg().map(Aggregation::Distinct),
            "cum-sum" => field_arg().map(Aggregation::CumulativeSum),
            _ => Ok(Aggregation::Other(value.clone())),
        }
    }
}

impl TryFrom<Value> for Aggregation {
    type Error = ExprError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Aggregation::from_value(&value)
    }
}

impl From<Aggregation> for Value {
    fn from(aggregation: Aggregation) -> Self {
        aggregation.to_value()
    }
}

// =============================================================================
// Filters
// =============================================================================

/// A filter clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Filter {
    /// Relative window: `amount` units back (negative) or forward from now.
    TimeInterval {
        field: FieldRef,
        amount: i64,
        unit: TemporalUnit,
    },
    Equals(FieldRef, Value),
    NotNull(FieldRef),
    And(Vec<Filter>),
    /// Any other filter clause (`or`, `>`, `between`, ...), verbatim.
    Other(Value),
}

impl Filter {
    pub fn time_interval(field: FieldRef, amount: i64, unit: TemporalUnit) -> Self {
        Filter::TimeInterval {
            field,
            amount,
            unit,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Filter::TimeInterval {
                field,
                amount,
                unit,
            } => Value::Array(vec![
                "time-interval".into(),
                field.to_value(),
                (*amount).into(),
                unit.as_str().into(),
            ]),
            Filter::Equals(field, literal) => {
                Value::Array(vec!["=".into(), field.to_value(), literal.clone()])
            }
            Filter::NotNull(field) => Value::Array(vec!["not-null".into(), field.to_value()]),
            Filter::And(clauses) => {
                let mut items = vec![Value::from("and")];
                items.extend(clauses.iter().map(Filter::to_value));
                Value::Array(items)
            }
            Filter::Other(value) => value.clone(),
        }
    }

    pub fn from_value(value: &Value) -> ExprResult<Self> {
        let (tag, args) = split_tag(value)?;
        match tag {
            "time-interval" => {
                expect_arity(tag, args, 3)?;
                let field = FieldRef::from_value(&args[0])?;
                let amount = args[1]
                    .as_i64()
                    .ok_or_else(|| invalid(tag, format!("bad amount {}", args[1])))?;
                let unit = args[2]
                    .as_str()
                    .and_then(TemporalUnit::from_str)
                    .ok_or_else(|| invalid(tag, format!("bad unit {}", args[2])))?;
                Ok(Filter::TimeInterval {
                    field,
                    amount,
                    unit,
                })
            }
            "=" => {
                expect_arity(tag, args, 2)?;
                Ok(Filter::Equals(FieldRef::from_value(&args[0])?, args[1].clone()))
            }
            "not-null" => {
                expect_arity(tag, args, 1)?;
                Ok(Filter::NotNull(FieldRef::from_value(&args[0])?))
            }
            "and" => {
                if args.len() < 2 {
                    return Err(ExprError::Arity {
                        tag: tag.to_string(),
                        expected: 2,
                        found: args.len(),
                    });
                }
                let clauses = args.iter().map(Filter::from_value).collect::<ExprResult<_>>()?;
                Ok(Filter::And(clauses))
            }
            _ => Ok(Filter::Other(value.clone())),
        }
    }

    /// Conjoin `other` onto this filter, flattening nested `and`s.
    pub fn and(self, other: Filter) -> Filter {
        let mut clauses = match self {
            Filter::And(clauses) => clauses,
            single => vec![single],
        };
        match other {
            Filter::And(more) => clauses.extend(more),
            single => clauses.push(single),
        }
        Filter::And(clauses)
    }
}

impl TryFrom<Value> for Filter {
    type Error = ExprError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Filter::from_value(&value)
    }
}

impl From<Filter> for Value {
    fn from(filter: Filter) -> Self {
        filter.to_value()
    }
}
