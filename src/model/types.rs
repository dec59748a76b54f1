//! Primitive model types shared by expressions, metadata and metrics.

use serde::{Deserialize, Serialize};

/// Identifier of a table in the injected metadata.
pub type TableId = i64;

/// Identifier of a saved question (card).
pub type CardId = i64;

/// Identifier of the collection a metric is filed under.
pub type CollectionId = i64;

/// Temporal units: truncation buckets and extraction units.
///
/// Truncation units (`day`, `month`, ...) bucket a timestamp into periods.
/// Extraction units (`day-of-week`, `quarter-of-year`, ...) pull out a cyclic
/// component and yield an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemporalUnit {
    Default,
    Minute,
    MinuteOfHour,
    Hour,
    HourOfDay,
    Day,
    DayOfWeek,
    DayOfMonth,
    DayOfYear,
    Week,
    WeekOfYear,
    Month,
    MonthOfYear,
    Quarter,
    QuarterOfYear,
    Year,
}

impl TemporalUnit {
    /// Parse a temporal unit from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(TemporalUnit::Default),
            "minute" => Some(TemporalUnit::Minute),
            "minute-of-hour" => Some(TemporalUnit::MinuteOfHour),
            "hour" => Some(TemporalUnit::Hour),
            "hour-of-day" => Some(TemporalUnit::HourOfDay),
            "day" => Some(TemporalUnit::Day),
            "day-of-week" => Some(TemporalUnit::DayOfWeek),
            "day-of-month" => Some(TemporalUnit::DayOfMonth),
            "day-of-year" => Some(TemporalUnit::DayOfYear),
            "week" => Some(TemporalUnit::Week),
            "week-of-year" => Some(TemporalUnit::WeekOfYear),
            "month" => Some(TemporalUnit::Month),
            "month-of-year" => Some(TemporalUnit::MonthOfYear),
            "quarter" => Some(TemporalUnit::Quarter),
            "quarter-of-year" => Some(TemporalUnit::QuarterOfYear),
            "year" => Some(TemporalUnit::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalUnit::Default => "default",
            TemporalUnit::Minute => "minute",
            TemporalUnit::MinuteOfHour => "minute-of-hour",
            TemporalUnit::Hour => "hour",
            TemporalUnit::HourOfDay => "hour-of-day",
            TemporalUnit::Day => "day",
            TemporalUnit::DayOfWeek => "day-of-week",
            TemporalUnit::DayOfMonth => "day-of-month",
            TemporalUnit::DayOfYear => "day-of-year",
            TemporalUnit::Week => "week",
            TemporalUnit::WeekOfYear => "week-of-year",
            TemporalUnit::Month => "month",
            TemporalUnit::MonthOfYear => "month-of-year",
            TemporalUnit::Quarter => "quarter",
            TemporalUnit::QuarterOfYear => "quarter-of-year",
            TemporalUnit::Year => "year",
        }
    }

    /// Whether the unit extracts a component rather than truncating.
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            TemporalUnit::MinuteOfHour
                | TemporalUnit::HourOfDay
                | TemporalUnit::DayOfWeek
                | TemporalUnit::DayOfMonth
                | TemporalUnit::DayOfYear
                | TemporalUnit::WeekOfYear
                | TemporalUnit::MonthOfYear
                | TemporalUnit::QuarterOfYear
        )
    }
}

impl std::fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column base types, in their `type/...` wire spelling.
///
/// Unrecognized types are preserved verbatim so metadata round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BaseType {
    Date,
    DateTime,
    DateTimeWithTZ,
    Time,
    Integer,
    BigInteger,
    Float,
    Decimal,
    Text,
    Boolean,
    Other(String),
}

impl BaseType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "type/Date" => BaseType::Date,
            "type/DateTime" => BaseType::DateTime,
            "type/DateTimeWithTZ" | "type/DateTimeWithLocalTZ" => BaseType::DateTimeWithTZ,
            "type/Time" => BaseType::Time,
            "type/Integer" => BaseType::Integer,
            "type/BigInteger" => BaseType::BigInteger,
            "type/Float" => BaseType::Float,
            "type/Decimal" => BaseType::Decimal,
            "type/Text" => BaseType::Text,
            "type/Boolean" => BaseType::Boolean,
            other => BaseType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BaseType::Date => "type/Date",
            BaseType::DateTime => "type/DateTime",
            BaseType::DateTimeWithTZ => "type/DateTimeWithTZ",
            BaseType::Time => "type/Time",
            BaseType::Integer => "type/Integer",
            BaseType::BigInteger => "type/BigInteger",
            BaseType::Float => "type/Float",
            BaseType::Decimal => "type/Decimal",
            BaseType::Text => "type/Text",
            BaseType::Boolean => "type/Boolean",
            BaseType::Other(s) => s,
        }
    }

    /// Calendar dates and timestamps. Time-of-day columns are not dates.
    pub fn is_date(&self) -> bool {
        matches!(
            self,
            BaseType::Date | BaseType::DateTime | BaseType::DateTimeWithTZ
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BaseType::Integer | BaseType::BigInteger | BaseType::Float | BaseType::Decimal
        )
    }
}

impl From<String> for BaseType {
    fn from(s: String) -> Self {
        BaseType::from_str(&s)
    }
}

impl From<BaseType> for String {
    fn from(t: BaseType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
