//! Integration tests for resolving field references into dimensions.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use metricize::model::{Aggregation, BaseType, FieldRef, TemporalUnit};
use metricize::query::{Dimension, StructuredQuery};

#[test]
fn test_parse_joined_column() {
    let query = signups_query();
    let dim = Dimension::parse(&joined_created_at(), query.metadata(), &query).unwrap();

    assert_eq!(dim.field().name, "created_at");
    assert!(dim.field().is_date());
    assert_eq!(dim.display_name(), "People → Created At");
}

#[test]
fn test_parse_keeps_bucketing() {
    let query = signups_query();
    let bucketed = joined_created_at().with_temporal_unit(TemporalUnit::Day);
    let dim = Dimension::parse(&bucketed, query.metadata(), &query).unwrap();

    assert_eq!(dim.temporal_unit(), Some(TemporalUnit::Day));
    assert_eq!(dim.to_field_ref(), bucketed);
    assert_eq!(dim.display_name(), "People → Created At: Day");
}

#[test]
fn test_parse_rejects_unknown_join() {
    let query = StructuredQuery::new(SIGNUPS, metadata());
    assert!(Dimension::parse(&joined_created_at(), query.metadata(), &query).is_none());
}

#[test]
fn test_parse_rejects_join_to_other_table() {
    // "People" exists but the field belongs to `events`.
    let query = signups_query();
    let wrong = FieldRef::field(EVENTS_OCCURRED_AT).with_join_alias("People");
    assert!(Dimension::parse(&wrong, query.metadata(), &query).is_none());
}

#[test]
fn test_parse_rejects_unknown_field() {
    let query = signups_query();
    assert!(Dimension::parse(&FieldRef::field(999), query.metadata(), &query).is_none());
}

#[test]
fn test_parse_foreign_key_requires_source_table() {
    let fk_ref = FieldRef::field(PEOPLE_CREATED_AT).with_source_field(ORDERS_CUSTOMER_ID);

    let orders = StructuredQuery::new(ORDERS, metadata());
    assert!(Dimension::parse(&fk_ref, orders.metadata(), &orders).is_some());

    let signups = signups_query();
    assert!(Dimension::parse(&fk_ref, signups.metadata(), &signups).is_none());
}

#[test]
fn test_parse_nested_references() {
    let inner = signups_query()
        .add_aggregation(Aggregation::Max(joined_created_at()))
        .add_breakout(FieldRef::field(2));
    let outer = StructuredQuery::nested(inner);
    let metadata = outer.metadata_handle();

    let plan = Dimension::parse(&FieldRef::named("plan", BaseType::Text), &metadata, &outer)
        .unwrap();
    assert_eq!(plan.field().base_type, BaseType::Text);

    let latest = Dimension::parse(&FieldRef::aggregation(0), &metadata, &outer).unwrap();
    assert_eq!(latest.field().name, "max");
    assert!(latest.field().is_date());

    assert!(Dimension::parse(&FieldRef::aggregation(1), &metadata, &outer).is_none());
    assert!(Dimension::parse(&FieldRef::named("missing", BaseType::Text), &metadata, &outer)
        .is_none());
}

#[test]
fn test_parse_repeated_breakout_by_suffixed_name() {
    let inner = signups_query()
        .add_aggregation(Aggregation::Count)
        .add_breakout(joined_created_at().with_temporal_unit(TemporalUnit::Month))
        .add_breakout(joined_created_at().with_temporal_unit(TemporalUnit::DayOfWeek));
    let outer = StructuredQuery::nested(inner);
    let metadata = outer.metadata_handle();

    let first = Dimension::parse(
        &FieldRef::named("created_at", BaseType::DateTime),
        &metadata,
        &outer,
    )
    .unwrap();
    assert!(first.field().is_date());

    let second = Dimension::parse(
        &FieldRef::named("created_at_2", BaseType::Integer),
        &metadata,
        &outer,
    )
    .unwrap();
    assert_eq!(second.field().name, "created_at_2");
    assert_eq!(second.field().base_type, BaseType::Integer);
    assert!(!second.field().is_date());
}

#[test]
fn test_aggregation_reference_needs_nested_source() {
    let query = signups_query().add_aggregation(Aggregation::Count);
    assert!(Dimension::parse(&FieldRef::aggregation(0), query.metadata(), &query).is_none());
}
