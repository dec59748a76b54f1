//! Integration tests for structured queries and saved-question cards.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use metricize::model::{Aggregation, BaseType, FieldRef, TemporalUnit};
use metricize::query::{Card, CardError, Question, StructuredQuery};
use serde_json::json;

fn refs(query: &StructuredQuery) -> Vec<FieldRef> {
    query
        .dimension_options()
        .into_iter()
        .map(|dim| dim.to_field_ref())
        .collect()
}

#[test]
fn test_dimension_options_include_joined_columns() {
    let options = refs(&signups_query());

    assert_eq!(
        options,
        vec![
            FieldRef::field(1),
            FieldRef::field(2),
            FieldRef::field(SIGNUPS_PERSON_ID),
            FieldRef::field(PEOPLE_ID).with_join_alias("People"),
            joined_created_at(),
            FieldRef::field(12).with_join_alias("People"),
        ]
    );
}

#[test]
fn test_dimension_options_follow_foreign_keys() {
    let query = order_revenue();
    let options = refs(query.structured_query().unwrap());

    assert_eq!(options.len(), 6);
    assert_eq!(options[0], FieldRef::field(30));
    assert_eq!(
        options[4],
        FieldRef::field(PEOPLE_CREATED_AT).with_source_field(ORDERS_CUSTOMER_ID)
    );
}

#[test]
fn test_nested_dimensions_are_result_columns() {
    let inner = signups_query()
        .add_aggregation(Aggregation::Count)
        .add_breakout(joined_created_at().with_temporal_unit(TemporalUnit::Month));
    let outer = StructuredQuery::nested(inner);

    let dims = outer.dimensions();
    assert_eq!(dims.len(), 2);
    assert_eq!(
        dims[0].to_field_ref(),
        FieldRef::named("created_at", BaseType::DateTime)
    );
    assert!(dims[0].field().is_date());
    assert_eq!(dims[1].to_field_ref(), FieldRef::aggregation(0));
    assert_eq!(dims[1].field().name, "count");
    assert_eq!(outer.source_table_id(), None);
}

#[test]
fn test_card_round_trip() {
    let raw = json!({
        "id": 42,
        "name": "Weekly Signups",
        "dataset_query": {
            "type": "query",
            "database": 1,
            "query": {
                "source-table": 1,
                "joins": [{
                    "alias": "People",
                    "source-table": 2,
                    "condition": ["=", ["field", 3, null], ["field", 10, {"join-alias": "People"}]]
                }],
                "aggregation": [["count"]]
            }
        }
    });

    let card: Card = serde_json::from_value(raw.clone()).unwrap();
    let question = Question::from_card(card, metadata()).unwrap();

    assert_eq!(question.id(), 42);
    let query = question.structured_query().unwrap();
    assert_eq!(query.source_table_id(), Some(SIGNUPS));
    assert_eq!(query.aggregations(), &[Aggregation::Count]);
    assert!(query.join("People").is_some());

    assert_eq!(serde_json::to_value(question.to_card()).unwrap(), raw);
}

#[test]
fn test_card_keeps_uninterpreted_clauses() {
    let raw = json!({
        "id": 42,
        "name": "Top plans",
        "display": "bar",
        "dataset_query": {
            "type": "query",
            "database": 1,
            "query": {
                "source-table": 1,
                "joins": [{
                    "alias": "People",
                    "source-table": 2,
                    "condition": ["=", ["field", 3, null], ["field", 10, {"join-alias": "People"}]],
                    "strategy": "inner-join",
                    "fields": "all"
                }],
                "aggregation": [["count"]],
                "breakout": [["field", 2, null]],
                "order-by": [["desc", ["aggregation", 0]]],
                "limit": 10
            }
        }
    });

    let card: Card = serde_json::from_value(raw.clone()).unwrap();
    let question = Question::from_card(card, metadata()).unwrap();
    let query = question.structured_query().unwrap();

    let join = query.join("People").unwrap();
    assert_eq!(join.extra.get("strategy"), Some(&json!("inner-join")));
    assert_eq!(query.extra().get("limit"), Some(&json!(10)));

    assert_eq!(serde_json::to_value(question.to_card()).unwrap(), raw);
}

#[test]
fn test_nested_card_keeps_inner_clauses() {
    let raw = json!({
        "id": 12,
        "name": "Nested",
        "dataset_query": {
            "type": "query",
            "query": {
                "source-query": {
                    "source-table": 3,
                    "expressions": {"double_id": ["*", ["field", 20, null], 2]},
                    "fields": [["field", 20, null]]
                },
                "aggregation": [["count"]]
            }
        }
    });

    let card: Card = serde_json::from_value(raw.clone()).unwrap();
    let question = Question::from_card(card, metadata()).unwrap();

    assert_eq!(serde_json::to_value(question.to_card()).unwrap(), raw);
}

#[test]
fn test_native_card() {
    let raw = json!({
        "id": 8,
        "name": "Raw SQL",
        "dataset_query": {"type": "native", "native": {"query": "SELECT 1"}}
    });
    let card: Card = serde_json::from_value(raw).unwrap();
    let question = Question::from_card(card, metadata()).unwrap();

    assert!(!question.is_structured());
    assert!(question.structured_query().is_none());
}

#[test]
fn test_card_source_errors() {
    let card = |query: serde_json::Value| -> Card {
        serde_json::from_value(json!({
            "id": 1,
            "name": "Broken",
            "dataset_query": {"type": "query", "query": query}
        }))
        .unwrap()
    };

    assert_eq!(
        Question::from_card(card(json!({})), metadata()).unwrap_err(),
        CardError::MissingSource
    );
    assert_eq!(
        Question::from_card(
            card(json!({"source-table": 1, "source-query": {"source-table": 1}})),
            metadata()
        )
        .unwrap_err(),
        CardError::AmbiguousSource
    );
    assert_eq!(
        Question::from_card(card(json!({"source-table": 99})), metadata()).unwrap_err(),
        CardError::UnknownTable(99)
    );
}
