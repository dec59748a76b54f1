//! Tests for applying a metric back onto a question.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use metricize::config::{Environment, Settings};
use metricize::convert::{apply_metric, try_apply_metric, ApplyOptions, ConvertError};
use metricize::model::{Aggregation, FieldRef, Filter, Metric, MetricDimension, TemporalUnit};
use metricize::query::{Card, Question, StructuredQuery};
use serde_json::json;

fn signups_metric() -> Metric {
    Metric {
        id: Some(1),
        name: "42_metric".to_string(),
        display_name: "Weekly Signups Metric".to_string(),
        description: String::new(),
        archived: false,
        card_id: 42,
        measure: Aggregation::Count,
        dimensions: vec![MetricDimension::new("created_at", joined_created_at())],
        granularities: vec![],
        default_granularity: TemporalUnit::Month,
        collection_id: None,
    }
}

#[test]
fn test_production_adds_day_breakout_and_trailing_filter() {
    let question = weekly_signups();
    let applied = apply_metric(&question, &signups_metric(), &ApplyOptions::production()).unwrap();
    let query = applied.structured_query().unwrap();

    assert_eq!(
        query.breakouts(),
        &[joined_created_at().with_temporal_unit(TemporalUnit::Day)]
    );
    assert_eq!(
        query.filter(),
        Some(&Filter::time_interval(joined_created_at(), -30, TemporalUnit::Day))
    );
}

#[test]
fn test_development_adds_month_breakout_only() {
    let question = weekly_signups();
    let applied = apply_metric(&question, &signups_metric(), &ApplyOptions::development()).unwrap();
    let query = applied.structured_query().unwrap();

    assert_eq!(
        query.breakouts(),
        &[joined_created_at().with_temporal_unit(TemporalUnit::Month)]
    );
    assert_eq!(query.filter(), None);
}

#[test]
fn test_applied_question_keeps_identity_and_measure() {
    let question = weekly_signups();
    let applied = apply_metric(&question, &signups_metric(), &ApplyOptions::production()).unwrap();

    assert_eq!(applied.id(), question.id());
    assert_eq!(applied.display_name(), question.display_name());
    assert_eq!(
        applied.structured_query().unwrap().aggregations(),
        &[Aggregation::Count]
    );
}

#[test]
fn test_original_question_is_untouched() {
    let question = weekly_signups();
    let before = question.clone();

    apply_metric(&question, &signups_metric(), &ApplyOptions::production()).unwrap();

    assert_eq!(question, before);
    assert!(question.structured_query().unwrap().breakouts().is_empty());
}

#[test]
fn test_existing_filter_is_conjoined() {
    let query = signups_query()
        .add_aggregation(Aggregation::Count)
        .add_filter(Filter::Equals(FieldRef::field(2), "pro".into()));
    let question = Question::structured(43, "Pro signups", query);

    let applied = apply_metric(&question, &signups_metric(), &ApplyOptions::production()).unwrap();

    assert_eq!(
        applied.structured_query().unwrap().filter(),
        Some(&Filter::And(vec![
            Filter::Equals(FieldRef::field(2), "pro".into()),
            Filter::time_interval(joined_created_at(), -30, TemporalUnit::Day),
        ]))
    );
}

#[test]
fn test_unknown_field_yields_none() {
    let question = weekly_signups();
    let mut metric = signups_metric();
    metric.dimensions = vec![MetricDimension::new("deleted_col", FieldRef::field(999))];

    assert_eq!(
        apply_metric(&question, &metric, &ApplyOptions::production()),
        None
    );
    assert_eq!(
        try_apply_metric(&question, &metric, &ApplyOptions::production()).unwrap_err(),
        ConvertError::UnresolvableReference(FieldRef::field(999))
    );
}

#[test]
fn test_missing_join_yields_none() {
    // Same table, but without the "People" join the stored reference is stale.
    let query = StructuredQuery::new(SIGNUPS, metadata()).add_aggregation(Aggregation::Count);
    let question = Question::structured(42, "Weekly Signups", query);
    let before = question.clone();

    assert_eq!(
        apply_metric(&question, &signups_metric(), &ApplyOptions::development()),
        None
    );
    assert_eq!(question, before);
}

#[test]
fn test_metric_without_dimension_yields_none() {
    let mut metric = signups_metric();
    metric.dimensions.clear();

    assert_eq!(
        try_apply_metric(&weekly_signups(), &metric, &ApplyOptions::production()).unwrap_err(),
        ConvertError::MissingDimension
    );
}

#[test]
fn test_native_question_yields_none() {
    let question = Question::native(42, "Raw", "SELECT 1");
    assert_eq!(
        try_apply_metric(&question, &signups_metric(), &ApplyOptions::production()).unwrap_err(),
        ConvertError::NotStructured
    );
}

#[test]
fn test_options_from_settings() {
    let settings = Settings {
        environment: Environment::Production,
        ..Settings::default()
    };
    assert_eq!(ApplyOptions::from_settings(&settings), ApplyOptions::production());
}

#[test]
fn test_production_card_wire_form() {
    let question = weekly_signups();
    let applied = apply_metric(&question, &signups_metric(), &ApplyOptions::production()).unwrap();
    let json = serde_json::to_string(&applied.to_card().dataset_query).unwrap();

    insta::assert_snapshot!(json, @r#"{"type":"query","query":{"source-table":1,"joins":[{"alias":"People","source-table":2,"condition":["=",["field",3,null],["field",10,{"join-alias":"People"}]]}],"aggregation":[["count"]],"breakout":[["field",11,{"join-alias":"People","temporal-unit":"day"}]],"filter":["time-interval",["field",11,{"join-alias":"People"}],-30,"day"]}}"#);
}

#[test]
fn test_applied_card_differs_only_by_breakout_and_filter() {
    let mut raw = json!({
        "id": 42,
        "name": "Weekly Signups",
        "display": "table",
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
                    "fields": "none"
                }],
                "aggregation": [["count"]],
                "filter": ["or", ["=", ["field", 2, null], "pro"], [">", ["field", 1, null], 100]],
                "order-by": [["desc", ["aggregation", 0]]],
                "limit": 10
            }
        }
    });
    let card: Card = serde_json::from_value(raw.clone()).unwrap();
    let question = Question::from_card(card, metadata()).unwrap();

    let applied = apply_metric(&question, &signups_metric(), &ApplyOptions::production()).unwrap();

    let query = &mut raw["dataset_query"]["query"];
    query["breakout"] = json!([["field", 11, {"join-alias": "People", "temporal-unit": "day"}]]);
    query["filter"] = json!([
        "and",
        ["or", ["=", ["field", 2, null], "pro"], [">", ["field", 1, null], 100]],
        ["time-interval", ["field", 11, {"join-alias": "People"}], -30, "day"]
    ]);
    assert_eq!(serde_json::to_value(applied.to_card()).unwrap(), raw);
}
