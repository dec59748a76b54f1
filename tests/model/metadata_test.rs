//! Integration tests for metadata and metric loading.

use metricize::model::loader::{load_metadata, load_metric, LoadError};
use metricize::model::{BaseType, TemporalUnit};
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("metricize_{}_{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_metadata() {
    let path = write_temp(
        "metadata.json",
        r#"{
            "tables": [{"id": 1, "name": "order_items", "schema": "public"}],
            "fields": [
                {"id": 1, "table_id": 1, "name": "id", "base_type": "type/Integer"},
                {"id": 2, "table_id": 1, "name": "shipped_on", "base_type": "type/Date",
                 "display_name": "Ship Date"},
                {"id": 3, "table_id": 1, "name": "product_id", "base_type": "type/Integer",
                 "fk_target_field_id": 40}
            ]
        }"#,
    );

    let metadata = load_metadata(&path).unwrap();
    fs::remove_file(&path).ok();

    let table = metadata.table(1).unwrap();
    assert_eq!(table.display_name(), "Order Items");
    assert_eq!(table.schema.as_deref(), Some("public"));

    let shipped = metadata.field(2).unwrap();
    assert!(shipped.is_date());
    assert_eq!(shipped.base_type, BaseType::Date);
    assert_eq!(shipped.display_name(), "Ship Date");

    assert!(metadata.field(3).unwrap().is_foreign_key());
    assert_eq!(metadata.table_fields(1).count(), 3);
    assert!(metadata.field(40).is_none());
}

#[test]
fn test_load_metric() {
    let path = write_temp(
        "metric.json",
        r#"{
            "id": 3,
            "name": "42_metric",
            "display_name": "Weekly Signups Metric",
            "description": "",
            "archived": false,
            "card_id": 42,
            "measure": ["count"],
            "dimensions": [["created_at", ["field", 11, {"join-alias": "People"}]]],
            "granularities": ["day", "month"],
            "default_granularity": "month",
            "collection_id": null
        }"#,
    );

    let metric = load_metric(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(metric.id, Some(3));
    assert_eq!(
        metric.granularities,
        vec![TemporalUnit::Day, TemporalUnit::Month]
    );
    assert_eq!(
        metric.date_dimension().unwrap().field_ref().join_alias(),
        Some("People")
    );
}

#[test]
fn test_load_metric_with_bad_dimension() {
    let path = write_temp(
        "bad_metric.json",
        r#"{
            "name": "x", "display_name": "x", "card_id": 1,
            "measure": ["median", ["field", 1, null]],
            "dimensions": [["created_at", ["field", 11, {"temporal-unit": "fortnight"}]]],
            "default_granularity": "month", "collection_id": null
        }"#,
    );

    let err = load_metric(&path).unwrap_err();
    fs::remove_file(&path).ok();

    assert!(matches!(err, LoadError::Json { .. }));
    assert!(err.to_string().contains("fortnight"));
}
