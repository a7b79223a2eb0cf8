// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the diagnostic engine
//!
//! These tests verify that:
//! - Valid text yields no diagnostics
//! - The truncation loop terminates on pathological input
//! - Completions are emitted exactly once per concept
//! - Imports are reported as written

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use trilogy_studio_catalog::ImportDirective;
use trilogy_studio_engine::{EngineConfig, Severity, get_diagnostics, validate_query};
use trilogy_studio_test_utils::ModelFixtures;

fn labels(text: &str) -> Vec<String> {
    get_diagnostics(text, &ModelFixtures::all_sources(), &EngineConfig::default())
        .completions
        .into_iter()
        .map(|c| c.label)
        .collect()
}

#[test]
fn test_valid_input_has_no_diagnostics() {
    let text = format!("import shop;\n{}", ModelFixtures::revenue_by_region());
    let response = get_diagnostics(&text, &ModelFixtures::shop_sources(), &EngineConfig::default());

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(response.imports, vec![ImportDirective::new("shop")]);
    assert!(response.completions.iter().any(|c| c.label == "region_revenue"));
}

#[test]
fn test_empty_text() {
    let response = get_diagnostics("", &ModelFixtures::shop_sources(), &EngineConfig::default());
    assert!(response.diagnostics.is_empty());
    assert!(response.completions.is_empty());
    assert!(response.imports.is_empty());
}

#[test]
fn test_recoverable_error_is_positioned() {
    let response = get_diagnostics(
        "import shop;\nselect ,;\nselect order_id;",
        &ModelFixtures::shop_sources(),
        &EngineConfig::default(),
    );

    assert_eq!(response.diagnostics.len(), 1);
    let item = &response.diagnostics[0];
    assert_eq!(item.start_line_number, 2);
    assert_eq!(item.severity, Severity::Error);
    assert!(item.message.starts_with("Unexpected token ','"), "{}", item.message);
    assert!(response.completions.iter().any(|c| c.label == "order_id"));
}

#[test]
fn test_incomplete_tail_still_completes() {
    let text = format!("import shop;\n{}", ModelFixtures::incomplete_query());
    let response = get_diagnostics(&text, &ModelFixtures::shop_sources(), &EngineConfig::default());

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let labels: Vec<&str> = response.completions.iter().map(|c| c.label.as_str()).collect();
    assert!(labels.contains(&"threshold"));
    assert!(labels.contains(&"revenue"));
}

#[test]
fn test_truncation_terminates_on_unterminated_string() {
    let mut text = String::from("select 'never closed");
    for _ in 0..500 {
        text.push_str("; select order_id");
    }

    let response = get_diagnostics(&text, &ModelFixtures::shop_sources(), &EngineConfig::default());

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.completions.is_empty());
    assert!(response.imports.is_empty());
}

#[test]
fn test_truncation_terminates_on_terminator_runs() {
    let text = format!("import shop;\nselect order_id where{}", ";".repeat(10_000));
    let response = get_diagnostics(&text, &ModelFixtures::shop_sources(), &EngineConfig::default());

    assert_eq!(response.imports, vec![ImportDirective::new("shop")]);
    assert!(response.completions.iter().any(|c| c.label == "order_id"));
}

#[test]
fn test_deep_nesting_is_a_diagnostic() {
    let text = format!("select {}order_id{};", "(".repeat(5_000), ")".repeat(5_000));
    let response = get_diagnostics(&text, &ModelFixtures::shop_sources(), &EngineConfig::default());

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0].message.contains("nested deeper than"));

    let minus = format!("import shop;\nselect {}amount;", "- ".repeat(5_000));
    let response = get_diagnostics(&minus, &ModelFixtures::shop_sources(), &EngineConfig::default());
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert!(response.completions.iter().any(|c| c.label == "amount"));
}

#[test]
fn test_retry_budget_is_respected() {
    let config = EngineConfig {
        max_truncation_retries: 1,
        ..EngineConfig::default()
    };
    let text = format!("import shop;\n{}", ModelFixtures::incomplete_query());
    let response = get_diagnostics(&text, &ModelFixtures::shop_sources(), &config);

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.completions.is_empty());
}

#[test]
fn test_completion_labels_are_unique() {
    let labels = labels("import shop;\nconst threshold <- 5;");

    let unique: HashSet<&String> = labels.iter().collect();
    assert_eq!(unique.len(), labels.len(), "{labels:?}");
    assert!(labels.contains(&"threshold".to_string()));
    assert!(labels.contains(&"revenue".to_string()));
    assert!(!labels.iter().any(|l| l.contains("_load_id")));
}

#[test]
fn test_aliased_import_labels() {
    let response = get_diagnostics(
        "import shop as s;",
        &ModelFixtures::shop_sources(),
        &EngineConfig::default(),
    );

    assert_eq!(response.imports, vec![ImportDirective::new("shop").with_alias("s")]);
    let revenue = response
        .completions
        .iter()
        .find(|c| c.label == "s.revenue")
        .expect("aliased metric");
    assert_eq!(revenue.calculation_text.as_deref(), Some("sum(s.amount)"));
    assert_eq!(revenue.description.as_deref(), Some("total order value"));
}

#[test]
fn test_property_completion_carries_keys() {
    let response = get_diagnostics("import shop;", &ModelFixtures::shop_sources(), &EngineConfig::default());
    let status = response
        .completions
        .iter()
        .find(|c| c.label == "status")
        .expect("status property");
    assert_eq!(status.keys, vec!["local.order_id".to_string()]);
    assert_eq!(status.datatype, "string");
}

#[test]
fn test_failing_import_is_still_listed() {
    let response = get_diagnostics(
        "import missing;\nconst threshold <- 5;",
        &ModelFixtures::shop_sources(),
        &EngineConfig::default(),
    );

    assert!(response.diagnostics.is_empty());
    assert_eq!(response.imports, vec![ImportDirective::new("missing")]);
    assert_eq!(
        response.completions.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        vec!["threshold"]
    );
}

#[test]
fn test_semantic_errors_are_not_diagnostics() {
    let response = get_diagnostics(
        "import shop;\nselect not_a_concept;",
        &ModelFixtures::shop_sources(),
        &EngineConfig::default(),
    );
    assert!(response.diagnostics.is_empty());
    assert!(!response.completions.is_empty());
}

#[test]
fn test_response_json_shape() {
    let response = get_diagnostics(
        "select ,;",
        &ModelFixtures::shop_sources(),
        &EngineConfig::default(),
    );
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["diagnostics"][0]["startLineNumber"], 1);
    assert_eq!(value["diagnostics"][0]["severity"], 8);
    assert!(value["completions"].as_array().unwrap().is_empty());
    assert!(value["imports"].as_array().unwrap().is_empty());
}

#[test]
fn test_validate_reports_imports_and_filters() {
    let response = validate_query(
        "select region, revenue;",
        &ModelFixtures::shop_sources(),
        &[ImportDirective::new("shop")],
        &["status = 'complete'".to_string(), "amount >".to_string()],
        &EngineConfig::default(),
    );

    assert_eq!(response.imports, vec![ImportDirective::new("shop")]);
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].start_line_number, 0);
    assert_eq!(response.diagnostics[0].end_column, 0);
}
