// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the batch query compiler
//!
//! These tests verify that:
//! - Results match the input fragments in order and length
//! - Fragments are isolated from each other's local concepts and failures
//! - Extra filters and parameters reach every target select
//! - The default row limit applies only when no limit is given

use pretty_assertions::assert_eq;
use trilogy_studio_catalog::{ImportDirective, SourceFragment};
use trilogy_studio_engine::{
    BatchRequest, CompiledResult, EngineConfig, EngineError, FailureRecovery, FilterError,
    QueryError, QueryFragment, QueryRequest, compile_batch, compile_single, format_query,
    parse_model,
};
use trilogy_studio_ir::{DataType, Dialect, Purpose};
use trilogy_studio_test_utils::{ModelFixtures, SqlAssertions};

fn shop_request() -> BatchRequest {
    BatchRequest::new(ModelFixtures::shop_sources())
        .with_import(ImportDirective::new("shop"))
        .with_dialect(Dialect::DuckDB)
}

fn compile(request: &BatchRequest) -> Vec<CompiledResult> {
    compile_batch(request, &EngineConfig::default()).unwrap()
}

fn sql(result: &CompiledResult) -> &str {
    assert!(result.is_ok(), "{:?}", result.error);
    result.sql.as_deref().expect("expected SQL")
}

#[test]
fn test_independent_fragments_share_the_model() {
    let request = BatchRequest::new(ModelFixtures::facts_sources())
        .with_import(ImportDirective::new("facts"))
        .with_query(QueryFragment::new("n", "SELECT count(x) as n;"))
        .with_query(QueryFragment::new("total", "SELECT sum(y) as total;"));

    let results = compile(&request);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label, "n");
    let names: Vec<Vec<&str>> = results
        .iter()
        .map(|r| r.output_columns.iter().map(|c| c.name.as_str()).collect())
        .collect();
    assert_eq!(names, vec![vec!["n"], vec!["total"]]);

    SqlAssertions::assert_contains(sql(&results[0]), "COUNT(facts.x) AS n");
    SqlAssertions::assert_not_contains(sql(&results[0]), "total");
    SqlAssertions::assert_contains(sql(&results[1]), "SUM(facts.y) AS total");
    SqlAssertions::assert_not_contains(sql(&results[1]), "AS n");
}

#[test]
fn test_order_is_preserved_when_a_fragment_fails() {
    let request = shop_request()
        .with_query(QueryFragment::new("first", "select order_id;"))
        .with_query(QueryFragment::new("broken", "select no_such_concept;"))
        .with_query(QueryFragment::new("syntax", "select ,;"))
        .with_query(QueryFragment::new("last", "select status;"));

    let results = compile(&request);

    let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["first", "broken", "syntax", "last"]);
    assert!(results[0].is_ok());
    assert!(results[1].sql.is_none());
    assert!(
        results[1].error.as_deref().unwrap().contains("no_such_concept"),
        "{:?}",
        results[1].error
    );
    assert!(results[2].error.is_some());
    SqlAssertions::assert_contains(sql(&results[3]), "orders_table.status AS status");
}

#[test]
fn test_local_concepts_do_not_leak_between_fragments() {
    let request = shop_request()
        .with_query(QueryFragment::new("a", "select order_id, amount * 2 as x;"))
        .with_query(QueryFragment::new("b", "select order_id, status as x;"));

    let results = compile(&request);

    assert!(results.iter().all(CompiledResult::is_ok), "{results:?}");
    assert_eq!(results[0].output_columns[1].name, "x");
    assert_eq!(results[1].output_columns[1].name, "x");
    assert_eq!(results[1].output_columns[1].datatype, DataType::String);
}

#[test]
fn test_without_cleanup_alias_reuse_is_shadowing() {
    let request = shop_request()
        .with_query(QueryFragment::new("a", "select order_id, amount * 2 as x;"))
        .with_query(QueryFragment::new("b", "select order_id, status as x;"));
    let config = EngineConfig::default().with_cleanup(false);

    let results = compile_batch(&request, &config).unwrap();

    assert!(results[0].is_ok());
    assert!(results[1].error.is_some());
}

#[test]
fn test_output_column_metadata() {
    let request = shop_request().with_query(QueryFragment::new(
        "q",
        "select order_id, amount, revenue;",
    ));

    let results = compile(&request);
    let columns = &results[0].output_columns;

    assert_eq!(columns[0].purpose, Purpose::Key);
    assert_eq!(columns[1].traits, vec!["money".to_string()]);
    assert_eq!(columns[1].description.as_deref(), Some("order value in dollars"));
    assert_eq!(columns[2].purpose, Purpose::Metric);
}

#[test]
fn test_extra_filters_are_conjoined() {
    let request = shop_request()
        .with_filter("status = 'complete'")
        .with_filter("amount > 100")
        .with_query(QueryFragment::new("q", "select order_id;"));

    let results = compile(&request);

    SqlAssertions::assert_contains(
        sql(&results[0]),
        "WHERE (orders_table.status = 'complete') AND (orders_table.amount > 100)",
    );
}

#[test]
fn test_fragment_filter_precedes_request_filter() {
    let request = shop_request()
        .with_filter("amount > 100")
        .with_query(
            QueryFragment::new("q", "where order_id > 5 select order_id;")
                .with_filter("status = 'complete'"),
        )
        .with_query(QueryFragment::new("plain", "select order_id;"));

    let results = compile(&request);

    let filtered = SqlAssertions::normalize(sql(&results[0]));
    let existing = filtered.find("orders_table.id > 5").unwrap();
    let fragment = filtered.find("orders_table.status = 'complete'").unwrap();
    let global = filtered.find("orders_table.amount > 100").unwrap();
    assert!(existing < fragment && fragment < global, "{filtered}");

    SqlAssertions::assert_not_contains(sql(&results[1]), "status");
    SqlAssertions::assert_contains(sql(&results[1]), "orders_table.amount > 100");
}

#[test]
fn test_parameters_become_constants() {
    let request = shop_request()
        .with_filter("amount > :min_amount and status = :wanted")
        .with_parameter(":min_amount", 100_i64)
        .with_parameter(":wanted", "complete")
        .with_query(QueryFragment::new("q", "select order_id;"));

    let results = compile(&request);

    SqlAssertions::assert_contains(sql(&results[0]), "orders_table.amount > 100");
    SqlAssertions::assert_contains(sql(&results[0]), "orders_table.status = 'complete'");
}

#[test]
fn test_fragment_parameters() {
    let request = shop_request().with_query(
        QueryFragment::new("q", "select order_id;")
            .with_filter("amount >= :floor")
            .with_parameter(":floor", 2.5_f64),
    );

    let results = compile(&request);

    SqlAssertions::assert_contains(sql(&results[0]), "orders_table.amount >= 2.5");
}

#[test]
fn test_fragment_parameters_do_not_leak() {
    let request = shop_request()
        .with_filter("region = :r")
        .with_parameter(":r", "west")
        .with_query(
            QueryFragment::new("a", "select order_id;")
                .with_filter("status = :r")
                .with_parameter(":r", "east"),
        )
        .with_query(QueryFragment::new("b", "select order_id;"))
        .with_query(QueryFragment::new("c", "select order_id where status = r;"));

    let results = compile(&request);

    SqlAssertions::assert_contains(sql(&results[0]), "orders_table.status = 'east'");
    SqlAssertions::assert_contains(sql(&results[0]), "customers_table.region = 'west'");
    SqlAssertions::assert_not_contains(sql(&results[0]), "region = 'east'");
    SqlAssertions::assert_contains(sql(&results[1]), "customers_table.region = 'west'");
    SqlAssertions::assert_not_contains(sql(&results[1]), "'east'");
    assert!(results[2].error.as_deref().unwrap().contains("Undefined concept"));
}

#[test]
fn test_deeply_nested_fragment_fails_alone() {
    let nested = format!("select order_id where amount > {}1{};", "(".repeat(5_000), ")".repeat(5_000));
    let request = shop_request()
        .with_query(QueryFragment::new("deep", nested))
        .with_query(QueryFragment::new("plain", "select order_id;"));

    let results = compile(&request);

    assert!(results[0].error.as_deref().unwrap().contains("nested deeper than"));
    assert!(results[1].is_ok());
}

#[test]
fn test_triple_quoted_request_parameter_fails_setup() {
    let request = shop_request()
        .with_filter("status = :wanted")
        .with_parameter(":wanted", "a''' or 1=1 --")
        .with_query(QueryFragment::new("q", "select order_id;"));

    let err = compile_batch(&request, &EngineConfig::default()).unwrap_err();

    assert!(
        matches!(err, EngineError::Filter(FilterError::TripleQuote { ref parameter }) if parameter == "wanted"),
        "{err:?}"
    );
}

#[test]
fn test_triple_quoted_fragment_parameter_fails_only_that_fragment() {
    let request = shop_request()
        .with_query(
            QueryFragment::new("bad", "select order_id;")
                .with_filter("status = :wanted")
                .with_parameter(":wanted", "'''"),
        )
        .with_query(QueryFragment::new("good", "select order_id;"));

    let results = compile(&request);

    assert!(results[0].error.as_deref().unwrap().contains("triple quotes"));
    assert!(results[1].is_ok());
}

#[test]
fn test_default_limit_applied() {
    let request = shop_request().with_query(QueryFragment::new("q", "select order_id;"));
    SqlAssertions::assert_limit(sql(&compile(&request)[0]), 10_000);
}

#[test]
fn test_explicit_limit_untouched() {
    let request = shop_request().with_query(QueryFragment::new("q", "select order_id limit 5;"));
    let results = compile(&request);

    SqlAssertions::assert_limit(sql(&results[0]), 5);
    SqlAssertions::assert_not_contains(sql(&results[0]), "10000");
}

#[test]
fn test_configured_limit_and_dialect() {
    let request = shop_request()
        .with_dialect(Dialect::SqlServer)
        .with_query(QueryFragment::new("q", "select order_id;"));
    let config = EngineConfig::default().with_default_limit(50);

    let results = compile_batch(&request, &config).unwrap();

    assert!(sql(&results[0]).starts_with("SELECT TOP 50"), "{}", sql(&results[0]));
}

#[test]
fn test_multi_select_filters_each_select() {
    let text = "select order_date, count(order_id) as orders_n \
                merge select order_date, sum(amount) as total \
                align order_day: order_date, order_date;";
    let request = shop_request()
        .with_filter("status = 'complete'")
        .with_query(QueryFragment::new("merged", text));

    let results = compile(&request);
    let normalized = SqlAssertions::normalize(sql(&results[0]));

    assert_eq!(normalized.matches("orders_table.status = 'complete'").count(), 2);
    SqlAssertions::assert_limit(sql(&results[0]), 10_000);
    let names: Vec<&str> = results[0].output_columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["order_day", "orders_n", "total"]);
}

#[test]
fn test_persist_gets_default_limit() {
    let request = shop_request().with_query(QueryFragment::new(
        "p",
        "persist big into shop.big from select order_id;",
    ));

    let results = compile(&request);

    assert!(sql(&results[0]).starts_with("CREATE OR REPLACE TABLE shop.big AS"));
    SqlAssertions::assert_limit(sql(&results[0]), 10_000);
}

#[test]
fn test_raw_sql_is_passed_through() {
    let request = shop_request()
        .with_filter("amount > 100")
        .with_query(QueryFragment::new("raw", "raw_sql('''select 42''');"));

    let results = compile(&request);

    assert_eq!(results[0].sql.as_deref(), Some("select 42"));
    assert!(results[0].output_columns.is_empty());
}

#[test]
fn test_introspection_results() {
    let request = shop_request()
        .with_query(QueryFragment::new("concepts", "show concepts;"))
        .with_query(QueryFragment::new("query", "show select order_id;"))
        .with_query(QueryFragment::new("validate", "validate all;"));

    let results = compile(&request);

    assert!(results[0].sql.is_none());
    let concepts = results[0].results.as_ref().unwrap();
    assert_eq!(concepts.columns[0], "address");
    assert!(concepts.rows.iter().any(|r| r[0] == "local.revenue"));

    SqlAssertions::assert_contains(sql(&results[1]), "orders_table.id AS order_id");
    assert!(results[1].results.is_some());

    let validation = results[2].results.as_ref().unwrap();
    assert!(validation.rows.iter().all(|r| r[2] == "ok"));
}

#[test]
fn test_declarations_and_blank_fragments_produce_nothing() {
    let request = shop_request()
        .with_query(QueryFragment::new("blank", "   \n"))
        .with_query(QueryFragment::new("decl", "const cutoff <- 10"));

    let results = compile(&request);

    for result in &results {
        assert!(result.is_ok());
        assert!(result.sql.is_none());
        assert!(result.output_columns.is_empty());
    }
}

#[test]
fn test_rollback_discards_failed_fragment_state() {
    let request = shop_request()
        .with_query(QueryFragment::new("bad", "const tmp <- 5;\nselect missing;"))
        .with_query(QueryFragment::new("uses", "select order_id where amount > tmp;"));

    let results = compile(&request);

    assert!(results[0].error.is_some());
    assert!(results[1].error.as_deref().unwrap().contains("tmp"));
}

#[test]
fn test_declarations_persist_across_fragments() {
    let request = shop_request()
        .with_query(QueryFragment::new("decl", "const tmp <- 5;"))
        .with_query(QueryFragment::new("broken", "select missing;"))
        .with_query(QueryFragment::new("uses", "select order_id where amount > tmp;"));

    let results = compile(&request);

    SqlAssertions::assert_contains(sql(&results[2]), "orders_table.amount > 5");
}

#[test]
fn test_rebuild_recovery_resets_environment() {
    let request = shop_request()
        .with_query(QueryFragment::new("decl", "const tmp <- 5;"))
        .with_query(QueryFragment::new("broken", "select missing;"))
        .with_query(QueryFragment::new("uses", "select order_id where amount > tmp;"))
        .with_query(QueryFragment::new("plain", "select order_id;"));
    let config = EngineConfig::default().with_failure_recovery(FailureRecovery::Rebuild);

    let results = compile_batch(&request, &config).unwrap();

    assert!(results[0].is_ok());
    assert!(results[1].error.is_some());
    assert!(results[2].error.as_deref().unwrap().contains("tmp"));
    assert!(results[3].is_ok());
}

#[test]
fn test_unknown_import_fails_setup() {
    let request = BatchRequest::new(ModelFixtures::shop_sources())
        .with_import(ImportDirective::new("nowhere"))
        .with_query(QueryFragment::new("q", "select 1 as one;"));

    let err = compile_batch(&request, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, EngineError::Setup(_)), "{err:?}");
}

#[test]
fn test_request_from_json() {
    let request: BatchRequest = serde_json::from_value(serde_json::json!({
        "sources": [{"alias": "facts", "contents": ModelFixtures::facts_model()}],
        "imports": [{"name": "facts"}],
        "dialect": "postgres",
        "queries": [{"query": "select x, y;", "label": "both"}],
        "extra_filters": ["y > :cut"],
        "parameters": {":cut": 1.5}
    }))
    .unwrap();

    let results = compile(&request);
    let value = serde_json::to_value(&results).unwrap();

    assert_eq!(value[0]["label"], "both");
    assert_eq!(value[0]["error"], serde_json::Value::Null);
    assert_eq!(value[0]["output_columns"][1]["datatype"], "float");
    SqlAssertions::assert_contains(sql(&results[0]), "facts.y > 1.5");
}

#[test]
fn test_single_query_error_kinds() {
    let base = QueryRequest {
        sources: ModelFixtures::shop_sources(),
        imports: vec![ImportDirective::new("shop")],
        ..Default::default()
    };

    let ok = compile_single(
        &QueryRequest {
            query: QueryFragment::new("q", ModelFixtures::revenue_by_region()),
            ..base.clone()
        },
        &EngineConfig::default(),
    )
    .unwrap();
    SqlAssertions::assert_limit(ok.sql.as_deref().unwrap(), 5);

    let syntax = compile_single(
        &QueryRequest {
            query: QueryFragment::new("q", "select order_id where;"),
            ..base.clone()
        },
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(syntax, QueryError::Syntax(ref m) if m.starts_with("Unexpected token")));

    let other = compile_single(
        &QueryRequest {
            query: QueryFragment::new("q", "select revnue;"),
            ..base
        },
        &EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(other, QueryError::Other(ref m) if m.contains("revenue")), "{other:?}");
}

#[test]
fn test_format_and_model_helpers() {
    let sources = vec![SourceFragment::new("m", ModelFixtures::facts_model())];

    let formatted = format_query("import m;select x,y;", &sources, &EngineConfig::default()).unwrap();
    assert!(formatted.starts_with("import m;\n\nSELECT"), "{formatted}");

    let summary = parse_model("m", &sources, &EngineConfig::default()).unwrap();
    let names: Vec<&str> = summary.concepts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(summary.datasources[0].address, "db.facts");
}
