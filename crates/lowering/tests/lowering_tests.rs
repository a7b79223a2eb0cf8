// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the dialect generator

use pretty_assertions::assert_eq;
use trilogy_studio_ir::Dialect;
use trilogy_studio_lowering::{
    DialectGenerator, LoweringError, ProcessedStatement, ShowKind,
};
use trilogy_studio_semantic::{Environment, parse_text};
use trilogy_studio_test_utils::{ModelFixtures, SqlAssertions};

fn shop_env() -> Environment {
    let mut env = Environment::from_sources(ModelFixtures::all_sources());
    parse_text("import shop;", &mut env).unwrap();
    env
}

fn compile_with(env: &mut Environment, text: &str, dialect: Dialect) -> Vec<ProcessedStatement> {
    let statements = parse_text(text, env).unwrap();
    DialectGenerator::new(dialect).compile(env, &statements).unwrap()
}

/// Render the last compiled statement of `text` against the shop model
fn sql_for(text: &str, dialect: Dialect) -> String {
    let mut env = shop_env();
    let compiled = compile_with(&mut env, text, dialect);
    let last = compiled.last().expect("nothing compiled");
    DialectGenerator::new(dialect).render(last)
}

#[test]
fn test_select_joins_and_groups() {
    let sql = sql_for(ModelFixtures::revenue_by_region(), Dialect::DuckDB);

    SqlAssertions::assert_contains(&sql, "customers_table.region AS region");
    SqlAssertions::assert_contains(&sql, "SUM(orders_table.amount) AS region_revenue");
    SqlAssertions::assert_contains(&sql, "FROM shop.orders AS orders_table");
    SqlAssertions::assert_contains(
        &sql,
        "LEFT OUTER JOIN shop.customers AS customers_table ON orders_table.customer_id = customers_table.id",
    );
    SqlAssertions::assert_contains(&sql, "WHERE orders_table.status = 'complete'");
    SqlAssertions::assert_contains(&sql, "GROUP BY customers_table.region");
    SqlAssertions::assert_contains(&sql, "ORDER BY region_revenue DESC");
    SqlAssertions::assert_limit(&sql, 5);
}

#[test]
fn test_single_datasource_needs_no_join() {
    let sql = sql_for("select order_id, amount;", Dialect::Postgres);

    SqlAssertions::assert_contains(&sql, "orders_table.id AS order_id");
    SqlAssertions::assert_not_contains(&sql, "JOIN");
    SqlAssertions::assert_not_contains(&sql, "GROUP BY");
    SqlAssertions::assert_not_contains(&sql, "LIMIT");
}

#[test]
fn test_sql_server_uses_top() {
    let sql = sql_for(ModelFixtures::revenue_by_region(), Dialect::SqlServer);

    assert!(sql.starts_with("SELECT TOP 5"), "{sql}");
    SqlAssertions::assert_not_contains(&sql, "LIMIT");
}

#[test]
fn test_aggregate_filter_moves_to_having() {
    let sql = sql_for("where revenue > 100 select region;", Dialect::DuckDB);

    SqlAssertions::assert_contains(&sql, "HAVING SUM(orders_table.amount) > 100");
    SqlAssertions::assert_contains(&sql, "GROUP BY customers_table.region");
    SqlAssertions::assert_not_contains(&sql, "WHERE");
}

#[test]
fn test_constants_are_inlined() {
    let sql = sql_for(
        "const threshold <- 100;\nselect order_id where amount > threshold;",
        Dialect::BigQuery,
    );

    SqlAssertions::assert_contains(&sql, "WHERE orders_table.amount > 100");
}

#[test]
fn test_derived_lineage_is_parenthesized() {
    let sql = sql_for(
        "auto net <- amount - 5;\nselect order_id, net * 2 as doubled;",
        Dialect::DuckDB,
    );

    SqlAssertions::assert_contains(&sql, "(orders_table.amount - 5) * 2 AS doubled");
}

#[test]
fn test_aliased_import_output_names() {
    let mut env = Environment::from_sources(ModelFixtures::all_sources());
    let compiled = compile_with(&mut env, "import shop as s;\nselect s.revenue;", Dialect::DuckDB);
    let ProcessedStatement::Query(query) = &compiled[0] else {
        panic!("expected a query");
    };
    assert_eq!(query.output_columns, vec!["s.revenue".to_string()]);

    let sql = DialectGenerator::new(Dialect::DuckDB).render(&compiled[0]);
    SqlAssertions::assert_contains(&sql, "SUM(s_orders_table.amount) AS s_revenue");
}

#[test]
fn test_multi_select_full_outer_join() {
    let text = "select order_date, count(order_id) as orders_n \
                merge select order_date, sum(amount) as total \
                align order_day: order_date, order_date \
                order by order_day asc limit 20;";
    let sql = sql_for(text, Dialect::DuckDB);

    assert!(sql.starts_with("WITH"), "{sql}");
    SqlAssertions::assert_contains(&sql, "cte_0 AS (");
    SqlAssertions::assert_contains(
        &sql,
        "COALESCE(cte_0.order_date, cte_1.order_date) AS order_day",
    );
    SqlAssertions::assert_contains(&sql, "cte_0.orders_n AS orders_n");
    SqlAssertions::assert_contains(&sql, "cte_1.total AS total");
    SqlAssertions::assert_contains(
        &sql,
        "FULL OUTER JOIN cte_1 ON cte_0.order_date = cte_1.order_date",
    );
    SqlAssertions::assert_contains(&sql, "ORDER BY order_day ASC");
    SqlAssertions::assert_limit(&sql, 20);
}

#[test]
fn test_persist_per_dialect() {
    let text = "persist big into shop.big from select order_id where amount > 100;";

    let bigquery = sql_for(text, Dialect::BigQuery);
    assert!(bigquery.starts_with("CREATE OR REPLACE TABLE shop.big AS\nSELECT"));

    let postgres = sql_for(text, Dialect::Postgres);
    assert!(postgres.starts_with("DROP TABLE IF EXISTS shop.big;\nCREATE TABLE shop.big AS"));

    let sqlserver = sql_for(text, Dialect::SqlServer);
    SqlAssertions::assert_contains(&sqlserver, "INTO shop.big FROM shop.orders AS orders_table");
}

#[test]
fn test_show_select_emits_query_text() {
    let generator = DialectGenerator::new(Dialect::DuckDB);
    let mut env = shop_env();
    let shown = compile_with(&mut env, "show select order_id, status;", Dialect::DuckDB);
    let plain = compile_with(&mut env, "select order_id, status;", Dialect::DuckDB);

    let ProcessedStatement::Show(show) = &shown[0] else {
        panic!("expected a show result");
    };
    assert_eq!(show.kind, ShowKind::QueryText);
    assert_eq!(show.rows.len(), 1);
    assert_eq!(generator.render(&shown[0]), generator.render(&plain[0]));
}

#[test]
fn test_show_concepts_rows() {
    let mut env = shop_env();
    let compiled = compile_with(&mut env, "show concepts;", Dialect::DuckDB);
    let ProcessedStatement::Show(show) = &compiled[0] else {
        panic!("expected a show result");
    };
    assert_eq!(show.kind, ShowKind::Concepts);
    assert!(show.rows.iter().any(|r| r[0] == "local.revenue" && r[2] == "metric"));
    assert!(!show.rows.iter().any(|r| r[0].contains("_load_id")));
}

#[test]
fn test_validate_all_passes_on_shop_model() {
    let mut env = shop_env();
    let compiled = compile_with(&mut env, "validate all;", Dialect::DuckDB);
    let ProcessedStatement::Show(show) = &compiled[0] else {
        panic!("expected a show result");
    };
    assert_eq!(show.kind, ShowKind::Validation);
    assert!(show.rows.iter().all(|r| r[2] == "ok"), "{:?}", show.rows);
}

#[test]
fn test_raw_sql_passthrough() {
    let sql = sql_for("raw_sql('''select * from somewhere''');", Dialect::Snowflake);
    assert_eq!(sql, "select * from somewhere");
}

#[test]
fn test_declarations_produce_no_output() {
    let mut env = shop_env();
    let compiled = compile_with(
        &mut env,
        "const cutoff <- 10;\nkey other_id int;\nselect order_id;",
        Dialect::DuckDB,
    );
    assert_eq!(compiled.len(), 1);
}

#[test]
fn test_unbound_concept_is_an_error() {
    let mut env = shop_env();
    let statements = parse_text("key lonely int;\nselect lonely;", &mut env).unwrap();
    let err = DialectGenerator::new(Dialect::DuckDB)
        .compile(&env, &statements)
        .unwrap_err();
    assert_eq!(
        err,
        LoweringError::NoDatasource {
            concepts: vec!["local.lonely".to_string()]
        }
    );
}
