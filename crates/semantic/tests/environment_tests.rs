// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for Environment construction, imports and statement building

use std::sync::Arc;

use pretty_assertions::assert_eq;
use trilogy_studio_catalog::SourceFragment;
use trilogy_studio_ir::{DataType, Purpose, Statement, StatementKind};
use trilogy_studio_semantic::{Environment, SemanticError, parse_text};
use trilogy_studio_test_utils::{MockResolver, ModelFixtures};

fn shop_env() -> Environment {
    let mut env = Environment::from_sources(ModelFixtures::all_sources());
    parse_text("import shop;", &mut env).unwrap();
    env
}

#[test]
fn test_unaliased_import_merges_into_local_namespace() {
    let env = shop_env();

    let amount = env.concept("local.amount").unwrap();
    assert_eq!(amount.datatype.to_string(), "float::money");
    assert_eq!(amount.keys, vec!["local.order_id".to_string()]);
    assert_eq!(amount.description.as_deref(), Some("order value in dollars"));

    let revenue = env.concept("local.revenue").unwrap();
    assert_eq!(revenue.purpose, Purpose::Metric);
    assert_eq!(env.datasources().len(), 2);
    assert_eq!(env.imports().len(), 1);
}

#[test]
fn test_aliased_import_reroots_everything() {
    let mut env = Environment::from_sources(ModelFixtures::all_sources());
    parse_text("import shop as s;", &mut env).unwrap();

    assert!(env.concept("local.order_id").is_none());
    let revenue = env.concept("s.revenue").unwrap();
    assert_eq!(
        revenue.lineage.as_ref().unwrap().concept_addresses(),
        vec!["s.amount".to_string()]
    );

    let orders = env.datasource("s.orders_table").unwrap();
    assert_eq!(orders.column_for("s.amount"), Some("amount"));
    assert_eq!(orders.grain, vec!["s.order_id".to_string()]);
}

#[test]
fn test_nested_import_namespaces() {
    let mut env = Environment::from_sources(ModelFixtures::all_sources());
    parse_text("import warehouse as w;", &mut env).unwrap();

    assert!(env.concept("w.city").is_some());
    assert!(env.concept("w.store.revenue").is_some());
    assert!(env.datasource("w.store.customers_table").is_some());
}

#[test]
fn test_imports_resolve_lazily() {
    let resolver = Arc::new(
        MockResolver::builder()
            .with_module("shop", ModelFixtures::shop_model())
            .with_module("facts", ModelFixtures::facts_model())
            .build(),
    );
    let mut env = Environment::new(resolver.clone());
    assert!(resolver.requests().is_empty());

    parse_text("import facts;", &mut env).unwrap();
    assert_eq!(resolver.requests(), vec!["facts".to_string()]);
}

#[test]
fn test_unknown_module() {
    let mut env = Environment::from_sources(ModelFixtures::shop_sources());
    let err = parse_text("import nope;", &mut env).unwrap_err();
    assert!(matches!(err, SemanticError::Catalog(_)));
}

#[test]
fn test_circular_import_detected() {
    let mut env = Environment::from_sources(vec![
        SourceFragment::new("a", "import b;\nkey a_id int;"),
        SourceFragment::new("b", "import a;\nkey b_id int;"),
    ]);
    let err = parse_text("import a;", &mut env).unwrap_err();

    let mut current = &err;
    while let SemanticError::InModule { source, .. } = current {
        current = &**source;
    }
    assert_eq!(
        current,
        &SemanticError::CircularImport {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()]
        }
    );
}

#[test]
fn test_select_declares_locally_derived_concepts() {
    let mut env = shop_env();
    let statements = parse_text(ModelFixtures::revenue_by_region(), &mut env).unwrap();

    let Statement::Select(select) = &statements[0] else {
        panic!("expected a select");
    };
    assert_eq!(
        select.selection,
        vec!["local.region".to_string(), "local.region_revenue".to_string()]
    );
    assert_eq!(select.local_concepts, vec!["local.region_revenue".to_string()]);
    assert_eq!(select.limit, Some(5));
    assert!(select.where_clause.is_some());

    let derived = env.concept("local.region_revenue").unwrap();
    assert!(derived.locally_derived);
    assert_eq!(derived.purpose, Purpose::Metric);
    assert_eq!(derived.datatype, DataType::Float);
}

#[test]
fn test_select_alias_cannot_shadow_model_concept() {
    let mut env = shop_env();
    let err = parse_text("select amount * 2 as revenue;", &mut env).unwrap_err();
    assert_eq!(
        err,
        SemanticError::Shadowing {
            name: "revenue".to_string()
        }
    );
}

#[test]
fn test_select_alias_replaces_leftover_local_concept() {
    let mut env = shop_env();
    parse_text("select count(order_id) as n;", &mut env).unwrap();
    parse_text("select upper(status) as n;", &mut env).unwrap();
    assert_eq!(env.concept("local.n").unwrap().datatype, DataType::String);
}

#[test]
fn test_top_level_redeclaration_is_tracked() {
    let mut env = shop_env();
    let before = env.overrides().len();
    parse_text("const threshold <- 1;\nconst threshold <- 'high';", &mut env).unwrap();

    assert_eq!(env.overrides().len(), before + 1);
    assert_eq!(env.concept("local.threshold").unwrap().datatype, DataType::String);
}

#[test]
fn test_unaliased_expression_rejected() {
    let mut env = shop_env();
    let err = parse_text("select amount + 1;", &mut env).unwrap_err();
    assert!(matches!(err, SemanticError::UnaliasedExpression { .. }));
}

#[test]
fn test_where_must_be_boolean() {
    let mut env = shop_env();
    let err = parse_text("where amount select order_id;", &mut env).unwrap_err();
    assert!(matches!(err, SemanticError::ExpectedBoolean { .. }));
}

#[test]
fn test_multi_select_align() {
    let mut env = shop_env();
    let text = "select order_date, count(order_id) as orders_n \
                merge select order_date, sum(amount) as total \
                align order_day: order_date, order_date;";
    let statements = parse_text(text, &mut env).unwrap();

    let Statement::MultiSelect(multi) = &statements[0] else {
        panic!("expected a multi-select");
    };
    assert_eq!(multi.align[0].address, "local.order_day");
    assert_eq!(
        statements[0].output_components().unwrap(),
        vec![
            "local.order_day".to_string(),
            "local.orders_n".to_string(),
            "local.total".to_string()
        ]
    );
    assert_eq!(
        statements[0].local_concepts(),
        &[
            "local.order_day".to_string(),
            "local.orders_n".to_string(),
            "local.total".to_string()
        ]
    );
}

#[test]
fn test_statement_kinds() {
    let mut env = shop_env();
    let text = "show concepts;\nvalidate all;\nraw_sql('''select 1''');\npersist big into shop.big from select order_id where amount > 100;";
    let kinds: Vec<StatementKind> = parse_text(text, &mut env)
        .unwrap()
        .iter()
        .map(Statement::kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            StatementKind::Introspection,
            StatementKind::Introspection,
            StatementKind::RawSql,
            StatementKind::PersistSelection
        ]
    );
}

#[test]
fn test_tolerant_build_skips_failures() {
    let mut env = shop_env();
    let tree = trilogy_studio_grammar::parse(
        "select missing_name;\nconst limit_value <- 10;\nselect order_id;",
    )
    .unwrap();
    let built = trilogy_studio_semantic::build_tolerant(&tree, &mut env);

    assert_eq!(built.statements.len(), 2);
    assert_eq!(built.errors.len(), 1);
    assert!(env.concept("local.limit_value").is_some());
}
