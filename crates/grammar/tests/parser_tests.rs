// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parser integration tests
//!
//! Covers every statement form, comment attachment, operator precedence,
//! tolerant-mode recovery and canonical rendering.

use pretty_assertions::assert_eq;
use trilogy_studio_grammar::*;
use trilogy_studio_ir::BinaryOp;

fn single(text: &str) -> SyntaxStatement {
    let mut tree = parse(text).unwrap_or_else(|e| panic!("failed to parse {text:?}: {e}"));
    assert_eq!(tree.statements.len(), 1, "expected one statement in {text:?}");
    tree.statements.remove(0)
}

#[test]
fn test_import_with_alias() {
    let stmt = single("import game.team as home_team;");
    assert_eq!(
        stmt.kind,
        StatementSyntax::Import {
            path: "game.team".to_string(),
            alias: Some("home_team".to_string()),
        }
    );
}

#[test]
fn test_key_with_trait_type_and_comment() {
    let stmt = single("key revenue float::money; # gross revenue");
    let StatementSyntax::Concept(concept) = stmt.kind else {
        panic!("expected concept");
    };
    assert_eq!(concept.keyword, ConceptKeyword::Key);
    assert_eq!(concept.name, "revenue");
    let datatype = concept.datatype.unwrap();
    assert_eq!(datatype.base, "float");
    assert_eq!(datatype.traits, vec!["money"]);
    assert_eq!(stmt.comment.as_deref(), Some("gross revenue"));
}

#[test]
fn test_leading_comment_becomes_description() {
    let tree = parse("key a int;\n# identifier of b\nkey b int;").unwrap();
    assert_eq!(tree.statements[0].comment, None);
    assert_eq!(tree.statements[1].comment.as_deref(), Some("identifier of b"));
}

#[test]
fn test_property_forms() {
    let stmt = single("property order.status string;");
    let StatementSyntax::Concept(concept) = stmt.kind else {
        panic!("expected concept");
    };
    assert_eq!(concept.keys, vec!["order"]);
    assert_eq!(concept.name, "status");

    let stmt = single("property <order, customer>.note string;");
    let StatementSyntax::Concept(concept) = stmt.kind else {
        panic!("expected concept");
    };
    assert_eq!(concept.keys, vec!["order", "customer"]);
    assert_eq!(concept.name, "note");
}

#[test]
fn test_metric_requires_arrow() {
    let err = parse("metric total int;").unwrap_err();
    match err {
        SyntaxError::UnexpectedToken { expected, .. } => assert_eq!(expected, vec!["<-"]),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_datasource() {
    let stmt = single(
        "datasource orders (
            order_id: order_id,
            amount: revenue,
            status,
        )
        grain (order_id)
        address `project.sales.orders`;",
    );
    let StatementSyntax::Datasource(ds) = stmt.kind else {
        panic!("expected datasource");
    };
    assert_eq!(ds.name, "orders");
    assert_eq!(ds.columns.len(), 3);
    assert_eq!(ds.columns[1].column, "amount");
    assert_eq!(ds.columns[1].concept, "revenue");
    assert_eq!(ds.columns[2].concept, "status");
    assert_eq!(ds.grain, vec!["order_id"]);
    assert_eq!(ds.address, "project.sales.orders");
}

#[test]
fn test_datasource_requires_address() {
    let err = parse("datasource orders (id: id);").unwrap_err();
    assert!(matches!(err, SyntaxError::UnexpectedToken { .. }));
}

#[test]
fn test_select_with_all_clauses() {
    let stmt = single(
        "WHERE region = 'west'
        SELECT order_date, sum(revenue) as total,
        WHERE status != 'void'
        HAVING total > 100
        ORDER BY total desc, order_date
        LIMIT 50;",
    );
    let StatementSyntax::Select(select) = stmt.kind else {
        panic!("expected select");
    };
    assert_eq!(select.items.len(), 2);
    assert_eq!(select.items[1].alias.as_deref(), Some("total"));
    assert!(matches!(
        select.where_clause.as_ref().unwrap().kind,
        ExprKind::Binary {
            op: BinaryOp::And,
            ..
        }
    ));
    assert!(select.having.is_some());
    assert_eq!(select.order_by.len(), 2);
    assert!(select.order_by[0].descending);
    assert!(!select.order_by[1].descending);
    assert_eq!(select.limit, Some(50));
}

#[test]
fn test_operator_precedence() {
    let stmt = single("select a + b * 2 > 3 and not c or d;");
    let StatementSyntax::Select(select) = stmt.kind else {
        panic!("expected select");
    };
    let expr = &select.items[0].expr;
    let ExprKind::Binary { op, left, .. } = &expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Or);
    let ExprKind::Binary { op, .. } = &left.kind else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::And);
    assert_eq!(expr.to_string(), "a + b * 2 > 3 and not c or d");
}

#[test]
fn test_predicates() {
    let stmt = single("where x is not null and y not in (1, 2) and z not like 'a%' select x;");
    let StatementSyntax::Select(select) = stmt.kind else {
        panic!("expected select");
    };
    assert_eq!(
        select.where_clause.unwrap().to_string(),
        "x is not null and y not in (1, 2) and z not like 'a%'"
    );
}

#[test]
fn test_case_and_cast() {
    let stmt = single("const label <- CASE WHEN cast(x as int) > 1 THEN 'big' ELSE 'small' END;");
    let StatementSyntax::Concept(concept) = stmt.kind else {
        panic!("expected concept");
    };
    assert_eq!(
        concept.lineage.unwrap().to_string(),
        "CASE WHEN cast(x as int) > 1 THEN 'big' ELSE 'small' END"
    );
}

#[test]
fn test_multi_select() {
    let stmt = single(
        "select a.id, a.total merge select b.id, b.count align id: a.id, b.id, other: a.x, b.y order by id limit 5;",
    );
    let StatementSyntax::MultiSelect(multi) = stmt.kind else {
        panic!("expected multi-select");
    };
    assert_eq!(multi.selects.len(), 2);
    assert_eq!(multi.align.len(), 2);
    assert_eq!(multi.align[0].name, "id");
    assert_eq!(multi.align[0].concepts, vec!["a.id", "b.id"]);
    assert_eq!(multi.align[1].concepts, vec!["a.x", "b.y"]);
    assert_eq!(multi.limit, Some(5));
}

#[test]
fn test_persist_show_validate_raw() {
    let stmt = single("persist daily into warehouse.daily from select id;");
    assert!(matches!(stmt.kind, StatementSyntax::Persist { ref address, .. } if address == "warehouse.daily"));

    assert_eq!(
        single("show concepts;").kind,
        StatementSyntax::Show(ShowSyntax::Concepts)
    );
    assert!(matches!(
        single("SHOW select id;").kind,
        StatementSyntax::Show(ShowSyntax::Select(_))
    ));
    assert_eq!(single("validate all;").kind, StatementSyntax::Validate);
    assert_eq!(
        single("raw_sql('''select 1 as one''');").kind,
        StatementSyntax::RawSql("select 1 as one".to_string())
    );
}

#[test]
fn test_recovery_reports_each_error_in_order() {
    let text = "key id int;\nselect id +;\nkey name string;\nselect , id;\nselect id;";
    let mut errors = Vec::new();
    let tree = parse_with_recovery(text, &mut |e| {
        errors.push(e.clone());
        true
    })
    .unwrap();

    assert_eq!(tree.statements.len(), 3);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].span().start.line, 2);
    assert_eq!(errors[1].span().start.line, 4);
}

#[test]
fn test_unexpected_token_reports_position() {
    let err = parse("select id\nlimit x;").unwrap_err();
    let span = err.span();
    assert_eq!(span.start.line, 2);
    assert_eq!(span.start.column, 7);
    assert_eq!(span.end.column, 8);
}

#[test]
fn test_missing_terminator_is_terminal() {
    let err = parse("key id int;\nselect id").unwrap_err();
    assert!(err.is_terminal());
    assert!(matches!(err, SyntaxError::UnexpectedEof { .. }));
}

#[test]
fn test_render_is_stable() {
    let text = "key id int; # the id\nwhere id > 1 select id, count(id) as n order by n desc limit 10;";
    let rendered = parse(text).unwrap().render();
    assert_eq!(
        rendered,
        "key id int; # the id\n\nWHERE\n    id > 1\nSELECT\n    id,\n    count(id) as n,\nORDER BY\n    n desc\nLIMIT 10;"
    );
    // rendering the rendered text again changes nothing
    assert_eq!(parse(&rendered).unwrap().render(), rendered);
}

#[test]
fn test_nesting_up_to_the_limit_parses() {
    let depth = MAX_EXPR_DEPTH - 1;
    let text = format!("select {}1{};", "(".repeat(depth), ")".repeat(depth));
    assert!(parse(&text).is_ok());
}

#[test]
fn test_deep_parentheses_are_rejected() {
    let text = format!("select {}1{};", "(".repeat(10_000), ")".repeat(10_000));
    let err = parse(&text).unwrap_err();
    assert!(err.is_terminal());
    assert!(matches!(err, SyntaxError::NestingTooDeep { limit: MAX_EXPR_DEPTH, .. }));
    // the first parenthesis past the limit
    assert_eq!(err.span().start.column, "select ".len() + MAX_EXPR_DEPTH + 1);
}

#[test]
fn test_deep_unary_chains_are_rejected() {
    let minus = format!("select {}1;", "- ".repeat(10_000));
    assert!(matches!(parse(&minus), Err(SyntaxError::NestingTooDeep { .. })));

    let not = format!("where {}flag select id;", "not ".repeat(10_000));
    assert!(matches!(parse(&not), Err(SyntaxError::NestingTooDeep { .. })));
}

#[test]
fn test_deep_nesting_stops_tolerant_parse() {
    let text = format!("key id int;\nselect {}id;", "(".repeat(500));
    let mut recovered = 0;
    let err = parse_with_recovery(&text, &mut |_| {
        recovered += 1;
        true
    })
    .unwrap_err();
    assert!(matches!(err, SyntaxError::NestingTooDeep { .. }));
    assert_eq!(recovered, 0);
}
