// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Unit tests for IR expression rendering and traversal

use trilogy_studio_ir::{BinaryOp, ConceptRef, Expr, Literal, UnaryOp};

#[test]
fn test_render_function_call() {
    let expr = Expr::Function {
        name: "count".to_string(),
        args: vec![Expr::concept("local.order_id")],
    };
    assert_eq!(expr.to_string(), "count(order_id)");
}

#[test]
fn test_render_imported_reference_keeps_namespace() {
    let expr = Expr::binary(
        Expr::concept("game.attendance"),
        BinaryOp::GtEq,
        Expr::Literal(Literal::Integer(1000)),
    );
    assert_eq!(expr.to_string(), "game.attendance >= 1000");
}

#[test]
fn test_render_unary_and_null_checks() {
    let not_null = Expr::IsNull {
        expr: Box::new(Expr::concept("local.name")),
        negated: true,
    };
    assert_eq!(not_null.to_string(), "name is not null");

    let negated = Expr::UnaryOp {
        op: UnaryOp::Not,
        expr: Box::new(Expr::Paren(Box::new(not_null))),
    };
    assert_eq!(negated.to_string(), "not (name is not null)");
}

#[test]
fn test_render_in_list() {
    let expr = Expr::InList {
        expr: Box::new(Expr::concept("local.region")),
        list: vec![
            Expr::Literal(Literal::String("east".into())),
            Expr::Literal(Literal::String("west".into())),
        ],
        negated: false,
    };
    assert_eq!(expr.to_string(), "region in ('east', 'west')");
}

#[test]
fn test_map_concepts_rewrites_addresses() {
    let mut expr = Expr::binary(
        Expr::concept("local.a"),
        BinaryOp::Add,
        Expr::concept("local.b"),
    );
    expr.map_concepts(&mut |c: &mut ConceptRef| {
        c.address = c.address.replace("local.", "team.");
    });
    assert_eq!(expr.concept_addresses(), vec!["team.a", "team.b"]);
}

#[test]
fn test_substitute_concepts_replaces_matching_references() {
    let mut expr = Expr::binary(
        Expr::concept("local.region"),
        BinaryOp::Eq,
        Expr::concept("local.wanted"),
    );
    expr.substitute_concepts(&mut |c: &ConceptRef| {
        (c.address == "local.wanted").then(|| Expr::Literal(Literal::String("west".into())))
    });
    assert_eq!(expr.to_string(), "region = 'west'");
    assert_eq!(expr.concept_addresses(), vec!["local.region"]);
}

#[test]
fn test_conjuncts_flatten_nested_and() {
    let expr = Expr::and(
        Expr::and(Expr::concept("local.a"), Expr::concept("local.b")),
        Expr::concept("local.c"),
    );
    let parts: Vec<String> = expr.conjuncts().iter().map(|e| e.to_string()).collect();
    assert_eq!(parts, vec!["a", "b", "c"]);
}

#[test]
fn test_or_is_single_conjunct() {
    let expr = Expr::binary(Expr::concept("local.a"), BinaryOp::Or, Expr::concept("local.b"));
    assert_eq!(expr.conjuncts().len(), 1);
}

#[test]
fn test_operator_precedence_ordering() {
    assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
    assert!(BinaryOp::Add.precedence() > BinaryOp::Eq.precedence());
    assert!(BinaryOp::Eq.precedence() > BinaryOp::And.precedence());
    assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
}
