// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Type and purpose inference
//!
//! Inference walks a resolved [`Expr`] against the Environment. Type errors
//! (incompatible operands, wrong arity, non-boolean conditions) are raised
//! here, so a statement that transforms successfully is well typed.

use std::sync::LazyLock;

use trilogy_studio_function_registry::FunctionRegistry;
use trilogy_studio_ir::{BinaryOp, DataType, Expr, Literal, Purpose, UnaryOp};

use crate::Environment;
use crate::error::{SemanticError, SemanticResult};
use crate::resolution::ResolutionConfig;

static REGISTRY: LazyLock<FunctionRegistry> = LazyLock::new(FunctionRegistry::new);

/// Builtin functions known to the language
pub fn registry() -> &'static FunctionRegistry {
    &REGISTRY
}

pub(crate) fn unknown_function(name: &str) -> SemanticError {
    SemanticError::UnknownFunction {
        name: name.to_string(),
        suggestions: ResolutionConfig::default().suggest(name, registry().names()),
    }
}

fn literal_type(literal: &Literal) -> DataType {
    match literal {
        Literal::Null => DataType::Unknown,
        Literal::Boolean(_) => DataType::Boolean,
        Literal::Integer(_) => DataType::Integer,
        Literal::Float(_) => DataType::Float,
        Literal::String(_) => DataType::String,
    }
}

fn expect_boolean(context: &'static str, found: DataType) -> SemanticResult<()> {
    if found.is_unknown() || found.base() == &DataType::Boolean {
        Ok(())
    } else {
        Err(SemanticError::ExpectedBoolean { context, found })
    }
}

/// Boolean check for WHERE and HAVING conditions
pub fn check_condition(
    expr: &Expr,
    env: &Environment,
    context: &'static str,
) -> SemanticResult<()> {
    expect_boolean(context, infer_type(expr, env)?)
}

/// Datatype an expression evaluates to
pub fn infer_type(expr: &Expr, env: &Environment) -> SemanticResult<DataType> {
    match expr {
        Expr::Concept(c) => env
            .concept(&c.address)
            .map(|concept| concept.datatype.clone())
            .ok_or_else(|| SemanticError::undefined(c.address.clone(), env.suggest(c.name()))),
        Expr::Literal(l) => Ok(literal_type(l)),
        Expr::BinaryOp { left, op, right } => {
            let l = infer_type(left, env)?;
            let r = infer_type(right, env)?;
            binary_type(*op, l, r)
        }
        Expr::UnaryOp { op, expr } => {
            let inner = infer_type(expr, env)?;
            match op {
                UnaryOp::Neg if inner.is_numeric() || inner.is_unknown() => Ok(inner),
                UnaryOp::Neg => Err(SemanticError::ExpectedNumeric(inner)),
                UnaryOp::Not => {
                    expect_boolean("Operand of 'not'", inner)?;
                    Ok(DataType::Boolean)
                }
            }
        }
        Expr::Function { name, args } => {
            let function = registry()
                .get_function(name)
                .ok_or_else(|| unknown_function(name))?;
            if !function.accepts(args.len()) {
                return Err(SemanticError::ArityMismatch {
                    function: function.name.clone(),
                    expected: function.arity_display(),
                    found: args.len(),
                });
            }
            let arg_types = args
                .iter()
                .map(|a| infer_type(a, env))
                .collect::<SemanticResult<Vec<_>>>()?;
            Ok(function.resolve_return_type(&arg_types))
        }
        Expr::Case {
            conditions,
            results,
            else_result,
        } => {
            for condition in conditions {
                check_condition(condition, env, "CASE condition")?;
            }
            let mut result = DataType::Unknown;
            for expr in results.iter().chain(else_result.as_deref()) {
                let ty = infer_type(expr, env)?;
                result = if result.is_unknown() {
                    ty
                } else if result.is_numeric() && ty.is_numeric() {
                    result.widen(&ty)
                } else if ty.is_unknown() || result.base() == ty.base() {
                    result
                } else {
                    return Err(SemanticError::IncompatibleTypes {
                        operator: "case".to_string(),
                        left: result,
                        right: ty,
                    });
                };
            }
            Ok(result)
        }
        Expr::Cast { expr, type_name } => {
            infer_type(expr, env)?;
            type_name
                .parse::<DataType>()
                .map_err(|_| SemanticError::UnknownType {
                    name: type_name.clone(),
                    suggestions: Vec::new(),
                })
        }
        Expr::Paren(inner) => infer_type(inner, env),
        Expr::IsNull { expr, .. } => {
            infer_type(expr, env)?;
            Ok(DataType::Boolean)
        }
        Expr::InList { expr, list, .. } => {
            let ty = infer_type(expr, env)?;
            for item in list {
                let item_ty = infer_type(item, env)?;
                if !ty.is_comparable_with(&item_ty) {
                    return Err(SemanticError::IncompatibleTypes {
                        operator: "in".to_string(),
                        left: ty,
                        right: item_ty,
                    });
                }
            }
            Ok(DataType::Boolean)
        }
    }
}

fn binary_type(op: BinaryOp, left: DataType, right: DataType) -> SemanticResult<DataType> {
    let incompatible = |left: DataType, right: DataType| SemanticError::IncompatibleTypes {
        operator: op.symbol().to_string(),
        left,
        right,
    };

    match op {
        BinaryOp::And | BinaryOp::Or => {
            expect_boolean("Operand of 'and'/'or'", left)?;
            expect_boolean("Operand of 'and'/'or'", right)?;
            Ok(DataType::Boolean)
        }
        BinaryOp::Like | BinaryOp::NotLike => {
            let stringy = |t: &DataType| t.is_unknown() || t.base() == &DataType::String;
            if stringy(&left) && stringy(&right) {
                Ok(DataType::Boolean)
            } else {
                Err(incompatible(left, right))
            }
        }
        op if op.is_comparison() => {
            if left.is_comparable_with(&right) {
                Ok(DataType::Boolean)
            } else {
                Err(incompatible(left, right))
            }
        }
        _ => {
            let numeric = |t: &DataType| t.is_numeric() || t.is_unknown();
            if numeric(&left) && numeric(&right) {
                Ok(left.widen(&right))
            } else {
                Err(incompatible(left, right))
            }
        }
    }
}

/// Whether the expression calls an aggregate function
pub fn contains_aggregate(expr: &Expr) -> bool {
    match expr {
        Expr::Function { name, args } => {
            registry().is_aggregate(name) || args.iter().any(contains_aggregate)
        }
        Expr::Concept(_) | Expr::Literal(_) => false,
        Expr::BinaryOp { left, right, .. } => contains_aggregate(left) || contains_aggregate(right),
        Expr::UnaryOp { expr, .. }
        | Expr::Cast { expr, .. }
        | Expr::Paren(expr)
        | Expr::IsNull { expr, .. } => contains_aggregate(expr),
        Expr::Case {
            conditions,
            results,
            else_result,
        } => {
            conditions.iter().any(contains_aggregate)
                || results.iter().any(contains_aggregate)
                || else_result.as_deref().is_some_and(contains_aggregate)
        }
        Expr::InList { expr, list, .. } => {
            contains_aggregate(expr) || list.iter().any(contains_aggregate)
        }
    }
}

/// Purpose of a concept derived from `lineage`
///
/// Aggregations and anything computed from a metric are metrics; expressions
/// over constants only are constants; everything else is a property.
pub fn infer_purpose(lineage: &Expr, env: &Environment) -> Purpose {
    if contains_aggregate(lineage) {
        return Purpose::Metric;
    }
    let purposes: Vec<Purpose> = lineage
        .concept_addresses()
        .iter()
        .filter_map(|address| env.concept(address).map(|c| c.purpose))
        .collect();
    if purposes.iter().all(|p| *p == Purpose::Constant) {
        Purpose::Constant
    } else if purposes.contains(&Purpose::Metric) {
        Purpose::Metric
    } else {
        Purpose::Property
    }
}

/// Key addresses a derived property hangs off
pub fn infer_keys(lineage: &Expr, env: &Environment) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for address in lineage.concept_addresses() {
        let Some(concept) = env.concept(&address) else {
            continue;
        };
        let found = match concept.purpose {
            Purpose::Key => vec![address.clone()],
            Purpose::Property => concept.keys.clone(),
            _ => Vec::new(),
        };
        for key in found {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}
