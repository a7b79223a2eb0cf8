// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Statement building
//!
//! Turns untyped syntax into typed [`Statement`]s, applying declarations to
//! the Environment as it goes. Statements are processed in order, so a
//! statement may use anything declared before it.
//!
//! Inline `as` aliases in selections become *locally derived* concepts. An
//! alias may replace a leftover locally derived concept, but never a concept
//! declared by the model.

use tracing::warn;
use trilogy_studio_grammar::{
    ConceptKeyword, ConceptSyntax, DatasourceSyntax, ExprKind, ExprSyntax, LiteralSyntax,
    MultiSelectSyntax, OrderSyntax, ParseTree, SelectSyntax, ShowSyntax, StatementSyntax,
    SyntaxStatement, TypeSyntax,
};
use trilogy_studio_ir::{
    AlignItem, Concept, ConceptDeclaration, DEFAULT_NAMESPACE, DataType, Datasource,
    DatasourceDeclaration, Expr, HavingClause, ImportStatement, Literal, MultiSelectStatement,
    OrderItem, PersistStatement, Purpose, RawSqlStatement, SelectStatement, ShowStatement,
    ShowTarget, SortDirection, Statement, TypeDeclaration, ValidateStatement, WhereClause,
    address_of,
};

use crate::Environment;
use crate::error::{SemanticError, SemanticResult};
use crate::resolution::ResolutionConfig;
use crate::typing::{check_condition, infer_keys, infer_purpose, infer_type, registry, unknown_function};

const BASE_TYPES: &[&str] = &[
    "string", "int", "float", "numeric", "bool", "date", "datetime", "timestamp",
];

/// Output of a tolerant build
#[derive(Debug, Default)]
pub struct TolerantBuild {
    pub statements: Vec<Statement>,
    pub errors: Vec<SemanticError>,
}

/// Builds typed statements against a mutable Environment
pub struct StatementBuilder<'env> {
    env: &'env mut Environment,
}

impl<'env> StatementBuilder<'env> {
    pub fn new(env: &'env mut Environment) -> Self {
        Self { env }
    }

    /// Build every statement, stopping at the first error
    pub fn build_all(&mut self, tree: &ParseTree) -> SemanticResult<Vec<Statement>> {
        tree.statements.iter().map(|s| self.build(s)).collect()
    }

    /// Build every statement, logging and skipping the ones that fail
    pub fn build_tolerant(&mut self, tree: &ParseTree) -> TolerantBuild {
        let mut out = TolerantBuild::default();
        for statement in &tree.statements {
            match self.build(statement) {
                Ok(built) => out.statements.push(built),
                Err(e) => {
                    warn!(
                        line = statement.span.start.line,
                        error = %e,
                        "skipping statement that failed to build"
                    );
                    out.errors.push(e);
                }
            }
        }
        out
    }

    pub fn build(&mut self, statement: &SyntaxStatement) -> SemanticResult<Statement> {
        match &statement.kind {
            StatementSyntax::Import { path, alias } => {
                self.env.import(path, alias.as_deref())?;
                Ok(Statement::Import(ImportStatement {
                    path: path.clone(),
                    alias: alias.clone(),
                }))
            }
            StatementSyntax::TypeDeclaration { name, base } => {
                let base = self.resolve_type(base)?;
                self.env.declare_type(name.clone(), base.clone());
                Ok(Statement::TypeDeclaration(TypeDeclaration {
                    name: name.clone(),
                    base,
                }))
            }
            StatementSyntax::Concept(concept) => {
                self.declare_concept(concept, statement.comment.clone())
            }
            StatementSyntax::Datasource(datasource) => self.declare_datasource(datasource),
            StatementSyntax::Select(select) => Ok(Statement::Select(self.build_select(select)?)),
            StatementSyntax::MultiSelect(multi) => {
                Ok(Statement::MultiSelect(self.build_multi_select(multi)?))
            }
            StatementSyntax::Persist {
                name,
                address,
                select,
            } => Ok(Statement::Persist(PersistStatement {
                identifier: name.clone(),
                address: address.clone(),
                select: self.build_select(select)?,
            })),
            StatementSyntax::Show(show) => {
                let target = match show {
                    ShowSyntax::Select(select) => {
                        ShowTarget::Select(Box::new(self.build_select(select)?))
                    }
                    ShowSyntax::Concepts => ShowTarget::Concepts,
                    ShowSyntax::Datasources => ShowTarget::Datasources,
                };
                Ok(Statement::Show(ShowStatement { target }))
            }
            StatementSyntax::Validate => Ok(Statement::Validate(ValidateStatement)),
            StatementSyntax::RawSql(text) => Ok(Statement::RawSql(RawSqlStatement {
                text: text.clone(),
            })),
        }
    }

    fn resolve_type(&self, syntax: &TypeSyntax) -> SemanticResult<DataType> {
        let mut datatype =
            DataType::from_base_name(&syntax.base).ok_or_else(|| SemanticError::UnknownType {
                name: syntax.base.clone(),
                suggestions: ResolutionConfig::default()
                    .suggest(&syntax.base, BASE_TYPES.iter().copied()),
            })?;
        for name in &syntax.traits {
            if self.env.trait_base(name).is_none() {
                return Err(SemanticError::UnknownType {
                    name: format!("{}::{}", syntax.base, name),
                    suggestions: ResolutionConfig::default().suggest(name, self.env.type_names()),
                });
            }
            datatype = datatype.with_trait(name.clone());
        }
        Ok(datatype)
    }

    fn declare_concept(
        &mut self,
        syntax: &ConceptSyntax,
        description: Option<String>,
    ) -> SemanticResult<Statement> {
        let keys = syntax
            .keys
            .iter()
            .map(|k| self.env.lookup(k).map(Concept::address))
            .collect::<SemanticResult<Vec<_>>>()?;

        let concept = match (&syntax.lineage, &syntax.datatype) {
            (Some(lineage), _) => {
                let lineage = self.resolve_expr(lineage)?;
                let datatype = infer_type(&lineage, self.env)?;
                let purpose = match syntax.keyword {
                    ConceptKeyword::Metric => Purpose::Metric,
                    ConceptKeyword::Const => Purpose::Constant,
                    ConceptKeyword::Key => Purpose::Key,
                    ConceptKeyword::Property | ConceptKeyword::Auto => {
                        infer_purpose(&lineage, self.env)
                    }
                };
                let keys = if keys.is_empty() && purpose == Purpose::Property {
                    infer_keys(&lineage, self.env)
                } else {
                    keys
                };
                Concept::new(&syntax.name, DEFAULT_NAMESPACE, datatype, purpose)
                    .with_keys(keys)
                    .with_lineage(lineage)
            }
            (None, Some(datatype)) => {
                let purpose = match syntax.keyword {
                    ConceptKeyword::Key => Purpose::Key,
                    ConceptKeyword::Metric => Purpose::Metric,
                    ConceptKeyword::Const => Purpose::Constant,
                    ConceptKeyword::Property | ConceptKeyword::Auto => Purpose::Property,
                };
                Concept::new(&syntax.name, DEFAULT_NAMESPACE, self.resolve_type(datatype)?, purpose)
                    .with_keys(keys)
            }
            (None, None) => Concept::new(
                &syntax.name,
                DEFAULT_NAMESPACE,
                DataType::Unknown,
                Purpose::Property,
            ),
        }
        .with_description(description);

        let declaration = ConceptDeclaration {
            address: concept.address(),
            purpose: concept.purpose,
        };
        self.env.declare_concept(concept);
        Ok(Statement::Declaration(declaration))
    }

    fn declare_datasource(&mut self, syntax: &DatasourceSyntax) -> SemanticResult<Statement> {
        let mut datasource = Datasource::new(&syntax.name, &syntax.address);
        for column in &syntax.columns {
            let concept = self.env.resolve_address(&column.concept).ok_or_else(|| {
                SemanticError::UnboundColumn {
                    datasource: syntax.name.clone(),
                    column: column.column.clone(),
                    concept: column.concept.clone(),
                }
            })?;
            datasource = datasource.with_column(&column.column, concept);
        }
        let grain = syntax
            .grain
            .iter()
            .map(|g| self.env.lookup(g).map(Concept::address))
            .collect::<SemanticResult<Vec<_>>>()?;
        self.env.add_datasource(datasource.with_grain(grain));
        Ok(Statement::Datasource(DatasourceDeclaration {
            name: syntax.name.clone(),
        }))
    }

    /// Declare a concept scoped to the statement being built
    fn declare_derived(
        &mut self,
        name: &str,
        lineage: Expr,
        datatype: DataType,
        purpose: Purpose,
    ) -> SemanticResult<String> {
        let address = address_of(DEFAULT_NAMESPACE, name);
        if let Some(existing) = self.env.concept(&address) {
            if !existing.locally_derived {
                return Err(SemanticError::Shadowing {
                    name: name.to_string(),
                });
            }
        }
        let keys = if purpose == Purpose::Property {
            infer_keys(&lineage, self.env)
        } else {
            Vec::new()
        };
        let concept = Concept::new(name, DEFAULT_NAMESPACE, datatype, purpose)
            .with_lineage(lineage)
            .with_keys(keys)
            .locally_derived();
        self.env.declare_concept(concept);
        Ok(address)
    }

    fn build_select(&mut self, syntax: &SelectSyntax) -> SemanticResult<SelectStatement> {
        let mut select = SelectStatement {
            limit: syntax.limit,
            ..Default::default()
        };

        for item in &syntax.items {
            let address = match (&item.alias, &item.expr.kind) {
                (Some(alias), _) => {
                    let lineage = self.resolve_expr(&item.expr)?;
                    let datatype = infer_type(&lineage, self.env)?;
                    let purpose = infer_purpose(&lineage, self.env);
                    let address = self.declare_derived(alias, lineage, datatype, purpose)?;
                    select.local_concepts.push(address.clone());
                    address
                }
                (None, ExprKind::Ref(name)) => self.env.lookup(name)?.address(),
                (None, _) => {
                    return Err(SemanticError::UnaliasedExpression {
                        expr: item.expr.to_string(),
                    });
                }
            };
            if !select.selection.contains(&address) {
                select.selection.push(address);
            }
        }

        if let Some(condition) = &syntax.where_clause {
            let conditional = self.resolve_expr(condition)?;
            check_condition(&conditional, self.env, "WHERE clause")?;
            select.where_clause = Some(WhereClause { conditional });
        }
        if let Some(condition) = &syntax.having {
            let conditional = self.resolve_expr(condition)?;
            check_condition(&conditional, self.env, "HAVING clause")?;
            select.having_clause = Some(HavingClause { conditional });
        }
        select.order_by = self.build_order(&syntax.order_by)?;
        Ok(select)
    }

    fn build_multi_select(
        &mut self,
        syntax: &MultiSelectSyntax,
    ) -> SemanticResult<MultiSelectStatement> {
        let selects = syntax
            .selects
            .iter()
            .map(|s| self.build_select(s))
            .collect::<SemanticResult<Vec<_>>>()?;

        let mut align = Vec::new();
        let mut local_concepts = Vec::new();
        for item in &syntax.align {
            let mut concepts = Vec::new();
            for reference in &item.concepts {
                let address = self.env.lookup(reference)?.address();
                if !selects.iter().any(|s| s.selection.contains(&address)) {
                    return Err(SemanticError::InvalidAlign {
                        name: item.name.clone(),
                        reason: format!("'{}' is not selected by any merged select", reference),
                    });
                }
                concepts.push(address);
            }
            let Some(first) = concepts.first().and_then(|a| self.env.concept(a)) else {
                return Err(SemanticError::InvalidAlign {
                    name: item.name.clone(),
                    reason: "no concepts to align".to_string(),
                });
            };
            let (datatype, purpose) = (first.datatype.clone(), first.purpose);
            let lineage = Expr::Function {
                name: "coalesce".to_string(),
                args: concepts.iter().map(Expr::concept).collect(),
            };
            let address = self.declare_derived(&item.name, lineage, datatype, purpose)?;
            local_concepts.push(address.clone());
            align.push(AlignItem { address, concepts });
        }

        for select in &selects {
            local_concepts.extend(select.local_concepts.iter().cloned());
        }
        let order_by = self.build_order(&syntax.order_by)?;

        Ok(MultiSelectStatement {
            selects,
            align,
            order_by,
            limit: syntax.limit,
            local_concepts,
        })
    }

    fn build_order(&self, items: &[OrderSyntax]) -> SemanticResult<Vec<OrderItem>> {
        items
            .iter()
            .map(|item| {
                let expr = self.resolve_expr(&item.expr)?;
                infer_type(&expr, self.env)?;
                Ok(OrderItem {
                    expr,
                    direction: if item.descending {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    },
                })
            })
            .collect()
    }

    /// Resolve references in an expression to concept addresses
    pub fn resolve_expr(&self, syntax: &ExprSyntax) -> SemanticResult<Expr> {
        let expr = match &syntax.kind {
            ExprKind::Ref(name) => Expr::concept(self.env.lookup(name)?.address()),
            ExprKind::Literal(literal) => Expr::Literal(match literal {
                LiteralSyntax::Null => Literal::Null,
                LiteralSyntax::Boolean(b) => Literal::Boolean(*b),
                LiteralSyntax::Integer(i) => Literal::Integer(*i),
                LiteralSyntax::Float(f) => Literal::Float(*f),
                LiteralSyntax::String(s) => Literal::String(s.clone()),
            }),
            ExprKind::Binary { left, op, right } => {
                Expr::binary(self.resolve_expr(left)?, *op, self.resolve_expr(right)?)
            }
            ExprKind::Unary { op, expr } => Expr::UnaryOp {
                op: *op,
                expr: Box::new(self.resolve_expr(expr)?),
            },
            ExprKind::Call { name, args } => {
                if !registry().has_function(name) {
                    return Err(unknown_function(name));
                }
                Expr::Function {
                    name: name.clone(),
                    args: self.resolve_all(args)?,
                }
            }
            ExprKind::Paren(inner) => Expr::Paren(Box::new(self.resolve_expr(inner)?)),
            ExprKind::IsNull { expr, negated } => Expr::IsNull {
                expr: Box::new(self.resolve_expr(expr)?),
                negated: *negated,
            },
            ExprKind::InList {
                expr,
                list,
                negated,
            } => Expr::InList {
                expr: Box::new(self.resolve_expr(expr)?),
                list: self.resolve_all(list)?,
                negated: *negated,
            },
            ExprKind::Case { whens, else_result } => {
                let mut conditions = Vec::with_capacity(whens.len());
                let mut results = Vec::with_capacity(whens.len());
                for (condition, result) in whens {
                    conditions.push(self.resolve_expr(condition)?);
                    results.push(self.resolve_expr(result)?);
                }
                let else_result = match else_result {
                    Some(e) => Some(Box::new(self.resolve_expr(e)?)),
                    None => None,
                };
                Expr::Case {
                    conditions,
                    results,
                    else_result,
                }
            }
            ExprKind::Cast { expr, datatype } => Expr::Cast {
                expr: Box::new(self.resolve_expr(expr)?),
                type_name: self.resolve_type(datatype)?.to_string(),
            },
        };
        Ok(expr)
    }

    fn resolve_all(&self, exprs: &[ExprSyntax]) -> SemanticResult<Vec<Expr>> {
        exprs.iter().map(|e| self.resolve_expr(e)).collect()
    }
}
