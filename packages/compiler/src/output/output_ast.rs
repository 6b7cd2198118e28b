//! Output AST Module
//!
//! Defines the AST of compiled factory units. The emitter turns it into
//! script text and the evaluator executes it.

use crate::value::ArrayKey;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    ReadVar(ReadVarExpr),
    WriteVar(WriteVarExpr),
    ReadProp(ReadPropExpr),
    WriteProp(WritePropExpr),
    InvokeFn(InvokeFunctionExpr),
    Instantiate(InstantiateExpr),
    Literal(LiteralExpr),
    LiteralArray(LiteralArrayExpr),
    LiteralMap(LiteralMapExpr),
    External(ExternalExpr),
    CommaExpr(CommaExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadVarExpr {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteVarExpr {
    pub name: String,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadPropExpr {
    pub receiver: Box<Expression>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WritePropExpr {
    pub receiver: Box<Expression>,
    pub name: String,
    pub value: Box<Expression>,
}

/// Call of a runtime function (`prototype(...)`) or of a method (`instance.setFoo(...)`).
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeFunctionExpr {
    pub fn_: Box<Expression>,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstantiateExpr {
    pub class_expr: Box<Expression>,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralArrayExpr {
    pub entries: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapEntry {
    pub key: ArrayKey,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapExpr {
    pub entries: Vec<LiteralMapEntry>,
}

/// Reference to a class by its fully qualified name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalExpr {
    pub value: ExternalReference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalReference {
    pub name: String,
}

/// Parenthesised tuple, `(a, b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommaExpr {
    pub parts: Vec<Expression>,
}

pub trait ExpressionVisitor {
    type Output;

    fn visit_read_var_expr(&mut self, expr: &ReadVarExpr) -> Self::Output;
    fn visit_write_var_expr(&mut self, expr: &WriteVarExpr) -> Self::Output;
    fn visit_read_prop_expr(&mut self, expr: &ReadPropExpr) -> Self::Output;
    fn visit_write_prop_expr(&mut self, expr: &WritePropExpr) -> Self::Output;
    fn visit_invoke_function_expr(&mut self, expr: &InvokeFunctionExpr) -> Self::Output;
    fn visit_instantiate_expr(&mut self, expr: &InstantiateExpr) -> Self::Output;
    fn visit_literal_expr(&mut self, expr: &LiteralExpr) -> Self::Output;
    fn visit_literal_array_expr(&mut self, expr: &LiteralArrayExpr) -> Self::Output;
    fn visit_literal_map_expr(&mut self, expr: &LiteralMapExpr) -> Self::Output;
    fn visit_external_expr(&mut self, expr: &ExternalExpr) -> Self::Output;
    fn visit_comma_expr(&mut self, expr: &CommaExpr) -> Self::Output;
}

impl Expression {
    pub fn visit_expression<V: ExpressionVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expression::ReadVar(e) => visitor.visit_read_var_expr(e),
            Expression::WriteVar(e) => visitor.visit_write_var_expr(e),
            Expression::ReadProp(e) => visitor.visit_read_prop_expr(e),
            Expression::WriteProp(e) => visitor.visit_write_prop_expr(e),
            Expression::InvokeFn(e) => visitor.visit_invoke_function_expr(e),
            Expression::Instantiate(e) => visitor.visit_instantiate_expr(e),
            Expression::Literal(e) => visitor.visit_literal_expr(e),
            Expression::LiteralArray(e) => visitor.visit_literal_array_expr(e),
            Expression::LiteralMap(e) => visitor.visit_literal_map_expr(e),
            Expression::External(e) => visitor.visit_external_expr(e),
            Expression::CommaExpr(e) => visitor.visit_comma_expr(e),
        }
    }

    pub fn prop(self, name: impl Into<String>) -> Expression {
        Expression::ReadProp(ReadPropExpr {
            receiver: Box::new(self),
            name: name.into(),
        })
    }

    pub fn set_prop(self, name: impl Into<String>, value: Expression) -> Expression {
        Expression::WriteProp(WritePropExpr {
            receiver: Box::new(self),
            name: name.into(),
            value: Box::new(value),
        })
    }

    pub fn call_fn(self, args: Vec<Expression>) -> Expression {
        Expression::InvokeFn(InvokeFunctionExpr {
            fn_: Box::new(self),
            args,
        })
    }

    pub fn call_method(self, name: impl Into<String>, args: Vec<Expression>) -> Expression {
        self.prop(name).call_fn(args)
    }

    pub fn instantiate(self, args: Vec<Expression>) -> Expression {
        Expression::Instantiate(InstantiateExpr {
            class_expr: Box::new(self),
            args,
        })
    }

    pub fn to_stmt(self) -> Statement {
        Statement::Expression(ExpressionStatement { expr: Box::new(self) })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Namespace(NamespaceStmt),
    Expression(ExpressionStatement),
    Return(ReturnStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceStmt {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expr: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Box<Expression>,
}

pub trait StatementVisitor {
    type Output;

    fn visit_namespace_stmt(&mut self, stmt: &NamespaceStmt) -> Self::Output;
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStatement) -> Self::Output;
    fn visit_return_stmt(&mut self, stmt: &ReturnStatement) -> Self::Output;
}

impl Statement {
    pub fn visit_statement<V: StatementVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Statement::Namespace(s) => visitor.visit_namespace_stmt(s),
            Statement::Expression(s) => visitor.visit_expression_stmt(s),
            Statement::Return(s) => visitor.visit_return_stmt(s),
        }
    }
}

// Helper functions for creating common expressions
pub fn variable(name: impl Into<String>) -> Expression {
    Expression::ReadVar(ReadVarExpr { name: name.into() })
}

pub fn assign(name: impl Into<String>, value: Expression) -> Expression {
    Expression::WriteVar(WriteVarExpr {
        name: name.into(),
        value: Box::new(value),
    })
}

pub fn literal(value: impl Into<LiteralValue>) -> Expression {
    Expression::Literal(LiteralExpr { value: value.into() })
}

pub fn null_expr() -> Expression {
    literal(LiteralValue::Null)
}

pub fn literal_arr(entries: Vec<Expression>) -> Expression {
    Expression::LiteralArray(LiteralArrayExpr { entries })
}

pub fn literal_map(entries: Vec<LiteralMapEntry>) -> Expression {
    Expression::LiteralMap(LiteralMapExpr { entries })
}

pub fn import_ref(name: impl Into<String>) -> Expression {
    Expression::External(ExternalExpr {
        value: ExternalReference { name: name.into() },
    })
}

pub fn namespace(name: impl Into<String>) -> Statement {
    Statement::Namespace(NamespaceStmt { name: name.into() })
}

/// `return (instance, is_singleton);`
pub fn return_tuple(instance: Expression, is_singleton: bool) -> Statement {
    Statement::Return(ReturnStatement {
        value: Box::new(Expression::CommaExpr(CommaExpr {
            parts: vec![instance, literal(is_singleton)],
        })),
    })
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::String(s)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::String(s.to_string())
    }
}

impl From<i64> for LiteralValue {
    fn from(n: i64) -> Self {
        LiteralValue::Int(n)
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Float(n)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Bool(b)
    }
}
