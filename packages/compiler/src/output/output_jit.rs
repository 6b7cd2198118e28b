//! Output JIT Module
//!
//! Evaluates compiled factory units against a [`FactoryContext`].

use crate::di::argument::ParameterRef;
use crate::di::dependency_key::DependencyKey;
use crate::error::{CompilerError, Result};
use crate::output::output_ast as o;
use crate::reflection::ClassRegistry;
use crate::value::{Array, ArrayKey, Object, Value};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use indexmap::IndexMap;

/// Runtime services a compiled unit calls into.
pub trait FactoryContext {
    /// A fresh instance for `key` unless its unit declares singleton scope.
    fn prototype(&self, key: &DependencyKey, injection_point: Option<ParameterRef>) -> Result<Value>;

    /// The shared instance for `key`.
    fn singleton(&self, key: &DependencyKey, injection_point: Option<ParameterRef>) -> Result<Value>;

    /// Descriptor of the parameter currently being supplied.
    fn injection_point(&self) -> Result<Value>;

    /// Self-reference of the running injector.
    fn injector(&self) -> Result<Value>;

    fn classes(&self) -> &ClassRegistry;
}

/// Executes the statements of one unit and returns its `(instance, is_singleton)` tuple.
pub struct JitEvaluator;

impl JitEvaluator {
    pub fn new() -> Self {
        JitEvaluator
    }

    /// Evaluate unit statements
    ///
    /// # Arguments
    /// * `source_url` - Name of the unit, used in diagnostics
    /// * `statements` - The parsed unit
    /// * `ctx` - Supplies pulls, the injection point and the injector
    pub fn evaluate_statements(
        &self,
        source_url: &str,
        statements: &[o::Statement],
        ctx: &dyn FactoryContext,
    ) -> Result<(Value, bool)> {
        let mut visitor = JitEmitterVisitor::new(source_url, ctx);
        for stmt in statements {
            if let Some(result) = stmt.visit_statement(&mut visitor)? {
                return Ok(result);
            }
        }
        Err(CompilerError::runtime(format!(
            "{}: unit has no return statement",
            source_url
        )))
    }

    /// Evaluate a single expression, e.g. a normalized value.
    pub fn evaluate_expression(&self, expr: &o::Expression, ctx: &dyn FactoryContext) -> Result<Value> {
        expr.visit_expression(&mut JitEmitterVisitor::new("<expression>", ctx))
    }
}

impl Default for JitEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Visitor that executes output AST nodes.
pub struct JitEmitterVisitor<'a> {
    source_url: &'a str,
    ctx: &'a dyn FactoryContext,
    vars: IndexMap<String, Value>,
}

impl<'a> JitEmitterVisitor<'a> {
    pub fn new(source_url: &'a str, ctx: &'a dyn FactoryContext) -> Self {
        JitEmitterVisitor {
            source_url,
            ctx,
            vars: IndexMap::new(),
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> CompilerError {
        CompilerError::runtime(format!("{}: {}", self.source_url, message))
    }

    fn visit_all(&mut self, expressions: &[o::Expression]) -> Result<Vec<Value>> {
        expressions.iter().map(|e| e.visit_expression(self)).collect()
    }

    fn string_arg(&self, func: &str, args: &[Value], index: usize) -> Result<String> {
        args.get(index)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| self.error(format!("{}() expects a string argument #{}", func, index + 1)))
    }

    /// `['Class', 'method', 'param']`
    fn injection_point_arg(&self, func: &str, args: &[Value]) -> Result<Option<ParameterRef>> {
        let Some(value) = args.get(1) else {
            return Ok(None);
        };
        let parts: Vec<&str> = value
            .as_array()
            .map(|a| a.values().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        match parts.as_slice() {
            [class, method, parameter] => Ok(Some(ParameterRef::new(*class, *method, *parameter))),
            _ => Err(self.error(format!("{}() expects an injection point triple", func))),
        }
    }

    fn call_builtin(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        match name {
            "prototype" | "singleton" => {
                let key = DependencyKey::from(self.string_arg(name, &args, 0)?);
                let ip = self.injection_point_arg(name, &args)?;
                if name == "singleton" {
                    self.ctx.singleton(&key, ip)
                } else {
                    self.ctx.prototype(&key, ip)
                }
            }
            "injection_point" => self.ctx.injection_point(),
            "injector" => self.ctx.injector(),
            "restore" => {
                let class = self.string_arg(name, &args, 0)?;
                let mut properties = IndexMap::new();
                if let Some(array) = args.get(1).and_then(|v| v.as_array()) {
                    for (key, value) in array.iter() {
                        properties.insert(key.to_string(), value.clone());
                    }
                }
                Ok(Value::Object(Object::with_properties(class, properties)))
            }
            "unserialize" => {
                let type_name = self.string_arg(name, &args, 0)?;
                let encoded = self.string_arg(name, &args, 1)?;
                let bytes = BASE64
                    .decode(encoded.as_bytes())
                    .map_err(|e| self.error(format!("invalid snapshot of {}: {}", type_name, e)))?;
                Ok(Value::Native(self.ctx.classes().decode_native(&type_name, &bytes)?))
            }
            _ => Err(self.error(format!("call to undefined function {}()", name))),
        }
    }
}

impl o::ExpressionVisitor for JitEmitterVisitor<'_> {
    type Output = Result<Value>;

    fn visit_read_var_expr(&mut self, expr: &o::ReadVarExpr) -> Result<Value> {
        self.vars
            .get(&expr.name)
            .cloned()
            .ok_or_else(|| self.error(format!("undefined variable {}", expr.name)))
    }

    fn visit_write_var_expr(&mut self, expr: &o::WriteVarExpr) -> Result<Value> {
        let value = expr.value.visit_expression(self)?;
        self.vars.insert(expr.name.clone(), value.clone());
        Ok(value)
    }

    fn visit_read_prop_expr(&mut self, expr: &o::ReadPropExpr) -> Result<Value> {
        let receiver = expr.receiver.visit_expression(self)?;
        match receiver.as_object() {
            Some(object) => Ok(object.get(&expr.name).unwrap_or(Value::Null)),
            None => Err(self.error(format!(
                "property {} read on non-object {}",
                expr.name,
                receiver.type_name()
            ))),
        }
    }

    fn visit_write_prop_expr(&mut self, expr: &o::WritePropExpr) -> Result<Value> {
        let receiver = expr.receiver.visit_expression(self)?;
        let value = expr.value.visit_expression(self)?;
        match receiver.as_object() {
            Some(object) => {
                object.set(expr.name.clone(), value.clone());
                Ok(value)
            }
            None => Err(self.error(format!(
                "property {} written on non-object {}",
                expr.name,
                receiver.type_name()
            ))),
        }
    }

    fn visit_invoke_function_expr(&mut self, expr: &o::InvokeFunctionExpr) -> Result<Value> {
        match expr.fn_.as_ref() {
            o::Expression::ReadVar(func) => {
                let args = self.visit_all(&expr.args)?;
                self.call_builtin(&func.name, args)
            }
            o::Expression::ReadProp(method) => {
                let receiver = method.receiver.visit_expression(self)?;
                let args = self.visit_all(&expr.args)?;
                match receiver.as_object() {
                    Some(object) => self.ctx.classes().invoke(object, &method.name, &args),
                    None => Err(self.error(format!(
                        "method {}() called on non-object {}",
                        method.name,
                        receiver.type_name()
                    ))),
                }
            }
            _ => Err(self.error("expression is not callable")),
        }
    }

    fn visit_instantiate_expr(&mut self, expr: &o::InstantiateExpr) -> Result<Value> {
        let class = match expr.class_expr.as_ref() {
            o::Expression::External(external) => external.value.name.clone(),
            _ => return Err(self.error("new expects a class name")),
        };
        let args = self.visit_all(&expr.args)?;
        Ok(Value::Object(self.ctx.classes().new_instance(&class, args)?))
    }

    fn visit_literal_expr(&mut self, expr: &o::LiteralExpr) -> Result<Value> {
        Ok(match &expr.value {
            o::LiteralValue::Null => Value::Null,
            o::LiteralValue::Bool(b) => Value::Bool(*b),
            o::LiteralValue::Int(i) => Value::Int(*i),
            o::LiteralValue::Float(f) => Value::Float(*f),
            o::LiteralValue::String(s) => Value::String(s.clone()),
        })
    }

    fn visit_literal_array_expr(&mut self, expr: &o::LiteralArrayExpr) -> Result<Value> {
        Ok(Value::Array(Array::from_values(self.visit_all(&expr.entries)?)))
    }

    fn visit_literal_map_expr(&mut self, expr: &o::LiteralMapExpr) -> Result<Value> {
        let mut array = Array::new();
        for entry in &expr.entries {
            let value = entry.value.visit_expression(self)?;
            array.insert(entry.key.clone(), value);
        }
        Ok(Value::Array(array))
    }

    fn visit_external_expr(&mut self, expr: &o::ExternalExpr) -> Result<Value> {
        Ok(Value::String(expr.value.name.clone()))
    }

    fn visit_comma_expr(&mut self, expr: &o::CommaExpr) -> Result<Value> {
        let mut array = Array::new();
        for (i, value) in self.visit_all(&expr.parts)?.into_iter().enumerate() {
            array.insert(ArrayKey::Int(i as i64), value);
        }
        Ok(Value::Array(array))
    }
}

impl o::StatementVisitor for JitEmitterVisitor<'_> {
    type Output = Result<Option<(Value, bool)>>;

    fn visit_namespace_stmt(&mut self, _stmt: &o::NamespaceStmt) -> Self::Output {
        Ok(None)
    }

    fn visit_expression_stmt(&mut self, stmt: &o::ExpressionStatement) -> Self::Output {
        stmt.expr.visit_expression(self)?;
        Ok(None)
    }

    fn visit_return_stmt(&mut self, stmt: &o::ReturnStatement) -> Self::Output {
        let parts = match stmt.value.as_ref() {
            o::Expression::CommaExpr(comma) if comma.parts.len() == 2 => &comma.parts,
            _ => return Err(self.error("unit must return (instance, is_singleton)")),
        };
        let instance = parts[0].visit_expression(self)?;
        match parts[1].visit_expression(self)? {
            Value::Bool(is_singleton) => Ok(Some((instance, is_singleton))),
            other => Err(self.error(format!(
                "scope flag must be a bool, got {}",
                other.type_name()
            ))),
        }
    }
}
