//! Abstract Emitter Module
//!
//! Prints output AST statements as script text.

use crate::output::output_ast as o;
use crate::value::ArrayKey;
use once_cell::sync::Lazy;
use regex::Regex;

static SINGLE_QUOTE_ESCAPE_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"['\\\n\r\t]").expect("valid escape pattern"));

#[derive(Debug, Clone, Default)]
struct EmittedLine {
    parts: Vec<String>,
}

pub struct EmitterVisitorContext {
    lines: Vec<EmittedLine>,
}

impl EmitterVisitorContext {
    pub fn create_root() -> Self {
        EmitterVisitorContext {
            lines: vec![EmittedLine::default()],
        }
    }

    fn current_line_mut(&mut self) -> &mut EmittedLine {
        if self.lines.is_empty() {
            self.lines.push(EmittedLine::default());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part, true);
    }

    pub fn print(&mut self, part: &str, new_line: bool) {
        if !part.is_empty() {
            self.current_line_mut().parts.push(part.to_string());
        }
        if new_line {
            self.lines.push(EmittedLine::default());
        }
    }

    pub fn to_source(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.parts.join(""))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Escape a string for a single-quoted script literal
pub fn escape_string(input: &str) -> String {
    let escaped = SINGLE_QUOTE_ESCAPE_STRING_RE.replace_all(input, |caps: &regex::Captures| {
        match &caps[0] {
            "\n" => "\\n".to_string(),
            "\r" => "\\r".to_string(),
            "\t" => "\\t".to_string(),
            other => format!("\\{}", other),
        }
    });
    format!("'{}'", escaped)
}

/// Floats always carry a `.` or an exponent so they read back as floats.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NAN".to_string()
    } else if f.is_infinite() {
        let s = if f > 0.0 { "INF" } else { "-INF" };
        s.to_string()
    } else {
        let s = format!("{:?}", f);
        if s.contains('.') || s.contains('e') || s.contains('E') {
            s
        } else {
            format!("{}.0", s)
        }
    }
}

pub struct AbstractEmitterVisitor<'a> {
    ctx: &'a mut EmitterVisitorContext,
}

impl<'a> AbstractEmitterVisitor<'a> {
    pub fn new(ctx: &'a mut EmitterVisitorContext) -> Self {
        AbstractEmitterVisitor { ctx }
    }

    fn visit_all_expressions(&mut self, expressions: &[o::Expression], separator: &str) {
        for (i, expr) in expressions.iter().enumerate() {
            if i > 0 {
                self.ctx.print(separator, false);
            }
            expr.visit_expression(self);
        }
    }

    fn print_key(&mut self, key: &ArrayKey) {
        match key {
            ArrayKey::Int(i) => self.ctx.print(&i.to_string(), false),
            ArrayKey::Str(s) => self.ctx.print(&escape_string(s), false),
        }
    }
}

impl o::ExpressionVisitor for AbstractEmitterVisitor<'_> {
    type Output = ();

    fn visit_read_var_expr(&mut self, expr: &o::ReadVarExpr) {
        self.ctx.print(&expr.name, false);
    }

    fn visit_write_var_expr(&mut self, expr: &o::WriteVarExpr) {
        self.ctx.print(&expr.name, false);
        self.ctx.print(" = ", false);
        expr.value.visit_expression(self);
    }

    fn visit_read_prop_expr(&mut self, expr: &o::ReadPropExpr) {
        expr.receiver.visit_expression(self);
        self.ctx.print(".", false);
        self.ctx.print(&expr.name, false);
    }

    fn visit_write_prop_expr(&mut self, expr: &o::WritePropExpr) {
        expr.receiver.visit_expression(self);
        self.ctx.print(".", false);
        self.ctx.print(&expr.name, false);
        self.ctx.print(" = ", false);
        expr.value.visit_expression(self);
    }

    fn visit_invoke_function_expr(&mut self, expr: &o::InvokeFunctionExpr) {
        expr.fn_.visit_expression(self);
        self.ctx.print("(", false);
        self.visit_all_expressions(&expr.args, ", ");
        self.ctx.print(")", false);
    }

    fn visit_instantiate_expr(&mut self, expr: &o::InstantiateExpr) {
        self.ctx.print("new ", false);
        expr.class_expr.visit_expression(self);
        self.ctx.print("(", false);
        self.visit_all_expressions(&expr.args, ", ");
        self.ctx.print(")", false);
    }

    fn visit_literal_expr(&mut self, expr: &o::LiteralExpr) {
        let value_str = match &expr.value {
            o::LiteralValue::Null => "null".to_string(),
            o::LiteralValue::Bool(b) => b.to_string(),
            o::LiteralValue::Int(i) => i.to_string(),
            o::LiteralValue::Float(f) => format_float(*f),
            o::LiteralValue::String(s) => escape_string(s),
        };
        self.ctx.print(&value_str, false);
    }

    fn visit_literal_array_expr(&mut self, expr: &o::LiteralArrayExpr) {
        self.ctx.print("[", false);
        self.visit_all_expressions(&expr.entries, ", ");
        self.ctx.print("]", false);
    }

    fn visit_literal_map_expr(&mut self, expr: &o::LiteralMapExpr) {
        self.ctx.print("[", false);
        for (i, entry) in expr.entries.iter().enumerate() {
            if i > 0 {
                self.ctx.print(", ", false);
            }
            self.print_key(&entry.key);
            self.ctx.print(" => ", false);
            entry.value.visit_expression(self);
        }
        self.ctx.print("]", false);
    }

    fn visit_external_expr(&mut self, expr: &o::ExternalExpr) {
        self.ctx.print(&expr.value.name, false);
    }

    fn visit_comma_expr(&mut self, expr: &o::CommaExpr) {
        self.ctx.print("(", false);
        self.visit_all_expressions(&expr.parts, ", ");
        self.ctx.print(")", false);
    }
}

impl o::StatementVisitor for AbstractEmitterVisitor<'_> {
    type Output = ();

    fn visit_namespace_stmt(&mut self, stmt: &o::NamespaceStmt) {
        self.ctx.println(&format!("namespace {};", stmt.name));
        self.ctx.println("");
    }

    fn visit_expression_stmt(&mut self, stmt: &o::ExpressionStatement) {
        stmt.expr.visit_expression(self);
        self.ctx.println(";");
    }

    fn visit_return_stmt(&mut self, stmt: &o::ReturnStatement) {
        self.ctx.print("return ", false);
        stmt.value.visit_expression(self);
        self.ctx.println(";");
    }
}

/// Render statements as script text.
pub fn emit_statements(statements: &[o::Statement]) -> String {
    let mut ctx = EmitterVisitorContext::create_root();
    {
        let mut visitor = AbstractEmitterVisitor::new(&mut ctx);
        for stmt in statements {
            stmt.visit_statement(&mut visitor);
        }
    }
    ctx.to_source()
}

/// Render a single expression as script text.
pub fn emit_expression(expr: &o::Expression) -> String {
    let mut ctx = EmitterVisitorContext::create_root();
    expr.visit_expression(&mut AbstractEmitterVisitor::new(&mut ctx));
    ctx.to_source()
}
