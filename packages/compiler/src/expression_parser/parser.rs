//! Script Parser
//!
//! Recursive descent parser turning the text of a compiled unit back into
//! output AST statements.

use super::lexer::{Lexer, Token};
use crate::chars;
use crate::error::{CompilerError, Result};
use crate::output::output_ast as o;
use crate::value::ArrayKey;

pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            lexer: Lexer::new(),
        }
    }

    /// Parse a whole unit. `file` is only used for diagnostics.
    pub fn parse_unit(&self, file: &str, input: &str) -> Result<Vec<o::Statement>> {
        let tokens = self.lexer.tokenize(input);
        let mut ast = ParseAST::new(file, input, tokens);
        ast.parse_statements()
    }

    /// Parse a single expression.
    pub fn parse_expression(&self, input: &str) -> Result<o::Expression> {
        let tokens = self.lexer.tokenize(input);
        let mut ast = ParseAST::new("<expression>", input, tokens);
        let expr = ast.parse_expression()?;
        if let Some(token) = ast.peek() {
            return Err(ast.error_at(token.index, format!("Unexpected token '{}'", token.str_value)));
        }
        Ok(expr)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

struct ParseAST<'a> {
    file: &'a str,
    input: &'a str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> ParseAST<'a> {
    fn new(file: &'a str, input: &'a str, tokens: Vec<Token>) -> Self {
        ParseAST {
            file,
            input,
            tokens,
            index: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Result<Token> {
        match self.tokens.get(self.index) {
            Some(token) if token.is_error() => {
                Err(self.error_at(token.index, token.str_value.clone()))
            }
            Some(token) => {
                let token = token.clone();
                self.index += 1;
                Ok(token)
            }
            None => Err(self.error_at(self.input.len(), "Unexpected end of input".to_string())),
        }
    }

    fn error_at(&self, offset: usize, message: String) -> CompilerError {
        CompilerError::Syntax {
            file: self.file.to_string(),
            offset,
            message,
        }
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.peek().map_or(false, |t| t.is_character(code)) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_character(&mut self, code: char) -> Result<()> {
        let token = self.next()?;
        if token.is_character(code) {
            Ok(())
        } else {
            Err(self.error_at(
                token.index,
                format!("Missing expected {} but found '{}'", code, token.str_value),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let token = self.next()?;
        if token.is_identifier() || token.token_type == super::lexer::TokenType::Keyword {
            Ok(token.str_value)
        } else {
            Err(self.error_at(
                token.index,
                format!("Expected identifier but found '{}'", token.str_value),
            ))
        }
    }

    fn parse_statements(&mut self) -> Result<Vec<o::Statement>> {
        let mut statements = Vec::new();
        while let Some(token) = self.peek() {
            if token.is_keyword("namespace") {
                self.index += 1;
                let name = self.expect_identifier()?;
                self.expect_character(chars::SEMICOLON)?;
                statements.push(o::namespace(name));
            } else if token.is_keyword("return") {
                self.index += 1;
                let value = self.parse_expression()?;
                self.expect_character(chars::SEMICOLON)?;
                statements.push(o::Statement::Return(o::ReturnStatement {
                    value: Box::new(value),
                }));
            } else {
                let expr = self.parse_expression()?;
                self.expect_character(chars::SEMICOLON)?;
                statements.push(expr.to_stmt());
            }
        }
        Ok(statements)
    }

    fn parse_expression(&mut self) -> Result<o::Expression> {
        let start = self.peek().map_or(self.input.len(), |t| t.index);
        let target = self.parse_postfix()?;
        if !self.consume_optional_character(chars::EQ) {
            return Ok(target);
        }
        let value = self.parse_expression()?;
        match target {
            o::Expression::ReadVar(var) => Ok(o::assign(var.name, value)),
            o::Expression::ReadProp(prop) => Ok(prop_write(prop, value)),
            _ => Err(self.error_at(start, "Invalid assignment target".to_string())),
        }
    }

    fn parse_postfix(&mut self) -> Result<o::Expression> {
        let mut result = self.parse_primary()?;
        loop {
            if self.consume_optional_character(chars::PERIOD) {
                let name = self.expect_identifier()?;
                result = result.prop(name);
            } else if self.consume_optional_character(chars::LPAREN) {
                let args = self.parse_call_arguments()?;
                result = result.call_fn(args);
            } else {
                return Ok(result);
            }
        }
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<o::Expression>> {
        let mut args = Vec::new();
        if self.consume_optional_character(chars::RPAREN) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.consume_optional_character(chars::COMMA) {
                continue;
            }
            self.expect_character(chars::RPAREN)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> Result<o::Expression> {
        let token = self.next()?;
        if token.is_keyword("null") {
            Ok(o::null_expr())
        } else if token.is_keyword("true") {
            Ok(o::literal(true))
        } else if token.is_keyword("false") {
            Ok(o::literal(false))
        } else if token.is_keyword("NAN") {
            Ok(o::literal(f64::NAN))
        } else if token.is_keyword("INF") {
            Ok(o::literal(f64::INFINITY))
        } else if token.is_number() {
            self.number_literal(&token, false)
        } else if token.is_operator("-") {
            let operand = self.next()?;
            if operand.is_keyword("INF") {
                Ok(o::literal(f64::NEG_INFINITY))
            } else if operand.is_number() {
                self.number_literal(&operand, true)
            } else {
                Err(self.error_at(operand.index, "Expected number after '-'".to_string()))
            }
        } else if token.is_string() {
            Ok(o::literal(token.str_value))
        } else if token.is_keyword("new") {
            let class = self.expect_identifier()?;
            self.expect_character(chars::LPAREN)?;
            let args = self.parse_call_arguments()?;
            Ok(o::import_ref(class).instantiate(args))
        } else if token.is_identifier() {
            Ok(o::variable(token.str_value))
        } else if token.is_character(chars::LBRACKET) {
            self.parse_array()
        } else if token.is_character(chars::LPAREN) {
            let mut parts = vec![self.parse_expression()?];
            while self.consume_optional_character(chars::COMMA) {
                parts.push(self.parse_expression()?);
            }
            self.expect_character(chars::RPAREN)?;
            if parts.len() == 1 {
                Ok(parts.remove(0))
            } else {
                Ok(o::Expression::CommaExpr(o::CommaExpr { parts }))
            }
        } else {
            Err(self.error_at(token.index, format!("Unexpected token '{}'", token.str_value)))
        }
    }

    fn number_literal(&self, token: &Token, negative: bool) -> Result<o::Expression> {
        let text = if negative {
            format!("-{}", token.str_value)
        } else {
            token.str_value.clone()
        };
        let invalid = || self.error_at(token.index, format!("Invalid number '{}'", text));
        if token.is_float_number() {
            Ok(o::literal(text.parse::<f64>().map_err(|_| invalid())?))
        } else {
            Ok(o::literal(text.parse::<i64>().map_err(|_| invalid())?))
        }
    }

    fn parse_array(&mut self) -> Result<o::Expression> {
        if self.consume_optional_character(chars::RBRACKET) {
            return Ok(o::literal_arr(vec![]));
        }
        let first = self.parse_expression()?;
        let is_map = self.peek().map_or(false, |t| t.is_operator("=>"));
        if !is_map {
            let mut entries = vec![first];
            while self.consume_optional_character(chars::COMMA) {
                entries.push(self.parse_expression()?);
            }
            self.expect_character(chars::RBRACKET)?;
            return Ok(o::literal_arr(entries));
        }

        let mut entries = Vec::new();
        let mut key_expr = first;
        loop {
            let arrow = self.next()?;
            if !arrow.is_operator("=>") {
                return Err(self.error_at(arrow.index, "Expected '=>'".to_string()));
            }
            let key = self.map_key(key_expr, arrow.index)?;
            let value = self.parse_expression()?;
            entries.push(o::LiteralMapEntry {
                key,
                value: Box::new(value),
            });
            if !self.consume_optional_character(chars::COMMA) {
                break;
            }
            key_expr = self.parse_expression()?;
        }
        self.expect_character(chars::RBRACKET)?;
        Ok(o::literal_map(entries))
    }

    fn map_key(&self, expr: o::Expression, offset: usize) -> Result<ArrayKey> {
        match expr {
            o::Expression::Literal(o::LiteralExpr {
                value: o::LiteralValue::Int(i),
            }) => Ok(ArrayKey::Int(i)),
            o::Expression::Literal(o::LiteralExpr {
                value: o::LiteralValue::String(s),
            }) => Ok(ArrayKey::Str(s)),
            _ => Err(self.error_at(offset, "Array keys must be integer or string literals".to_string())),
        }
    }
}

fn prop_write(prop: o::ReadPropExpr, value: o::Expression) -> o::Expression {
    o::Expression::WriteProp(o::WritePropExpr {
        receiver: prop.receiver,
        name: prop.name,
        value: Box::new(value),
    })
}
