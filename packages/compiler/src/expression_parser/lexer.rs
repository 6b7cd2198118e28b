//! Script Lexer
//!
//! Tokenizes compiled factory units.

use crate::chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Character,
    Identifier,
    Keyword,
    String,
    Operator,
    Number,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub str_value: String,
}

impl Token {
    pub fn new(index: usize, end: usize, token_type: TokenType, str_value: String) -> Self {
        Token {
            index,
            end,
            token_type,
            str_value,
        }
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }

    /// Float literals always carry a fraction or an exponent.
    pub fn is_float_number(&self) -> bool {
        self.is_number() && self.str_value.contains(['.', 'e', 'E'])
    }
}

const KEYWORDS: &[&str] = &[
    "namespace", "new", "return", "null", "true", "false", "NAN", "INF",
];

pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text).scan()
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Lexer::new()
    }
}

struct Scanner<'a> {
    input: &'a str,
    length: usize,
    index: usize,
    peek: char,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        let peek = input.chars().next().unwrap_or(chars::EOF);
        Scanner {
            input,
            length: input.len(),
            index: 0,
            peek,
        }
    }

    fn scan(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan_token() {
            let stop = token.is_error();
            tokens.push(token);
            if stop {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = self.input[self.index..].chars().next().unwrap_or(chars::EOF);
    }

    fn peek_next(&self) -> char {
        self.input[self.index..].chars().nth(1).unwrap_or(chars::EOF)
    }

    fn scan_token(&mut self) -> Option<Token> {
        loop {
            while self.index < self.length && chars::is_whitespace(self.peek) {
                self.advance();
            }
            // line comments
            if self.peek == chars::SLASH && self.peek_next() == chars::SLASH {
                while self.index < self.length && self.peek != chars::LF {
                    self.advance();
                }
                continue;
            }
            break;
        }

        if self.index >= self.length {
            return None;
        }

        let start = self.index;
        let ch = self.peek;

        if chars::is_identifier_start(ch) || ch == chars::BACKSLASH {
            return Some(self.scan_identifier());
        }
        if chars::is_digit(ch) {
            return Some(self.scan_number(start));
        }

        Some(match ch {
            chars::LPAREN
            | chars::RPAREN
            | chars::COMMA
            | chars::SEMICOLON
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::PERIOD => self.scan_character(start, ch),
            chars::SQ => self.scan_string(),
            chars::MINUS => self.scan_operator(start, "-"),
            chars::EQ => {
                self.advance();
                if self.peek == chars::GT {
                    self.advance();
                    Token::new(start, self.index, TokenType::Operator, "=>".to_string())
                } else {
                    Token::new(start, self.index, TokenType::Character, "=".to_string())
                }
            }
            _ => {
                self.advance();
                self.error(start, format!("Unexpected character [{}]", ch))
            }
        })
    }

    fn error(&self, start: usize, message: String) -> Token {
        Token::new(start, self.index, TokenType::Error, message)
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::new(start, self.index, TokenType::Character, ch.to_string())
    }

    fn scan_operator(&mut self, start: usize, op: &str) -> Token {
        self.advance();
        Token::new(start, self.index, TokenType::Operator, op.to_string())
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();
        while self.index < self.length && chars::is_identifier_part(self.peek) {
            self.advance();
        }
        let str_value = self.input[start..self.index].to_string();
        let token_type = if KEYWORDS.contains(&str_value.as_str()) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        Token::new(start, self.index, token_type, str_value)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self.index < self.length {
            if chars::is_digit(self.peek) || self.peek == chars::PERIOD {
                self.advance();
            } else if self.peek == 'e' || self.peek == 'E' {
                self.advance();
                if self.peek == '+' || self.peek == chars::MINUS {
                    self.advance();
                }
            } else {
                break;
            }
        }
        let str_value = self.input[start..self.index].to_string();
        if str_value.ends_with(['e', 'E', '+', '-']) {
            return self.error(start, format!("Invalid exponent in [{}]", str_value));
        }
        Token::new(start, self.index, TokenType::Number, str_value)
    }

    fn scan_string(&mut self) -> Token {
        let start = self.index;
        self.advance();

        let mut buffer = String::new();
        let mut escaped = false;
        while self.index < self.length {
            let ch = self.peek;
            if escaped {
                buffer.push(match ch {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    _ => ch,
                });
                escaped = false;
            } else if ch == chars::BACKSLASH {
                escaped = true;
            } else if ch == chars::SQ {
                self.advance();
                return Token::new(start, self.index, TokenType::String, buffer);
            } else {
                buffer.push(ch);
            }
            self.advance();
        }

        self.error(start, "Unterminated quote".to_string())
    }
}
