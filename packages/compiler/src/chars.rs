//! Character constants and classes used by the script lexer

pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const CR: char = '\r';
pub const SPACE: char = ' ';

pub const SQ: char = '\'';
pub const LPAREN: char = '(';
pub const RPAREN: char = ')';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const PERIOD: char = '.';
pub const SEMICOLON: char = ';';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const LBRACKET: char = '[';
pub const RBRACKET: char = ']';
pub const BACKSLASH: char = '\\';
pub const UNDERSCORE: char = '_';
pub const SLASH: char = '/';

pub const ZERO: char = '0';
pub const NINE: char = '9';

pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == TAB || ch == LF || ch == CR || (ch != EOF && ch < ' ')
}

pub fn is_digit(ch: char) -> bool {
    (ZERO..=NINE).contains(&ch)
}

pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Check if character can start an identifier
pub fn is_identifier_start(ch: char) -> bool {
    is_ascii_letter(ch) || ch == UNDERSCORE
}

/// Identifiers may contain namespace separators so class paths lex as one token.
pub fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || is_digit(ch) || ch == BACKSLASH
}
