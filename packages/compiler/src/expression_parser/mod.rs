/**
 * Expression Parser Module
 *
 * Reads compiled unit text back into output AST statements.
 */
pub mod lexer;
pub mod parser;

pub use lexer::Lexer;
pub use parser::Parser;
