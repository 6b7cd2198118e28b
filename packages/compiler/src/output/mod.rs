//! Output Module
//!
//! Syntax tree of compiled units, the emitter that prints it and the
//! evaluator that runs it.

pub mod abstract_emitter;
pub mod output_ast;
pub mod output_jit;
