//! Code artifacts

use crate::di::argument::ParameterRef;
use crate::output::abstract_emitter::emit_statements;
use crate::output::output_ast as o;
use crate::value::Value;
use std::fmt;

/// Qualifier payload of a parameter that receives a contextual provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IpQualifier {
    pub parameter: ParameterRef,
    pub qualifier: Value,
}

/// One compiled factory unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub statements: Vec<o::Statement>,
    pub is_singleton: bool,
    pub qualifiers: Vec<IpQualifier>,
}

impl Code {
    pub fn new(statements: Vec<o::Statement>, is_singleton: bool) -> Self {
        Code {
            statements,
            is_singleton,
            qualifiers: Vec::new(),
        }
    }

    pub fn to_source(&self) -> String {
        emit_statements(&self.statements)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}
