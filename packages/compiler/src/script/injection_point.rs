//! Injection Point

use crate::di::argument::ParameterRef;
use crate::error::{CompilerError, Result};
use crate::script::qualifier_path;
use crate::value::{NativeValue, Value};
use std::any::Any;
use std::fs;
use std::path::Path;

/// The parameter a provider is currently supplying, with its qualifier payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionPoint {
    parameter: ParameterRef,
    qualifier: Option<Value>,
}

impl InjectionPoint {
    pub const TYPE_NAME: &'static str = "InjectionPoint";

    pub fn new(parameter: ParameterRef, qualifier: Option<Value>) -> Self {
        InjectionPoint {
            parameter,
            qualifier,
        }
    }

    /// Reads the qualifier side file of `parameter`, if one was saved.
    pub fn load(script_dir: &Path, parameter: ParameterRef) -> Result<Self> {
        let path = qualifier_path(script_dir, &parameter);
        let qualifier = if path.exists() {
            let json = fs::read(&path).map_err(|e| CompilerError::io(&path, e))?;
            Some(serde_json::from_slice(&json)?)
        } else {
            None
        };
        Ok(InjectionPoint::new(parameter, qualifier))
    }

    pub fn parameter(&self) -> &ParameterRef {
        &self.parameter
    }

    pub fn class(&self) -> &str {
        &self.parameter.class
    }

    pub fn method(&self) -> &str {
        &self.parameter.method
    }

    pub fn qualifier(&self) -> Option<&Value> {
        self.qualifier.as_ref()
    }

    pub fn qualifiers(&self) -> Vec<Value> {
        vec![self.qualifier.clone().unwrap_or(Value::Null)]
    }
}

impl NativeValue for InjectionPoint {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
