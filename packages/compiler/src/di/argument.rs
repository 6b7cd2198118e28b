//! Constructor and setter arguments of a binding.

use crate::di::dependency_key::{file_stem, DependencyKey, NAME_ANY};
use crate::reflection::ParamDef;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declaring class, method and parameter name of an injected argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterRef {
    pub class: String,
    pub method: String,
    pub parameter: String,
}

impl ParameterRef {
    pub fn new(class: impl Into<String>, method: impl Into<String>, parameter: impl Into<String>) -> Self {
        ParameterRef {
            class: class.into(),
            method: method.into(),
            parameter: parameter.into(),
        }
    }

    /// `{class}-{method}-{parameter}.json`
    pub fn qualifier_file_name(&self) -> String {
        format!("{}-{}-{}.json", file_stem(&self.class), self.method, self.parameter)
    }
}

impl fmt::Display for ParameterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(${})", self.class, self.method, self.parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub key: DependencyKey,
    pub parameter: ParameterRef,
    pub default: Option<Value>,
    pub qualifier: Option<Value>,
    /// Receives the map multi-binding of this interface.
    #[serde(default)]
    pub set: Option<String>,
}

impl Argument {
    pub fn new(key: DependencyKey, parameter: ParameterRef) -> Self {
        Argument {
            key,
            parameter,
            default: None,
            qualifier: None,
            set: None,
        }
    }

    pub fn from_param(class: &str, method: &str, param: &ParamDef) -> Self {
        let interface = param.type_hint.as_deref().unwrap_or("");
        let name = param.named.as_deref().unwrap_or(NAME_ANY);
        Argument {
            key: DependencyKey::new(interface, name),
            parameter: ParameterRef::new(class, method, param.name.clone()),
            default: param.default.clone(),
            qualifier: param.qualifier.clone(),
            set: param.set.clone(),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key.as_str())
    }
}
