//! Binding descriptors

use crate::di::argument::Argument;
use crate::error::Result;
use crate::reflection::{ClassRegistry, Scope, CONSTRUCTOR};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetterMethod {
    pub method: String,
    pub arguments: Vec<Argument>,
    pub is_optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInstance {
    pub class: String,
    pub arguments: Vec<Argument>,
    pub setters: Vec<SetterMethod>,
}

/// Constructor-based class binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub new_instance: NewInstance,
    pub post_construct: Option<String>,
    pub is_singleton: bool,
    /// Method name to interceptor classes, filled in by weaving.
    #[serde(default)]
    pub bindings: IndexMap<String, Vec<String>>,
}

impl Dependency {
    /// Injection plan of a class taken from its registered metadata.
    pub fn from_class(classes: &ClassRegistry, class: &str) -> Result<Dependency> {
        let def = classes.get(class)?;
        let arguments = def
            .constructor
            .iter()
            .map(|p| Argument::from_param(class, CONSTRUCTOR, p))
            .collect();
        let setters = def
            .setters
            .iter()
            .map(|s| SetterMethod {
                method: s.method.clone(),
                arguments: s
                    .params
                    .iter()
                    .map(|p| Argument::from_param(class, &s.method, p))
                    .collect(),
                is_optional: s.optional,
            })
            .collect();
        Ok(Dependency {
            new_instance: NewInstance {
                class: class.to_string(),
                arguments,
                setters,
            },
            post_construct: def.post_construct.clone(),
            is_singleton: def.scope == Scope::Singleton,
            bindings: IndexMap::new(),
        })
    }

    pub fn class(&self) -> &str {
        &self.new_instance.class
    }

    /// Every argument of the constructor and the setters, in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.new_instance.arguments.iter().chain(
            self.new_instance
                .setters
                .iter()
                .flat_map(|s| s.arguments.iter()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyProvider {
    pub dependency: Dependency,
    pub is_singleton: bool,
    /// Passed to the provider through `setContext` before `get`.
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceBinding {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullObjectBinding {
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    Instance(InstanceBinding),
    Class(Dependency),
    Provider(DependencyProvider),
    NullObject(NullObjectBinding),
}

impl Binding {
    pub fn instance(value: impl Into<Value>) -> Self {
        Binding::Instance(InstanceBinding {
            value: value.into(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Instance(_) => "instance",
            Binding::Class(_) => "class",
            Binding::Provider(_) => "provider",
            Binding::NullObject(_) => "null_object",
        }
    }

    pub fn is_singleton(&self) -> bool {
        match self {
            Binding::Class(d) => d.is_singleton,
            Binding::Provider(p) => p.is_singleton,
            Binding::Instance(_) | Binding::NullObject(_) => false,
        }
    }

    pub fn set_singleton(&mut self) {
        match self {
            Binding::Class(d) => d.is_singleton = true,
            Binding::Provider(p) => p.is_singleton = true,
            Binding::Instance(_) | Binding::NullObject(_) => {}
        }
    }
}
