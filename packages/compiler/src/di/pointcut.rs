//! Interceptor pointcuts

use crate::reflection::ClassRegistry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Matcher {
    Any,
    /// The class itself or anything extending or implementing it.
    SubclassesOf(String),
    StartsWith(String),
    Named(String),
}

impl Matcher {
    pub fn matches_class(&self, classes: &ClassRegistry, class: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::SubclassesOf(parent) => classes.is_subclass_of(class, parent),
            Matcher::StartsWith(prefix) => class.starts_with(prefix.as_str()),
            Matcher::Named(name) => class == name,
        }
    }

    pub fn matches_method(&self, method: &str) -> bool {
        match self {
            Matcher::Any => true,
            Matcher::SubclassesOf(_) => false,
            Matcher::StartsWith(prefix) => method.starts_with(prefix.as_str()),
            Matcher::Named(name) => method == name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointcut {
    pub class_matcher: Matcher,
    pub method_matcher: Matcher,
    pub interceptors: Vec<String>,
}
