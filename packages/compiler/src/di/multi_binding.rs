//! Map multi-bindings
//!
//! Several bindings of one interface collected under map keys. Every element
//! is an ordinary binding of the interface with a reserved name, so it is
//! compiled and resolved like any other key.

use crate::di::dependency_key::DependencyKey;
use crate::value::ArrayKey;
use serde::{Deserialize, Serialize};

/// Elements of one interface's map, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapBinding {
    elements: Vec<(ArrayKey, DependencyKey)>,
}

impl MapBinding {
    pub fn new() -> Self {
        MapBinding::default()
    }

    /// Binding name of the element stored under `key`.
    pub fn element_name(key: &ArrayKey) -> String {
        format!("@{}", key)
    }

    pub fn element_key(interface: &str, key: &ArrayKey) -> DependencyKey {
        DependencyKey::new(interface, &MapBinding::element_name(key))
    }

    /// Next integer key after the largest one, as arrays append.
    pub fn next_index(&self) -> i64 {
        self.elements
            .iter()
            .filter_map(|(key, _)| match key {
                ArrayKey::Int(i) => Some(i.saturating_add(1)),
                ArrayKey::Str(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn contains(&self, key: &ArrayKey) -> bool {
        self.elements.iter().any(|(k, _)| k == key)
    }

    /// Add or replace the element under `key`.
    pub fn insert(&mut self, key: ArrayKey, element: DependencyKey) {
        match self.elements.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = element,
            None => self.elements.push((key, element)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &DependencyKey)> {
        self.elements.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
