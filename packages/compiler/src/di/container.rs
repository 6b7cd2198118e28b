//! Binding graph

use crate::di::binding::{Binding, Dependency};
use crate::di::dependency_key::DependencyKey;
use crate::di::module::{Binder, Module};
use crate::di::multi_binding::MapBinding;
use crate::di::pointcut::Pointcut;
use crate::error::Result;
use crate::reflection::ClassRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    bindings: IndexMap<DependencyKey, Binding>,
    #[serde(default)]
    pointcuts: Vec<Pointcut>,
    /// Interface to its map of element bindings.
    #[serde(default)]
    multi_bindings: IndexMap<String, MapBinding>,
}

impl Container {
    pub fn new() -> Self {
        Container::default()
    }

    /// Run a module's bindings into a fresh container.
    pub fn from_module(classes: &Rc<ClassRegistry>, module: &dyn Module) -> Result<Container> {
        let mut binder = Binder::new(classes.clone());
        module.configure(&mut binder)?;
        Ok(binder.into_container())
    }

    pub fn get(&self, key: &DependencyKey) -> Option<&Binding> {
        self.bindings.get(key)
    }

    pub fn get_mut(&mut self, key: &DependencyKey) -> Option<&mut Binding> {
        self.bindings.get_mut(key)
    }

    pub fn has(&self, key: &DependencyKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Add or replace a binding.
    pub fn add(&mut self, key: DependencyKey, binding: Binding) {
        self.bindings.insert(key, binding);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DependencyKey, &Binding)> {
        self.bindings.iter()
    }

    /// Keys in compile order.
    pub fn sorted_keys(&self) -> Vec<DependencyKey> {
        let mut keys: Vec<_> = self.bindings.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Override merge: bindings of `other` replace ours.
    pub fn merge(&mut self, other: Container) {
        for (key, binding) in other.bindings {
            self.bindings.insert(key, binding);
        }
        self.pointcuts.extend(other.pointcuts);
        for (interface, map) in other.multi_bindings {
            let ours = self.multi_bindings.entry(interface).or_default();
            for (key, element) in map.iter() {
                ours.insert(key.clone(), element.clone());
            }
        }
    }

    /// Install merge: only keys we do not have yet are taken from `other`.
    pub fn merge_missing(&mut self, other: Container) {
        for (key, binding) in other.bindings {
            self.bindings.entry(key).or_insert(binding);
        }
        self.pointcuts.extend(other.pointcuts);
        for (interface, map) in other.multi_bindings {
            let ours = self.multi_bindings.entry(interface).or_default();
            for (key, element) in map.iter() {
                if !ours.contains(key) {
                    ours.insert(key.clone(), element.clone());
                }
            }
        }
    }

    pub fn multi_binding(&self, interface: &str) -> Option<&MapBinding> {
        self.multi_bindings.get(interface)
    }

    pub fn multi_binding_mut(&mut self, interface: &str) -> &mut MapBinding {
        self.multi_bindings.entry(interface.to_string()).or_default()
    }

    pub fn pointcuts(&self) -> &[Pointcut] {
        &self.pointcuts
    }

    pub fn add_pointcut(&mut self, pointcut: Pointcut) {
        self.pointcuts.push(pointcut);
    }

    /// Record interceptor bindings on every class binding a pointcut matches.
    pub fn weave_aspects(&mut self, classes: &ClassRegistry) -> Result<()> {
        if self.pointcuts.is_empty() {
            return Ok(());
        }
        let pointcuts = self.pointcuts.clone();
        for binding in self.bindings.values_mut() {
            if let Binding::Class(dependency) = binding {
                weave_dependency(classes, &pointcuts, dependency)?;
            }
        }
        Ok(())
    }
}

pub fn weave_dependency(
    classes: &ClassRegistry,
    pointcuts: &[Pointcut],
    dependency: &mut Dependency,
) -> Result<()> {
    let class = dependency.class().to_string();
    let methods = classes.method_names(&class)?;
    for pointcut in pointcuts {
        if !pointcut.class_matcher.matches_class(classes, &class) {
            continue;
        }
        for method in methods.iter().filter(|m| pointcut.method_matcher.matches_method(m)) {
            let bound = dependency.bindings.entry(method.clone()).or_default();
            for interceptor in &pointcut.interceptors {
                if !bound.contains(interceptor) {
                    bound.push(interceptor.clone());
                }
            }
        }
    }
    Ok(())
}
