//! Null object bindings
//!
//! A null-object binding becomes a class binding on a generated class that
//! implements the interface with methods returning null.

use crate::di::binding::{Binding, Dependency};
use crate::di::container::Container;
use crate::error::Result;
use crate::reflection::{ClassDef, ClassRegistry};
use crate::script::class_path;
use crate::script::file_put_contents::file_put_contents;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of a generated class, saved as `<Class>.class.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedClass {
    pub name: String,
    pub interfaces: Vec<String>,
    pub null_methods: Vec<String>,
}

impl GeneratedClass {
    pub fn null_object(classes: &ClassRegistry, interface: &str) -> Result<Self> {
        let mut null_methods = Vec::new();
        collect_interface_methods(classes, interface, &mut null_methods)?;
        Ok(GeneratedClass {
            name: format!("{}Null", interface),
            interfaces: vec![interface.to_string()],
            null_methods,
        })
    }

    pub fn to_class_def(&self) -> ClassDef {
        let mut def = ClassDef::new(self.name.as_str());
        for interface in &self.interfaces {
            def = def.implements(interface.as_str());
        }
        for method in &self.null_methods {
            def = def.method(method.as_str(), |_, _| Ok(Value::Null));
        }
        def
    }
}

fn collect_interface_methods(classes: &ClassRegistry, interface: &str, out: &mut Vec<String>) -> Result<()> {
    let def = classes.get(interface)?;
    for parent in &def.interfaces {
        collect_interface_methods(classes, parent, out)?;
    }
    for method in &def.declared_methods {
        if !out.contains(method) {
            out.push(method.clone());
        }
    }
    Ok(())
}

/// Generate, save and register the null class of `interface`, and return its binding.
pub fn null_object_dependency(classes: &ClassRegistry, script_dir: &Path, interface: &str) -> Result<Dependency> {
    let generated = GeneratedClass::null_object(classes, interface)?;
    file_put_contents(
        &class_path(script_dir, &generated.name),
        serde_json::to_vec_pretty(&generated)?,
    )?;
    classes.register(generated.to_class_def());
    tracing::debug!(class = %generated.name, "generated null object");
    Dependency::from_class(classes, &generated.name)
}

/// Replace every null-object binding of `container` with its generated class binding.
pub fn compile_null_object(container: &mut Container, classes: &ClassRegistry, script_dir: &Path) -> Result<()> {
    let null_objects: Vec<_> = container
        .iter()
        .filter_map(|(key, binding)| match binding {
            Binding::NullObject(null) => Some((key.clone(), null.interface.clone())),
            _ => None,
        })
        .collect();
    for (key, interface) in null_objects {
        let dependency = null_object_dependency(classes, script_dir, &interface)?;
        container.add(key, Binding::Class(dependency));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::binding::NullObjectBinding;
    use crate::di::dependency_key::DependencyKey;

    #[test]
    fn null_object_becomes_generated_class() {
        let dir = tempfile::tempdir().unwrap();
        let classes = ClassRegistry::new();
        classes.register(ClassDef::interface("WriterInterface", &["flush"]));
        classes.register(ClassDef::interface("LoggerInterface", &["log"]).implements("WriterInterface"));
        let key = DependencyKey::any("LoggerInterface");
        let mut container = Container::new();
        container.add(
            key.clone(),
            Binding::NullObject(NullObjectBinding {
                interface: "LoggerInterface".to_string(),
            }),
        );

        compile_null_object(&mut container, &classes, dir.path()).unwrap();

        match container.get(&key) {
            Some(Binding::Class(dependency)) => assert_eq!(dependency.class(), "LoggerInterfaceNull"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(class_path(dir.path(), "LoggerInterfaceNull").exists());
        let logger = classes.new_instance("LoggerInterfaceNull", vec![]).unwrap();
        assert_eq!(classes.invoke(&logger, "log", &[Value::from("x")]).unwrap(), Value::Null);
        assert_eq!(classes.invoke(&logger, "flush", &[]).unwrap(), Value::Null);
        assert!(classes.is_subclass_of("LoggerInterfaceNull", "WriterInterface"));
    }
}
