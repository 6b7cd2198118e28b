//! Injector Factory
//!
//! Chooses the injector for a module: the in-memory container injector during
//! development, a script injector once compile mode is on.

use crate::di::binding::Binding;
use crate::di::container::Container;
use crate::di::dependency_key::{DependencyKey, COMPILE_NAME};
use crate::di::module::LazyModule;
use crate::error::Result;
use crate::injector::container_injector::ContainerInjector;
use crate::injector::Injector;
use crate::reflection::ClassRegistry;
use crate::script::compile_injector::CompileInjector;
use crate::script::file_put_contents::ensure_dir;
use crate::script::script_injector::ScriptInjector;
use crate::value::Value;
use std::path::Path;
use std::rc::Rc;

pub struct InjectorFactory;

impl InjectorFactory {
    pub fn get_instance(
        modules: Rc<dyn LazyModule>,
        classes: Rc<ClassRegistry>,
        script_dir: &Path,
    ) -> Result<Rc<dyn Injector>> {
        Self::create(modules, classes, script_dir, false)
    }

    /// `force_compile` turns compile mode on regardless of the module.
    pub fn create(
        modules: Rc<dyn LazyModule>,
        classes: Rc<ClassRegistry>,
        script_dir: &Path,
        force_compile: bool,
    ) -> Result<Rc<dyn Injector>> {
        ensure_dir(script_dir)?;
        let container = Container::from_module(&classes, modules.module().as_ref())?;
        if !(force_compile || is_prod(&container)) {
            tracing::debug!(script_dir = %script_dir.display(), "using container injector");
            let injector: Rc<dyn Injector> = ContainerInjector::new(container, classes, script_dir)?;
            return Ok(injector);
        }
        if modules.is_serializable() {
            tracing::debug!(script_dir = %script_dir.display(), "using compile injector");
            return Ok(Rc::new(CompileInjector::with_container(script_dir, classes, modules, container)));
        }
        tracing::debug!(script_dir = %script_dir.display(), "using script injector");
        let injector: Rc<dyn Injector> = ScriptInjector::with_container(script_dir, classes, modules, container, false);
        Ok(injector)
    }
}

/// `-Compile` bound to `true` switches the module to compiled scripts.
fn is_prod(container: &Container) -> bool {
    match container.get(&DependencyKey::new("", COMPILE_NAME)) {
        Some(Binding::Instance(instance)) => matches!(instance.value, Value::Bool(true)),
        _ => false,
    }
}
