//! Compile Injector
//!
//! Script injector for lazy modules that every process can rebuild on its
//! own. The first missing unit compiles the whole graph once, guarded by the
//! `compiled` sentinel; a unit still missing after that is unbound.

use crate::di::container::Container;
use crate::di::module::LazyModule;
use crate::error::Result;
use crate::injector::Injector;
use crate::reflection::ClassRegistry;
use crate::script::script_injector::{InjectorSnapshot, ScriptInjector};
use crate::value::Value;
use std::path::PathBuf;
use std::rc::Rc;

pub struct CompileInjector {
    inner: Rc<ScriptInjector>,
}

impl CompileInjector {
    pub fn new(script_dir: impl Into<PathBuf>, classes: Rc<ClassRegistry>, lazy_module: Rc<dyn LazyModule>) -> Self {
        CompileInjector {
            inner: ScriptInjector::new_strict(script_dir, classes, lazy_module),
        }
    }

    pub(crate) fn with_container(
        script_dir: impl Into<PathBuf>,
        classes: Rc<ClassRegistry>,
        lazy_module: Rc<dyn LazyModule>,
        container: Container,
    ) -> Self {
        CompileInjector {
            inner: ScriptInjector::with_container(script_dir, classes, lazy_module, container, true),
        }
    }

    pub fn from_snapshot(
        snapshot: InjectorSnapshot,
        classes: Rc<ClassRegistry>,
        lazy_module: Rc<dyn LazyModule>,
    ) -> Result<Self> {
        let snapshot = InjectorSnapshot {
            strict: true,
            is_serializable_lazy: true,
            ..snapshot
        };
        Ok(CompileInjector {
            inner: ScriptInjector::from_snapshot(snapshot, classes, Some(lazy_module))?,
        })
    }

    /// Compile every unit of the lazy module's graph.
    pub fn compile(&self) -> Result<()> {
        self.inner.compile()
    }

    pub fn script_injector(&self) -> &Rc<ScriptInjector> {
        &self.inner
    }
}

impl Injector for CompileInjector {
    fn get_instance(&self, interface: &str, name: &str) -> Result<Value> {
        self.inner.get_instance(interface, name)
    }

    fn snapshot(&self) -> Result<Option<InjectorSnapshot>> {
        self.inner.snapshot()
    }
}
