//! Batch Compiler
//!
//! Compiles every binding of a graph into the script directory.

use crate::compiler::compile_null_object::compile_null_object;
use crate::compiler::dependency_compiler::DependencyCompiler;
use crate::di::binding::Binding;
use crate::di::container::Container;
use crate::di::dependency_key::{DependencyKey, INJECTOR_INTERFACE, SCRIPT_DIR_NAME};
use crate::di::module::Module;
use crate::error::{CompilerError, Result};
use crate::injector::Injector;
use crate::reflection::ClassRegistry;
use crate::script::dependency_saver::DependencySaver;
use crate::script::file_put_contents::{ensure_dir, file_put_contents};
use crate::script::module_file::ModuleFile;
use crate::script::script_injector::ScriptInjector;
use crate::script::{AOP_FILE, COMPILE_LOG};
use crate::value::{InjectorRef, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct DiCompiler {
    container: Container,
    classes: Rc<ClassRegistry>,
    script_dir: PathBuf,
    saver: DependencySaver,
}

impl DiCompiler {
    /// Prepare `container` for compilation: null objects are generated,
    /// aspects woven, and the injector and script directory bound.
    pub fn new(mut container: Container, classes: Rc<ClassRegistry>, script_dir: impl Into<PathBuf>) -> Result<Self> {
        let script_dir = script_dir.into();
        ensure_dir(&script_dir)?;
        compile_null_object(&mut container, &classes, &script_dir)?;
        container.weave_aspects(&classes)?;
        let injector_key = DependencyKey::any(INJECTOR_INTERFACE);
        if !container.has(&injector_key) {
            container.add(injector_key, Binding::instance(Value::Injector(InjectorRef::detached())));
        }
        container.add(
            DependencyKey::new("", SCRIPT_DIR_NAME),
            Binding::instance(script_dir.to_string_lossy().into_owned()),
        );
        let saver = DependencySaver::new(script_dir.clone());
        Ok(DiCompiler {
            container,
            classes,
            script_dir,
            saver,
        })
    }

    pub fn from_module(module: &dyn Module, classes: Rc<ClassRegistry>, script_dir: impl Into<PathBuf>) -> Result<Self> {
        let container = Container::from_module(&classes, module)?;
        DiCompiler::new(container, classes, script_dir)
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Compile every unit, then save the pointcut table and the module snapshot.
    pub fn compile(&self) -> Result<()> {
        self.compile_container()?;
        self.save_pointcuts()?;
        match ModuleFile::save(&self.script_dir, &self.container) {
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "module snapshot not written"),
        }
        Ok(())
    }

    /// Compile every unit in key order.
    pub fn compile_container(&self) -> Result<()> {
        let log_path = self.script_dir.join(COMPILE_LOG);
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| CompilerError::io(&log_path, e))?;
        let compiler = DependencyCompiler::new(&self.container, &self.classes);
        let keys = self.container.sorted_keys();
        for key in &keys {
            append(&mut log, &log_path, &format!("Compiled: {}\n", key))?;
            let Some(binding) = self.container.get(key) else {
                continue;
            };
            let code = match compiler.compile(binding) {
                Ok(code) => code,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "dependency failed to compile");
                    append(&mut log, &log_path, &format!("\nError: {}\nUnbound: {}\n", key, e))?;
                    return Err(e);
                }
            };
            self.saver.save(key, &code)?;
        }
        tracing::info!(
            script_dir = %self.script_dir.display(),
            units = keys.len(),
            "compiled binding graph"
        );
        Ok(())
    }

    pub fn save_pointcuts(&self) -> Result<()> {
        let json = serde_json::to_vec(self.container.pointcuts())?;
        file_put_contents(&self.script_dir.join(AOP_FILE), json)
    }
}

fn append(log: &mut File, path: &Path, line: &str) -> Result<()> {
    log.write_all(line.as_bytes())
        .map_err(|e| CompilerError::io(path, e))
}

/// Compiles the graph, then resolves through a script injector over the result.
impl Injector for DiCompiler {
    fn get_instance(&self, interface: &str, name: &str) -> Result<Value> {
        self.compile()?;
        ScriptInjector::new(self.script_dir.clone(), self.classes.clone(), None).get_instance(interface, name)
    }
}
