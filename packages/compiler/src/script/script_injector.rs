//! Script Injector
//!
//! Resolves dependency keys by running their compiled units. A missing unit
//! triggers the batch compile the first time, and a single-key compile after
//! that.

use crate::compiler::di_compiler::DiCompiler;
use crate::compiler::function_compiler::ScopeResolver;
use crate::compiler::on_demand_compiler::OnDemandCompiler;
use crate::di::argument::ParameterRef;
use crate::di::container::Container;
use crate::di::dependency_key::DependencyKey;
use crate::di::module::LazyModule;
use crate::error::{CompilerError, Result};
use crate::expression_parser::Parser;
use crate::injector::Injector;
use crate::output::output_ast as o;
use crate::output::output_jit::{FactoryContext, JitEvaluator};
use crate::reflection::ClassRegistry;
use crate::script::file_put_contents::file_put_contents;
use crate::script::injection_point::InjectionPoint;
use crate::script::module_file::ModuleFile;
use crate::script::{meta_path, unit_path, Meta, AOP_FILE, COMPILED_SENTINEL};
use crate::value::{InjectorRef, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

/// The parts of a script injector that survive a process boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectorSnapshot {
    pub script_dir: PathBuf,
    pub singletons: IndexMap<DependencyKey, Value>,
    pub is_serializable_lazy: bool,
    #[serde(default)]
    pub strict: bool,
}

pub struct ScriptInjector {
    script_dir: PathBuf,
    classes: Rc<ClassRegistry>,
    lazy_module: Option<Rc<dyn LazyModule>>,
    is_serializable_lazy: bool,
    /// Compile once behind the sentinel, never on demand.
    strict: bool,
    singletons: RefCell<IndexMap<DependencyKey, Value>>,
    /// Parameter being supplied by the current pull.
    ip: RefCell<Option<ParameterRef>>,
    units: RefCell<HashMap<DependencyKey, Rc<Vec<o::Statement>>>>,
    graph: RefCell<Option<Rc<Container>>>,
    parser: Parser,
    evaluator: JitEvaluator,
    this: Weak<ScriptInjector>,
}

impl ScriptInjector {
    /// Without a lazy module the graph is read from the module snapshot.
    pub fn new(
        script_dir: impl Into<PathBuf>,
        classes: Rc<ClassRegistry>,
        lazy_module: Option<Rc<dyn LazyModule>>,
    ) -> Rc<Self> {
        Self::build(script_dir.into(), classes, lazy_module, false, IndexMap::new(), None)
    }

    pub(crate) fn new_strict(
        script_dir: impl Into<PathBuf>,
        classes: Rc<ClassRegistry>,
        lazy_module: Rc<dyn LazyModule>,
    ) -> Rc<Self> {
        Self::build(script_dir.into(), classes, Some(lazy_module), true, IndexMap::new(), None)
    }

    /// Reuse a container already built from `lazy_module`.
    pub(crate) fn with_container(
        script_dir: impl Into<PathBuf>,
        classes: Rc<ClassRegistry>,
        lazy_module: Rc<dyn LazyModule>,
        container: Container,
        strict: bool,
    ) -> Rc<Self> {
        Self::build(
            script_dir.into(),
            classes,
            Some(lazy_module),
            strict,
            IndexMap::new(),
            Some(Rc::new(container)),
        )
    }

    /// Rebuild an injector from its snapshot. A snapshot taken with a
    /// serializable lazy module needs that module again.
    pub fn from_snapshot(
        snapshot: InjectorSnapshot,
        classes: Rc<ClassRegistry>,
        lazy_module: Option<Rc<dyn LazyModule>>,
    ) -> Result<Rc<Self>> {
        let lazy_module = if snapshot.is_serializable_lazy {
            Some(lazy_module.ok_or_else(|| {
                CompilerError::runtime("snapshot was taken with a lazy module, none given")
            })?)
        } else {
            None
        };
        Ok(Self::build(
            snapshot.script_dir,
            classes,
            lazy_module,
            snapshot.strict,
            snapshot.singletons,
            None,
        ))
    }

    fn build(
        script_dir: PathBuf,
        classes: Rc<ClassRegistry>,
        lazy_module: Option<Rc<dyn LazyModule>>,
        strict: bool,
        mut singletons: IndexMap<DependencyKey, Value>,
        graph: Option<Rc<Container>>,
    ) -> Rc<Self> {
        if classes.register_script_dir(&script_dir) {
            tracing::debug!(script_dir = %script_dir.display(), "registered script directory");
        }
        let is_serializable_lazy = lazy_module.as_ref().map_or(false, |m| m.is_serializable());
        Rc::new_cyclic(|this: &Weak<ScriptInjector>| {
            let handle: Weak<dyn Injector> = this.clone();
            let handle = InjectorRef::new(handle);
            for instance in singletons.values_mut() {
                instance.reattach_injector(&handle);
            }
            ScriptInjector {
                script_dir,
                classes,
                lazy_module,
                is_serializable_lazy,
                strict,
                singletons: RefCell::new(singletons),
                ip: RefCell::new(None),
                units: RefCell::new(HashMap::new()),
                graph: RefCell::new(graph),
                parser: Parser::new(),
                evaluator: JitEvaluator::new(),
                this: this.clone(),
            }
        })
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The singleton table is memoized per key; anything else runs the unit again.
    pub fn resolve(&self, key: &DependencyKey) -> Result<Value> {
        let cached = self.singletons.borrow().get(key).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }
        let (instance, is_singleton) = self.run_unit(key)?;
        if is_singleton {
            self.singletons.borrow_mut().insert(key.clone(), instance.clone());
        }
        Ok(instance)
    }

    /// Remove everything under the script directory.
    pub fn clear(&self) -> Result<()> {
        self.units.borrow_mut().clear();
        let entries = match fs::read_dir(&self.script_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(CompilerError::io(&self.script_dir, e)),
        };
        for entry in entries {
            let path = entry.map_err(|e| CompilerError::io(&self.script_dir, e))?.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match removed {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CompilerError::io(&path, e)),
            }
        }
        tracing::debug!(script_dir = %self.script_dir.display(), "cleared script directory");
        Ok(())
    }

    /// Singletons, the script directory, and the module snapshot when the
    /// lazy module cannot be recreated on its own.
    pub fn to_snapshot(&self) -> Result<InjectorSnapshot> {
        if !self.is_serializable_lazy {
            ModuleFile::save(&self.script_dir, self.graph()?.as_ref())?;
        }
        Ok(InjectorSnapshot {
            script_dir: self.script_dir.clone(),
            singletons: self.singletons.borrow().clone(),
            is_serializable_lazy: self.is_serializable_lazy,
            strict: self.strict,
        })
    }

    /// Compile every unit of the graph without saving the pointcut table.
    pub fn compile(&self) -> Result<()> {
        let container = self.graph()?;
        DiCompiler::new((*container).clone(), self.classes.clone(), self.script_dir.clone())?
            .compile_container()
    }

    fn graph(&self) -> Result<Rc<Container>> {
        let cached = self.graph.borrow().clone();
        if let Some(container) = cached {
            return Ok(container);
        }
        let container = match &self.lazy_module {
            Some(lazy) => Container::from_module(&self.classes, lazy.module().as_ref())?,
            None => ModuleFile::load(&self.script_dir)?.unwrap_or_default(),
        };
        let container = Rc::new(container);
        *self.graph.borrow_mut() = Some(container.clone());
        Ok(container)
    }

    fn run_unit(&self, key: &DependencyKey) -> Result<(Value, bool)> {
        let unit = self.load_unit(key)?;
        let source_url = format!("{}.{}", key.file_stem(), super::UNIT_EXTENSION);
        self.evaluator.evaluate_statements(&source_url, &unit, self)
    }

    fn load_unit(&self, key: &DependencyKey) -> Result<Rc<Vec<o::Statement>>> {
        let cached = self.units.borrow().get(key).cloned();
        if let Some(unit) = cached {
            return Ok(unit);
        }
        let path = unit_path(&self.script_dir, key);
        if !path.exists() {
            self.compile_on_demand(key, &path)?;
            if !path.exists() {
                return Err(CompilerError::unbound(key.as_str()));
            }
        }
        let source = fs::read_to_string(&path).map_err(|e| CompilerError::io(&path, e))?;
        let unit = Rc::new(self.parser.parse_unit(&path.display().to_string(), &source)?);
        self.units.borrow_mut().insert(key.clone(), unit.clone());
        tracing::debug!(key = %key, "loaded unit");
        Ok(unit)
    }

    fn compile_on_demand(&self, key: &DependencyKey, path: &Path) -> Result<()> {
        if self.strict {
            return self.compile_once(key, path);
        }
        let container = self.graph()?;
        let is_first_compile = !self.script_dir.join(AOP_FILE).exists();
        if is_first_compile {
            let compiler = DiCompiler::new((*container).clone(), self.classes.clone(), self.script_dir.clone())?;
            // Saved first: single-key compiles need them even when the batch fails.
            compiler.save_pointcuts()?;
            compiler.compile()?;
            if path.exists() {
                return Ok(());
            }
        }
        let runtime: &dyn ScopeResolver = self;
        OnDemandCompiler::new(&self.script_dir, &container, &self.classes, Some(runtime)).compile(key)
    }

    fn compile_once(&self, key: &DependencyKey, path: &Path) -> Result<()> {
        let sentinel = self.script_dir.join(COMPILED_SENTINEL);
        if sentinel.exists() {
            return Err(CompilerError::unbound(key.as_str()));
        }
        file_put_contents(&sentinel, "")?;
        self.compile()?;
        if !path.exists() {
            return Err(CompilerError::unbound(key.as_str()));
        }
        Ok(())
    }

    fn with_injection_point<T>(
        &self,
        injection_point: Option<ParameterRef>,
        pull: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let previous = self.ip.replace(injection_point);
        let result = pull();
        self.ip.replace(previous);
        result
    }
}

impl FactoryContext for ScriptInjector {
    fn prototype(&self, key: &DependencyKey, injection_point: Option<ParameterRef>) -> Result<Value> {
        self.with_injection_point(injection_point, || self.resolve(key))
    }

    fn singleton(&self, key: &DependencyKey, injection_point: Option<ParameterRef>) -> Result<Value> {
        let cached = self.singletons.borrow().get(key).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }
        let (instance, _) = self.with_injection_point(injection_point, || self.run_unit(key))?;
        self.singletons.borrow_mut().insert(key.clone(), instance.clone());
        Ok(instance)
    }

    fn injection_point(&self) -> Result<Value> {
        let parameter = self
            .ip
            .borrow()
            .clone()
            .ok_or_else(|| CompilerError::runtime("injection_point() called outside of a provider pull"))?;
        Ok(Value::Native(Rc::new(InjectionPoint::load(&self.script_dir, parameter)?)))
    }

    fn injector(&self) -> Result<Value> {
        let this: Weak<dyn Injector> = self.this.clone();
        Ok(Value::Injector(InjectorRef::new(this)))
    }

    fn classes(&self) -> &ClassRegistry {
        &self.classes
    }
}

impl ScopeResolver for ScriptInjector {
    /// The graph's binding decides, then the scope record of a compiled unit.
    fn is_singleton(&self, key: &DependencyKey) -> Result<bool> {
        if let Some(binding) = self.graph()?.get(key) {
            return Ok(binding.is_singleton());
        }
        let path = meta_path(&self.script_dir, key);
        if path.exists() {
            let json = fs::read(&path).map_err(|e| CompilerError::io(&path, e))?;
            let meta: Meta = serde_json::from_slice(&json)?;
            return Ok(meta.is_singleton);
        }
        Err(CompilerError::NotCompiled {
            key: key.to_string(),
        })
    }
}

impl Injector for ScriptInjector {
    fn get_instance(&self, interface: &str, name: &str) -> Result<Value> {
        self.resolve(&DependencyKey::new(interface, name))
    }

    fn snapshot(&self) -> Result<Option<InjectorSnapshot>> {
        self.to_snapshot().map(Some)
    }
}
