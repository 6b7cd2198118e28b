//! Container Injector
//!
//! Resolves straight from the binding graph: every requested node is compiled
//! in memory and evaluated without touching the script directory.

use crate::compiler::code::Code;
use crate::compiler::compile_null_object::compile_null_object;
use crate::compiler::dependency_compiler::DependencyCompiler;
use crate::compiler::function_compiler::ScopeResolver;
use crate::compiler::on_demand_compiler::infer_dependency;
use crate::di::argument::ParameterRef;
use crate::di::binding::Binding;
use crate::di::container::{weave_dependency, Container};
use crate::di::dependency_key::{DependencyKey, INJECTOR_INTERFACE, SCRIPT_DIR_NAME};
use crate::error::{CompilerError, Result};
use crate::injector::Injector;
use crate::output::output_jit::{FactoryContext, JitEvaluator};
use crate::reflection::ClassRegistry;
use crate::script::injection_point::InjectionPoint;
use crate::value::{InjectorRef, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::{Rc, Weak};

pub struct ContainerInjector {
    container: Container,
    classes: Rc<ClassRegistry>,
    singletons: RefCell<IndexMap<DependencyKey, Value>>,
    codes: RefCell<HashMap<DependencyKey, Rc<Code>>>,
    qualifiers: RefCell<HashMap<ParameterRef, Value>>,
    ip: RefCell<Option<ParameterRef>>,
    evaluator: JitEvaluator,
    this: Weak<ContainerInjector>,
}

impl ContainerInjector {
    /// `script_dir` receives generated null-object classes only.
    pub fn new(mut container: Container, classes: Rc<ClassRegistry>, script_dir: &Path) -> Result<Rc<Self>> {
        compile_null_object(&mut container, &classes, script_dir)?;
        container.weave_aspects(&classes)?;
        let injector_key = DependencyKey::any(INJECTOR_INTERFACE);
        if !container.has(&injector_key) {
            container.add(injector_key, Binding::instance(Value::Injector(InjectorRef::detached())));
        }
        container.add(
            DependencyKey::new("", SCRIPT_DIR_NAME),
            Binding::instance(script_dir.to_string_lossy().into_owned()),
        );
        Ok(Rc::new_cyclic(|this| ContainerInjector {
            container,
            classes,
            singletons: RefCell::new(IndexMap::new()),
            codes: RefCell::new(HashMap::new()),
            qualifiers: RefCell::new(HashMap::new()),
            ip: RefCell::new(None),
            evaluator: JitEvaluator::new(),
            this: this.clone(),
        }))
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn resolve(&self, key: &DependencyKey) -> Result<Value> {
        let cached = self.singletons.borrow().get(key).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }
        let (instance, is_singleton) = self.run(key)?;
        if is_singleton {
            self.singletons.borrow_mut().insert(key.clone(), instance.clone());
        }
        Ok(instance)
    }

    fn run(&self, key: &DependencyKey) -> Result<(Value, bool)> {
        let code = self.code(key)?;
        self.evaluator.evaluate_statements(key.as_str(), &code.statements, self)
    }

    fn code(&self, key: &DependencyKey) -> Result<Rc<Code>> {
        let cached = self.codes.borrow().get(key).cloned();
        if let Some(code) = cached {
            return Ok(code);
        }
        let binding = match self.container.get(key) {
            Some(binding) => binding.clone(),
            None => {
                let mut dependency = infer_dependency(&self.classes, key)?;
                weave_dependency(&self.classes, self.container.pointcuts(), &mut dependency)?;
                Binding::Class(dependency)
            }
        };
        let runtime: &dyn ScopeResolver = self;
        let code = DependencyCompiler::with_runtime(&self.container, &self.classes, Some(runtime)).compile(&binding)?;
        {
            let mut qualifiers = self.qualifiers.borrow_mut();
            for ip in &code.qualifiers {
                qualifiers.insert(ip.parameter.clone(), ip.qualifier.clone());
            }
        }
        let code = Rc::new(code);
        self.codes.borrow_mut().insert(key.clone(), code.clone());
        Ok(code)
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

impl FactoryContext for ContainerInjector {
    fn prototype(&self, key: &DependencyKey, injection_point: Option<ParameterRef>) -> Result<Value> {
        self.with_injection_point(injection_point, || self.resolve(key))
    }

    fn singleton(&self, key: &DependencyKey, injection_point: Option<ParameterRef>) -> Result<Value> {
        let cached = self.singletons.borrow().get(key).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }
        let (instance, _) = self.with_injection_point(injection_point, || self.run(key))?;
        self.singletons.borrow_mut().insert(key.clone(), instance.clone());
        Ok(instance)
    }

    fn injection_point(&self) -> Result<Value> {
        let parameter = self
            .ip
            .borrow()
            .clone()
            .ok_or_else(|| CompilerError::runtime("injection_point() called outside of a provider pull"))?;
        let qualifier = self.qualifiers.borrow().get(&parameter).cloned();
        Ok(Value::Native(Rc::new(InjectionPoint::new(parameter, qualifier))))
    }

    fn injector(&self) -> Result<Value> {
        let this: Weak<dyn Injector> = self.this.clone();
        Ok(Value::Injector(InjectorRef::new(this)))
    }

    fn classes(&self) -> &ClassRegistry {
        &self.classes
    }
}

impl ScopeResolver for ContainerInjector {
    fn is_singleton(&self, key: &DependencyKey) -> Result<bool> {
        match self.container.get(key) {
            Some(binding) => Ok(binding.is_singleton()),
            None => Err(CompilerError::NotCompiled {
                key: key.to_string(),
            }),
        }
    }
}

impl Injector for ContainerInjector {
    fn get_instance(&self, interface: &str, name: &str) -> Result<Value> {
        self.resolve(&DependencyKey::new(interface, name))
    }
}
