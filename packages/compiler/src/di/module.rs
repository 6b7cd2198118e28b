//! Module DSL
//!
//! Modules describe bindings through a [`Binder`]:
//!
//! ```ignore
//! binder.bind("EngineInterface").to("Engine")?;
//! binder.bind("MirrorInterface").annotated_with("left").to("Mirror")?.in_singleton();
//! binder.bind("").annotated_with("count").to_instance(1);
//! binder.multi_bind("EngineInterface").add_binding("turbo").to("TurboEngine")?;
//! ```

use crate::di::binding::{Binding, Dependency, DependencyProvider, NullObjectBinding};
use crate::di::container::Container;
use crate::di::dependency_key::{DependencyKey, NAME_ANY};
use crate::di::multi_binding::MapBinding;
use crate::di::pointcut::{Matcher, Pointcut};
use crate::error::Result;
use crate::reflection::ClassRegistry;
use crate::value::{ArrayKey, Value};
use std::rc::Rc;

pub trait Module {
    fn configure(&self, binder: &mut Binder) -> Result<()>;
}

impl<F> Module for F
where
    F: Fn(&mut Binder) -> Result<()>,
{
    fn configure(&self, binder: &mut Binder) -> Result<()> {
        self(binder)
    }
}

pub struct Binder {
    classes: Rc<ClassRegistry>,
    container: Container,
}

impl Binder {
    pub fn new(classes: Rc<ClassRegistry>) -> Self {
        Binder {
            classes,
            container: Container::new(),
        }
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn bind(&mut self, interface: impl Into<String>) -> Bind<'_> {
        Bind {
            binder: self,
            interface: interface.into(),
            name: NAME_ANY.to_string(),
        }
    }

    /// Collect bindings of `interface` into a map injected through `ParamDef::set`.
    pub fn multi_bind(&mut self, interface: impl Into<String>) -> MultiBinder<'_> {
        MultiBinder {
            binder: self,
            interface: interface.into(),
        }
    }

    pub fn bind_interceptor(
        &mut self,
        class_matcher: Matcher,
        method_matcher: Matcher,
        interceptors: Vec<String>,
    ) -> Result<()> {
        for interceptor in &interceptors {
            self.untarget(interceptor)?;
        }
        self.container.add_pointcut(Pointcut {
            class_matcher,
            method_matcher,
            interceptors,
        });
        Ok(())
    }

    /// Install a module; bindings already present here win.
    pub fn install(&mut self, module: &dyn Module) -> Result<()> {
        let mut sub = Binder::new(self.classes.clone());
        module.configure(&mut sub)?;
        self.container.merge_missing(sub.container);
        Ok(())
    }

    /// Apply a module on top; its bindings replace ours.
    pub fn override_with(&mut self, module: &dyn Module) -> Result<()> {
        let mut sub = Binder::new(self.classes.clone());
        module.configure(&mut sub)?;
        self.container.merge(sub.container);
        Ok(())
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn into_container(self) -> Container {
        self.container
    }

    fn add(&mut self, key: DependencyKey, binding: Binding) -> Result<()> {
        let dependencies: Vec<String> = match &binding {
            Binding::Class(d) => untargeted_candidates(d),
            Binding::Provider(p) => untargeted_candidates(&p.dependency),
            Binding::Instance(_) | Binding::NullObject(_) => Vec::new(),
        };
        self.container.add(key, binding);
        for class in dependencies {
            self.untarget(&class)?;
        }
        Ok(())
    }

    /// Bind a concrete class to itself unless something is bound already.
    fn untarget(&mut self, class: &str) -> Result<()> {
        let key = DependencyKey::any(class);
        if self.container.has(&key) {
            return Ok(());
        }
        match self.classes.find(class)? {
            Some(def) if def.is_concrete() => {
                let dependency = Dependency::from_class(&self.classes, class)?;
                self.add(key, Binding::Class(dependency))
            }
            _ => Ok(()),
        }
    }
}

fn untargeted_candidates(dependency: &Dependency) -> Vec<String> {
    dependency
        .arguments()
        .filter(|a| a.key.is_any() && !a.key.interface().is_empty())
        .map(|a| a.key.interface().to_string())
        .collect()
}

pub struct Bind<'a> {
    binder: &'a mut Binder,
    interface: String,
    name: String,
}

impl<'a> Bind<'a> {
    pub fn annotated_with(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn key(&self) -> DependencyKey {
        DependencyKey::new(&self.interface, &self.name)
    }

    fn finish(self, binding: Binding) -> Result<Scoped<'a>> {
        let key = self.key();
        self.binder.add(key.clone(), binding)?;
        Ok(Scoped {
            binder: self.binder,
            key,
        })
    }

    pub fn to(self, class: &str) -> Result<Scoped<'a>> {
        let dependency = Dependency::from_class(&self.binder.classes, class)?;
        self.finish(Binding::Class(dependency))
    }

    /// Bind the interface to itself.
    pub fn untargeted(self) -> Result<Scoped<'a>> {
        let class = self.interface.clone();
        self.to(&class)
    }

    pub fn to_instance(self, value: impl Into<Value>) -> Result<Scoped<'a>> {
        self.finish(Binding::instance(value))
    }

    pub fn to_provider(self, provider: &str) -> Result<Scoped<'a>> {
        self.provider(provider, None)
    }

    pub fn to_provider_with_context(self, provider: &str, context: &str) -> Result<Scoped<'a>> {
        self.provider(provider, Some(context.to_string()))
    }

    fn provider(self, provider: &str, context: Option<String>) -> Result<Scoped<'a>> {
        let dependency = Dependency::from_class(&self.binder.classes, provider)?;
        self.finish(Binding::Provider(DependencyProvider {
            dependency,
            is_singleton: false,
            context,
        }))
    }

    pub fn to_null_object(self) -> Result<Scoped<'a>> {
        let interface = self.interface.clone();
        self.finish(Binding::NullObject(NullObjectBinding { interface }))
    }
}

pub struct MultiBinder<'a> {
    binder: &'a mut Binder,
    interface: String,
}

impl MultiBinder<'_> {
    /// Bind the element stored under `key`; an existing element is replaced.
    pub fn add_binding(&mut self, key: impl Into<ArrayKey>) -> Bind<'_> {
        let key = key.into();
        let element = MapBinding::element_key(&self.interface, &key);
        self.binder
            .container
            .multi_binding_mut(&self.interface)
            .insert(key.clone(), element);
        Bind {
            binder: &mut *self.binder,
            interface: self.interface.clone(),
            name: MapBinding::element_name(&key),
        }
    }

    /// Bind an element under the next integer key.
    pub fn add(&mut self) -> Bind<'_> {
        let index = self
            .binder
            .container
            .multi_binding(&self.interface)
            .map_or(0, MapBinding::next_index);
        self.add_binding(index)
    }
}

pub struct Scoped<'a> {
    binder: &'a mut Binder,
    key: DependencyKey,
}

impl Scoped<'_> {
    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    pub fn in_singleton(self) {
        if let Some(binding) = self.binder.container.get_mut(&self.key) {
            binding.set_singleton();
        }
    }
}

/// Deferred module construction.
pub trait LazyModule {
    fn module(&self) -> Box<dyn Module>;

    /// Whether the lazy module can be recreated by a later process on its own.
    fn is_serializable(&self) -> bool {
        false
    }
}

impl<F> LazyModule for F
where
    F: Fn() -> Box<dyn Module>,
{
    fn module(&self) -> Box<dyn Module> {
        self()
    }
}

/// Lazy module with an override module merged on top.
pub struct OverrideLazyModule {
    base: Rc<dyn LazyModule>,
    overriding: Rc<dyn Module>,
}

impl OverrideLazyModule {
    pub fn new(base: Rc<dyn LazyModule>, overriding: Rc<dyn Module>) -> Self {
        OverrideLazyModule { base, overriding }
    }
}

struct OverrideModule {
    base: Box<dyn Module>,
    overriding: Rc<dyn Module>,
}

impl Module for OverrideModule {
    fn configure(&self, binder: &mut Binder) -> Result<()> {
        self.base.configure(binder)?;
        binder.override_with(self.overriding.as_ref())
    }
}

impl LazyModule for OverrideLazyModule {
    fn module(&self) -> Box<dyn Module> {
        Box::new(OverrideModule {
            base: self.base.module(),
            overriding: self.overriding.clone(),
        })
    }

    fn is_serializable(&self) -> bool {
        self.base.is_serializable()
    }
}
