//! Cached Injector Factory
//!
//! Registry of injectors keyed by injector id. A miss in the registry consults
//! the cache provider for a persisted snapshot before building a new injector.

use crate::config::InjectorConfig;
use crate::di::module::{LazyModule, Module, OverrideLazyModule};
use crate::error::Result;
use crate::injector::cache::{ArrayCache, CacheProvider};
use crate::injector::injector_factory::InjectorFactory;
use crate::injector::Injector;
use crate::reflection::ClassRegistry;
use crate::script::compile_injector::CompileInjector;
use crate::script::script_injector::{InjectorSnapshot, ScriptInjector};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Cache entry holding the persisted injector.
pub const INJECTOR_CACHE_ID: &str = "InjectorInterface";

#[derive(Default)]
pub struct CachedInjectorFactory {
    injectors: RefCell<HashMap<String, Rc<dyn Injector>>>,
    caches: RefCell<HashMap<String, Rc<dyn CacheProvider>>>,
}

impl CachedInjectorFactory {
    pub fn new() -> Self {
        CachedInjectorFactory::default()
    }

    /// `modules` is only asked for its module when nothing is cached.
    pub fn get_instance(
        &self,
        injector_id: &str,
        script_dir: &Path,
        classes: Rc<ClassRegistry>,
        modules: Rc<dyn LazyModule>,
        cache: Option<Rc<dyn CacheProvider>>,
        saved_singletons: &[String],
    ) -> Result<Rc<dyn Injector>> {
        self.get_or_build(injector_id, script_dir, classes, modules, cache, saved_singletons, false)
    }

    /// Same as [`get_instance`](Self::get_instance) with the id, script
    /// directory, compile mode and warm singletons taken from `config`.
    pub fn from_config(
        &self,
        config: &InjectorConfig,
        classes: Rc<ClassRegistry>,
        modules: Rc<dyn LazyModule>,
        cache: Option<Rc<dyn CacheProvider>>,
    ) -> Result<Rc<dyn Injector>> {
        self.get_or_build(
            &config.injector_id(),
            &config.script_dir,
            classes,
            modules,
            cache,
            &config.saved_singletons,
            config.compile,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn get_or_build(
        &self,
        injector_id: &str,
        script_dir: &Path,
        classes: Rc<ClassRegistry>,
        modules: Rc<dyn LazyModule>,
        cache: Option<Rc<dyn CacheProvider>>,
        saved_singletons: &[String],
        force_compile: bool,
    ) -> Result<Rc<dyn Injector>> {
        let registered = self.injectors.borrow().get(injector_id).cloned();
        if let Some(injector) = registered {
            return Ok(injector);
        }
        let cache = self.cache(injector_id, cache);
        cache.set_namespace(injector_id);
        let injector = match cache.fetch(INJECTOR_CACHE_ID)? {
            Some(data) => {
                tracing::debug!(injector_id, "restoring injector from cache");
                let snapshot: InjectorSnapshot = serde_json::from_str(&data)?;
                restore(snapshot, classes, modules)?
            }
            None => {
                let injector = InjectorFactory::create(modules, classes, script_dir, force_compile)?;
                save_singletons(injector.as_ref(), saved_singletons)?;
                match save_snapshot(cache.as_ref(), injector.as_ref()) {
                    Ok(true) => {}
                    Ok(false) => tracing::warn!(injector_id, "injector has no snapshot, not cached"),
                    Err(e) => tracing::warn!(injector_id, error = %e, "injector snapshot not cached"),
                }
                injector
            }
        };
        self.injectors
            .borrow_mut()
            .insert(injector_id.to_string(), injector.clone());
        Ok(injector)
    }

    /// A fresh injector with `override_module` applied on top; never cached.
    pub fn get_override_instance(
        &self,
        script_dir: &Path,
        classes: Rc<ClassRegistry>,
        modules: Rc<dyn LazyModule>,
        override_module: Rc<dyn Module>,
        saved_singletons: &[String],
    ) -> Result<Rc<dyn Injector>> {
        let modules: Rc<dyn LazyModule> = Rc::new(OverrideLazyModule::new(modules, override_module));
        let injector = InjectorFactory::get_instance(modules, classes, script_dir)?;
        save_singletons(injector.as_ref(), saved_singletons)?;
        Ok(injector)
    }

    fn cache(&self, injector_id: &str, cache: Option<Rc<dyn CacheProvider>>) -> Rc<dyn CacheProvider> {
        self.caches
            .borrow_mut()
            .entry(injector_id.to_string())
            .or_insert_with(|| cache.unwrap_or_else(|| Rc::new(ArrayCache::new())))
            .clone()
    }
}

fn restore(
    snapshot: InjectorSnapshot,
    classes: Rc<ClassRegistry>,
    modules: Rc<dyn LazyModule>,
) -> Result<Rc<dyn Injector>> {
    if snapshot.strict {
        return Ok(Rc::new(CompileInjector::from_snapshot(snapshot, classes, modules)?));
    }
    let lazy_module = if snapshot.is_serializable_lazy {
        Some(modules)
    } else {
        None
    };
    let injector: Rc<dyn Injector> = ScriptInjector::from_snapshot(snapshot, classes, lazy_module)?;
    Ok(injector)
}

/// False when the injector has nothing to persist.
fn save_snapshot(cache: &dyn CacheProvider, injector: &dyn Injector) -> Result<bool> {
    let Some(snapshot) = injector.snapshot()? else {
        return Ok(false);
    };
    cache.save(INJECTOR_CACHE_ID, &serde_json::to_string(&snapshot)?)?;
    Ok(true)
}

fn save_singletons(injector: &dyn Injector, saved_singletons: &[String]) -> Result<()> {
    for interface in saved_singletons {
        injector.get_instance(interface, crate::di::dependency_key::NAME_ANY)?;
    }
    Ok(())
}
