//! Context Injector
//!
//! An injector context bundles what an application needs to get its injector:
//! the module, the script directory, the cache and the singletons to warm.

use crate::di::module::{LazyModule, Module};
use crate::error::Result;
use crate::injector::cache::CacheProvider;
use crate::injector::cached_injector_factory::CachedInjectorFactory;
use crate::injector::Injector;
use crate::reflection::ClassRegistry;
use std::path::Path;
use std::rc::Rc;

pub trait InjectorContext {
    fn tmp_dir(&self) -> &Path;

    fn module(&self) -> Box<dyn Module>;

    fn cache(&self) -> Option<Rc<dyn CacheProvider>> {
        None
    }

    /// Interfaces resolved before the injector is cached.
    fn saved_singletons(&self) -> Vec<String> {
        Vec::new()
    }
}

struct ContextModule<C>(Rc<C>);

impl<C: InjectorContext> LazyModule for ContextModule<C> {
    fn module(&self) -> Box<dyn Module> {
        self.0.module()
    }
}

pub struct ContextInjector;

impl ContextInjector {
    /// The context's type name is the injector id.
    pub fn get_instance<C: InjectorContext + 'static>(
        factory: &CachedInjectorFactory,
        classes: Rc<ClassRegistry>,
        context: Rc<C>,
    ) -> Result<Rc<dyn Injector>> {
        let injector_id = std::any::type_name::<C>();
        factory.get_instance(
            injector_id,
            context.tmp_dir(),
            classes,
            Rc::new(ContextModule(context.clone())),
            context.cache(),
            &context.saved_singletons(),
        )
    }

    pub fn get_override_instance<C: InjectorContext + 'static>(
        factory: &CachedInjectorFactory,
        classes: Rc<ClassRegistry>,
        context: Rc<C>,
        override_module: Rc<dyn Module>,
    ) -> Result<Rc<dyn Injector>> {
        factory.get_override_instance(
            context.tmp_dir(),
            classes,
            Rc::new(ContextModule(context.clone())),
            override_module,
            &context.saved_singletons(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::module::Binder;
    use crate::value::Value;
    use std::path::PathBuf;

    struct AppContext {
        tmp_dir: PathBuf,
    }

    impl InjectorContext for AppContext {
        fn tmp_dir(&self) -> &Path {
            &self.tmp_dir
        }

        fn module(&self) -> Box<dyn Module> {
            Box::new(|binder: &mut Binder| -> Result<()> {
                binder.bind("").annotated_with("greeting").to_instance("hello")?;
                Ok(())
            })
        }
    }

    #[test]
    fn context_type_identifies_the_injector() {
        let dir = tempfile::tempdir().unwrap();
        let factory = CachedInjectorFactory::new();
        let classes = Rc::new(ClassRegistry::new());
        let context = Rc::new(AppContext {
            tmp_dir: dir.path().to_path_buf(),
        });
        let a = ContextInjector::get_instance(&factory, classes.clone(), context.clone()).unwrap();
        let b = ContextInjector::get_instance(&factory, classes.clone(), context.clone()).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.get_instance("", "greeting").unwrap(), Value::from("hello"));

        let override_module: Rc<dyn Module> = Rc::new(|binder: &mut Binder| -> Result<()> {
            binder.bind("").annotated_with("greeting").to_instance("bye")?;
            Ok(())
        });
        let c = ContextInjector::get_override_instance(&factory, classes, context, override_module).unwrap();
        assert_eq!(c.get_instance("", "greeting").unwrap(), Value::from("bye"));
        assert_eq!(a.get_instance("", "greeting").unwrap(), Value::from("hello"));
    }
}
