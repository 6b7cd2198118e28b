#[path = "../fixtures/mod.rs"]
mod fixtures;

use di_compiler::config::InjectorConfig;
use di_compiler::di::{Binder, LazyModule, Module};
use di_compiler::error::Result;
use di_compiler::injector::{
    CacheProvider, CachedInjectorFactory, ContextInjector, FileCache, Injector, InjectorContext,
    InjectorFactory,
};
use di_compiler::script::{AOP_FILE, COMPILED_SENTINEL};
use di_compiler::value::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::{classes, lazy_car_module, prop, CarModule, LazyCarModule};

    struct ProdContext {
        tmp_dir: PathBuf,
        cache: Rc<dyn CacheProvider>,
    }

    impl InjectorContext for ProdContext {
        fn tmp_dir(&self) -> &Path {
            &self.tmp_dir
        }

        fn module(&self) -> Box<dyn Module> {
            Box::new(|binder: &mut Binder| -> Result<()> {
                binder.install(&CarModule)?;
                binder.bind("").annotated_with("Compile").to_instance(true)?;
                Ok(())
            })
        }

        fn cache(&self) -> Option<Rc<dyn CacheProvider>> {
            Some(self.cache.clone())
        }

        fn saved_singletons(&self) -> Vec<String> {
            vec!["LogInterceptor".to_string()]
        }
    }

    #[test]
    fn should_resolve_in_memory_without_compile_mode() {
        let dir = tempfile::tempdir().unwrap();
        let injector = InjectorFactory::get_instance(lazy_car_module(), classes(), dir.path()).unwrap();
        let a = injector.get_instance("CarInterface", "*").unwrap();
        let b = injector.get_instance("CarInterface", "*").unwrap();
        assert!(prop(&a, "leftMirror").same(&prop(&b, "leftMirror")));
        assert_eq!(prop(&prop(&a, "handle"), "side"), Value::from("left-hand"));
        assert!(!dir.path().join(AOP_FILE).exists());
    }

    #[test]
    fn should_select_compile_injector_for_serializable_modules() {
        let dir = tempfile::tempdir().unwrap();
        let modules: Rc<dyn LazyModule> = Rc::new(LazyCarModule { serializable: true });
        let injector = InjectorFactory::create(modules, classes(), dir.path(), true).unwrap();
        injector.get_instance("CarInterface", "*").unwrap();
        assert!(dir.path().join(COMPILED_SENTINEL).exists());
        assert!(injector.snapshot().unwrap().unwrap().strict);
    }

    #[test]
    fn should_restore_injector_from_file_cache_in_a_new_process() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let context = Rc::new(ProdContext {
            tmp_dir: dir.path().to_path_buf(),
            cache: Rc::new(FileCache::new(cache_dir.path())),
        });
        let first = ContextInjector::get_instance(&CachedInjectorFactory::new(), classes(), context).unwrap();
        let interceptor = first.get_instance("LogInterceptor", "*").unwrap();

        let context = Rc::new(ProdContext {
            tmp_dir: dir.path().to_path_buf(),
            cache: Rc::new(FileCache::new(cache_dir.path())),
        });
        let second = ContextInjector::get_instance(&CachedInjectorFactory::new(), classes(), context).unwrap();
        assert_eq!(second.get_instance("LogInterceptor", "*").unwrap(), interceptor);
        let car = second.get_instance("CarInterface", "*").unwrap();
        assert_eq!(car.as_object().unwrap().class(), "Car");
    }

    #[test]
    fn should_apply_override_module() {
        let dir = tempfile::tempdir().unwrap();
        let factory = CachedInjectorFactory::new();
        let override_module: Rc<dyn Module> = Rc::new(|binder: &mut Binder| -> Result<()> {
            binder.bind("").annotated_with("logo").to_instance("sparco")?;
            Ok(())
        });
        let overridden = factory
            .get_override_instance(dir.path(), classes(), lazy_car_module(), override_module, &[])
            .unwrap();
        assert_eq!(overridden.get_instance("", "logo").unwrap(), Value::from("sparco"));

        let plain = factory
            .get_instance("car", dir.path(), classes(), lazy_car_module(), None, &[])
            .unwrap();
        assert_eq!(plain.get_instance("", "logo").unwrap(), Value::from("momo"));
    }

    #[test]
    fn should_build_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let script_dir = dir.path().join("scripts");
        let config_path = dir.path().join("di.json");
        fs::write(
            &config_path,
            serde_json::json!({
                "scriptDir": &script_dir,
                "compile": true,
                "savedSingletons": ["LogInterceptor"],
            })
            .to_string(),
        )
        .unwrap();
        let config = InjectorConfig::load(&config_path).unwrap();
        let factory = CachedInjectorFactory::new();
        let a = factory.from_config(&config, classes(), lazy_car_module(), None).unwrap();
        let b = factory.from_config(&config, classes(), lazy_car_module(), None).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(script_dir.join(AOP_FILE).exists());
    }
}
