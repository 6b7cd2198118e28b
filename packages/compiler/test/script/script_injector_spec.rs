#[path = "../fixtures/mod.rs"]
mod fixtures;

use di_compiler::di::{Binder, DependencyKey};
use di_compiler::error::{CompilerError, Result};
use di_compiler::expression_parser::Parser;
use di_compiler::injector::Injector;
use di_compiler::reflection::{ClassDef, ClassRegistry, ParamDef};
use di_compiler::script::{unit_path, CompileInjector, ScriptInjector, COMPILED_SENTINEL};
use di_compiler::value::{Object, Value};
use std::fs;
use std::rc::Rc;
use std::thread;

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::{classes, lazy_car_module, prop, LazyCarModule};

    #[test]
    fn should_share_singleton_mirrors_between_cars() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let a = injector.get_instance("CarInterface", "*").unwrap();
        let b = injector.get_instance("CarInterface", "*").unwrap();

        assert_eq!(a.as_object().unwrap().class(), "Car");
        assert!(!a.same(&b));
        assert!(prop(&a, "rightMirror").same(&prop(&b, "rightMirror")));
        assert!(prop(&a, "leftMirror").same(&prop(&b, "leftMirror")));
        assert!(!prop(&a, "rightMirror").same(&prop(&a, "leftMirror")));
        assert!(!prop(&a, "frontTyre").same(&prop(&b, "frontTyre")));
        assert!(!prop(&a, "frontTyre").same(&prop(&a, "rearTyre")));
        assert_eq!(prop(&a, "isConstructed"), Value::Bool(true));
    }

    #[test]
    fn should_resolve_singletons_to_one_instance() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let first = injector.get_instance("MirrorInterface", "left").unwrap();
        for _ in 0..3 {
            assert!(first.same(&injector.get_instance("MirrorInterface", "left").unwrap()));
        }
        let tyre = injector.get_instance("TyreInterface", "*").unwrap();
        for _ in 0..3 {
            assert!(!tyre.same(&injector.get_instance("TyreInterface", "*").unwrap()));
        }
    }

    #[test]
    fn should_pass_qualifier_to_provider() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let car = injector.get_instance("CarInterface", "*").unwrap();
        let handle = prop(&car, "handle");
        assert_eq!(handle.as_object().unwrap().class(), "Handle");
        assert_eq!(prop(&handle, "side"), Value::from("left-hand"));
        assert_eq!(prop(&handle, "method"), Value::from("setHandle"));
    }

    #[test]
    fn should_bind_interceptors_as_singletons() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let a = injector.get_instance("CarInterface", "*").unwrap();
        let b = injector.get_instance("CarInterface", "*").unwrap();
        let interceptor = |car: &Value| {
            let bindings = prop(car, "bindings");
            let start = bindings.as_array().unwrap().values().next().cloned().unwrap();
            let interceptor = start.as_array().unwrap().values().next().cloned().unwrap();
            interceptor
        };
        assert_eq!(interceptor(&a).as_object().unwrap().class(), "LogInterceptor");
        assert!(interceptor(&a).same(&interceptor(&b)));
    }

    #[test]
    fn should_hand_itself_to_units_asking_for_the_injector() {
        let dir = tempfile::tempdir().unwrap();
        let classes = ClassRegistry::new();
        classes.register(
            ClassDef::new("Robot").constructor(vec![ParamDef::new("injector").typed("InjectorInterface")]),
        );
        let module = || -> Box<dyn di_compiler::di::Module> {
            Box::new(|binder: &mut Binder| -> Result<()> {
                binder.bind("Robot").untargeted()?;
                Ok(())
            })
        };
        let injector = ScriptInjector::new(dir.path(), Rc::new(classes), Some(Rc::new(module)));
        let robot = injector.get_instance("Robot", "*").unwrap();
        match prop(&robot, "injector") {
            Value::Injector(handle) => {
                let again = handle.upgrade().unwrap().get_instance("Robot", "*").unwrap();
                assert_eq!(again.as_object().unwrap().class(), "Robot");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn should_generate_null_objects_and_pass_provider_context() {
        let dir = tempfile::tempdir().unwrap();
        let classes = ClassRegistry::new();
        classes.register(ClassDef::interface("LoggerInterface", &["log"]));
        classes.register(ClassDef::interface("ConnectionInterface", &[]));
        classes.register(
            ClassDef::new("ConnectionProvider")
                .method("setContext", |this, args| {
                    this.set("context", args.first().cloned().unwrap_or(Value::Null));
                    Ok(Value::Null)
                })
                .method("get", |this, _| {
                    let connection = Object::new("Connection");
                    connection.set("dsn", this.get("context").unwrap_or(Value::Null));
                    Ok(Value::Object(connection))
                }),
        );
        let classes = Rc::new(classes);
        let module = || -> Box<dyn di_compiler::di::Module> {
            Box::new(|binder: &mut Binder| -> Result<()> {
                binder.bind("LoggerInterface").to_null_object()?;
                binder
                    .bind("ConnectionInterface")
                    .to_provider_with_context("ConnectionProvider", "sqlite::memory")?;
                Ok(())
            })
        };
        let injector = ScriptInjector::new(dir.path(), classes.clone(), Some(Rc::new(module)));

        let logger = injector.get_instance("LoggerInterface", "*").unwrap();
        let logger = logger.as_object().unwrap();
        assert_eq!(logger.class(), "LoggerInterfaceNull");
        assert_eq!(classes.invoke(logger, "log", &[Value::from("hi")]).unwrap(), Value::Null);
        assert!(dir.path().join("LoggerInterfaceNull.class.json").exists());

        let connection = injector.get_instance("ConnectionInterface", "*").unwrap();
        assert_eq!(prop(&connection, "dsn"), Value::from("sqlite::memory"));
    }

    #[test]
    fn should_share_a_directory_between_independent_injectors() {
        let dir = tempfile::tempdir().unwrap();
        let workers: Vec<_> = (0..2)
            .map(|_| {
                let path = dir.path().to_path_buf();
                thread::spawn(move || {
                    let injector = ScriptInjector::new(path, classes(), Some(lazy_car_module()));
                    let car = injector.get_instance("CarInterface", "*").unwrap();
                    car.as_object().unwrap().class().to_string()
                })
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), "Car");
        }
        let path = unit_path(dir.path(), &DependencyKey::any("CarInterface"));
        let source = fs::read_to_string(&path).unwrap();
        assert!(Parser::new().parse_unit("CarInterface-*.di", &source).is_ok());
    }

    #[test]
    fn should_restore_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let mirror = injector.get_instance("MirrorInterface", "left").unwrap();
        let snapshot = injector.to_snapshot().unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();

        let restored = ScriptInjector::from_snapshot(serde_json::from_str(&json).unwrap(), classes(), None).unwrap();
        assert_eq!(restored.get_instance("MirrorInterface", "left").unwrap(), mirror);
        let car = restored.get_instance("CarInterface", "*").unwrap();
        assert_eq!(car.as_object().unwrap().class(), "Car");
    }

    #[test]
    fn should_recompile_after_clear() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        injector.get_instance("CarInterface", "*").unwrap();
        injector.clear().unwrap();
        let key = DependencyKey::any("EngineInterface");
        assert!(!unit_path(dir.path(), &key).exists());
        injector.get_instance("EngineInterface", "*").unwrap();
        assert!(unit_path(dir.path(), &key).exists());
    }

    #[test]
    fn should_compile_once_in_strict_mode() {
        let dir = tempfile::tempdir().unwrap();
        let injector = CompileInjector::new(dir.path(), classes(), Rc::new(LazyCarModule { serializable: true }));
        let car = injector.get_instance("CarInterface", "*").unwrap();
        assert_eq!(car.as_object().unwrap().class(), "Car");
        assert!(dir.path().join(COMPILED_SENTINEL).exists());

        let err = injector.get_instance("Engine", "*").unwrap_err();
        assert!(matches!(err, CompilerError::Unbound { ref key, .. } if key == "Engine-*"));
    }
}
