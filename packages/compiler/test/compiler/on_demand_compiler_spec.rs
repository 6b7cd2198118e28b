#[path = "../fixtures/mod.rs"]
mod fixtures;

use di_compiler::compiler::{DiCompiler, OnDemandCompiler};
use di_compiler::di::{Container, DependencyKey};
use di_compiler::error::CompilerError;
use di_compiler::injector::Injector;
use di_compiler::script::{meta_path, unit_path, ScriptInjector, AOP_FILE};
use di_compiler::value::Value;
use std::error::Error;
use std::fs;

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::{classes, lazy_car_module, CarModule};

    #[test]
    fn should_match_batch_compile_output() {
        let batch = tempfile::tempdir().unwrap();
        DiCompiler::from_module(&CarModule, classes(), batch.path())
            .unwrap()
            .compile()
            .unwrap();

        let on_demand = tempfile::tempdir().unwrap();
        fs::copy(batch.path().join(AOP_FILE), on_demand.path().join(AOP_FILE)).unwrap();
        let classes = classes();
        let container = Container::from_module(&classes, &CarModule).unwrap();
        let key = DependencyKey::any("CarInterface");
        OnDemandCompiler::new(on_demand.path(), &container, &classes, None)
            .compile(&key)
            .unwrap();

        assert_eq!(
            fs::read_to_string(unit_path(on_demand.path(), &key)).unwrap(),
            fs::read_to_string(unit_path(batch.path(), &key)).unwrap()
        );
        assert_eq!(
            fs::read_to_string(meta_path(on_demand.path(), &key)).unwrap(),
            fs::read_to_string(meta_path(batch.path(), &key)).unwrap()
        );
    }

    #[test]
    fn should_infer_concrete_class_outside_the_graph() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let bound = injector.get_instance("EngineInterface", "*").unwrap();
        let inferred = injector.get_instance("Engine", "*").unwrap();

        assert_eq!(bound.as_object().unwrap().class(), "Engine");
        assert_eq!(inferred.as_object().unwrap().class(), "Engine");
        assert!(!inferred.same(&injector.get_instance("Engine", "*").unwrap()));
        assert!(unit_path(dir.path(), &DependencyKey::any("Engine")).exists());
    }

    #[test]
    fn should_report_unbound_key_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let err = injector.get_instance("Foo", "bar").unwrap_err();
        match &err {
            CompilerError::Unbound { key, .. } => assert_eq!(key, "Foo-bar"),
            other => panic!("unexpected {:?}", other),
        }
        let cause = err.source().map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("Class not found: Foo"));
    }

    #[test]
    fn should_not_infer_interfaces() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_car_module()));
        let err = injector.get_instance("HardtopInterface", "*").unwrap_err();
        assert_eq!(err.key(), Some("HardtopInterface-*"));
        assert_eq!(injector.get_instance("", "logo").unwrap(), Value::from("momo"));
    }
}
