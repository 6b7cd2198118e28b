#[path = "../fixtures/mod.rs"]
mod fixtures;

use di_compiler::compiler::DiCompiler;
use di_compiler::di::{Binder, DependencyKey, ParameterRef};
use di_compiler::error::{CompilerError, Result};
use di_compiler::script::{qualifier_path, unit_path, AOP_FILE, COMPILE_LOG, MODULE_FILE};
use std::fs;

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::{classes, CarModule};

    const CAR_UNIT: &str = "namespace di\\compiled;

instance = new Car(prototype('EngineInterface-*'));
instance.setTires(prototype('TyreInterface-*'), prototype('TyreInterface-*'));
instance.setMirrors(singleton('MirrorInterface-right'), singleton('MirrorInterface-left'));
instance.setHandle(prototype('HandleInterface-*', ['Car', 'setHandle', 'handle']));
instance.postConstruct();
instance.bindings = ['start' => [singleton('LogInterceptor-*')]];
return (instance, false);
";

    #[test]
    fn should_compile_every_key_of_the_graph() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = DiCompiler::from_module(&CarModule, classes(), dir.path()).unwrap();
        compiler.compile().unwrap();

        for key in compiler.container().sorted_keys() {
            assert!(unit_path(dir.path(), &key).exists(), "missing unit for {}", key);
        }
        assert!(dir.path().join(AOP_FILE).exists());
        assert!(dir.path().join(MODULE_FILE).exists());
        let log = fs::read_to_string(dir.path().join(COMPILE_LOG)).unwrap();
        assert!(log.contains("Compiled: CarInterface-*\n"));
    }

    #[test]
    fn should_emit_car_factory() {
        let dir = tempfile::tempdir().unwrap();
        DiCompiler::from_module(&CarModule, classes(), dir.path())
            .unwrap()
            .compile()
            .unwrap();
        let unit = fs::read_to_string(unit_path(dir.path(), &DependencyKey::any("CarInterface"))).unwrap();
        assert_eq!(unit, CAR_UNIT);
    }

    #[test]
    fn should_write_qualifier_of_provider_parameters() {
        let dir = tempfile::tempdir().unwrap();
        DiCompiler::from_module(&CarModule, classes(), dir.path())
            .unwrap()
            .compile()
            .unwrap();
        let path = qualifier_path(dir.path(), &ParameterRef::new("Car", "setHandle", "handle"));
        let qualifier: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(qualifier.to_string().contains("left-hand"));
    }

    #[test]
    fn should_be_deterministic() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        for dir in [&first, &second] {
            DiCompiler::from_module(&CarModule, classes(), dir.path())
                .unwrap()
                .compile()
                .unwrap();
        }
        for key in ["CarInterface-*", "MirrorInterface-left", "HandleInterface-*", "-logo"] {
            let key = DependencyKey::from(key);
            assert_eq!(
                fs::read(unit_path(first.path(), &key)).unwrap(),
                fs::read(unit_path(second.path(), &key)).unwrap()
            );
        }
    }

    #[test]
    fn should_log_the_failing_key_before_rethrowing() {
        let dir = tempfile::tempdir().unwrap();
        let module = |binder: &mut Binder| -> Result<()> {
            binder.bind("Roadster").untargeted()?;
            Ok(())
        };
        let err = DiCompiler::from_module(&module, classes(), dir.path())
            .unwrap()
            .compile()
            .unwrap_err();
        assert!(matches!(&err, CompilerError::Unbound { key, .. } if key == "HardtopInterface-*"));

        let log = fs::read_to_string(dir.path().join(COMPILE_LOG)).unwrap();
        assert!(log.contains("\nError: Roadster-*\nUnbound: Unbound: HardtopInterface-*\n"));
        assert!(!dir.path().join(AOP_FILE).exists());
    }
}
