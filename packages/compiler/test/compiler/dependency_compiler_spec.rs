#[path = "../fixtures/mod.rs"]
mod fixtures;

use di_compiler::compiler::DependencyCompiler;
use di_compiler::di::{Binding, Container, DependencyKey, NullObjectBinding};
use di_compiler::error::CompilerError;
use di_compiler::injector::{ContainerInjector, Injector};
use di_compiler::value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::{classes, CarModule};

    #[test]
    fn should_compile_literal_binding() {
        let classes = classes();
        let container = Container::new();
        let code = DependencyCompiler::new(&container, &classes)
            .compile(&Binding::instance(1))
            .unwrap();
        assert_eq!(code.to_source(), "return (1, false);\n");
        assert!(!code.is_singleton);
    }

    #[test]
    fn should_return_the_literal_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut container = Container::new();
        container.add(DependencyKey::new("", "count"), Binding::instance(1));
        let injector = ContainerInjector::new(container, classes(), dir.path()).unwrap();
        assert_eq!(injector.get_instance("", "count").unwrap(), Value::Int(1));
    }

    #[test]
    fn should_skip_optional_setter_with_unbound_argument() {
        let classes = classes();
        let container = Container::from_module(&classes, &CarModule).unwrap();
        let binding = container.get(&DependencyKey::any("CarInterface")).unwrap();
        let source = DependencyCompiler::new(&container, &classes)
            .compile(binding)
            .unwrap()
            .to_source();
        assert!(source.contains("instance.setTires("));
        assert!(!source.contains("setHardtop"));
    }

    #[test]
    fn should_fail_non_optional_setter_with_unbound_argument() {
        let classes = classes();
        let container = Container::new();
        let binding = Binding::Class(di_compiler::di::Dependency::from_class(&classes, "Roadster").unwrap());
        let err = DependencyCompiler::new(&container, &classes)
            .compile(&binding)
            .unwrap_err();
        assert!(err.is_unbound());
        assert_eq!(err.key(), Some("HardtopInterface-*"));
    }

    #[test]
    fn should_produce_identical_text_for_identical_bindings() {
        let classes = classes();
        let container = Container::from_module(&classes, &CarModule).unwrap();
        let compiler = DependencyCompiler::new(&container, &classes);
        for (_, binding) in container.iter() {
            let first = compiler.compile(binding).unwrap().to_source();
            let second = compiler.compile(binding).unwrap().to_source();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn should_reject_unsupported_binding() {
        let classes = classes();
        let container = Container::new();
        let err = DependencyCompiler::new(&container, &classes)
            .compile(&Binding::NullObject(NullObjectBinding {
                interface: "HardtopInterface".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, CompilerError::UnsupportedBinding { .. }));
    }
}
