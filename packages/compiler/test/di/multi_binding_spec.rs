use di_compiler::compiler::DependencyCompiler;
use di_compiler::di::{Binder, Container, DependencyKey, LazyModule, Module};
use di_compiler::error::{CompilerError, Result};
use di_compiler::injector::{Injector, InjectorFactory};
use di_compiler::reflection::{ClassDef, ClassRegistry, ParamDef};
use di_compiler::script::ScriptInjector;
use di_compiler::value::{ArrayKey, Object, Value};
use std::rc::Rc;

fn classes() -> Rc<ClassRegistry> {
    let classes = ClassRegistry::new();
    classes.register(ClassDef::interface("EngineInterface", &[]));
    classes.register(ClassDef::interface("RobotInterface", &[]));
    classes.register(ClassDef::new("Engine").implements("EngineInterface"));
    classes.register(ClassDef::new("Engine2").implements("EngineInterface"));
    classes.register(ClassDef::new("Engine3").implements("EngineInterface").singleton());
    classes.register(ClassDef::new("Robot").implements("RobotInterface"));
    classes.register(
        ClassDef::new("RobotProvider").method("get", |_, _| Ok(Value::Object(Object::new("Robot")))),
    );
    classes.register(ClassDef::new("Garage").constructor(vec![
        ParamDef::new("engines").set("EngineInterface"),
        ParamDef::new("robots").set("RobotInterface"),
    ]));
    classes.register(ClassDef::new("Shed").constructor(vec![ParamDef::new("tools").set("ToolInterface")]));
    Rc::new(classes)
}

fn module() -> Box<dyn Module> {
    Box::new(|binder: &mut Binder| -> Result<()> {
        let mut engines = binder.multi_bind("EngineInterface");
        engines.add_binding("one").to("Engine")?;
        engines.add_binding("two").to("Engine2")?;
        engines.add().to("Engine3")?;
        let mut robots = binder.multi_bind("RobotInterface");
        robots.add_binding("to").to("Robot")?;
        robots.add_binding("provider").to_provider("RobotProvider")?;
        robots.add_binding("instance").to_instance(Value::Object(Object::new("Robot")))?;
        binder.bind("Garage").untargeted()?;
        Ok(())
    })
}

fn lazy_module() -> Rc<dyn LazyModule> {
    Rc::new(module)
}

fn entry(map: &Value, key: impl Into<ArrayKey>) -> Value {
    map.as_array().unwrap().get(&key.into()).cloned().unwrap()
}

fn class_of(value: &Value) -> String {
    value.as_object().unwrap().class().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compile_map_of_scoped_pulls() {
        let classes = classes();
        let container = Container::from_module(&classes, module().as_ref()).unwrap();
        let binding = container.get(&DependencyKey::any("Garage")).unwrap();
        let source = DependencyCompiler::new(&container, &classes)
            .compile(binding)
            .unwrap()
            .to_source();
        assert!(source.contains(
            "['one' => prototype('EngineInterface-@one'), 'two' => prototype('EngineInterface-@two'), 0 => singleton('EngineInterface-@0')]"
        ));
    }

    #[test]
    fn should_inject_map_of_bound_engines() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_module()));
        let garage = injector.get_instance("Garage", "*").unwrap();
        let engines = garage.as_object().unwrap().get("engines").unwrap();

        assert_eq!(engines.as_array().unwrap().len(), 3);
        assert_eq!(class_of(&entry(&engines, "one")), "Engine");
        assert_eq!(class_of(&entry(&engines, "two")), "Engine2");
        assert_eq!(class_of(&entry(&engines, 0i64)), "Engine3");
    }

    #[test]
    fn should_keep_element_scope() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_module()));
        let engines = |garage: &Value| garage.as_object().unwrap().get("engines").unwrap();
        let a = engines(&injector.get_instance("Garage", "*").unwrap());
        let b = engines(&injector.get_instance("Garage", "*").unwrap());

        assert!(entry(&a, 0i64).same(&entry(&b, 0i64)));
        assert!(!entry(&a, "one").same(&entry(&b, "one")));
    }

    #[test]
    fn should_mix_class_provider_and_instance_elements() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_module()));
        let garage = injector.get_instance("Garage", "*").unwrap();
        let robots = garage.as_object().unwrap().get("robots").unwrap();

        let keys: Vec<String> = robots.as_array().unwrap().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["to", "provider", "instance"]);
        for robot in robots.as_array().unwrap().values() {
            assert_eq!(class_of(robot), "Robot");
        }
    }

    #[test]
    fn should_resolve_the_same_map_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let injector = InjectorFactory::get_instance(lazy_module(), classes(), dir.path()).unwrap();
        let garage = injector.get_instance("Garage", "*").unwrap();
        let engines = garage.as_object().unwrap().get("engines").unwrap();

        assert_eq!(class_of(&entry(&engines, "two")), "Engine2");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn should_report_missing_set() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ScriptInjector::new(dir.path(), classes(), Some(lazy_module()));
        let err = injector.get_instance("Shed", "*").unwrap_err();
        assert!(matches!(err, CompilerError::SetNotFound { ref interface } if interface == "ToolInterface"));
    }
}
