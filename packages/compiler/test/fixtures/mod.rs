//! Fake car graph shared by the integration tests.
#![allow(dead_code)]

use di_compiler::di::{Binder, LazyModule, Matcher, Module};
use di_compiler::error::{CompilerError, Result};
use di_compiler::reflection::{ClassDef, ClassRegistry, ParamDef, SetterDef};
use di_compiler::script::InjectionPoint;
use di_compiler::value::{Object, Value};
use indexmap::IndexMap;
use std::rc::Rc;

pub fn classes() -> Rc<ClassRegistry> {
    let classes = ClassRegistry::new();
    classes.register(ClassDef::interface("CarInterface", &["start"]));
    classes.register(ClassDef::interface("EngineInterface", &["start"]));
    classes.register(ClassDef::interface("TyreInterface", &[]));
    classes.register(ClassDef::interface("MirrorInterface", &[]));
    classes.register(ClassDef::interface("HandleInterface", &[]));
    classes.register(ClassDef::interface("HardtopInterface", &[]));

    classes.register(
        ClassDef::new("Engine")
            .implements("EngineInterface")
            .method("start", |_, _| Ok(Value::from("vroom"))),
    );
    classes.register(ClassDef::new("Tyre").implements("TyreInterface"));
    classes.register(ClassDef::new("Mirror").implements("MirrorInterface"));
    classes.register(
        ClassDef::new("HandleProvider")
            .constructor(vec![ParamDef::new("ip").typed("InjectionPointInterface")])
            .method("get", |this, _| {
                let ip = this.get("ip").unwrap_or(Value::Null);
                let ip = ip
                    .as_native::<InjectionPoint>()
                    .ok_or_else(|| CompilerError::runtime("no injection point"))?;
                let mut properties = IndexMap::new();
                properties.insert("side".to_string(), ip.qualifier().cloned().unwrap_or(Value::Null));
                properties.insert("method".to_string(), Value::from(ip.method()));
                Ok(Value::Object(Object::with_properties("Handle", properties)))
            }),
    );
    classes.register(ClassDef::new("LogInterceptor").singleton());
    classes.register(
        ClassDef::new("Car")
            .implements("CarInterface")
            .constructor(vec![ParamDef::new("engine").typed("EngineInterface")])
            .setter(SetterDef::new(
                "setTires",
                vec![
                    ParamDef::new("frontTyre").typed("TyreInterface"),
                    ParamDef::new("rearTyre").typed("TyreInterface"),
                ],
            ))
            .setter(SetterDef::new(
                "setMirrors",
                vec![
                    ParamDef::new("rightMirror").typed("MirrorInterface").named("right"),
                    ParamDef::new("leftMirror").typed("MirrorInterface").named("left"),
                ],
            ))
            .setter(SetterDef::new(
                "setHandle",
                vec![ParamDef::new("handle").typed("HandleInterface").qualified("left-hand")],
            ))
            .setter(
                SetterDef::new("setHardtop", vec![ParamDef::new("hardtop").typed("HardtopInterface")])
                    .optional(),
            )
            .post_construct("postConstruct")
            .method("postConstruct", |this, _| {
                this.set("isConstructed", Value::Bool(true));
                Ok(Value::Null)
            })
            .method("start", |_, _| Ok(Value::from("started"))),
    );
    classes.register(
        ClassDef::new("Roadster").setter(SetterDef::new(
            "setHardtop",
            vec![ParamDef::new("hardtop").typed("HardtopInterface")],
        )),
    );
    Rc::new(classes)
}

/// Car with an engine, two prototype tyres, two named singleton mirrors,
/// a qualified handle from a provider and a logging interceptor on `start*`.
pub struct CarModule;

impl Module for CarModule {
    fn configure(&self, binder: &mut Binder) -> Result<()> {
        binder.bind("CarInterface").to("Car")?;
        binder.bind("EngineInterface").to("Engine")?;
        binder.bind("TyreInterface").to("Tyre")?;
        binder.bind("MirrorInterface").annotated_with("right").to("Mirror")?.in_singleton();
        binder.bind("MirrorInterface").annotated_with("left").to("Mirror")?.in_singleton();
        binder.bind("HandleInterface").to_provider("HandleProvider")?;
        binder.bind("").annotated_with("logo").to_instance("momo")?;
        binder.bind_interceptor(
            Matcher::SubclassesOf("CarInterface".to_string()),
            Matcher::StartsWith("start".to_string()),
            vec!["LogInterceptor".to_string()],
        )?;
        Ok(())
    }
}

pub struct LazyCarModule {
    pub serializable: bool,
}

impl LazyModule for LazyCarModule {
    fn module(&self) -> Box<dyn Module> {
        Box::new(CarModule)
    }

    fn is_serializable(&self) -> bool {
        self.serializable
    }
}

pub fn lazy_car_module() -> Rc<dyn LazyModule> {
    Rc::new(LazyCarModule { serializable: false })
}

pub fn prop(value: &Value, name: &str) -> Value {
    value
        .as_object()
        .and_then(|o| o.get(name))
        .unwrap_or(Value::Null)
}
