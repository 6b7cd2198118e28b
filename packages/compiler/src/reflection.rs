//! Class Registry
//!
//! Ahead-of-time class metadata: what a class implements, how it is
//! constructed, which setters take injections and the native bodies of its
//! methods. The compiler reads it in place of runtime reflection and the
//! evaluator instantiates objects through it.

use crate::error::{CompilerError, Result};
use crate::script::script_dirs::ScriptDirRegistry;
use crate::value::{NativeBlob, NativeRef, Object, ObjectRef, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

pub type NativeMethod = Rc<dyn Fn(&ObjectRef, &[Value]) -> Result<Value>>;
pub type NativeDecoder = Rc<dyn Fn(&[u8]) -> Result<NativeRef>>;

/// Constructor that runs after arguments have been stored as properties.
pub const CONSTRUCTOR: &str = "__construct";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Prototype,
    Singleton,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    /// Interface or class the parameter is typed with.
    pub type_hint: Option<String>,
    /// Binding name selected for this parameter.
    pub named: Option<String>,
    pub default: Option<Value>,
    /// Contextual qualifier payload exposed through the injection point.
    pub qualifier: Option<Value>,
    /// Interface whose map multi-binding this parameter receives.
    pub set: Option<String>,
}

impl ParamDef {
    pub fn new(name: impl Into<String>) -> Self {
        ParamDef {
            name: name.into(),
            type_hint: None,
            named: None,
            default: None,
            qualifier: None,
            set: None,
        }
    }

    pub fn typed(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.named = Some(name.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn qualified(mut self, qualifier: impl Into<Value>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn set(mut self, interface: impl Into<String>) -> Self {
        self.set = Some(interface.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetterDef {
    pub method: String,
    pub params: Vec<ParamDef>,
    pub optional: bool,
}

impl SetterDef {
    pub fn new(method: impl Into<String>, params: Vec<ParamDef>) -> Self {
        SetterDef {
            method: method.into(),
            params,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Clone, Default)]
pub struct ClassDef {
    pub name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub scope: Scope,
    pub constructor: Vec<ParamDef>,
    pub setters: Vec<SetterDef>,
    pub post_construct: Option<String>,
    /// Method names declared by an interface.
    pub declared_methods: Vec<String>,
    pub methods: IndexMap<String, NativeMethod>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDef {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn interface(name: impl Into<String>, methods: &[&str]) -> Self {
        ClassDef {
            name: name.into(),
            is_interface: true,
            is_abstract: true,
            declared_methods: methods.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn singleton(mut self) -> Self {
        self.scope = Scope::Singleton;
        self
    }

    pub fn constructor(mut self, params: Vec<ParamDef>) -> Self {
        self.constructor = params;
        self
    }

    pub fn setter(mut self, setter: SetterDef) -> Self {
        self.setters.push(setter);
        self
    }

    pub fn post_construct(mut self, method: impl Into<String>) -> Self {
        self.post_construct = Some(method.into());
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> Result<Value> + 'static,
    {
        self.methods.insert(name.into(), Rc::new(body));
        self
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_abstract && !self.is_interface
    }

    pub fn setter_def(&self, method: &str) -> Option<&SetterDef> {
        self.setters.iter().find(|s| s.method == method)
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("interfaces", &self.interfaces)
            .field("scope", &self.scope)
            .field("constructor", &self.constructor)
            .field("setters", &self.setters)
            .field("post_construct", &self.post_construct)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry of known classes, binary decoders and script directories.
#[derive(Default)]
pub struct ClassRegistry {
    classes: RefCell<IndexMap<String, Rc<ClassDef>>>,
    decoders: RefCell<HashMap<String, NativeDecoder>>,
    script_dirs: ScriptDirRegistry,
}

impl ClassRegistry {
    pub fn new() -> Self {
        ClassRegistry::default()
    }

    pub fn register(&self, def: ClassDef) {
        self.classes
            .borrow_mut()
            .insert(def.name.clone(), Rc::new(def));
    }

    pub fn register_decoder<F>(&self, type_name: impl Into<String>, decoder: F)
    where
        F: Fn(&[u8]) -> Result<NativeRef> + 'static,
    {
        self.decoders
            .borrow_mut()
            .insert(type_name.into(), Rc::new(decoder));
    }

    /// Registers the class loader of a script directory. Returns false if it was already known.
    pub fn register_script_dir(&self, dir: &Path) -> bool {
        self.script_dirs.register(dir)
    }

    pub fn script_dirs(&self) -> &ScriptDirRegistry {
        &self.script_dirs
    }

    /// Look a class up, falling back to classes generated into registered script directories.
    pub fn find(&self, name: &str) -> Result<Option<Rc<ClassDef>>> {
        if let Some(def) = self.classes.borrow().get(name) {
            return Ok(Some(def.clone()));
        }
        match self.script_dirs.load(name)? {
            Some(def) => {
                tracing::debug!(class = name, "autoloaded generated class");
                self.register(def);
                Ok(self.classes.borrow().get(name).cloned())
            }
            None => Ok(None),
        }
    }

    pub fn get(&self, name: &str) -> Result<Rc<ClassDef>> {
        self.find(name)?.ok_or_else(|| CompilerError::ClassNotFound {
            class: name.to_string(),
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        matches!(self.find(name), Ok(Some(_)))
    }

    /// True when `class` is `target`, extends it, or implements it.
    pub fn is_subclass_of(&self, class: &str, target: &str) -> bool {
        let mut current = Some(class.to_string());
        while let Some(name) = current {
            if name == target {
                return true;
            }
            let def = match self.find(&name) {
                Ok(Some(def)) => def,
                _ => return false,
            };
            if def
                .interfaces
                .iter()
                .any(|i| i == target || self.is_subclass_of(i, target))
            {
                return true;
            }
            current = def.parent.clone();
        }
        false
    }

    /// Public method names of a class, parents first.
    pub fn method_names(&self, class: &str) -> Result<Vec<String>> {
        let def = self.get(class)?;
        let mut names = match &def.parent {
            Some(parent) => self.method_names(parent)?,
            None => Vec::new(),
        };
        for name in def.methods.keys() {
            if name != CONSTRUCTOR && !names.contains(name) {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    /// Create an object, storing constructor arguments as same-named properties.
    pub fn new_instance(&self, class: &str, args: Vec<Value>) -> Result<ObjectRef> {
        let def = self.get(class)?;
        if !def.is_concrete() {
            return Err(CompilerError::runtime(format!(
                "Cannot instantiate abstract class or interface {}",
                class
            )));
        }
        let object = Object::new(class);
        for (i, param) in def.constructor.iter().enumerate() {
            let value = match args.get(i) {
                Some(arg) => arg.clone(),
                None => param.default.clone().unwrap_or(Value::Null),
            };
            object.set(param.name.clone(), value);
        }
        if let Some(body) = self.find_method(&def, CONSTRUCTOR)? {
            body(&object, &args)?;
        }
        Ok(object)
    }

    fn find_method(&self, def: &ClassDef, method: &str) -> Result<Option<NativeMethod>> {
        if let Some(body) = def.methods.get(method) {
            return Ok(Some(body.clone()));
        }
        match &def.parent {
            Some(parent) => {
                let parent = self.get(parent)?;
                self.find_method(&parent, method)
            }
            None => Ok(None),
        }
    }

    fn find_setter(&self, def: &ClassDef, method: &str) -> Result<Option<SetterDef>> {
        if let Some(setter) = def.setter_def(method) {
            return Ok(Some(setter.clone()));
        }
        match &def.parent {
            Some(parent) => {
                let parent = self.get(parent)?;
                self.find_setter(&parent, method)
            }
            None => Ok(None),
        }
    }

    /// Call a method. Declared setters and post-construct hooks without a body
    /// assign their arguments or do nothing.
    pub fn invoke(&self, object: &ObjectRef, method: &str, args: &[Value]) -> Result<Value> {
        let def = self.get(object.class())?;
        if let Some(body) = self.find_method(&def, method)? {
            return body(object, args);
        }
        if let Some(setter) = self.find_setter(&def, method)? {
            for (param, value) in setter.params.iter().zip(args) {
                object.set(param.name.clone(), value.clone());
            }
            return Ok(Value::Null);
        }
        if def.post_construct.as_deref() == Some(method) {
            return Ok(Value::Null);
        }
        Err(CompilerError::MethodNotFound {
            class: object.class().to_string(),
            method: method.to_string(),
        })
    }

    /// Rebuild a native value from its binary snapshot.
    pub fn decode_native(&self, type_name: &str, bytes: &[u8]) -> Result<NativeRef> {
        let decoder = self.decoders.borrow().get(type_name).cloned();
        match decoder {
            Some(decode) => decode(bytes),
            None => Ok(Rc::new(NativeBlob {
                type_name: type_name.to_string(),
                bytes: bytes.to_vec(),
            })),
        }
    }
}
