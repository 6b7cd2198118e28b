//! Runtime Values
//!
//! The values produced by compiled factory units and held by bindings:
//! scalars, ordered arrays, dynamic objects of registered classes, foreign
//! native values and the injector self-reference.

use crate::error::{CompilerError, Result};
use crate::injector::Injector;
use crate::output::output_ast::Expression;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// Key of an array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl From<i64> for ArrayKey {
    fn from(i: i64) -> Self {
        ArrayKey::Int(i)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey::Str(s.to_string())
    }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self {
        ArrayKey::Str(s)
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{}", i),
            ArrayKey::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered array with integer and string keys.
///
/// Appending uses the next integer key after the largest integer key seen so far.
#[derive(Debug, Clone, Default)]
pub struct Array {
    entries: IndexMap<ArrayKey, Value>,
    next_index: i64,
}

impl Array {
    pub fn new() -> Self {
        Array::default()
    }

    pub fn from_values<I: IntoIterator<Item = Value>>(values: I) -> Self {
        let mut array = Array::new();
        for value in values {
            array.push(value);
        }
        array
    }

    pub fn push(&mut self, value: Value) {
        let key = ArrayKey::Int(self.next_index);
        self.insert(key, value);
    }

    pub fn insert(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Int(i) = key {
            if i >= self.next_index {
                self.next_index = i.saturating_add(1);
            }
        }
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.values_mut()
    }

    /// True when the keys are exactly `0, 1, 2, ...` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(i, key)| *key == ArrayKey::Int(i as i64))
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Dynamic instance of a registered class.
pub struct Object {
    class: String,
    properties: RefCell<IndexMap<String, Value>>,
}

pub type ObjectRef = Rc<Object>;

impl Object {
    pub fn new(class: impl Into<String>) -> ObjectRef {
        Rc::new(Object {
            class: class.into(),
            properties: RefCell::new(IndexMap::new()),
        })
    }

    pub fn with_properties(class: impl Into<String>, properties: IndexMap<String, Value>) -> ObjectRef {
        Rc::new(Object {
            class: class.into(),
            properties: RefCell::new(properties),
        })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.properties.borrow_mut().insert(name.into(), value);
    }

    pub fn properties(&self) -> Ref<'_, IndexMap<String, Value>> {
        self.properties.borrow()
    }

    pub fn properties_mut(&self) -> RefMut<'_, IndexMap<String, Value>> {
        self.properties.borrow_mut()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("properties", &self.properties.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A value that renders its own construction expression.
pub trait SourceRepresentable {
    fn to_source(&self, normalize: &dyn Fn(&Value) -> Result<Expression>) -> Result<Expression>;
}

/// Foreign Rust value carried through the container.
pub trait NativeValue: fmt::Debug {
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_source(&self) -> Option<&dyn SourceRepresentable> {
        None
    }

    /// Binary snapshot, only meaningful to a decoder registered for `type_name`.
    fn to_bytes(&self) -> Option<Vec<u8>> {
        None
    }
}

pub type NativeRef = Rc<dyn NativeValue>;

/// Binary snapshot of a native value whose type has no registered decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeBlob {
    pub type_name: String,
    pub bytes: Vec<u8>,
}

impl NativeValue for NativeBlob {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_bytes(&self) -> Option<Vec<u8>> {
        Some(self.bytes.clone())
    }
}

/// Non-owning handle to an injector.
#[derive(Clone)]
pub struct InjectorRef(Weak<dyn Injector>);

struct DetachedInjector;

impl Injector for DetachedInjector {
    fn get_instance(&self, interface: &str, name: &str) -> Result<Value> {
        Err(CompilerError::runtime(format!(
            "injector handle is detached, cannot resolve {}-{}",
            interface, name
        )))
    }
}

impl InjectorRef {
    pub fn new(injector: Weak<dyn Injector>) -> Self {
        InjectorRef(injector)
    }

    pub fn detached() -> Self {
        let weak: Weak<dyn Injector> = Weak::<DetachedInjector>::new();
        InjectorRef(weak)
    }

    pub fn upgrade(&self) -> Option<Rc<dyn Injector>> {
        self.0.upgrade()
    }

    pub fn ptr_eq(&self, other: &InjectorRef) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for InjectorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InjectorRef(attached: {})", self.0.strong_count() > 0)
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Array),
    Object(ObjectRef),
    Native(NativeRef),
    Injector(InjectorRef),
}

impl Value {
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Object(o) => o.class().to_string(),
            Value::Native(n) => n.type_name().to_string(),
            Value::Injector(_) => "injector".to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_native<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Native(n) => n.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Point every injector handle inside this value at `injector`.
    /// Values read back from a snapshot hold detached handles until then.
    pub fn reattach_injector(&mut self, injector: &InjectorRef) {
        match self {
            Value::Injector(handle) => *handle = injector.clone(),
            Value::Array(array) => {
                for value in array.values_mut() {
                    value.reattach_injector(injector);
                }
            }
            Value::Object(object) => {
                for value in object.properties_mut().values_mut() {
                    value.reattach_injector(injector);
                }
            }
            _ => {}
        }
    }

    /// Identity comparison: the same object, native or injector, or equal scalars.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Injector(a), Value::Injector(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same(vb))
            }
            _ => self == other,
        }
    }

    fn to_repr(&self) -> Result<ValueRepr> {
        Ok(match self {
            Value::Null => ValueRepr::Null,
            Value::Bool(b) => ValueRepr::Bool(*b),
            Value::Int(i) => ValueRepr::Int(*i),
            Value::Float(f) => ValueRepr::Float(*f),
            Value::String(s) => ValueRepr::String(s.clone()),
            Value::Array(a) => ValueRepr::Array(
                a.iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_repr()?)))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(o) => ValueRepr::Object {
                class: o.class().to_string(),
                properties: o
                    .properties()
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), v.to_repr()?)))
                    .collect::<Result<Vec<_>>>()?,
            },
            Value::Native(n) => match n.to_bytes() {
                Some(bytes) => ValueRepr::Native {
                    type_name: n.type_name().to_string(),
                    bytes: BASE64.encode(bytes),
                },
                None => {
                    return Err(CompilerError::InvalidInstance {
                        type_name: n.type_name().to_string(),
                    })
                }
            },
            Value::Injector(_) => ValueRepr::Injector,
        })
    }

    fn from_repr(repr: ValueRepr) -> std::result::Result<Value, base64::DecodeError> {
        Ok(match repr {
            ValueRepr::Null => Value::Null,
            ValueRepr::Bool(b) => Value::Bool(b),
            ValueRepr::Int(i) => Value::Int(i),
            ValueRepr::Float(f) => Value::Float(f),
            ValueRepr::String(s) => Value::String(s),
            ValueRepr::Array(entries) => {
                let mut array = Array::new();
                for (k, v) in entries {
                    array.insert(k, Value::from_repr(v)?);
                }
                Value::Array(array)
            }
            ValueRepr::Object { class, properties } => {
                let mut props = IndexMap::new();
                for (k, v) in properties {
                    props.insert(k, Value::from_repr(v)?);
                }
                Value::Object(Object::with_properties(class, props))
            }
            ValueRepr::Native { type_name, bytes } => Value::Native(Rc::new(NativeBlob {
                type_name,
                bytes: BASE64.decode(bytes)?,
            })),
            ValueRepr::Injector => Value::Injector(InjectorRef::detached()),
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Rc::ptr_eq(a, b) || (a.class() == b.class() && *a.properties() == *b.properties())
            }
            (Value::Native(a), Value::Native(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.type_name() == b.type_name()
                        && a.to_bytes().is_some()
                        && a.to_bytes() == b.to_bytes())
            }
            (Value::Injector(_), Value::Injector(_)) => true,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum ValueRepr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<(ArrayKey, ValueRepr)>),
    Object {
        class: String,
        properties: Vec<(String, ValueRepr)>,
    },
    Native {
        type_name: String,
        bytes: String,
    },
    Injector,
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_repr()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = ValueRepr::deserialize(deserializer)?;
        Value::from_repr(repr).map_err(D::Error::custom)
    }
}
