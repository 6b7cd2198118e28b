//! Value Normalizer
//!
//! Converts runtime values into the expressions that rebuild them.

use crate::error::{CompilerError, Result};
use crate::output::output_ast as o;
use crate::value::{Array, ArrayKey, Object, SourceRepresentable, Value};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Normalizer
    }

    pub fn normalize(&self, value: &Value) -> Result<o::Expression> {
        match value {
            Value::Null => Ok(o::null_expr()),
            Value::Bool(b) => Ok(o::literal(*b)),
            Value::Int(i) => Ok(o::literal(*i)),
            Value::Float(f) => Ok(o::literal(*f)),
            Value::String(s) => Ok(o::literal(s.as_str())),
            Value::Array(array) => self.array_value(array),
            Value::Object(object) => object.to_source(&|v| self.normalize(v)),
            Value::Injector(_) => Ok(o::variable("injector").call_fn(vec![])),
            Value::Native(native) => {
                if let Some(source) = native.as_source() {
                    return source.to_source(&|v| self.normalize(v));
                }
                match native.to_bytes() {
                    Some(bytes) => Ok(o::variable("unserialize").call_fn(vec![
                        o::literal(native.type_name()),
                        o::literal(BASE64.encode(bytes)),
                    ])),
                    None => Err(CompilerError::InvalidInstance {
                        type_name: native.type_name().to_string(),
                    }),
                }
            }
        }
    }

    /// Lists print positionally, anything else with explicit keys.
    fn array_value(&self, array: &Array) -> Result<o::Expression> {
        if array.is_list() {
            let entries = array
                .values()
                .map(|v| self.normalize(v))
                .collect::<Result<Vec<_>>>()?;
            return Ok(o::literal_arr(entries));
        }
        let entries = array
            .iter()
            .map(|(k, v)| {
                Ok(o::LiteralMapEntry {
                    key: k.clone(),
                    value: Box::new(self.normalize(v)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(o::literal_map(entries))
    }
}

/// Objects rebuild as `restore('Class', ['prop' => value, ...])`.
impl SourceRepresentable for Object {
    fn to_source(&self, normalize: &dyn Fn(&Value) -> Result<o::Expression>) -> Result<o::Expression> {
        let entries = self
            .properties()
            .iter()
            .map(|(name, value)| {
                Ok(o::LiteralMapEntry {
                    key: ArrayKey::Str(name.clone()),
                    value: Box::new(normalize(value)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(o::variable("restore").call_fn(vec![o::literal(self.class()), o::literal_map(entries)]))
    }
}
