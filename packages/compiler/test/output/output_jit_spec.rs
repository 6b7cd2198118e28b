#[path = "../fixtures/mod.rs"]
mod fixtures;

use di_compiler::compiler::Normalizer;
use di_compiler::di::Container;
use di_compiler::error::CompilerError;
use di_compiler::expression_parser::Parser;
use di_compiler::injector::ContainerInjector;
use di_compiler::output::abstract_emitter::emit_expression;
use di_compiler::output::output_jit::JitEvaluator;
use di_compiler::value::{Array, ArrayKey, NativeBlob, NativeValue, Object, Value};
use indexmap::IndexMap;
use std::any::Any;
use std::rc::Rc;

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::classes;

    #[derive(Debug)]
    struct Socket;

    impl NativeValue for Socket {
        fn type_name(&self) -> &str {
            "Socket"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Normalize, print, parse back and evaluate.
    fn round_trip(value: &Value) -> Value {
        let dir = tempfile::tempdir().unwrap();
        let injector = ContainerInjector::new(Container::new(), classes(), dir.path()).unwrap();
        let expr = Normalizer::new().normalize(value).unwrap();
        let source = emit_expression(&expr);
        let parsed = Parser::new().parse_expression(&source).unwrap();
        JitEvaluator::new().evaluate_expression(&parsed, &*injector).unwrap()
    }

    #[test]
    fn should_round_trip_scalars() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Int(-42),
            Value::Int(i64::MIN),
            Value::Float(0.1),
            Value::Float(1.0),
            Value::Float(f64::NAN),
            Value::Float(f64::NEG_INFINITY),
            Value::from("it's a\nnew 'line' \\"),
        ] {
            assert_eq!(round_trip(&value), value);
        }
    }

    #[test]
    fn should_round_trip_arrays() {
        let list = Array::from_values([Value::Int(1), Value::from("two")]);
        let mut sparse = Array::new();
        sparse.insert(ArrayKey::Int(3), Value::Int(1));
        sparse.insert(ArrayKey::Str("key".to_string()), Value::from(list.clone()));
        for value in [Value::from(Array::new()), Value::from(list), Value::from(sparse)] {
            assert_eq!(round_trip(&value), value);
        }
    }

    #[test]
    fn should_round_trip_objects_by_state() {
        let mut properties = IndexMap::new();
        properties.insert("power".to_string(), Value::Int(250));
        properties.insert("tags".to_string(), Value::from(Array::from_values([Value::from("v8")])));
        let engine = Value::Object(Object::with_properties("Engine", properties));
        let restored = round_trip(&engine);
        assert_eq!(restored, engine);
        assert!(!restored.same(&engine));
    }

    #[test]
    fn should_round_trip_native_blobs() {
        let blob = Value::Native(Rc::new(NativeBlob {
            type_name: "Color".to_string(),
            bytes: vec![0, 255, 7],
        }));
        assert_eq!(round_trip(&blob), blob);
    }

    #[test]
    fn should_reject_values_without_representation() {
        let err = Normalizer::new()
            .normalize(&Value::Native(Rc::new(Socket)))
            .unwrap_err();
        assert!(matches!(err, CompilerError::InvalidInstance { ref type_name } if type_name == "Socket"));
    }

    #[test]
    fn should_evaluate_parsed_unit() {
        let dir = tempfile::tempdir().unwrap();
        let injector = ContainerInjector::new(Container::new(), classes(), dir.path()).unwrap();
        let source = "namespace di\\compiled;\n\ninstance = new Engine();\ninstance.power = 120;\nreturn (instance, true);\n";
        let unit = Parser::new().parse_unit("Engine-*.di", source).unwrap();
        let (engine, is_singleton) = JitEvaluator::new()
            .evaluate_statements("Engine-*.di", &unit, &*injector)
            .unwrap();
        assert!(is_singleton);
        assert_eq!(engine.as_object().unwrap().get("power"), Some(Value::Int(120)));
    }
}
