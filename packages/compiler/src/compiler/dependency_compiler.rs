//! Dependency Compiler
//!
//! Turns one binding descriptor into a [`Code`] artifact.

use crate::compiler::aop_code::aop_code;
use crate::compiler::code::Code;
use crate::compiler::factory_compiler::{FactoryCompiler, INSTANCE_VAR};
use crate::compiler::function_compiler::{ArgumentResolver, ScopeResolver};
use crate::compiler::normalizer::Normalizer;
use crate::di::binding::{Binding, Dependency, DependencyProvider};
use crate::di::container::Container;
use crate::error::{CompilerError, Result};
use crate::output::output_ast as o;
use crate::reflection::ClassRegistry;
use crate::value::Value;

/// Namespace of every compiled class or provider unit.
pub const COMPILED_NAMESPACE: &str = "di\\compiled";

pub struct DependencyCompiler<'a> {
    factory: FactoryCompiler<'a>,
    normalizer: Normalizer,
}

impl<'a> DependencyCompiler<'a> {
    pub fn new(container: &'a Container, classes: &'a ClassRegistry) -> Self {
        Self::with_runtime(container, classes, None)
    }

    /// A compiler that asks `runtime` about keys missing from `container`.
    pub fn with_runtime(
        container: &'a Container,
        classes: &'a ClassRegistry,
        runtime: Option<&'a dyn ScopeResolver>,
    ) -> Self {
        DependencyCompiler {
            factory: FactoryCompiler::new(ArgumentResolver::new(container, classes, runtime)),
            normalizer: Normalizer::new(),
        }
    }

    pub fn compile(&self, binding: &Binding) -> Result<Code> {
        match binding {
            Binding::Instance(instance) => self.compile_instance(&instance.value),
            Binding::Class(dependency) => self.compile_dependency(dependency),
            Binding::Provider(provider) => self.compile_dependency_provider(provider),
            Binding::NullObject(_) => Err(CompilerError::UnsupportedBinding {
                kind: binding.kind().to_string(),
            }),
        }
    }

    fn compile_instance(&self, value: &Value) -> Result<Code> {
        let node = self.normalizer.normalize(value)?;
        Ok(Code::new(vec![o::return_tuple(node, false)], false))
    }

    fn compile_dependency(&self, dependency: &Dependency) -> Result<Code> {
        let mut qualifiers = Vec::new();
        let mut node = self.factory_node(dependency, &mut qualifiers)?;
        node.extend(aop_code(dependency));
        node.push(o::return_tuple(o::variable(INSTANCE_VAR), dependency.is_singleton));
        Ok(Code {
            statements: namespaced(node),
            is_singleton: dependency.is_singleton,
            qualifiers,
        })
    }

    fn compile_dependency_provider(&self, provider: &DependencyProvider) -> Result<Code> {
        let mut qualifiers = Vec::new();
        let mut node = self.factory_node(&provider.dependency, &mut qualifiers)?;
        if let Some(context) = &provider.context {
            node.push(
                o::variable(INSTANCE_VAR)
                    .call_method("setContext", vec![o::literal(context.as_str())])
                    .to_stmt(),
            );
        }
        let get = o::variable(INSTANCE_VAR).call_method("get", vec![]);
        node.push(o::return_tuple(get, provider.is_singleton));
        Ok(Code {
            statements: namespaced(node),
            is_singleton: provider.is_singleton,
            qualifiers,
        })
    }

    fn factory_node(
        &self,
        dependency: &Dependency,
        qualifiers: &mut Vec<crate::compiler::code::IpQualifier>,
    ) -> Result<Vec<o::Statement>> {
        let new_instance = &dependency.new_instance;
        self.factory.get_factory_code(
            &new_instance.class,
            &new_instance.arguments,
            &new_instance.setters,
            dependency.post_construct.as_deref(),
            qualifiers,
        )
    }
}

fn namespaced(node: Vec<o::Statement>) -> Vec<o::Statement> {
    let mut statements = Vec::with_capacity(node.len() + 1);
    statements.push(o::namespace(COMPILED_NAMESPACE));
    statements.extend(node);
    statements
}
