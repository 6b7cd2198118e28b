//! Argument Resolver
//!
//! Decides what expression supplies one constructor or setter argument:
//! a literal, a scoped pull of another unit, the injection point, a map of
//! multi-bound elements, or the argument's default when the dependency cannot
//! be compiled yet.

use crate::compiler::code::IpQualifier;
use crate::compiler::normalizer::Normalizer;
use crate::di::argument::Argument;
use crate::di::binding::Binding;
use crate::di::container::Container;
use crate::di::dependency_key::{DependencyKey, INJECTION_POINT_INTERFACE};
use crate::error::{CompilerError, Result};
use crate::output::output_ast as o;
use crate::reflection::{ClassRegistry, Scope};

/// Scope lookup for keys outside the graph being compiled.
pub trait ScopeResolver {
    /// `NotCompiled` when the key has neither a binding nor a compiled unit yet.
    fn is_singleton(&self, key: &DependencyKey) -> Result<bool>;
}

pub struct ArgumentResolver<'a> {
    container: &'a Container,
    classes: &'a ClassRegistry,
    runtime: Option<&'a dyn ScopeResolver>,
    normalizer: Normalizer,
}

impl<'a> ArgumentResolver<'a> {
    pub fn new(
        container: &'a Container,
        classes: &'a ClassRegistry,
        runtime: Option<&'a dyn ScopeResolver>,
    ) -> Self {
        ArgumentResolver {
            container,
            classes,
            runtime,
            normalizer: Normalizer::new(),
        }
    }

    pub fn resolve(&self, argument: &Argument, qualifiers: &mut Vec<IpQualifier>) -> Result<o::Expression> {
        if argument.key.interface() == INJECTION_POINT_INTERFACE {
            return Ok(o::variable("injection_point").call_fn(vec![]));
        }
        if let Some(interface) = &argument.set {
            return self.multi_binding(interface);
        }
        match self.container.get(&argument.key) {
            Some(Binding::Instance(instance)) => self.normalizer.normalize(&instance.value),
            Some(binding @ Binding::Provider(_)) => {
                if let Some(qualifier) = &argument.qualifier {
                    qualifiers.push(IpQualifier {
                        parameter: argument.parameter.clone(),
                        qualifier: qualifier.clone(),
                    });
                }
                Ok(pull(argument, binding.is_singleton(), true))
            }
            Some(binding) => Ok(pull(argument, binding.is_singleton(), false)),
            None => self.on_demand(argument),
        }
    }

    /// `[key => pull, ...]` over the elements bound to `interface`.
    fn multi_binding(&self, interface: &str) -> Result<o::Expression> {
        let map = self
            .container
            .multi_binding(interface)
            .ok_or_else(|| CompilerError::SetNotFound {
                interface: interface.to_string(),
            })?;
        let mut entries = Vec::with_capacity(map.len());
        for (key, element) in map.iter() {
            let value = match self.container.get(element) {
                Some(Binding::Instance(instance)) => self.normalizer.normalize(&instance.value)?,
                Some(binding) => scoped_pull(element, binding.is_singleton()),
                None => return Err(CompilerError::unbound(element.to_string())),
            };
            entries.push(o::LiteralMapEntry {
                key: key.clone(),
                value: Box::new(value),
            });
        }
        Ok(o::literal_map(entries))
    }

    /// The key is not part of the graph being compiled.
    fn on_demand(&self, argument: &Argument) -> Result<o::Expression> {
        let scope = match self.runtime {
            Some(runtime) => runtime.is_singleton(&argument.key),
            None => Err(CompilerError::NotCompiled {
                key: argument.key.to_string(),
            }),
        };
        let scope = match scope {
            Err(CompilerError::NotCompiled { .. }) => self.inferred_scope(argument)?,
            other => Some(other?),
        };
        if let Some(is_singleton) = scope {
            return Ok(pull(argument, is_singleton, false));
        }
        match &argument.default {
            Some(default) => {
                tracing::warn!(key = %argument.key, parameter = %argument.parameter, "unbound argument, using its default");
                self.normalizer.normalize(default)
            }
            None => Err(CompilerError::unbound(argument.key.to_string())),
        }
    }

    /// A concrete class can always be compiled on demand.
    fn inferred_scope(&self, argument: &Argument) -> Result<Option<bool>> {
        if !argument.key.is_any() || argument.key.interface().is_empty() {
            return Ok(None);
        }
        match self.classes.find(argument.key.interface())? {
            Some(def) if def.is_concrete() => Ok(Some(def.scope == Scope::Singleton)),
            _ => Ok(None),
        }
    }
}

fn scoped_pull(key: &DependencyKey, is_singleton: bool) -> o::Expression {
    let func = if is_singleton { "singleton" } else { "prototype" };
    o::variable(func).call_fn(vec![o::literal(key.as_str())])
}

/// `singleton('Key')` or `prototype('Key')`, with the parameter triple for providers.
fn pull(argument: &Argument, is_singleton: bool, with_injection_point: bool) -> o::Expression {
    let func = if is_singleton { "singleton" } else { "prototype" };
    let mut args = vec![o::literal(argument.key.as_str())];
    if with_injection_point {
        let parameter = &argument.parameter;
        args.push(o::literal_arr(vec![
            o::literal(parameter.class.as_str()),
            o::literal(parameter.method.as_str()),
            o::literal(parameter.parameter.as_str()),
        ]));
    }
    o::variable(func).call_fn(args)
}
