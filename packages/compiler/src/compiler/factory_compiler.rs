//! Factory Code Builder

use crate::compiler::code::IpQualifier;
use crate::compiler::function_compiler::ArgumentResolver;
use crate::di::argument::Argument;
use crate::di::binding::SetterMethod;
use crate::error::Result;
use crate::output::output_ast as o;

pub const INSTANCE_VAR: &str = "instance";

pub struct FactoryCompiler<'a> {
    resolver: ArgumentResolver<'a>,
}

impl<'a> FactoryCompiler<'a> {
    pub fn new(resolver: ArgumentResolver<'a>) -> Self {
        FactoryCompiler { resolver }
    }

    /// Instantiate, call setters, call the post-construct hook.
    pub fn get_factory_code(
        &self,
        class: &str,
        arguments: &[Argument],
        setters: &[SetterMethod],
        post_construct: Option<&str>,
        qualifiers: &mut Vec<IpQualifier>,
    ) -> Result<Vec<o::Statement>> {
        let mut node = Vec::new();
        let args = self.resolve_all(arguments, qualifiers)?;
        node.push(o::assign(INSTANCE_VAR, o::import_ref(class).instantiate(args)).to_stmt());
        for setter in setters {
            if let Some(stmt) = self.setter_injection(class, setter, qualifiers)? {
                node.push(stmt);
            }
        }
        if let Some(method) = post_construct {
            node.push(o::variable(INSTANCE_VAR).call_method(method, vec![]).to_stmt());
        }
        Ok(node)
    }

    fn resolve_all(&self, arguments: &[Argument], qualifiers: &mut Vec<IpQualifier>) -> Result<Vec<o::Expression>> {
        arguments
            .iter()
            .map(|argument| self.resolver.resolve(argument, qualifiers))
            .collect()
    }

    /// An optional setter with an unresolvable argument is left out entirely.
    fn setter_injection(
        &self,
        class: &str,
        setter: &SetterMethod,
        qualifiers: &mut Vec<IpQualifier>,
    ) -> Result<Option<o::Statement>> {
        let mut captured = Vec::new();
        match self.resolve_all(&setter.arguments, &mut captured) {
            Ok(args) => {
                qualifiers.extend(captured);
                Ok(Some(
                    o::variable(INSTANCE_VAR)
                        .call_method(setter.method.as_str(), args)
                        .to_stmt(),
                ))
            }
            Err(e) if e.is_unbound() && setter.is_optional => {
                tracing::warn!(class, method = %setter.method, error = %e, "optional setter skipped");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
