//! Interceptor binding code

use crate::compiler::factory_compiler::INSTANCE_VAR;
use crate::di::binding::Dependency;
use crate::di::dependency_key::DependencyKey;
use crate::output::output_ast as o;
use crate::value::ArrayKey;

pub const BINDINGS_PROP: &str = "bindings";

/// `instance.bindings = ['method' => [singleton('Interceptor-*'), ...]];`
///
/// Interceptors are always pulled through the singleton path.
pub fn aop_code(dependency: &Dependency) -> Option<o::Statement> {
    if dependency.bindings.is_empty() {
        return None;
    }
    let entries = dependency
        .bindings
        .iter()
        .map(|(method, interceptors)| {
            let pulls = interceptors
                .iter()
                .map(|interceptor| {
                    o::variable("singleton")
                        .call_fn(vec![o::literal(DependencyKey::any(interceptor).as_str())])
                })
                .collect();
            o::LiteralMapEntry {
                key: ArrayKey::Str(method.clone()),
                value: Box::new(o::literal_arr(pulls)),
            }
        })
        .collect();
    Some(
        o::variable(INSTANCE_VAR)
            .set_prop(BINDINGS_PROP, o::literal_map(entries))
            .to_stmt(),
    )
}
