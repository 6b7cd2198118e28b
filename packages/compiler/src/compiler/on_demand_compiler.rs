//! On-demand Compiler
//!
//! Compiles a single key the first time it is requested after the batch
//! compile. Keys missing from the graph are inferred from the class registry.

use crate::compiler::compile_null_object::null_object_dependency;
use crate::compiler::dependency_compiler::DependencyCompiler;
use crate::compiler::function_compiler::ScopeResolver;
use crate::di::binding::{Binding, Dependency};
use crate::di::container::{weave_dependency, Container};
use crate::di::dependency_key::DependencyKey;
use crate::di::pointcut::Pointcut;
use crate::error::{CompilerError, Result};
use crate::reflection::ClassRegistry;
use crate::script::dependency_saver::DependencySaver;
use crate::script::AOP_FILE;
use std::fs;
use std::path::Path;

pub struct OnDemandCompiler<'a> {
    script_dir: &'a Path,
    container: &'a Container,
    classes: &'a ClassRegistry,
    runtime: Option<&'a dyn ScopeResolver>,
}

impl<'a> OnDemandCompiler<'a> {
    pub fn new(
        script_dir: &'a Path,
        container: &'a Container,
        classes: &'a ClassRegistry,
        runtime: Option<&'a dyn ScopeResolver>,
    ) -> Self {
        OnDemandCompiler {
            script_dir,
            container,
            classes,
            runtime,
        }
    }

    pub fn compile(&self, key: &DependencyKey) -> Result<()> {
        let mut binding = match self.container.get(key) {
            Some(Binding::NullObject(null)) => {
                Binding::Class(null_object_dependency(self.classes, self.script_dir, &null.interface)?)
            }
            Some(binding) => binding.clone(),
            None => Binding::Class(infer_dependency(self.classes, key)?),
        };
        if let Binding::Class(dependency) = &mut binding {
            if let Some(pointcuts) = self.load_pointcuts()? {
                weave_dependency(self.classes, &pointcuts, dependency)?;
            }
        }
        let code = DependencyCompiler::with_runtime(self.container, self.classes, self.runtime).compile(&binding)?;
        DependencySaver::new(self.script_dir).save(key, &code)?;
        tracing::debug!(key = %key, "compiled on demand");
        Ok(())
    }

    fn load_pointcuts(&self) -> Result<Option<Vec<Pointcut>>> {
        let path = self.script_dir.join(AOP_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read(&path).map_err(|e| CompilerError::io(&path, e))?;
        Ok(Some(serde_json::from_slice(&json)?))
    }
}

/// Untargeted binding of a concrete class requested by its own name.
pub fn infer_dependency(classes: &ClassRegistry, key: &DependencyKey) -> Result<Dependency> {
    let class = key.interface();
    match classes.find(class)? {
        None => Err(CompilerError::unbound_caused_by(
            key.as_str(),
            CompilerError::ClassNotFound {
                class: class.to_string(),
            },
        )),
        Some(def) if def.is_concrete() && key.is_any() => Dependency::from_class(classes, class),
        Some(_) => Err(CompilerError::unbound(key.as_str())),
    }
}
