#![deny(clippy::all)]

/**
 * DI Compiler
 *
 * Compiles a dependency injection binding graph into one script unit per
 * dependency key and resolves instances by running those units.
 */

// Core modules
pub mod chars;
pub mod config;
pub mod error;
pub mod reflection;
pub mod value;

// Script text
pub mod expression_parser;
pub mod output;

// Binding graph and compilation
pub mod compiler;
pub mod di;

// Runtime
pub mod injector;
pub mod script;

// Re-exports
pub use compiler::{Code, DependencyCompiler, DiCompiler, OnDemandCompiler};
pub use config::InjectorConfig;
pub use di::{Binder, Binding, Container, DependencyKey, LazyModule, Module};
pub use error::{CompilerError, Result};
pub use injector::{
    ArrayCache, CacheProvider, CachedInjectorFactory, ContainerInjector, ContextInjector, Injector,
    InjectorContext, InjectorFactory,
};
pub use reflection::{ClassDef, ClassRegistry, ParamDef, SetterDef};
pub use script::{CompileInjector, InjectorSnapshot, ScriptInjector};
pub use value::Value;
