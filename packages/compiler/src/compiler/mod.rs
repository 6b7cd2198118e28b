//! Compiler Module
//!
//! Turns binding descriptors into compiled factory units.

pub mod aop_code;
pub mod code;
pub mod compile_null_object;
pub mod dependency_compiler;
pub mod di_compiler;
pub mod factory_compiler;
pub mod function_compiler;
pub mod normalizer;
pub mod on_demand_compiler;

pub use code::{Code, IpQualifier};
pub use dependency_compiler::DependencyCompiler;
pub use di_compiler::DiCompiler;
pub use function_compiler::ScopeResolver;
pub use normalizer::Normalizer;
pub use on_demand_compiler::OnDemandCompiler;
