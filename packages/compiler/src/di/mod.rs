//! Binding graph: keys, binding descriptors, the container and the module DSL.

pub mod argument;
pub mod binding;
pub mod container;
pub mod dependency_key;
pub mod module;
pub mod multi_binding;
pub mod pointcut;

pub use argument::{Argument, ParameterRef};
pub use binding::{
    Binding, Dependency, DependencyProvider, InstanceBinding, NewInstance, NullObjectBinding,
    SetterMethod,
};
pub use container::Container;
pub use dependency_key::{DependencyKey, NAME_ANY};
pub use module::{Bind, Binder, LazyModule, Module, MultiBinder, OverrideLazyModule};
pub use multi_binding::MapBinding;
pub use pointcut::{Matcher, Pointcut};
