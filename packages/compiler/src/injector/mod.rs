//! Injector Module
//!
//! Injector implementations and the factories that choose between them.

pub mod cache;
pub mod cached_injector_factory;
pub mod container_injector;
pub mod context_injector;
pub mod injector_factory;

pub use cache::{ArrayCache, CacheProvider, FileCache};
pub use cached_injector_factory::CachedInjectorFactory;
pub use container_injector::ContainerInjector;
pub use context_injector::{ContextInjector, InjectorContext};
pub use injector_factory::InjectorFactory;

use crate::error::Result;
use crate::script::script_injector::InjectorSnapshot;
use crate::value::Value;

pub trait Injector {
    fn get_instance(&self, interface: &str, name: &str) -> Result<Value>;

    /// Persistable form of the injector, if it has one.
    fn snapshot(&self) -> Result<Option<InjectorSnapshot>> {
        Ok(None)
    }
}
