//! Script Cache
//!
//! On-disk layout of compiled units and the injector that runs them.
//!
//! ```text
//! <script_dir>/
//!   <stem>.di                         compiled unit
//!   meta/<stem>.json                  {"is_singleton": bool}
//!   qualifier/<class>-<method>-<param>.json
//!   _aop.json                         pointcut table, marks the first compile
//!   _module.json                      binding graph snapshot
//!   compiled                          sentinel of the strict injector
//!   _compile.log
//!   <Class>.class.json                generated classes
//! ```

pub mod compile_injector;
pub mod dependency_saver;
pub mod file_put_contents;
pub mod injection_point;
pub mod module_file;
pub mod script_dirs;
pub mod script_injector;

pub use compile_injector::CompileInjector;
pub use dependency_saver::DependencySaver;
pub use injection_point::InjectionPoint;
pub use script_dirs::ScriptDirRegistry;
pub use script_injector::{InjectorSnapshot, ScriptInjector};

use crate::di::argument::ParameterRef;
use crate::di::dependency_key::{file_stem, DependencyKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const UNIT_EXTENSION: &str = "di";
pub const AOP_FILE: &str = "_aop.json";
pub const MODULE_FILE: &str = "_module.json";
pub const COMPILED_SENTINEL: &str = "compiled";
pub const COMPILE_LOG: &str = "_compile.log";
pub const META_DIR: &str = "meta";
pub const QUALIFIER_DIR: &str = "qualifier";

/// Scope record written next to every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub is_singleton: bool,
}

pub fn unit_path(script_dir: &Path, key: &DependencyKey) -> PathBuf {
    script_dir.join(format!("{}.{}", key.file_stem(), UNIT_EXTENSION))
}

pub fn meta_path(script_dir: &Path, key: &DependencyKey) -> PathBuf {
    script_dir
        .join(META_DIR)
        .join(format!("{}.json", key.file_stem()))
}

pub fn qualifier_path(script_dir: &Path, parameter: &ParameterRef) -> PathBuf {
    script_dir
        .join(QUALIFIER_DIR)
        .join(parameter.qualifier_file_name())
}

pub fn class_path(script_dir: &Path, class: &str) -> PathBuf {
    script_dir.join(format!("{}.class.json", file_stem(class)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_replace_namespace_separators() {
        let dir = Path::new("/tmp/di");
        let key = DependencyKey::any("Vendor\\Car");
        assert_eq!(unit_path(dir, &key), Path::new("/tmp/di/Vendor_Car-*.di"));
        assert_eq!(meta_path(dir, &key), Path::new("/tmp/di/meta/Vendor_Car-*.json"));
        assert_eq!(
            qualifier_path(dir, &ParameterRef::new("Vendor\\Car", "setHandle", "handle")),
            Path::new("/tmp/di/qualifier/Vendor_Car-setHandle-handle.json")
        );
        assert_eq!(class_path(dir, "LoggerNull"), Path::new("/tmp/di/LoggerNull.class.json"));
    }
}
