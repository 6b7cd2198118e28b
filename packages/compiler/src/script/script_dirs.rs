//! Script directory class loader

use crate::compiler::compile_null_object::GeneratedClass;
use crate::error::{CompilerError, Result};
use crate::reflection::ClassDef;
use crate::script::class_path;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories whose generated classes the class registry may load.
#[derive(Debug, Default)]
pub struct ScriptDirRegistry {
    dirs: RefCell<Vec<PathBuf>>,
}

impl ScriptDirRegistry {
    pub fn new() -> Self {
        ScriptDirRegistry::default()
    }

    /// Returns false when `dir` is registered already.
    pub fn register(&self, dir: &Path) -> bool {
        let mut dirs = self.dirs.borrow_mut();
        if dirs.iter().any(|d| d == dir) {
            return false;
        }
        dirs.push(dir.to_path_buf());
        true
    }

    pub fn dirs(&self) -> Vec<PathBuf> {
        self.dirs.borrow().clone()
    }

    pub fn load(&self, class: &str) -> Result<Option<ClassDef>> {
        for dir in self.dirs.borrow().iter() {
            let path = class_path(dir, class);
            if !path.exists() {
                continue;
            }
            let json = fs::read_to_string(&path).map_err(|e| CompilerError::io(&path, e))?;
            let generated: GeneratedClass = serde_json::from_str(&json)?;
            return Ok(Some(generated.to_class_def()));
        }
        Ok(None)
    }
}
