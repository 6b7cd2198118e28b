//! Module Snapshot
//!
//! The resolved binding graph, persisted so a later process can compile keys
//! on demand without running the original module code.

use crate::di::container::Container;
use crate::error::{CompilerError, Result};
use crate::script::file_put_contents::file_put_contents;
use crate::script::MODULE_FILE;
use std::fs;
use std::path::Path;

pub struct ModuleFile;

impl ModuleFile {
    pub fn load(script_dir: &Path) -> Result<Option<Container>> {
        let path = script_dir.join(MODULE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|e| CompilerError::io(&path, e))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Writes the snapshot unless one exists already. Returns whether it wrote.
    pub fn save(script_dir: &Path, container: &Container) -> Result<bool> {
        let path = script_dir.join(MODULE_FILE);
        if path.exists() {
            return Ok(false);
        }
        file_put_contents(&path, serde_json::to_vec(container)?)?;
        Ok(true)
    }
}
