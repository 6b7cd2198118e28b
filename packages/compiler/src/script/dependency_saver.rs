//! Dependency Saver

use crate::compiler::code::Code;
use crate::di::dependency_key::DependencyKey;
use crate::error::Result;
use crate::script::file_put_contents::file_put_contents;
use crate::script::{meta_path, qualifier_path, unit_path, Meta};
use std::path::{Path, PathBuf};

/// Writes a unit, its scope record and its qualifier side files.
#[derive(Debug, Clone)]
pub struct DependencySaver {
    script_dir: PathBuf,
}

impl DependencySaver {
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        DependencySaver {
            script_dir: script_dir.into(),
        }
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    pub fn save(&self, key: &DependencyKey, code: &Code) -> Result<()> {
        file_put_contents(&unit_path(&self.script_dir, key), code.to_source())?;
        let meta = Meta {
            is_singleton: code.is_singleton,
        };
        file_put_contents(&meta_path(&self.script_dir, key), serde_json::to_vec(&meta)?)?;
        for ip in &code.qualifiers {
            let json = serde_json::to_vec(&ip.qualifier)?;
            file_put_contents(&qualifier_path(&self.script_dir, &ip.parameter), json)?;
        }
        tracing::debug!(key = %key, singleton = code.is_singleton, "saved unit");
        Ok(())
    }
}
