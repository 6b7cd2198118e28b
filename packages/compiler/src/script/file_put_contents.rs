//! Atomic file writes
//!
//! Contents go to a temporary file in the target's directory and are renamed
//! into place, so readers see either the old file or the new one.

use crate::error::{CompilerError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write `contents` to `path` atomically.
pub fn file_put_contents(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    StagedWrite::stage(path, contents.as_ref())?.commit()
}

/// Create `dir` and its parents; an existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| CompilerError::FileNotWritable {
        path: dir.to_path_buf(),
        source,
    })
}

/// Contents written to a temporary file but not yet renamed over the target.
#[derive(Debug)]
pub struct StagedWrite {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    pub fn stage(path: &Path, contents: &[u8]) -> Result<StagedWrite> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        ensure_dir(dir)?;
        let not_writable = |source| CompilerError::FileNotWritable {
            path: path.to_path_buf(),
            source,
        };
        let mut file = NamedTempFile::new_in(dir).map_err(not_writable)?;
        file.write_all(contents).map_err(not_writable)?;
        file.flush().map_err(not_writable)?;
        Ok(StagedWrite {
            file,
            target: path.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    pub fn commit(self) -> Result<()> {
        let target = self.target;
        self.file
            .persist(&target)
            .map_err(|e| CompilerError::FileNotWritable {
                path: target.clone(),
                source: e.error,
            })?;
        Ok(())
    }

    /// Drop the temporary file, leaving the target untouched.
    pub fn abandon(self) {
        tracing::debug!(target_path = %self.target.display(), "staged write abandoned");
    }
}
