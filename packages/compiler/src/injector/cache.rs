//! Cache providers
//!
//! Key/value stores the cached injector factory persists injector snapshots
//! into. Entries are scoped by a namespace set before use.

use crate::error::{CompilerError, Result};
use crate::script::file_put_contents::file_put_contents;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub trait CacheProvider {
    fn fetch(&self, id: &str) -> Result<Option<String>>;
    fn save(&self, id: &str, data: &str) -> Result<()>;
    fn set_namespace(&self, namespace: &str);
}

/// In-memory cache, shared by everything holding the same instance.
#[derive(Debug, Default)]
pub struct ArrayCache {
    namespace: RefCell<String>,
    entries: RefCell<HashMap<String, String>>,
}

impl ArrayCache {
    pub fn new() -> Self {
        ArrayCache::default()
    }

    fn namespaced(&self, id: &str) -> String {
        format!("{}[{}]", self.namespace.borrow(), id)
    }
}

impl CacheProvider for ArrayCache {
    fn fetch(&self, id: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(&self.namespaced(id)).cloned())
    }

    fn save(&self, id: &str, data: &str) -> Result<()> {
        let key = self.namespaced(id);
        self.entries.borrow_mut().insert(key, data.to_string());
        Ok(())
    }

    fn set_namespace(&self, namespace: &str) {
        *self.namespace.borrow_mut() = namespace.to_string();
    }
}

/// One file per entry under `<dir>/<namespace>/`, written atomically.
#[derive(Debug)]
pub struct FileCache {
    dir: PathBuf,
    namespace: RefCell<String>,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileCache {
            dir: dir.into(),
            namespace: RefCell::new(String::new()),
        }
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir
            .join(sanitize(&self.namespace.borrow()))
            .join(format!("{}.json", sanitize(id)))
    }
}

fn sanitize(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}

impl CacheProvider for FileCache {
    fn fetch(&self, id: &str) -> Result<Option<String>> {
        let path = self.path(id);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CompilerError::io(path, e)),
        }
    }

    fn save(&self, id: &str, data: &str) -> Result<()> {
        file_put_contents(&self.path(id), data)
    }

    fn set_namespace(&self, namespace: &str) {
        *self.namespace.borrow_mut() = namespace.to_string();
    }
}
