//! Injector configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectorConfig {
    pub script_dir: PathBuf,
    /// Select the script injector instead of the in-memory one.
    #[serde(default)]
    pub compile: bool,
    /// Interfaces resolved eagerly before the injector is cached.
    #[serde(default)]
    pub saved_singletons: Vec<String>,
    /// Cache namespace, the injector id when absent.
    pub namespace: Option<String>,
}

impl InjectorConfig {
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        InjectorConfig {
            script_dir: script_dir.into(),
            ..InjectorConfig::default()
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: InjectorConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn injector_id(&self) -> String {
        match &self.namespace {
            Some(namespace) => namespace.clone(),
            None => self.script_dir.to_string_lossy().into_owned(),
        }
    }
}

impl Default for InjectorConfig {
    fn default() -> Self {
        InjectorConfig {
            script_dir: std::env::temp_dir().join("di_compiler"),
            compile: true,
            saved_singletons: Vec::new(),
            namespace: None,
        }
    }
}
