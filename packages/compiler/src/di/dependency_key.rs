//! Dependency keys, `{interface}-{name}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wildcard binding name.
pub const NAME_ANY: &str = "*";

/// Interface through which units receive the current injection point.
pub const INJECTION_POINT_INTERFACE: &str = "InjectionPointInterface";

/// Interface the injector binds itself under.
pub const INJECTOR_INTERFACE: &str = "InjectorInterface";

/// Name of the literal binding holding the script directory.
pub const SCRIPT_DIR_NAME: &str = "ScriptDir";

/// Name of the literal binding that switches compile mode on.
pub const COMPILE_NAME: &str = "Compile";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyKey(String);

impl DependencyKey {
    pub fn new(interface: &str, name: &str) -> Self {
        DependencyKey(format!("{}-{}", interface, name))
    }

    pub fn any(interface: &str) -> Self {
        DependencyKey::new(interface, NAME_ANY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interface or class part, everything before the last `-`.
    pub fn interface(&self) -> &str {
        match self.0.rfind('-') {
            Some(i) => &self.0[..i],
            None => &self.0,
        }
    }

    pub fn name(&self) -> &str {
        match self.0.rfind('-') {
            Some(i) => &self.0[i + 1..],
            None => "",
        }
    }

    pub fn is_any(&self) -> bool {
        self.name() == NAME_ANY
    }

    /// File name stem with namespace separators replaced by `_`.
    pub fn file_stem(&self) -> String {
        file_stem(&self.0)
    }
}

pub fn file_stem(name: &str) -> String {
    name.replace('\\', "_")
}

impl From<&str> for DependencyKey {
    fn from(s: &str) -> Self {
        DependencyKey(s.to_string())
    }
}

impl From<String> for DependencyKey {
    fn from(s: String) -> Self {
        DependencyKey(s)
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
