//! Compiler Errors
//!
//! Every failure surfaced by compilation, the script cache and the injectors.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompilerError>;

#[derive(Debug, Error)]
pub enum CompilerError {
    /// No binding and no usable default for the dependency key.
    #[error("Unbound: {key}")]
    Unbound {
        key: String,
        #[source]
        source: Option<Box<CompilerError>>,
    },

    /// The graph was never compiled for this key, so scope cannot be decided yet.
    #[error("Not compiled: {key}")]
    NotCompiled { key: String },

    /// The value has neither a literal nor an object representation.
    #[error("Invalid instance: {type_name} cannot be represented in compiled code")]
    InvalidInstance { type_name: String },

    /// The binding descriptor is not a literal, class or provider binding.
    #[error("Unsupported binding: {kind}")]
    UnsupportedBinding { kind: String },

    #[error("File not writable: {}", path.display())]
    FileNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A parameter asks for a map multi-binding nobody declared.
    #[error("Set not found: {interface}")]
    SetNotFound { interface: String },

    #[error("Class not found: {class}")]
    ClassNotFound { class: String },

    #[error("Method not found: {class}::{method}()")]
    MethodNotFound { class: String, method: String },

    #[error("Syntax error in {file} at offset {offset}: {message}")]
    Syntax {
        file: String,
        offset: usize,
        message: String,
    },

    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CompilerError {
    pub fn unbound(key: impl Into<String>) -> Self {
        CompilerError::Unbound {
            key: key.into(),
            source: None,
        }
    }

    pub fn unbound_caused_by(key: impl Into<String>, cause: CompilerError) -> Self {
        CompilerError::Unbound {
            key: key.into(),
            source: Some(Box::new(cause)),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        CompilerError::Runtime {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompilerError::Io {
            path: path.into(),
            source,
        }
    }

    /// `NotCompiled` is a specialisation of `Unbound`.
    pub fn is_unbound(&self) -> bool {
        matches!(
            self,
            CompilerError::Unbound { .. } | CompilerError::NotCompiled { .. }
        )
    }

    /// The dependency key carried by an unbound error.
    pub fn key(&self) -> Option<&str> {
        match self {
            CompilerError::Unbound { key, .. } | CompilerError::NotCompiled { key } => Some(key),
            _ => None,
        }
    }
}
