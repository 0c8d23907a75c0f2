//! Error types shared by the blueprint engine

use std::path::PathBuf;
use thiserror::Error;

use crate::blueprint::LifecycleState;

/// Errors produced while applying a single change to a host
#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("offset {offset} is out of bounds for {path} ({len} bytes)")]
    OutOfBounds {
        path: PathBuf,
        offset: usize,
        len: usize,
    },

    #[error("offset {offset} is not on a character boundary in {path}")]
    NotCharBoundary { path: PathBuf, offset: usize },

    #[error("invalid range {start}..{end} in {path}")]
    InvalidRange {
        path: PathBuf,
        start: usize,
        end: usize,
    },

    #[error("change has no target file")]
    MissingPath,

    #[error("change bundled for {bundle} targets {child}")]
    ForeignPath { bundle: PathBuf, child: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a blueprint during its lifecycle
#[derive(Debug, Error)]
pub enum BlueprintError {
    /// Requirements for the blueprint aren't met (bad input, target exists, ...)
    #[error("{0}")]
    Validation(String),

    /// Error caused by the user; displayed without a trace, then propagated
    #[error("{0}")]
    User(String),

    #[error("cannot move from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("changes requested while the blueprint is {0}")]
    NotPrepared(LifecycleState),

    #[error(transparent)]
    Change(#[from] ChangeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BlueprintError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::User(message.into())
    }

    /// Whether the error is expected and should be reported without a trace
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::User(_))
    }
}

/// Errors raised while building or querying the blueprint registry
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("loaded blueprint at {path} isn't valid: {reason}")]
    InvalidBlueprint { path: PathBuf, reason: String },

    #[error("couldn't find blueprint {0}")]
    UnknownBlueprint(String),

    #[error("failed to scan blueprints directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Errors raised while loading the project configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
