//! Text changes and the hosts they are applied to
//!
//! A [`Change`] is an immutable, ordered text mutation. It never touches the
//! disk itself: all reads and writes go through a [`Host`], so the same value
//! can be replayed against the real filesystem or an in-memory shadow.
//!
//! Changes are not idempotent. Offsets are computed against the content a
//! generator saw, so applying the same change twice to already mutated content
//! produces a different result than applying it once to the original.

pub mod cluster;
pub mod host;

use crate::error::ChangeError;
use std::path::{Path, PathBuf};

pub use cluster::ChangeCluster;
pub use host::{FsHost, Host, MemoryHost, ShadowHost};

/// Order given to changes that should sort before everything else
pub const NOOP_ORDER: i64 = i64::MAX;

/// The effect a change has on the content of its file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// Splice `text` in at byte `offset`; offset 0 prepends
    Insert { offset: usize, text: String },
    /// Delete the byte range `start..end`
    Remove { start: usize, end: usize },
    /// Remove `start..end`, then insert `text` at `start`
    Replace {
        start: usize,
        end: usize,
        text: String,
    },
    /// Children applied in the given order, never re-sorted
    Multi(Vec<Change>),
    /// Reporting placeholder without any content effect
    Noop,
}

impl ChangeKind {
    /// Short lowercase name used in summaries
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Insert { .. } => "insert",
            ChangeKind::Remove { .. } => "remove",
            ChangeKind::Replace { .. } => "replace",
            ChangeKind::Multi(_) => "multi",
            ChangeKind::Noop => "noop",
        }
    }
}

/// An atomic, ordered text mutation with an optional target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    path: Option<PathBuf>,
    order: i64,
    kind: ChangeKind,
}

impl Change {
    /// Insert `text` into `path` at `offset`
    pub fn insert(path: impl Into<PathBuf>, offset: usize, text: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            order: offset as i64,
            kind: ChangeKind::Insert {
                offset,
                text: text.into(),
            },
        }
    }

    /// Remove `start..end` from `path`
    pub fn remove(path: impl Into<PathBuf>, start: usize, end: usize) -> Self {
        Self {
            path: Some(path.into()),
            order: start as i64,
            kind: ChangeKind::Remove { start, end },
        }
    }

    /// Replace `start..end` in `path` with `text`
    pub fn replace(
        path: impl Into<PathBuf>,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            path: Some(path.into()),
            order: start as i64,
            kind: ChangeKind::Replace {
                start,
                end,
                text: text.into(),
            },
        }
    }

    /// Bundle several edits to one file as a single reportable change
    ///
    /// The bundle sorts by the highest order among its children. Every child
    /// must target `path`; [`Change::apply`] rejects the bundle otherwise.
    pub fn multi(path: impl Into<PathBuf>, children: Vec<Change>) -> Self {
        let order = children.iter().map(|c| c.order).max().unwrap_or(0);
        Self {
            path: Some(path.into()),
            order,
            kind: ChangeKind::Multi(children),
        }
    }

    /// Placeholder change, optionally attached to a file
    pub fn noop(path: Option<PathBuf>) -> Self {
        Self {
            path,
            order: NOOP_ORDER,
            kind: ChangeKind::Noop,
        }
    }

    /// Override the sort key
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn kind(&self) -> &ChangeKind {
        &self.kind
    }

    /// Leaf changes with every `Multi` flattened in application order
    pub fn unrolled(&self) -> Vec<&Change> {
        match &self.kind {
            ChangeKind::Multi(children) => children.iter().flat_map(Change::unrolled).collect(),
            _ => vec![self],
        }
    }

    /// Apply this change through `host`
    pub async fn apply(&self, host: &dyn Host) -> Result<(), ChangeError> {
        let leaves = self.unrolled();
        if let (ChangeKind::Multi(_), Some(bundle)) = (&self.kind, self.path()) {
            if let Some(child) = leaves.iter().find_map(|l| l.path().filter(|p| *p != bundle)) {
                return Err(ChangeError::ForeignPath {
                    bundle: bundle.to_path_buf(),
                    child: child.to_path_buf(),
                });
            }
        }
        for leaf in leaves {
            leaf.apply_leaf(host).await?;
        }
        Ok(())
    }

    async fn apply_leaf(&self, host: &dyn Host) -> Result<(), ChangeError> {
        let (start, end, text) = match &self.kind {
            ChangeKind::Noop | ChangeKind::Multi(_) => return Ok(()),
            ChangeKind::Insert { offset, text } => (*offset, *offset, text.as_str()),
            ChangeKind::Remove { start, end } => (*start, *end, ""),
            ChangeKind::Replace { start, end, text } => (*start, *end, text.as_str()),
        };

        let path = self.path.as_deref().ok_or(ChangeError::MissingPath)?;
        let mut content = host.read(path).await?;
        check_range(path, &content, start, end)?;
        content.replace_range(start..end, text);
        host.write(path, &content).await
    }
}

fn check_range(path: &Path, content: &str, start: usize, end: usize) -> Result<(), ChangeError> {
    if start > end {
        return Err(ChangeError::InvalidRange {
            path: path.to_path_buf(),
            start,
            end,
        });
    }
    for offset in [start, end] {
        if offset > content.len() {
            return Err(ChangeError::OutOfBounds {
                path: path.to_path_buf(),
                offset,
                len: content.len(),
            });
        }
        if !content.is_char_boundary(offset) {
            return Err(ChangeError::NotCharBoundary {
                path: path.to_path_buf(),
                offset,
            });
        }
    }
    Ok(())
}
