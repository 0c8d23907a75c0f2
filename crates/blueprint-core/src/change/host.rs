//! Hosts: the only way a change reads or writes file content
//!
//! - [`FsHost`] is backed by the real filesystem and persists immediately.
//! - [`ShadowHost`] overlays an in-memory copy on top of another host so a
//!   preview can apply a full change sequence without touching it.
//! - [`MemoryHost`] is a fully simulated filesystem that journals writes.

use crate::error::ChangeError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Read/write access to file content
#[async_trait]
pub trait Host: Send + Sync {
    /// Current content of `path`, or an empty string when the file is absent
    async fn read(&self, path: &Path) -> Result<String, ChangeError>;

    /// Replace the full content of `path`
    async fn write(&self, path: &Path, content: &str) -> Result<(), ChangeError>;

    /// Whether `path` exists in this host's view
    async fn exists(&self, path: &Path) -> bool;

    /// Create `path` empty if it does not exist yet
    async fn ensure_file(&self, path: &Path) -> Result<(), ChangeError>;
}

fn io_error(path: &Path, source: std::io::Error) -> ChangeError {
    ChangeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Host backed by the actual filesystem
#[derive(Debug, Clone, Default)]
pub struct FsHost {
    root: Option<PathBuf>,
}

impl FsHost {
    /// Host resolving relative paths against the process working directory
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Host resolving relative paths against `root`
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl Host for FsHost {
    async fn read(&self, path: &Path) -> Result<String, ChangeError> {
        let full = self.resolve(path);
        match fs::read_to_string(&full).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(io_error(&full, e)),
        }
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), ChangeError> {
        let full = self.resolve(path);
        fs::write(&full, content)
            .await
            .map_err(|e| io_error(&full, e))
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn ensure_file(&self, path: &Path) -> Result<(), ChangeError> {
        let full = self.resolve(path);
        if self.exists(path).await {
            return Ok(());
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        fs::write(&full, "").await.map_err(|e| io_error(&full, e))
    }
}

/// In-memory overlay over a base host
///
/// The first read of an unknown path falls through to the base host and seeds
/// the overlay; from then on that path is served from memory only, including
/// whether it exists. Writes never reach the base host.
pub struct ShadowHost<'a> {
    base: &'a dyn Host,
    /// `None` records a path read through while absent from the base
    files: Mutex<HashMap<PathBuf, Option<String>>>,
}

impl<'a> ShadowHost<'a> {
    pub fn new(base: &'a dyn Host) -> Self {
        Self {
            base,
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Paths currently held in memory
    pub async fn shadowed(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .files
            .lock()
            .await
            .iter()
            .filter(|(_, content)| content.is_some())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl Host for ShadowHost<'_> {
    async fn read(&self, path: &Path) -> Result<String, ChangeError> {
        if let Some(content) = self.files.lock().await.get(path) {
            return Ok(content.clone().unwrap_or_default());
        }

        let seed = if self.base.exists(path).await {
            Some(self.base.read(path).await?)
        } else {
            None
        };
        let mut files = self.files.lock().await;
        let content = files.entry(path.to_path_buf()).or_insert(seed);
        Ok(content.clone().unwrap_or_default())
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), ChangeError> {
        self.files
            .lock()
            .await
            .insert(path.to_path_buf(), Some(content.to_string()));
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        if let Some(content) = self.files.lock().await.get(path) {
            return content.is_some();
        }
        self.base.exists(path).await
    }

    async fn ensure_file(&self, path: &Path) -> Result<(), ChangeError> {
        if !self.exists(path).await {
            self.files
                .lock()
                .await
                .insert(path.to_path_buf(), Some(String::new()));
        }
        Ok(())
    }
}

/// Simulated filesystem that records every mutation
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: Mutex<BTreeMap<PathBuf, String>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host pre-populated with files; seeding is not journaled
    pub fn with_files<P, S>(files: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let files = files
            .into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect();
        Self {
            files: Mutex::new(files),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Content of a file, `None` if it does not exist
    pub async fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().await.get(path.as_ref()).cloned()
    }

    /// Every path written or created, in order
    pub async fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl Host for MemoryHost {
    async fn read(&self, path: &Path) -> Result<String, ChangeError> {
        Ok(self
            .files
            .lock()
            .await
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), ChangeError> {
        self.files
            .lock()
            .await
            .insert(path.to_path_buf(), content.to_string());
        self.writes.lock().await.push(path.to_path_buf());
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.files.lock().await.contains_key(path)
    }

    async fn ensure_file(&self, path: &Path) -> Result<(), ChangeError> {
        let mut files = self.files.lock().await;
        if !files.contains_key(path) {
            files.insert(path.to_path_buf(), String::new());
            self.writes.lock().await.push(path.to_path_buf());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_host_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let host = FsHost::rooted(dir.path());

        assert_eq!(host.read(Path::new("absent.txt")).await.unwrap(), "");
        assert!(!host.exists(Path::new("absent.txt")).await);
    }

    #[tokio::test]
    async fn test_fs_host_ensure_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let host = FsHost::rooted(dir.path());
        let path = Path::new("src/features/orders/mod.rs");

        host.ensure_file(path).await.unwrap();

        assert!(dir.path().join(path).is_file());
        assert_eq!(std::fs::read_to_string(dir.path().join(path)).unwrap(), "");
    }

    #[tokio::test]
    async fn test_fs_host_ensure_file_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "mod a;\n").unwrap();
        let host = FsHost::rooted(dir.path());

        host.ensure_file(Path::new("lib.rs")).await.unwrap();

        assert_eq!(host.read(Path::new("lib.rs")).await.unwrap(), "mod a;\n");
    }

    #[tokio::test]
    async fn test_shadow_reads_through_until_written() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("config.yaml");
        std::fs::write(&real, "original").unwrap();
        let base = FsHost::new();
        let shadow = ShadowHost::new(&base);

        assert_eq!(shadow.read(&real).await.unwrap(), "original");

        shadow.write(&real, "shadowed").await.unwrap();
        std::fs::write(&real, "changed on disk").unwrap();

        assert_eq!(shadow.read(&real).await.unwrap(), "shadowed");
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "changed on disk");
    }

    #[tokio::test]
    async fn test_shadow_never_touches_base() {
        let base = MemoryHost::with_files([("a.txt", "a")]);
        let shadow = ShadowHost::new(&base);

        shadow.ensure_file(Path::new("new.txt")).await.unwrap();
        shadow.write(Path::new("a.txt"), "b").await.unwrap();

        assert!(shadow.exists(Path::new("new.txt")).await);
        assert!(base.writes().await.is_empty());
        assert_eq!(base.content("a.txt").await.as_deref(), Some("a"));
        assert_eq!(
            shadow.shadowed().await,
            vec![PathBuf::from("a.txt"), PathBuf::from("new.txt")]
        );
    }

    #[tokio::test]
    async fn test_shadow_read_of_missing_file_keeps_it_missing() {
        let base = MemoryHost::new();
        let shadow = ShadowHost::new(&base);

        assert_eq!(shadow.read(Path::new("gone.rs")).await.unwrap(), "");
        assert!(!shadow.exists(Path::new("gone.rs")).await);
        assert!(shadow.shadowed().await.is_empty());

        shadow.ensure_file(Path::new("gone.rs")).await.unwrap();
        assert!(shadow.exists(Path::new("gone.rs")).await);
    }

    #[tokio::test]
    async fn test_memory_host_journals_writes() {
        let host = MemoryHost::with_files([("seed.txt", "seed")]);

        host.ensure_file(Path::new("seed.txt")).await.unwrap();
        host.ensure_file(Path::new("new.txt")).await.unwrap();
        host.write(Path::new("new.txt"), "content").await.unwrap();

        assert_eq!(
            host.writes().await,
            vec![PathBuf::from("new.txt"), PathBuf::from("new.txt")]
        );
        assert_eq!(host.content("new.txt").await.as_deref(), Some("content"));
    }
}
