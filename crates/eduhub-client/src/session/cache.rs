//! Storage backends for the cached identity.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use eduhub_common::CacheError;

/// Persists a single serialized identity entry.
pub trait CacheBackend: Send + Sync {
    fn load(&self) -> Result<Option<String>, CacheError>;
    fn save(&self, contents: &str) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    fn load(&self) -> Result<Option<String>, CacheError> {
        (**self).load()
    }

    fn save(&self, contents: &str) -> Result<(), CacheError> {
        (**self).save(contents)
    }

    fn clear(&self) -> Result<(), CacheError> {
        (**self).clear()
    }
}

/// A cache entry on disk, readable only by the owner.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheBackend for FileCache {
    fn load(&self) -> Result<Option<String>, CacheError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local cache. Used by tests and by callers that opt out of
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entry: Mutex<Option<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(contents: impl Into<String>) -> Self {
        Self {
            entry: Mutex::new(Some(contents.into())),
        }
    }
}

impl CacheBackend for MemoryCache {
    fn load(&self) -> Result<Option<String>, CacheError> {
        Ok(self.entry.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, contents: &str) -> Result<(), CacheError> {
        *self.entry.lock().unwrap_or_else(|e| e.into_inner()) = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        *self.entry.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
