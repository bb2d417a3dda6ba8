//! Durable storage for the session token.
//!
//! The store holds exactly one value. The signing password never goes through
//! here; it lives only in the broker's memory.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use zeroize::Zeroizing;

use crate::errors::ConsoleResult;

/// Persistence seam for the durable bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> ConsoleResult<Option<Zeroizing<String>>>;
    fn save(&self, token: &str) -> ConsoleResult<()>;
    fn clear(&self) -> ConsoleResult<()>;
}

/// File-backed token store. Writes go through a temporary file and a rename.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ConsoleResult<Option<Zeroizing<String>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = Zeroizing::new(fs::read_to_string(&self.path)?);
        let token = raw.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(Zeroizing::new(token.to_string())))
    }

    fn save(&self, token: &str) -> ConsoleResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("new");
        {
            let mut file = File::create(&tmp_path)?;
            restrict_permissions(&file)?;
            file.write_all(token.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> ConsoleResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> ConsoleResult<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> ConsoleResult<()> {
    Ok(())
}

/// In-memory store, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<Zeroizing<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(Zeroizing::new(token.to_string()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ConsoleResult<Option<Zeroizing<String>>> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &str) -> ConsoleResult<()> {
        *self.token.lock() = Some(Zeroizing::new(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> ConsoleResult<()> {
        *self.token.lock() = None;
        Ok(())
    }
}
