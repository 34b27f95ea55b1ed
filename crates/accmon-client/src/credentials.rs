//! Persisted management key.
//!
//! The key lives in a single file (`~/.accmon/management_key` by default).
//! It is loaded once when a monitor session starts and saved when the user
//! answers an auth challenge.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CredentialError;

const DATA_DIR: &str = ".accmon";
const KEY_FILE: &str = "management_key";

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the home directory.
    pub fn default_location() -> Result<Self, CredentialError> {
        let home = dirs::home_dir().ok_or(CredentialError::NoHomeDir)?;
        Ok(Self::new(home.join(DATA_DIR).join(KEY_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored key, or `None` if nothing (or only whitespace) was saved.
    pub fn load(&self) -> Result<Option<String>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let key = content.trim();
                Ok((!key.is_empty()).then(|| key.to_string()))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CredentialError::Read { path: self.path.clone(), source }),
        }
    }

    pub fn save(&self, key: &str) -> Result<(), CredentialError> {
        let write_err =
            |source: std::io::Error| CredentialError::Write { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut file = create_private(&self.path).map_err(write_err)?;
        file.write_all(key.trim().as_bytes()).map_err(write_err)?;
        tracing::debug!("[Credentials] Saved management key to {}", self.path.display());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CredentialError::Write { path: self.path.clone(), source }),
        }
    }
}

/// Open for writing with owner-only access from the moment the file exists.
#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    // `mode` only applies on creation; tighten a file left by an older save.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)
}
