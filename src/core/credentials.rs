//! # Credential Store
//!
//! The bearer token survives restarts in a single file, `~/.campusguide/token`
//! by default. Only the auth gate and the controller touch it.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) so a crash never
//! leaves a half-written token behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.campusguide/token`, or None without a home directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".campusguide").join("token"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, if any. Unreadable or empty files count as absent.
    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, token)?;
        restrict_permissions(&tmp_path)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("Token stored at {}", self.path.display());
        Ok(())
    }

    /// Remove the stored token. Clearing an absent token is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_token_path;

    #[test]
    fn test_load_missing_file_is_none() {
        let store = CredentialStore::new(temp_token_path());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_then_load() {
        let store = CredentialStore::new(temp_token_path());
        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc.def.ghi"));
        store.clear().unwrap();
    }

    #[test]
    fn test_clear_removes_token_and_is_idempotent() {
        let store = CredentialStore::new(temp_token_path());
        store.save("t").unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_whitespace_only_file_is_absent() {
        let store = CredentialStore::new(temp_token_path());
        store.save("  \n").unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let store = CredentialStore::new(temp_token_path());
        store.save("secret").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        store.clear().unwrap();
    }
}
