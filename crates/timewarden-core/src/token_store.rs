//! On-disk persistence for the single bearer credential.
//!
//! The equivalent of one fixed localStorage key: a plain file holding
//! the raw token string, nothing else. Expiry lives on
//! [`Credential`](timewarden_api::Credential); this type only stores.

use std::io;
use std::path::PathBuf;

use timewarden_api::Credential;
use tracing::warn;

#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The stored credential, if the file exists and is non-empty.
    pub fn load(&self) -> Option<Credential> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Credential::new(trimmed))
    }

    pub fn save(&self, credential: &Credential) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, credential.expose())
    }

    /// Remove the stored credential. Idempotent; a failure other than
    /// "already gone" is logged and swallowed -- logout must never fail.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to clear token file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::new(dir.path().join("state").join("token"))
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&Credential::new("aaa.bbb.ccc")).unwrap();
        assert_eq!(store.load().unwrap().expose(), "aaa.bbb.ccc");
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_none());
    }

    #[test]
    fn clear_removes_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&Credential::new("aaa.bbb.ccc")).unwrap();
        store.clear();
        assert!(store.load().is_none());
        store.clear();
    }

    #[test]
    fn whitespace_only_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        std::fs::write(dir.path().join("token"), "  \n").unwrap();
        assert!(store.load().is_none());
    }
}
