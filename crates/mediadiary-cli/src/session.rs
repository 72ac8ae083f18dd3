//! File-backed identity provider.
//!
//! The signed-in user is a JSON file in the data directory. Signing out
//! removes it.

use std::io::ErrorKind;
use std::path::PathBuf;

use mediadiary_core::{DiaryError, IdentityProvider, User};

pub struct FileIdentityProvider {
    path: PathBuf,
}

impl FileIdentityProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The signed-in user, if a session file exists.
    pub fn current_user(&self) -> anyhow::Result<Option<User>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to read session {}: {}",
                    self.path.display(),
                    e
                ))
            }
        };
        let user = serde_json::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse session {}: {}", self.path.display(), e)
        })?;
        Ok(Some(user))
    }

    pub fn sign_in(&self, user: &User) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create data directory {}: {}", parent.display(), e)
            })?;
        }
        let contents = serde_json::to_string_pretty(user)?;
        std::fs::write(&self.path, contents).map_err(|e| {
            anyhow::anyhow!("Failed to write session {}: {}", self.path.display(), e)
        })?;
        tracing::debug!(uid = %user.uid, path = %self.path.display(), "session written");
        Ok(())
    }
}

impl IdentityProvider for FileIdentityProvider {
    async fn sign_out(&self) -> mediadiary_core::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DiaryError::SignOut(format!(
                "Failed to remove session {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_then_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = FileIdentityProvider::new(dir.path().join("session.json"));
        assert!(provider.current_user().expect("read").is_none());

        provider
            .sign_in(&User::new("u1").with_display_name("Ada"))
            .expect("sign in");
        let user = provider.current_user().expect("read").expect("user");
        assert_eq!(user.uid, "u1");
        assert_eq!(user.display_name.as_deref(), Some("Ada"));

        provider.sign_out().await.expect("sign out");
        assert!(provider.current_user().expect("read").is_none());
    }

    #[tokio::test]
    async fn test_sign_out_failure_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        // a directory cannot be removed with remove_file
        let path = dir.path().join("session.json");
        std::fs::create_dir_all(&path).expect("mkdir");
        let provider = FileIdentityProvider::new(path);
        assert!(matches!(
            provider.sign_out().await,
            Err(DiaryError::SignOut(_))
        ));
    }
}
