//! JSON file holding the current session between runs.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use tourhub_core::session::Session;
use tracing::warn;

use crate::Result;

#[derive(Debug, Clone)]
pub struct SessionFile {
  path: PathBuf,
}

impl SessionFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// Read the stored session. A missing file is `None`; an unreadable one is
  /// logged and treated as missing.
  pub async fn load(&self) -> Result<Option<Session>> {
    let bytes = match tokio::fs::read(&self.path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    match serde_json::from_slice(&bytes) {
      Ok(session) => Ok(Some(session)),
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
        Ok(None)
      }
    }
  }

  pub async fn save(&self, session: &Session) -> Result<()> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(session)?;
    tokio::fs::write(&self.path, json).await?;
    Ok(())
  }

  pub async fn clear(&self) -> Result<()> {
    match tokio::fs::remove_file(&self.path).await {
      Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use tourhub_core::identity::Identity;
  use uuid::Uuid;

  use super::*;

  fn session() -> Session {
    Session {
      access_token:  "access".into(),
      refresh_token: Some("refresh".into()),
      expires_at:    None,
      user:          Some(Identity::new(Uuid::new_v4(), "a@b.co")),
    }
  }

  #[tokio::test]
  async fn save_load_clear() {
    let dir = tempfile::tempdir().unwrap();
    let file = SessionFile::new(dir.path().join("nested").join("session.json"));

    assert_eq!(file.load().await.unwrap(), None);

    let session = session();
    file.save(&session).await.unwrap();
    assert_eq!(file.load().await.unwrap(), Some(session));

    file.clear().await.unwrap();
    assert_eq!(file.load().await.unwrap(), None);
    file.clear().await.unwrap();
  }

  #[tokio::test]
  async fn corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, b"{not json").await.unwrap();

    assert_eq!(SessionFile::new(path).load().await.unwrap(), None);
  }
}
