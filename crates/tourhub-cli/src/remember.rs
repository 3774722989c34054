//! The "remember me" email hint kept between sign-ins.

use std::{io, path::PathBuf};

use tracing::debug;

/// Plain-text file holding the last email signed in with `--remember`.
pub struct RememberedEmail {
  path: PathBuf,
}

impl RememberedEmail {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub async fn load(&self) -> io::Result<Option<String>> {
    match tokio::fs::read_to_string(&self.path).await {
      Ok(raw) => {
        let email = raw.trim();
        Ok((!email.is_empty()).then(|| email.to_owned()))
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  pub async fn save(&self, email: &str) -> io::Result<()> {
    if let Some(parent) = self.path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&self.path, email).await?;
    debug!(path = %self.path.display(), "remembered email saved");
    Ok(())
  }

  pub async fn clear(&self) -> io::Result<()> {
    match tokio::fs::remove_file(&self.path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e),
    }
  }
}
