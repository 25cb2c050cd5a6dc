use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Flat JSON snapshot files under one root directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root_dir: PathBuf,
}

impl JsonStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root_dir.join(file_name)
    }

    /// Parsed file contents, or `None` when the file does not exist.
    pub async fn read<T: DeserializeOwned>(&self, file_name: &str) -> Result<Option<T>> {
        let path = self.path(file_name);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    pub async fn read_or_default<T: DeserializeOwned + Default>(&self, file_name: &str) -> Result<T> {
        Ok(self.read(file_name).await?.unwrap_or_default())
    }

    /// Pretty-print `value` to a sibling temp file, then rename it into place.
    pub async fn write<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.root_dir.display()))?;

        let path = self.path(file_name);
        let tmp = temp_path(&path);
        let body = serde_json::to_vec_pretty(value)?;

        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        info!("Saved {}", path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
