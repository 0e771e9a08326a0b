//! Filesystem exporter
//!
//! Writes a rendered report body under a destination key below a root
//! directory. Remote object stores stay behind the same port.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use techdigest_domain::{ExportError, ReportExporter};

pub struct FsExporter {
    root: PathBuf,
}

impl FsExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ReportExporter for FsExporter {
    async fn export(&self, body: &str, key: &str) -> Result<(), ExportError> {
        let key_path = Path::new(key);
        // Keys are storage identifiers, not arbitrary paths.
        let escapes_root = key_path.is_absolute()
            || key_path
                .components()
                .any(|component| matches!(component, Component::ParentDir));
        if key.is_empty() || escapes_root {
            return Err(ExportError::Destination(format!("invalid key: {key}")));
        }

        let path = self.root.join(key_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, body).await?;

        tracing::info!(path = %path.display(), bytes = body.len(), "report exported");
        Ok(())
    }
}
