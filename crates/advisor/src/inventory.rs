//! Resource inventory port.
//!
//! The ingestion pipeline that collects billing rows and utilization
//! metrics lives outside this service; it publishes per-project resource
//! snapshots the analysis reads back. `ResourceStore` is the seam, and
//! `FileInventory` is the file-backed implementation the service ships
//! with: one JSON array per `<root>/<project_id>/<resource_type>.json`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::resources::{ResourceData, ResourceKind};

/// Errors from inventory access.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to read inventory file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid inventory file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of resource snapshots for a project.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Load all resources of `kind` for a project, in inventory order.
    /// A project with no snapshot yields an empty list.
    async fn load(
        &self,
        project_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceData>, InventoryError>;
}

/// File-backed inventory.
pub struct FileInventory {
    root: PathBuf,
}

impl FileInventory {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, project_id: &str, kind: ResourceKind) -> PathBuf {
        self.root
            .join(project_id)
            .join(format!("{}.json", kind.as_str()))
    }
}

#[async_trait]
impl ResourceStore for FileInventory {
    async fn load(
        &self,
        project_id: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceData>, InventoryError> {
        let path = self.snapshot_path(project_id, kind);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(project_id = %project_id, kind = %kind, "no inventory snapshot");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(InventoryError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| InventoryError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
