use crate::signals::{Signal, SignalHub};

use askdocs_client::{DocumentStore, UploadReceipt};
use askdocs_core::{Document, DocumentId, ProjectId, Result};
use std::path::Path;
use std::sync::Arc;

/// Document operations that announce their effect on a project
///
/// Every successful upload or delete publishes
/// [`Signal::DocumentsChanged`] so the conversation view re-opens its
/// conversation against the new document set.
#[derive(Clone)]
pub struct DocumentPanel {
    store: Arc<dyn DocumentStore>,
    signals: SignalHub,
}

impl DocumentPanel {
    pub fn new(store: Arc<dyn DocumentStore>, signals: SignalHub) -> Self {
        Self { store, signals }
    }

    pub async fn list(&self, project_id: &ProjectId) -> Result<Vec<Document>> {
        self.store.list_documents(project_id).await
    }

    pub async fn upload(&self, path: &Path, project_id: &ProjectId) -> Result<UploadReceipt> {
        let receipt = self.store.upload_document(path, project_id).await?;
        tracing::info!(project = %project_id, document = %receipt.id, "document uploaded");
        self.signals.publish(Signal::DocumentsChanged { project_id: project_id.clone() });
        Ok(receipt)
    }

    pub async fn delete(&self, id: &DocumentId, project_id: &ProjectId) -> Result<()> {
        self.store.delete_document(id).await?;
        tracing::info!(project = %project_id, document = %id, "document deleted");
        self.signals.publish(Signal::DocumentsChanged { project_id: project_id.clone() });
        Ok(())
    }
}
