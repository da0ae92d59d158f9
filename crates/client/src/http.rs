use crate::api::{DocumentStore, MessageExchange, ProjectDirectory, UploadReceipt};

use askdocs_core::{
    BackendConfig, ConversationId, ConversationSnapshot, Document, DocumentId, Error, Project, ProjectId,
    ProjectPatch, Reply, Result,
};
use reqwest::{Client as HttpClient, Response, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// REST client for the AskDocs backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: HttpClient,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::Http(format!("failed to build http client: {}", e)))?;

        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = reqwest::Url::parse_with_params(&self.url(path), query)
            .map_err(|e| Error::Config(format!("invalid backend url: {}", e)))?;
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {} failed: {}", url, e)))?;
        decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self, method: reqwest::Method, path: &str, body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(%url, %method, "request");
        let response = self
            .client
            .request(method.clone(), &url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(format!("{} {} failed: {}", method, url, e)))?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        tracing::debug!(%url, "DELETE");
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("DELETE {} failed: {}", url, e)))?;
        ensure_success(response).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl ProjectDirectory for HttpBackend {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get("projects/", &[]).await
    }

    async fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        let body = serde_json::json!({ "name": name, "description": description });
        self.send_json(reqwest::Method::POST, "projects/", &body).await
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        self.delete(&format!("projects/{}/", id)).await
    }

    async fn update_project(&self, id: &ProjectId, patch: &ProjectPatch) -> Result<Project> {
        self.send_json(reqwest::Method::PATCH, &format!("projects/{}/", id), patch)
            .await
    }
}

#[async_trait::async_trait]
impl DocumentStore for HttpBackend {
    async fn list_documents(&self, project_id: &ProjectId) -> Result<Vec<Document>> {
        self.get("documents/", &[("project_id", project_id.as_str())]).await
    }

    async fn upload_document(&self, path: &Path, project_id: &ProjectId) -> Result<UploadReceipt> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Validation(format!("not a file: {}", path.display())))?;

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new()
            .part("file", part)
            .text("project_id", project_id.to_string());

        let url = self.url("documents/upload/");
        tracing::info!(%url, file = %path.display(), project = %project_id, "uploading document");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Http(format!("POST {} failed: {}", url, e)))?;
        decode(response).await
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<()> {
        self.delete(&format!("documents/{}/delete/", id)).await
    }
}

#[async_trait::async_trait]
impl MessageExchange for HttpBackend {
    async fn open_conversation(&self, project_id: &ProjectId) -> Result<ConversationSnapshot> {
        let body = serde_json::json!({ "project_id": project_id });
        self.send_json(reqwest::Method::POST, "conversations/", &body).await
    }

    async fn send_message(&self, conversation_id: &ConversationId, text: &str) -> Result<Reply> {
        let body = serde_json::json!({ "text": text });
        self.send_json(
            reqwest::Method::POST,
            &format!("conversations/{}/message/", conversation_id),
            &body,
        )
        .await
    }
}

async fn ensure_success(response: Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("failed to read response body: {}", e)))?;

    if !status.is_success() {
        let detail = error_detail(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        tracing::warn!(status = status.as_u16(), %detail, "backend rejected request");
        return Err(Error::backend(status.as_u16(), detail));
    }

    Ok(body)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = ensure_success(response).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, "unexpected response payload");
        Error::Parse(format!("unexpected response payload: {}", e))
    })
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers `{"detail": "..."}` for handled errors and a map of
/// field errors for validation failures.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
        return Some(detail.to_string());
    }

    let object = value.as_object()?;
    let fields: Vec<String> = object
        .iter()
        .map(|(field, errors)| match errors {
            serde_json::Value::Array(items) => {
                let joined: Vec<&str> = items.iter().filter_map(|i| i.as_str()).collect();
                format!("{}: {}", field, joined.join(", "))
            }
            other => format!("{}: {}", field, other),
        })
        .collect();

    if fields.is_empty() { None } else { Some(fields.join("; ")) }
}
