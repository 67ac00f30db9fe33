//! HttpBackend - reqwest client for the verification service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::{BackendTaskId, ClientError, UploadFile, VerificationResult};
use crate::ports::{Backend, HealthReport, StatusReport, UploadReceipt};

pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("claimcheck/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ClientError> {
        debug!(%url, "backend request");
        let response = request.send().await.map_err(|e| ClientError::Transport {
            url: url.to_string(),
            message: if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            },
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T, ClientError> {
        self.send(request, url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("{url}: {e}")))
    }
}

/// Pull the human-readable message out of an error body.
///
/// FastAPI-style bodies carry it in `detail`; anything else is used verbatim.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt, ClientError> {
        let url = self.url("/upload");
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                message: format!("invalid mime type {:?}: {e}", file.mime_type),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.json(self.client.post(&url).multipart(form), &url).await
    }

    async fn status(&self, id: &BackendTaskId) -> Result<StatusReport, ClientError> {
        let url = self.url(&format!("/status/{id}"));
        self.json(self.client.get(&url), &url).await
    }

    async fn result(&self, id: &BackendTaskId) -> Result<VerificationResult, ClientError> {
        let url = self.url(&format!("/result/{id}"));
        let raw: Value = self.json(self.client.get(&url), &url).await?;
        Ok(VerificationResult::from_json(raw))
    }

    async fn retry(&self, id: &BackendTaskId) -> Result<(), ClientError> {
        let url = self.url(&format!("/retry/{id}"));
        self.send(self.client.post(&url), &url).await?;
        Ok(())
    }

    async fn delete_task(&self, id: &BackendTaskId) -> Result<(), ClientError> {
        let url = self.url(&format!("/task/{id}"));
        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    async fn file(&self, id: &BackendTaskId) -> Result<Vec<u8>, ClientError> {
        let url = self.url(&format!("/file/{id}"));
        let response = match self.send(self.client.get(&url), &url).await {
            Ok(r) => r,
            Err(ClientError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                return Err(ClientError::FileUnavailable);
            }
            Err(e) => return Err(e),
        };
        let bytes = response.bytes().await.map_err(|e| ClientError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    async fn health(&self) -> Result<HealthReport, ClientError> {
        let url = self.url("/health");
        self.json(self.client.get(&url), &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decision, RemoteStatus};
    use axum::extract::{Multipart, Path};
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn upload_handler(mut multipart: Multipart) -> Result<Json<Value>, (AxumStatus, Json<Value>)> {
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("file") {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap_or_default();
                if !name.ends_with(".pdf") {
                    return Err((
                        AxumStatus::BAD_REQUEST,
                        Json(json!({"detail": format!("File type of {name} not allowed")})),
                    ));
                }
                return Ok(Json(json!({
                    "task_id": format!("srv-{}-{}", bytes.len(), content_type.replace('/', "_")),
                    "status": "pending",
                    "message": format!("File {name} queued for processing")
                })));
            }
        }
        Err((AxumStatus::BAD_REQUEST, Json(json!({"detail": "no file"}))))
    }

    async fn status_handler(Path(id): Path<String>) -> Result<Json<Value>, (AxumStatus, Json<Value>)> {
        if id == "missing" {
            return Err((AxumStatus::NOT_FOUND, Json(json!({"detail": "Task not found"}))));
        }
        Ok(Json(json!({
            "task_id": id,
            "status": "processing",
            "progress": 60,
            "stage": "Validating metadata",
            "created_at": "2026-01-01T12:00:00"
        })))
    }

    async fn file_handler(Path(id): Path<String>) -> Result<Vec<u8>, AxumStatus> {
        if id == "gone" {
            Err(AxumStatus::NOT_FOUND)
        } else {
            Ok(b"%PDF-1.7 original".to_vec())
        }
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/upload", post(upload_handler))
            .route("/status/{id}", get(status_handler))
            .route(
                "/result/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(json!({"task_id": id, "decision": "ACCEPT", "confidence": 0.91}))
                }),
            )
            .route("/retry/{id}", post(|| async { Json(json!({"status": "pending"})) }))
            .route("/task/{id}", delete(|| async { Json(json!({"message": "Task deleted"})) }))
            .route("/file/{id}", get(file_handler))
            .route(
                "/health",
                get(|| async {
                    Json(json!({
                        "status": "healthy",
                        "tasks_count": 3,
                        "tasks_by_status": {"completed": 2, "error": 1}
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    async fn backend() -> HttpBackend {
        HttpBackend::new(&spawn_server().await, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn error_detail_prefers_fastapi_detail() {
        assert_eq!(error_detail(r#"{"detail":"Task not found"}"#), "Task not found");
        assert_eq!(error_detail("  plain text\n"), "plain text");
        assert_eq!(error_detail(r#"{"other":1}"#), r#"{"other":1}"#);
    }

    #[tokio::test]
    async fn trailing_slash_is_trimmed_from_base_url() {
        let b = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(b.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn upload_sends_multipart_file_field() {
        let backend = backend().await;
        let receipt = backend
            .upload(&UploadFile::new("claim.pdf", b"12345".to_vec()))
            .await
            .unwrap();
        assert_eq!(receipt.task_id, BackendTaskId::new("srv-5-application_pdf"));
        assert_eq!(receipt.message.as_deref(), Some("File claim.pdf queued for processing"));
    }

    #[tokio::test]
    async fn upload_rejection_surfaces_backend_detail() {
        let backend = backend().await;
        let err = backend
            .upload(&UploadFile::new("photo.png", vec![1]))
            .await
            .unwrap_err();
        match err {
            ClientError::Status { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "File type of photo.png not allowed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn status_and_result_are_decoded() {
        let backend = backend().await;
        let status = backend.status(&BackendTaskId::new("t-1")).await.unwrap();
        assert_eq!(status.status, RemoteStatus::Processing);
        assert_eq!(status.progress_percent(), Some(60));

        let result = backend.result(&BackendTaskId::new("t-1")).await.unwrap();
        assert_eq!(result.decision, Some(Decision::Accept));
        assert_eq!(result.raw()["task_id"], "t-1");
    }

    #[tokio::test]
    async fn unknown_task_status_is_a_status_error() {
        let backend = backend().await;
        let err = backend.status(&BackendTaskId::new("missing")).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
        assert_eq!(err.task_message(), "Task not found");
    }

    #[tokio::test]
    async fn retry_delete_and_health() {
        let backend = backend().await;
        backend.retry(&BackendTaskId::new("t-1")).await.unwrap();
        backend.delete_task(&BackendTaskId::new("t-1")).await.unwrap();

        let health = backend.health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.tasks_count, Some(3));
        assert_eq!(health.tasks_by_status.get("error"), Some(&1));
    }

    #[tokio::test]
    async fn missing_original_file_is_file_unavailable() {
        let backend = backend().await;
        let bytes = backend.file(&BackendTaskId::new("t-1")).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.7 original");

        let err = backend.file(&BackendTaskId::new("gone")).await.unwrap_err();
        assert!(matches!(err, ClientError::FileUnavailable));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = backend.health().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
