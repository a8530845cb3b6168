//! HttpBackendGateway - REST implementation of the backend contract.
//!
//! Every request reads the bearer token from identity storage at send time,
//! so a login or logout is picked up by the very next call.

use async_trait::async_trait;
use finchat_core::config::ClientConfig;
use finchat_core::error::{FinchatError, Result};
use finchat_core::gateway::{
    AuthResponse, BackendGateway, CategoryList, CategoryQuery, CategoryResponse, ChatRequest,
    ChatResponse, ConversationHistory, Credentials, DemoCredentials, DemoCredentialsResponse,
    DocumentSearchResponse, FileUpload, UploadedDocument,
};
use finchat_core::session::SessionInfo;
use finchat_infrastructure::IdentityStorage;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Gateway implementation that talks to the FAQ backend over HTTP.
#[derive(Clone)]
pub struct HttpBackendGateway {
    client: Client,
    base_url: String,
    identity: IdentityStorage,
}

impl HttpBackendGateway {
    /// Builds a gateway for `config.api_base_url` with the configured timeout.
    pub fn new(config: &ClientConfig, identity: IdentityStorage) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FinchatError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, &config.api_base_url, identity))
    }

    pub fn with_client(client: Client, base_url: &str, identity: IdentityStorage) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Attaches `Authorization: Bearer <token>` when a token is persisted.
    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.identity.token().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorized(builder)
            .await?
            .send()
            .await
            .map_err(|err| FinchatError::network(format!("Backend request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read backend error body".to_string());
            return Err(map_http_error(status, &body));
        }

        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.client.get(self.url(path))).await
    }
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        tracing::debug!("POST /auth/login for {}", credentials.email);
        self.send_json(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    async fn create_anonymous_session(&self) -> Result<AuthResponse> {
        self.send_json(self.client.post(self.url("/auth/anonymous")))
            .await
    }

    async fn get_session(&self) -> Result<SessionInfo> {
        self.get("/auth/session").await.map_err(|err| match err {
            FinchatError::Auth(message) => FinchatError::SessionExpired(message),
            FinchatError::Http { status, message } if is_rejection(status) => {
                FinchatError::SessionExpired(message)
            }
            other => other,
        })
    }

    async fn logout(&self) -> Result<()> {
        self.send(self.client.post(self.url("/auth/logout")))
            .await
            .map(|_| ())
    }

    async fn get_demo_credentials(&self) -> Result<Option<DemoCredentials>> {
        let raw: DemoCredentialsResponse = self.get("/auth/demo-credentials").await?;
        Ok(raw.normalize())
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.send_json(self.client.post(self.url("/chat/message")).json(request))
            .await
    }

    async fn get_conversation_history(&self, conversation_id: &str) -> Result<ConversationHistory> {
        self.get(&format!("/chat/conversation/{conversation_id}"))
            .await
    }

    async fn clear_conversation(&self, conversation_id: &str) -> Result<()> {
        let url = self.url(&format!("/chat/conversation/{conversation_id}"));
        self.send(self.client.delete(url)).await.map(|_| ())
    }

    async fn ask_by_category(&self, query: &CategoryQuery) -> Result<CategoryResponse> {
        self.send_json(
            self.client
                .post(self.url("/fintech/ask-by-category"))
                .json(query),
        )
        .await
    }

    async fn get_categories(&self) -> Result<CategoryList> {
        self.get("/fintech/categories").await
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedDocument> {
        let content_type = upload.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&upload.file_name)
                .first_or_octet_stream()
                .to_string()
        });

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&content_type)
            .map_err(|e| FinchatError::internal(format!("Invalid content type '{content_type}': {e}")))?;

        let mut form = Form::new().part("file", part);
        if let Some(title) = upload.title {
            form = form.text("title", title);
        }

        self.send_json(
            self.client
                .post(self.url("/documents/upload-file"))
                .multipart(form),
        )
        .await
    }

    async fn search_documents(&self, query: &str, top_k: usize) -> Result<DocumentSearchResponse> {
        let top_k = top_k.to_string();
        self.send_json(
            self.client
                .get(self.url("/documents/search"))
                .query(&[("query", query), ("top_k", top_k.as_str())]),
        )
        .await
    }

    async fn health_check(&self) -> Result<serde_json::Value> {
        self.get("/chat/health").await
    }
}

/// FastAPI-style error body (`{"detail": "..."}`), with `message` as fallback.
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            detail: Some(serde_json::Value::String(detail)),
            ..
        }) => detail,
        Ok(ErrorResponse {
            detail: Some(detail),
            ..
        }) => detail.to_string(),
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => message,
        _ => body.to_string(),
    }
}

fn map_http_error(status: StatusCode, body: &str) -> FinchatError {
    let message = error_message(body);
    if status == StatusCode::UNAUTHORIZED {
        FinchatError::Auth(message)
    } else {
        FinchatError::http(status.as_u16(), message)
    }
}

/// Statuses with which the session endpoint rejects a token.
fn is_rejection(status: u16) -> bool {
    matches!(status, 401 | 403 | 404)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
