//! HTTP implementation of [`NotesApi`] on top of reqwest.

use super::NotesApi;
use crate::config::USER_AGENT;
use crate::error::{AppError, Result};
use crate::models::{
    ApiErrorBody, LoginRequest, Note, NoteDraft, NoteUpdate, RegisterRequest, User,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

/// REST client for the notes backend
#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client for the backend at `base_url` (e.g. "http://localhost:5000")
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Self::with_client(base_url, client)
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| AppError::Generic(format!("Invalid API base URL {:?}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Generic(format!(
                "API base URL cannot have paths appended: {}",
                base_url
            )));
        }

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str], token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(segments));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and turn any non-success status into `AppError::Api`
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|body| body.message);

        tracing::warn!("Backend returned status {}: {:?}", status, message);

        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl NotesApi for HttpClient {
    async fn register(&self, req: &RegisterRequest) -> Result<User> {
        let request = self.request(Method::POST, &["api", "auth"], None).json(req);
        self.send_json(request).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<User> {
        let request = self
            .request(Method::POST, &["api", "auth", "login"], None)
            .json(req);
        self.send_json(request).await
    }

    async fn list_notes(&self, token: Option<&str>) -> Result<Vec<Note>> {
        let request = self.request(Method::GET, &["api", "note"], token);
        self.send_json(request).await
    }

    async fn get_note(&self, token: Option<&str>, id: &str) -> Result<Note> {
        let request = self.request(Method::GET, &["api", "note", id], token);
        self.send_json(request).await
    }

    async fn create_note(&self, token: Option<&str>, draft: &NoteDraft) -> Result<Note> {
        let request = self
            .request(Method::POST, &["api", "note"], token)
            .json(draft);
        self.send_json(request).await
    }

    async fn update_note(&self, token: Option<&str>, update: &NoteUpdate) -> Result<Note> {
        let request = self
            .request(Method::PUT, &["api", "note", &update.id], token)
            .json(update);
        self.send_json(request).await
    }

    async fn delete_note(&self, token: Option<&str>, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, &["api", "note", id], token);
        // Body is ignored; the caller already knows the id.
        self.send(request).await?;
        Ok(())
    }
}
