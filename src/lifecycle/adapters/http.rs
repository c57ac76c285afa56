//! `reqwest` implementation of the remote task API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::association::domain::ResourceId;
use crate::config::ClientConfig;
use crate::lifecycle::{
    domain::{RemoteTask, ResourceKind, TaskId},
    ports::{RemoteApi, RemoteApiError, RemoteApiResult, SubmitRequest},
};

/// Header carrying the account API key (`X-Api-Key`).
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the API secret key (`X-Api-Secret-Key`).
pub const SECRET_KEY_HEADER: &str = "x-api-secret-key";

/// `GET /tasks/` answers either with a bare array or wrapped in `tasks`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskList {
    Wrapped { tasks: Vec<RemoteTask> },
    Bare(Vec<RemoteTask>),
}

/// HTTP client for the task-tracking REST API.
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: Client,
    base_url: String,
}

impl HttpRemoteApi {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Transport`] when the credentials are not
    /// valid header values or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> RemoteApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            secret_header(config.api_key())?,
        );
        headers.insert(
            HeaderName::from_static(SECRET_KEY_HEADER),
            secret_header(config.secret_key())?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent())
            .timeout(config.request_timeout())
            .build()
            .map_err(RemoteApiError::transport)?;
        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_owned(),
        })
    }

    /// Returns the base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> RemoteApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "sending request");
        let mut request = self.client.request(method.clone(), &url);
        if let Some(payload) = body {
            request = request.json(payload);
        }
        let response = request.send().await.map_err(RemoteApiError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            return Err(RemoteApiError::status(
                method.as_str(),
                path,
                status.as_u16(),
                body,
            ));
        }
        let bytes = response.bytes().await.map_err(RemoteApiError::transport)?;
        serde_json::from_slice(&bytes).map_err(RemoteApiError::decode)
    }
}

/// Body of an error response, or a note saying it could not be read.
fn error_body<E: std::fmt::Display>(read: Result<String, E>) -> String {
    read.unwrap_or_else(|err| {
        debug!(error = %err, "failed to read error response body");
        format!("<unreadable response body: {err}>")
    })
}

fn secret_header(value: &str) -> RemoteApiResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(RemoteApiError::transport)?;
    header.set_sensitive(true);
    Ok(header)
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn get_task(&self, task_id: &TaskId) -> RemoteApiResult<RemoteTask> {
        self.send(Method::GET, &format!("/tasks/{task_id}"), None)
            .await
    }

    async fn list_tasks(&self) -> RemoteApiResult<Vec<RemoteTask>> {
        let list: TaskList = self.send(Method::GET, "/tasks/", None).await?;
        Ok(match list {
            TaskList::Wrapped { tasks } | TaskList::Bare(tasks) => tasks,
        })
    }

    async fn submit(&self, request: &SubmitRequest) -> RemoteApiResult<RemoteTask> {
        let kind = request.kind();
        match request {
            SubmitRequest::Create { body, .. } => {
                self.send(Method::POST, kind.collection_path(), Some(body))
                    .await
            }
            SubmitRequest::Update {
                resource_id, body, ..
            } => {
                self.send(Method::PUT, &kind.instance_path(*resource_id), Some(body))
                    .await
            }
            SubmitRequest::Delete { resource_id, .. } => {
                self.send(Method::DELETE, &kind.instance_path(*resource_id), None)
                    .await
            }
        }
    }

    async fn fetch_resource(
        &self,
        kind: &ResourceKind,
        resource_id: ResourceId,
    ) -> RemoteApiResult<Value> {
        self.send(Method::GET, &kind.instance_path(resource_id), None)
            .await
    }
}
