//! JSON-over-HTTP implementation of [`TaskService`].

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use taskmate_core::id::{FriendId, TaskId, UserId};
use taskmate_core::{NewTask, Task, TaskPatch};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ServiceError;
use crate::service::{Friend, TaskService};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct CreatedTask {
    id: TaskId,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareRequest<'a> {
    task_id: &'a TaskId,
    friend_id: &'a FriendId,
}

/// Task service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTaskService {
    client: Client,
    base_url: Url,
}

impl HttpTaskService {
    /// Use an existing client against `base_url`.
    ///
    /// # Errors
    /// Returns [`ServiceError::Url`] when the URL is malformed or cannot take a path.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url).map_err(|e| ServiceError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::Url(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    /// Build a client from configuration (base URL and request timeout).
    ///
    /// # Errors
    /// Returns an error when the URL is invalid or the client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_client(client, &config.api_url)
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!(%method, %url, "task service request");
        self.client.request(method, url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "task service unreachable");
            ServiceError::from(err)
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) if !error.trim().is_empty() => ServiceError::Server {
                status: status.as_u16(),
                message: error,
            },
            _ => ServiceError::Status {
                status: status.as_u16(),
            },
        };
        warn!(status = status.as_u16(), error = %err, "task service rejected request");
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

impl TaskService for HttpTaskService {
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, ServiceError> {
        let user = user.to_string();
        self.fetch(self.request(Method::GET, &["tasks", user.as_str()])).await
    }

    async fn list_shared_tasks(&self, user: &UserId) -> Result<Vec<Task>, ServiceError> {
        let user = user.to_string();
        self.fetch(self.request(Method::GET, &["tasks", "shared", user.as_str()]))
            .await
    }

    async fn create_task(&self, user: &UserId, task: &NewTask) -> Result<TaskId, ServiceError> {
        let user = user.to_string();
        let created: CreatedTask = self
            .fetch(self.request(Method::POST, &["tasks", user.as_str()]).json(task))
            .await?;
        Ok(created.id)
    }

    async fn update_task(&self, task: &TaskId, patch: &TaskPatch) -> Result<(), ServiceError> {
        let task = task.to_string();
        self.send(self.request(Method::PUT, &["tasks", task.as_str()]).json(patch))
            .await?;
        Ok(())
    }

    async fn delete_task(&self, task: &TaskId) -> Result<(), ServiceError> {
        let task = task.to_string();
        self.send(self.request(Method::DELETE, &["tasks", task.as_str()]))
            .await?;
        Ok(())
    }

    async fn share_task(&self, task: &TaskId, friend: &FriendId) -> Result<(), ServiceError> {
        let body = ShareRequest {
            task_id: task,
            friend_id: friend,
        };
        self.send(self.request(Method::POST, &["tasks", "share"]).json(&body))
            .await?;
        Ok(())
    }

    async fn list_friends(&self, user: &UserId) -> Result<Vec<Friend>, ServiceError> {
        let user = user.to_string();
        self.fetch(self.request(Method::GET, &["friends", user.as_str()])).await
    }
}
