//! Task service contract consumed by the store and the sharing workflow.

use serde::{Deserialize, Serialize};
use taskmate_core::id::{FriendId, TaskId, UserId};
use taskmate_core::{NewTask, Task, TaskPatch};

use crate::error::ServiceError;

/// Friend entry used to populate the share-target selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// Identifier passed to share requests.
    pub id: FriendId,
    /// Display name.
    pub username: String,
}

/// Remote task service.
///
/// Every call is a single request; callers decide how failures surface.
#[allow(async_fn_in_trait)]
pub trait TaskService {
    /// Tasks owned by `user`.
    ///
    /// # Errors
    /// Returns a [`ServiceError`] when the request fails.
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, ServiceError>;

    /// Tasks other users shared with `user`, with `owner_username` set.
    ///
    /// # Errors
    /// Returns a [`ServiceError`] when the request fails.
    async fn list_shared_tasks(&self, user: &UserId) -> Result<Vec<Task>, ServiceError>;

    /// Create a task owned by `user` and return its assigned id.
    ///
    /// # Errors
    /// Returns a [`ServiceError`] when the request fails.
    async fn create_task(&self, user: &UserId, task: &NewTask) -> Result<TaskId, ServiceError>;

    /// Apply a partial update.
    ///
    /// # Errors
    /// Returns a [`ServiceError`] when the request fails.
    async fn update_task(&self, task: &TaskId, patch: &TaskPatch) -> Result<(), ServiceError>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns a [`ServiceError`] when the request fails.
    async fn delete_task(&self, task: &TaskId) -> Result<(), ServiceError>;

    /// Give one friend visibility into a task.
    ///
    /// # Errors
    /// Returns a [`ServiceError`] when the request fails.
    async fn share_task(&self, task: &TaskId, friend: &FriendId) -> Result<(), ServiceError>;

    /// Friends of `user`.
    ///
    /// # Errors
    /// Returns a [`ServiceError`] when the request fails.
    async fn list_friends(&self, user: &UserId) -> Result<Vec<Friend>, ServiceError>;
}
