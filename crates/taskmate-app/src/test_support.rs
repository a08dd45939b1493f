use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taskmate_core::id::{FriendId, TaskId, UserId};
use taskmate_core::validate::Field;
use taskmate_core::{NewTask, Priority, Task, TaskPatch};
use time::Date;
use tokio::sync::Barrier;

use crate::error::ServiceError;
use crate::service::{Friend, TaskService};
use crate::sharing::ShareWorkflow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListTasks(UserId),
    ListShared(UserId),
    Create { user: UserId, task: NewTask },
    Update { task: TaskId, patch: TaskPatch },
    Delete(TaskId),
    Share { task: TaskId, friend: FriendId },
    ListFriends(UserId),
}

#[derive(Clone, Default)]
pub struct MockService {
    inner: Arc<Mutex<MockServiceInner>>,
}

#[derive(Default)]
struct MockServiceInner {
    own: Vec<Task>,
    shared: Vec<Task>,
    friends: Vec<Friend>,
    calls: Vec<Call>,
    next_id: u64,
    fail_list: Option<String>,
    fail_shared: Option<String>,
    fail_create: Option<String>,
    fail_update: Option<String>,
    fail_delete: Option<String>,
    fail_friends: Option<String>,
    fail_share: HashMap<FriendId, String>,
    list_barrier: Option<Arc<Barrier>>,
    share_barrier: Option<Arc<Barrier>>,
}

fn server_error(message: &str) -> ServiceError {
    ServiceError::Server {
        status: 500,
        message: message.to_owned(),
    }
}

fn check(failure: Option<&String>) -> Result<(), ServiceError> {
    failure.map_or(Ok(()), |message| Err(server_error(message)))
}

/// Blocks until every party of the barrier has arrived.
async fn rendezvous(barrier: Option<&Barrier>) {
    if let Some(barrier) = barrier {
        barrier.wait().await;
    }
}

impl MockService {
    pub fn with_tasks(own: Vec<Task>, shared: Vec<Task>) -> Self {
        let service = Self::default();
        {
            let mut inner = service.guard();
            inner.own = own;
            inner.shared = shared;
        }
        service
    }

    pub fn set_friends(&self, friends: Vec<Friend>) {
        self.guard().friends = friends;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.guard().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.guard().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.guard().calls.iter().filter(|call| pred(call)).count()
    }

    pub fn fail_list(&self, message: &str) {
        self.guard().fail_list = Some(message.to_owned());
    }

    pub fn fail_shared(&self, message: &str) {
        self.guard().fail_shared = Some(message.to_owned());
    }

    pub fn fail_create(&self, message: &str) {
        self.guard().fail_create = Some(message.to_owned());
    }

    pub fn fail_update(&self, message: &str) {
        self.guard().fail_update = Some(message.to_owned());
    }

    pub fn fail_delete(&self, message: &str) {
        self.guard().fail_delete = Some(message.to_owned());
    }

    pub fn fail_friends(&self, message: &str) {
        self.guard().fail_friends = Some(message.to_owned());
    }

    pub fn fail_share(&self, friend: FriendId, message: &str) {
        self.guard().fail_share.insert(friend, message.to_owned());
    }

    /// Own and shared list reads only complete once `parties` of them are in flight.
    pub fn gate_lists(&self, parties: usize) {
        self.guard().list_barrier = Some(Arc::new(Barrier::new(parties)));
    }

    /// Share requests only complete once `parties` of them are in flight.
    pub fn gate_shares(&self, parties: usize) {
        self.guard().share_barrier = Some(Arc::new(Barrier::new(parties)));
    }

    fn guard(&self) -> MutexGuard<'_, MockServiceInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskService for MockService {
    async fn list_tasks(&self, user: &UserId) -> Result<Vec<Task>, ServiceError> {
        let (result, barrier) = {
            let mut inner = self.guard();
            inner.calls.push(Call::ListTasks(user.clone()));
            let result = check(inner.fail_list.as_ref()).map(|()| inner.own.clone());
            (result, inner.list_barrier.clone())
        };
        rendezvous(barrier.as_deref()).await;
        result
    }

    async fn list_shared_tasks(&self, user: &UserId) -> Result<Vec<Task>, ServiceError> {
        let (result, barrier) = {
            let mut inner = self.guard();
            inner.calls.push(Call::ListShared(user.clone()));
            let result = check(inner.fail_shared.as_ref()).map(|()| inner.shared.clone());
            (result, inner.list_barrier.clone())
        };
        rendezvous(barrier.as_deref()).await;
        result
    }

    async fn create_task(&self, user: &UserId, task: &NewTask) -> Result<TaskId, ServiceError> {
        let mut inner = self.guard();
        inner.calls.push(Call::Create {
            user: user.clone(),
            task: task.clone(),
        });
        check(inner.fail_create.as_ref())?;
        inner.next_id += 1;
        let id = TaskId::from_number(1000 + inner.next_id);
        inner.own.push(Task {
            id: id.clone(),
            name: task.name.clone(),
            date: task.date,
            time: task.time,
            priority: task.priority,
            workload: task.workload.to_string(),
            completed: false,
            owner_username: None,
        });
        Ok(id)
    }

    async fn update_task(&self, task: &TaskId, patch: &TaskPatch) -> Result<(), ServiceError> {
        let mut inner = self.guard();
        inner.calls.push(Call::Update {
            task: task.clone(),
            patch: patch.clone(),
        });
        check(inner.fail_update.as_ref())?;
        let inner = &mut *inner;
        let found = inner
            .own
            .iter_mut()
            .chain(inner.shared.iter_mut())
            .find(|t| &t.id == task)
            .ok_or_else(|| ServiceError::Server {
                status: 404,
                message: "Task not found".to_owned(),
            })?;
        if let Some(completed) = patch.completed {
            found.completed = completed;
        }
        Ok(())
    }

    async fn delete_task(&self, task: &TaskId) -> Result<(), ServiceError> {
        let mut inner = self.guard();
        inner.calls.push(Call::Delete(task.clone()));
        check(inner.fail_delete.as_ref())?;
        inner.own.retain(|t| &t.id != task);
        Ok(())
    }

    async fn share_task(&self, task: &TaskId, friend: &FriendId) -> Result<(), ServiceError> {
        let (result, barrier) = {
            let mut inner = self.guard();
            inner.calls.push(Call::Share {
                task: task.clone(),
                friend: friend.clone(),
            });
            (check(inner.fail_share.get(friend)), inner.share_barrier.clone())
        };
        rendezvous(barrier.as_deref()).await;
        result
    }

    async fn list_friends(&self, user: &UserId) -> Result<Vec<Friend>, ServiceError> {
        let mut inner = self.guard();
        inner.calls.push(Call::ListFriends(user.clone()));
        check(inner.fail_friends.as_ref())?;
        Ok(inner.friends.clone())
    }
}

pub fn task(id: u64, name: &str, date: Date, priority: Priority) -> Task {
    Task {
        id: TaskId::from_number(id),
        name: name.to_owned(),
        date,
        time: None,
        priority,
        workload: "1hr".to_owned(),
        completed: false,
        owner_username: None,
    }
}

pub fn shared_task(id: u64, name: &str, date: Date, owner: &str) -> Task {
    Task {
        owner_username: Some(owner.to_owned()),
        ..task(id, name, date, Priority::Medium)
    }
}

pub fn fill_valid(workflow: &mut ShareWorkflow) {
    workflow.edit(Field::Name, "New Task");
    workflow.edit(Field::Date, "2025-12-31");
    workflow.edit(Field::Time, "14:30");
    workflow.edit(Field::Priority, "High");
    workflow.edit(Field::Workload, "2hr 30min");
}
