//! In-memory simulation of the remote task API.
//!
//! Submissions create `received` tasks. Each fetch of an unfinished task
//! moves it to `processing-in-progress`; tasks finish either when the test
//! calls [`InMemoryRemoteApi::complete`] / [`InMemoryRemoteApi::fail`] or,
//! with [`InMemoryRemoteApi::with_auto_complete`], after a number of fetches.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::association::domain::ResourceId;
use crate::lifecycle::{
    domain::{
        CommandType, Operation, RemoteTask, ResourceKind, TaskId, TaskResponse, TaskStatus,
    },
    ports::{RemoteApi, RemoteApiError, RemoteApiResult, SubmitRequest},
};

const FIRST_RESOURCE_ID: u64 = 1;

#[derive(Debug)]
struct SimulatedTask {
    task: RemoteTask,
    request: Option<SubmitRequest>,
    polls: u32,
}

#[derive(Debug)]
struct SimulatedState {
    tasks: Vec<SimulatedTask>,
    resources: BTreeMap<(String, ResourceId), Value>,
    next_resource_id: u64,
    auto_complete_after: Option<u32>,
    submissions: usize,
}

impl Default for SimulatedState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            resources: BTreeMap::new(),
            next_resource_id: FIRST_RESOURCE_ID,
            auto_complete_after: None,
            submissions: 0,
        }
    }
}

/// Thread-safe simulated task API for tests and local development.
pub struct InMemoryRemoteApi<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<Mutex<SimulatedState>>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryRemoteApi<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl Default for InMemoryRemoteApi<DefaultClock> {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl<C> std::fmt::Debug for InMemoryRemoteApi<C>
where
    C: Clock + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRemoteApi").finish_non_exhaustive()
    }
}

fn lock_error(err: impl std::fmt::Display) -> RemoteApiError {
    RemoteApiError::transport(std::io::Error::other(err.to_string()))
}

fn not_found(method: &str, path: &str) -> RemoteApiError {
    RemoteApiError::status(method, path, 404, "")
}

fn fresh_task_id() -> TaskId {
    TaskId::from_uuid(Uuid::new_v4())
}

impl<C> InMemoryRemoteApi<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty simulated API stamping tasks with `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            state: Arc::default(),
            clock,
        }
    }

    /// Finishes every submitted task successfully on its `polls`-th fetch.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Transport`] when the state lock is poisoned.
    pub fn with_auto_complete(self, polls: u32) -> RemoteApiResult<Self> {
        self.lock()?.auto_complete_after = Some(polls.max(1));
        Ok(self)
    }

    /// Sets the id the next created resource receives.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Transport`] when the state lock is poisoned.
    pub fn with_next_resource_id(self, resource_id: ResourceId) -> RemoteApiResult<Self> {
        self.lock()?.next_resource_id = resource_id.get();
        Ok(self)
    }

    fn lock(&self) -> RemoteApiResult<MutexGuard<'_, SimulatedState>> {
        self.state.lock().map_err(lock_error)
    }

    /// Adds a task to the history as-is.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Transport`] when the state lock is poisoned.
    pub fn seed_task(&self, task: RemoteTask) -> RemoteApiResult<()> {
        self.lock()?.tasks.push(SimulatedTask {
            task,
            request: None,
            polls: 0,
        });
        Ok(())
    }

    /// Stores a resource representation.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Transport`] when the state lock is poisoned.
    pub fn seed_resource(
        &self,
        kind: &ResourceKind,
        resource_id: ResourceId,
        resource: Value,
    ) -> RemoteApiResult<()> {
        self.lock()?
            .resources
            .insert((kind.collection_path().to_owned(), resource_id), resource);
        Ok(())
    }

    /// Returns the current state of a task.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Transport`] when the state lock is poisoned.
    pub fn task(&self, task_id: &TaskId) -> RemoteApiResult<Option<RemoteTask>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .find(|entry| entry.task.task_id() == task_id)
            .map(|entry| entry.task.clone()))
    }

    /// Returns how many requests were submitted.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError::Transport`] when the state lock is poisoned.
    pub fn submissions(&self) -> RemoteApiResult<usize> {
        Ok(self.lock()?.submissions)
    }

    /// Finishes a task successfully, applying its request.
    ///
    /// Returns the resource id the task reports, if any.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`RemoteApiError::Status`] for unknown tasks.
    pub fn complete(&self, task_id: &TaskId) -> RemoteApiResult<Option<ResourceId>> {
        let timestamp = self.clock.utc();
        let mut state = self.lock()?;
        let index = position(&state, task_id)?;
        Ok(finish(&mut state, index, timestamp))
    }

    /// Finishes a task with `processing-error` and the given detail.
    ///
    /// # Errors
    ///
    /// Returns a 404 [`RemoteApiError::Status`] for unknown tasks.
    pub fn fail(&self, task_id: &TaskId, detail: Value) -> RemoteApiResult<()> {
        let timestamp = self.clock.utc();
        let mut state = self.lock()?;
        let index = position(&state, task_id)?;
        if let Some(entry) = state.tasks.get_mut(index) {
            entry.task = entry
                .task
                .clone()
                .with_status(TaskStatus::ProcessingError)
                .with_timestamp(timestamp)
                .with_response(TaskResponse::with_error(detail));
        }
        Ok(())
    }
}

fn position(state: &SimulatedState, task_id: &TaskId) -> RemoteApiResult<usize> {
    state
        .tasks
        .iter()
        .position(|entry| entry.task.task_id() == task_id)
        .ok_or_else(|| not_found("GET", &format!("/tasks/{task_id}")))
}

/// Applies the request behind a task and marks it completed. Finished tasks
/// are left untouched.
fn finish(
    state: &mut SimulatedState,
    index: usize,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> Option<ResourceId> {
    let entry = state.tasks.get(index)?;
    if entry.task.status().is_terminal() {
        return entry.task.resource_id();
    }
    let request = entry.request.clone();
    let resource_id = match request {
        Some(SubmitRequest::Create { kind, body }) => {
            let allocated = ResourceId::new(state.next_resource_id);
            state.next_resource_id = state.next_resource_id.saturating_add(1);
            if let Some(resource_id) = allocated {
                state.resources.insert(
                    (kind.collection_path().to_owned(), resource_id),
                    with_id(body, resource_id),
                );
            }
            allocated
        }
        Some(SubmitRequest::Update {
            kind,
            resource_id,
            body,
        }) => {
            state.resources.insert(
                (kind.collection_path().to_owned(), resource_id),
                with_id(body, resource_id),
            );
            Some(resource_id)
        }
        Some(SubmitRequest::Delete { kind, resource_id }) => {
            state
                .resources
                .remove(&(kind.collection_path().to_owned(), resource_id));
            Some(resource_id)
        }
        None => None,
    };
    if let Some(entry) = state.tasks.get_mut(index) {
        let mut task = entry
            .task
            .clone()
            .with_status(TaskStatus::ProcessingCompleted)
            .with_timestamp(timestamp);
        if let Some(id) = resource_id {
            task = task.with_response(TaskResponse::with_resource_id(id));
        }
        entry.task = task;
    }
    resource_id
}

fn with_id(body: Value, resource_id: ResourceId) -> Value {
    let mut object = match body {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("body".to_owned(), other);
            map
        }
    };
    object.insert("id".to_owned(), Value::from(resource_id.get()));
    Value::Object(object)
}

#[async_trait]
impl<C> RemoteApi for InMemoryRemoteApi<C>
where
    C: Clock + Send + Sync,
{
    async fn get_task(&self, task_id: &TaskId) -> RemoteApiResult<RemoteTask> {
        let timestamp = self.clock.utc();
        let mut state = self.lock()?;
        let index = position(&state, task_id)?;
        let auto_complete_after = state.auto_complete_after;
        let Some(entry) = state.tasks.get_mut(index) else {
            return Err(not_found("GET", &format!("/tasks/{task_id}")));
        };
        if !entry.task.status().is_terminal() {
            entry.polls = entry.polls.saturating_add(1);
            let due = entry.request.is_some()
                && auto_complete_after.is_some_and(|after| entry.polls >= after);
            if due {
                finish(&mut state, index, timestamp);
            } else {
                entry.task = entry
                    .task
                    .clone()
                    .with_status(TaskStatus::ProcessingInProgress)
                    .with_timestamp(timestamp);
            }
        }
        state
            .tasks
            .get(index)
            .map(|entry| entry.task.clone())
            .ok_or_else(|| not_found("GET", &format!("/tasks/{task_id}")))
    }

    async fn list_tasks(&self) -> RemoteApiResult<Vec<RemoteTask>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .map(|entry| entry.task.clone())
            .collect())
    }

    async fn submit(&self, request: &SubmitRequest) -> RemoteApiResult<RemoteTask> {
        let timestamp = self.clock.utc();
        let mut state = self.lock()?;
        let kind = request.kind();
        if let Some(resource_id) = request.resource_id() {
            let key = (kind.collection_path().to_owned(), resource_id);
            if !state.resources.contains_key(&key) {
                let method = match request.operation() {
                    Operation::Delete => "DELETE",
                    Operation::Create | Operation::Update => "PUT",
                };
                return Err(not_found(method, &kind.instance_path(resource_id)));
            }
        }
        let command_type: CommandType = kind.command_type(request.operation());
        let task = RemoteTask::new(fresh_task_id(), command_type, TaskStatus::Received)
            .with_description("Task request received and is being queued for processing.")
            .with_timestamp(timestamp);
        state.submissions = state.submissions.saturating_add(1);
        state.tasks.push(SimulatedTask {
            task: task.clone(),
            request: Some(request.clone()),
            polls: 0,
        });
        Ok(task)
    }

    async fn fetch_resource(
        &self,
        kind: &ResourceKind,
        resource_id: ResourceId,
    ) -> RemoteApiResult<Value> {
        self.lock()?
            .resources
            .get(&(kind.collection_path().to_owned(), resource_id))
            .cloned()
            .ok_or_else(|| not_found("GET", &kind.instance_path(resource_id)))
    }
}
