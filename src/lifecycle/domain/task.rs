//! Remote tasks as observed through the task API.

use super::{LifecycleDomainError, Operation, ResourceKind};
use crate::association::domain::{PrimaryId, ResourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Server-assigned identifier of a remote task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleDomainError::EmptyTaskId`] when the value is empty
    /// or whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, LifecycleDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(LifecycleDomainError::EmptyTaskId);
        }
        Ok(Self(raw))
    }

    /// Creates a task identifier from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resources created through the controller are keyed by their create task.
impl From<&TaskId> for PrimaryId {
    fn from(task_id: &TaskId) -> Self {
        Self::trusted(task_id.as_str().to_owned())
    }
}

/// Kind of work a task performs, e.g. `cloudAccountCreateRequest`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandType(String);

impl CommandType {
    /// Wraps a raw command type.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the command type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when this is `operation` on `kind`.
    #[must_use]
    pub fn is(&self, kind: &ResourceKind, operation: Operation) -> bool {
        *self == kind.command_type(operation)
    }

    /// Returns the operation suffix of this command type, if recognised.
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        [Operation::Create, Operation::Update, Operation::Delete]
            .into_iter()
            .find(|op| self.0.ends_with(&format!("{}Request", op.as_str())))
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Processing status reported for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Accepted but not yet picked up.
    Received,
    /// Being processed.
    ProcessingInProgress,
    /// Finished successfully. Terminal.
    ProcessingCompleted,
    /// Finished with an error. Terminal.
    ProcessingError,
    /// A status this client does not know; treated as still running.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Returns `true` for statuses with no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ProcessingCompleted | Self::ProcessingError)
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::ProcessingInProgress => "processing-in-progress",
            Self::ProcessingCompleted => "processing-completed",
            Self::ProcessingError => "processing-error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome payload attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[serde(
        default,
        deserialize_with = "non_zero_resource_id",
        skip_serializing_if = "Option::is_none"
    )]
    resource_id: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

impl TaskResponse {
    /// Response reporting a resource id.
    #[must_use]
    pub const fn with_resource_id(resource_id: ResourceId) -> Self {
        Self {
            resource_id: Some(resource_id),
            error: None,
        }
    }

    /// Response carrying a server error payload.
    #[must_use]
    pub const fn with_error(error: Value) -> Self {
        Self {
            resource_id: None,
            error: Some(error),
        }
    }

    /// Returns the reported resource id; a wire value of `0` reads as `None`.
    #[must_use]
    pub const fn resource_id(&self) -> Option<ResourceId> {
        self.resource_id
    }

    /// Returns the server error payload.
    #[must_use]
    pub const fn error(&self) -> Option<&Value> {
        self.error.as_ref()
    }
}

fn non_zero_resource_id<'de, D>(deserializer: D) -> Result<Option<ResourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<u64>::deserialize(deserializer)?;
    Ok(raw.and_then(ResourceId::new))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| DateTime::parse_from_rfc3339(&value).ok().map(|ts| ts.to_utc())))
}

/// One unit of asynchronous server-side work.
///
/// Tasks are created by the remote API when a request is submitted; the
/// client only ever observes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTask {
    task_id: TaskId,
    #[serde(default)]
    command_type: CommandType,
    status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<TaskResponse>,
}

impl RemoteTask {
    /// Creates a task with no description, timestamp or response.
    #[must_use]
    pub const fn new(task_id: TaskId, command_type: CommandType, status: TaskStatus) -> Self {
        Self {
            task_id,
            command_type,
            status,
            description: None,
            timestamp: None,
            response: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the response payload.
    #[must_use]
    pub fn with_response(mut self, response: TaskResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the task id.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the command type.
    #[must_use]
    pub const fn command_type(&self) -> &CommandType {
        &self.command_type
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the timestamp. Informational only.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Returns the response payload.
    #[must_use]
    pub const fn response(&self) -> Option<&TaskResponse> {
        self.response.as_ref()
    }

    /// Returns the resource id reported in the response.
    #[must_use]
    pub fn resource_id(&self) -> Option<ResourceId> {
        self.response.as_ref().and_then(TaskResponse::resource_id)
    }

    /// Returns the server-reported error detail for a failed task.
    ///
    /// Falls back to the description, then to `null`.
    #[must_use]
    pub fn error_detail(&self) -> Value {
        self.response
            .as_ref()
            .and_then(TaskResponse::error)
            .cloned()
            .or_else(|| self.description.clone().map(Value::String))
            .unwrap_or(Value::Null)
    }
}

/// Successful terminal outcome of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletion {
    task_id: TaskId,
    command_type: CommandType,
    resource_id: Option<ResourceId>,
}

impl TaskCompletion {
    /// Builds a completion from a completed task.
    ///
    /// The resource id is only carried for create and update commands.
    #[must_use]
    pub fn from_task(task: &RemoteTask) -> Self {
        let reports_id = task
            .command_type()
            .operation()
            .is_none_or(Operation::reports_resource_id);
        Self {
            task_id: task.task_id().clone(),
            command_type: task.command_type().clone(),
            resource_id: task.resource_id().filter(|_| reports_id),
        }
    }

    /// Returns the task id.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the command type.
    #[must_use]
    pub const fn command_type(&self) -> &CommandType {
        &self.command_type
    }

    /// Returns the resource id reported by a create or update.
    #[must_use]
    pub const fn resource_id(&self) -> Option<ResourceId> {
        self.resource_id
    }
}
