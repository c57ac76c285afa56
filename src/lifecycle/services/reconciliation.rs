//! Rebuilding associations from the remote task history.
//!
//! Used when no association store is configured. The task list is treated as
//! the source of truth: completed creates minus completed deletes, keyed by
//! resource id.
//!
//! Known limitation: ordering is ignored. A resource id that is created,
//! deleted and created again is reported as deleted, because the delete set
//! is subtracted regardless of which task came last.

use crate::association::domain::{Association, PrimaryId, ResourceId};
use crate::lifecycle::{
    domain::{Operation, RemoteTask, ResourceKind, TaskId, TaskStatus},
    ports::{RemoteApi, RemoteApiResult},
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Computes the live `resource id -> create task id` map for `kind`.
///
/// Later completed creates for the same resource id replace earlier ones in
/// list order.
#[must_use]
pub fn reconcile(tasks: &[RemoteTask], kind: &ResourceKind) -> BTreeMap<ResourceId, TaskId> {
    let mut created = BTreeMap::new();
    let mut deleted = BTreeSet::new();
    for task in tasks
        .iter()
        .filter(|task| task.status() == TaskStatus::ProcessingCompleted)
    {
        let Some(resource_id) = task.resource_id() else {
            continue;
        };
        if task.command_type().is(kind, Operation::Create) {
            created.insert(resource_id, task.task_id().clone());
        } else if task.command_type().is(kind, Operation::Delete) {
            deleted.insert(resource_id);
        }
    }
    created.retain(|resource_id, _| !deleted.contains(resource_id));
    created
}

/// Scans `GET /tasks/` and reconciles it for a resource kind.
#[derive(Debug)]
pub struct TaskHistoryScanner<A: RemoteApi> {
    api: Arc<A>,
}

impl<A: RemoteApi> Clone for TaskHistoryScanner<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: RemoteApi> TaskHistoryScanner<A> {
    /// Creates a scanner over `api`.
    #[must_use]
    pub const fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Returns the live associations for `kind`, sorted by primary id.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError`](crate::lifecycle::ports::RemoteApiError)
    /// when the task history cannot be fetched.
    pub async fn scan(&self, kind: &ResourceKind) -> RemoteApiResult<Vec<Association>> {
        let tasks = self.api.list_tasks().await?;
        let live = reconcile(&tasks, kind);
        debug!(kind = %kind, scanned = tasks.len(), live = live.len(), "reconciled task history");
        let mut associations: Vec<Association> = live
            .into_iter()
            .map(|(resource_id, task_id)| Association::new(PrimaryId::from(&task_id), resource_id))
            .collect();
        associations.sort_by(|a, b| a.primary_id().cmp(b.primary_id()));
        Ok(associations)
    }

    /// Returns the live primary ids for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError`](crate::lifecycle::ports::RemoteApiError)
    /// when the task history cannot be fetched.
    pub async fn primary_ids(&self, kind: &ResourceKind) -> RemoteApiResult<Vec<PrimaryId>> {
        let associations = self.scan(kind).await?;
        Ok(associations
            .into_iter()
            .map(|association| association.into_parts().0)
            .collect())
    }

    /// Resolves the resource id of `primary_id` from the task history.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteApiError`](crate::lifecycle::ports::RemoteApiError)
    /// when the task history cannot be fetched.
    pub async fn resolve(
        &self,
        kind: &ResourceKind,
        primary_id: &PrimaryId,
    ) -> RemoteApiResult<Option<ResourceId>> {
        let associations = self.scan(kind).await?;
        Ok(associations
            .into_iter()
            .find(|association| association.primary_id() == primary_id)
            .map(|association| association.resource_id()))
    }
}
