//! Resumable create, update and delete over a task-tracking API.
//!
//! Each operation is one bounded tick of `Uninitiated -> Requested ->
//! Polling -> {Completed | Failed}`. A tick is re-entered from scratch on
//! every invocation using only the caller's [`ContinuationToken`] and
//! [`PrimaryId`]; the request is submitted only while the token is empty.

use crate::association::{
    adapters::memory::InMemoryAssociationStore,
    domain::{PrimaryId, ResourceId},
    ports::AssociationStore,
};
use crate::lifecycle::{
    domain::{Budget, ContinuationToken, Progress, ResourceKind, TaskCompletion, TaskId},
    ports::{RemoteApi, RemoteApiError, SubmitRequest, TaskWaiter},
    services::{LifecycleError, LifecycleResult, TaskHistoryScanner, TaskPoller},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Where primary id to resource id associations come from.
#[derive(Debug)]
pub enum AssociationSource<S> {
    /// A persistent association store.
    Store(Arc<S>),
    /// Reconciliation of the remote task history. Writes are no-ops because
    /// the history already records them.
    TaskHistory,
}

impl<S> Clone for AssociationSource<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Store(store) => Self::Store(Arc::clone(store)),
            Self::TaskHistory => Self::TaskHistory,
        }
    }
}

/// Terminal result of a create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    primary_id: PrimaryId,
    resource_id: ResourceId,
}

impl Created {
    /// Primary id the new resource is recorded under.
    #[must_use]
    pub const fn primary_id(&self) -> &PrimaryId {
        &self.primary_id
    }

    /// Server-assigned resource id.
    #[must_use]
    pub const fn resource_id(&self) -> ResourceId {
        self.resource_id
    }
}

/// Terminal result of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updated {
    task_id: TaskId,
    resource_id: Option<ResourceId>,
}

impl Updated {
    /// The completed update task.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Resource id reported by the update task, if any.
    #[must_use]
    pub const fn resource_id(&self) -> Option<ResourceId> {
        self.resource_id
    }
}

/// Terminal result of a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deleted {
    /// The delete task completed.
    Completed(TaskId),
    /// Nothing was live: no association, or the resource answered 404.
    AlreadyGone,
}

/// Lifecycle controller for one resource kind.
pub struct ResourceLifecycle<A, S = InMemoryAssociationStore, W = TaskPoller<A>>
where
    A: RemoteApi,
    S: AssociationStore,
    W: TaskWaiter,
{
    kind: ResourceKind,
    api: Arc<A>,
    waiter: Arc<W>,
    associations: AssociationSource<S>,
    scanner: TaskHistoryScanner<A>,
}

impl<A, S, W> Clone for ResourceLifecycle<A, S, W>
where
    A: RemoteApi,
    S: AssociationStore,
    W: TaskWaiter,
{
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            api: Arc::clone(&self.api),
            waiter: Arc::clone(&self.waiter),
            associations: self.associations.clone(),
            scanner: self.scanner.clone(),
        }
    }
}

impl<A, S> ResourceLifecycle<A, S, TaskPoller<A>>
where
    A: RemoteApi,
    S: AssociationStore,
{
    /// Creates a controller that records associations in `store`.
    #[must_use]
    pub fn new(kind: ResourceKind, api: Arc<A>, store: Arc<S>) -> Self {
        Self::with_source(kind, api, AssociationSource::Store(store))
    }

    /// Creates a controller over an explicit association source.
    #[must_use]
    pub fn with_source(kind: ResourceKind, api: Arc<A>, associations: AssociationSource<S>) -> Self {
        Self {
            kind,
            waiter: Arc::new(TaskPoller::new(Arc::clone(&api))),
            scanner: TaskHistoryScanner::new(Arc::clone(&api)),
            api,
            associations,
        }
    }

    /// Replaces the default poller with one pausing `interval` between
    /// fetches.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.waiter = Arc::new(TaskPoller::new(Arc::clone(&self.api)).with_interval(interval));
        self
    }
}

impl<A> ResourceLifecycle<A, InMemoryAssociationStore, TaskPoller<A>>
where
    A: RemoteApi,
{
    /// Creates a controller that derives associations from the task history.
    #[must_use]
    pub fn from_task_history(kind: ResourceKind, api: Arc<A>) -> Self {
        Self::with_source(kind, api, AssociationSource::TaskHistory)
    }
}

impl<A, S, W> ResourceLifecycle<A, S, W>
where
    A: RemoteApi,
    S: AssociationStore,
    W: TaskWaiter,
{
    /// Swaps the task waiter.
    #[must_use]
    pub fn with_waiter<V: TaskWaiter>(self, waiter: Arc<V>) -> ResourceLifecycle<A, S, V> {
        ResourceLifecycle {
            kind: self.kind,
            api: self.api,
            waiter,
            associations: self.associations,
            scanner: self.scanner,
        }
    }

    /// Returns the managed resource kind.
    #[must_use]
    pub const fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Returns the association source.
    #[must_use]
    pub const fn associations(&self) -> &AssociationSource<S> {
        &self.associations
    }

    /// Runs one tick of a create keyed by the create task id.
    ///
    /// With an empty token the create request is submitted and `token` is set
    /// to the new task id before waiting, so the caller can resume even if
    /// this tick later fails. On completion the association
    /// `task id -> resource id` is recorded. Task ids are the keys the
    /// task-history source reports, so this is the form to use without a
    /// store.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskFailed`] when the task fails,
    /// [`LifecycleError::MissingResourceId`] when it completes without a
    /// resource id, and transport or association errors as they occur.
    pub async fn create<B>(
        &self,
        budget: &Budget,
        token: &mut ContinuationToken,
        body: &B,
    ) -> LifecycleResult<Progress<Created>>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.create_keyed(budget, None, token, body).await
    }

    /// Runs one tick of a create keyed by a caller-chosen `primary_id`.
    ///
    /// Behaves like [`ResourceLifecycle::create`] but records
    /// `primary_id -> resource id` on completion. With the task-history
    /// source nothing is recorded and the resource stays reachable only
    /// through its create task id.
    ///
    /// # Errors
    ///
    /// As for [`ResourceLifecycle::create`].
    pub async fn create_as<B>(
        &self,
        budget: &Budget,
        primary_id: &PrimaryId,
        token: &mut ContinuationToken,
        body: &B,
    ) -> LifecycleResult<Progress<Created>>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.create_keyed(budget, Some(primary_id), token, body).await
    }

    #[instrument(skip(self, budget, token, body), fields(kind = %self.kind, token = %token))]
    async fn create_keyed<B>(
        &self,
        budget: &Budget,
        primary_id: Option<&PrimaryId>,
        token: &mut ContinuationToken,
        body: &B,
    ) -> LifecycleResult<Progress<Created>>
    where
        B: Serialize + Sync + ?Sized,
    {
        let task_id = match token.task_id() {
            Some(task_id) => task_id,
            None => {
                if budget.is_exhausted() {
                    return Ok(Progress::Pending(ContinuationToken::empty()));
                }
                let request = SubmitRequest::Create {
                    kind: self.kind.clone(),
                    body: encode(body)?,
                };
                self.submit(&request, token).await?
            }
        };

        let completion = match self.waiter.wait(budget, &task_id).await? {
            Progress::Complete(completion) => completion,
            Progress::Pending(pending) => return Ok(Progress::Pending(pending)),
        };
        let resource_id = completion
            .resource_id()
            .ok_or_else(|| LifecycleError::MissingResourceId(task_id.clone()))?;
        let primary_id = match (primary_id, &self.associations) {
            (Some(chosen), AssociationSource::Store(_)) => chosen.clone(),
            _ => PrimaryId::from(&task_id),
        };
        self.record(&primary_id, resource_id).await?;
        info!(primary_id = %primary_id, resource_id = %resource_id, "resource created");
        Ok(Progress::Complete(Created {
            primary_id,
            resource_id,
        }))
    }

    /// Runs one tick of an update.
    ///
    /// With an empty token the resource id is resolved from the association
    /// and the update request is submitted. A non-empty token resumes the
    /// in-flight task without consulting the association.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when there is no association or
    /// the update request answers 404, [`LifecycleError::TaskFailed`] when the
    /// task fails, and transport or association errors as they occur.
    #[instrument(skip(self, budget, token, body), fields(kind = %self.kind, token = %token))]
    pub async fn update<B>(
        &self,
        budget: &Budget,
        primary_id: &PrimaryId,
        token: &mut ContinuationToken,
        body: &B,
    ) -> LifecycleResult<Progress<Updated>>
    where
        B: Serialize + Sync + ?Sized,
    {
        let task_id = match token.task_id() {
            Some(task_id) => task_id,
            None => {
                if budget.is_exhausted() {
                    return Ok(Progress::Pending(ContinuationToken::empty()));
                }
                let resource_id = self.require(primary_id).await?;
                let request = SubmitRequest::Update {
                    kind: self.kind.clone(),
                    resource_id,
                    body: encode(body)?,
                };
                match self.submit(&request, token).await {
                    Ok(task_id) => task_id,
                    Err(err) if err.is_not_found() => {
                        return Err(LifecycleError::NotFound(primary_id.clone()));
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        Ok(self
            .waiter
            .wait(budget, &task_id)
            .await?
            .map(|completion: TaskCompletion| Updated {
                task_id: completion.task_id().clone(),
                resource_id: completion.resource_id(),
            }))
    }

    /// Runs one tick of a delete.
    ///
    /// Deleting an unknown primary id, or a resource that answers 404, is a
    /// successful [`Deleted::AlreadyGone`]. On completion the association is
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::TaskFailed`] when the task fails, and
    /// transport or association errors as they occur.
    #[instrument(skip(self, budget, token), fields(kind = %self.kind, token = %token))]
    pub async fn delete(
        &self,
        budget: &Budget,
        primary_id: &PrimaryId,
        token: &mut ContinuationToken,
    ) -> LifecycleResult<Progress<Deleted>> {
        let task_id = match token.task_id() {
            Some(task_id) => task_id,
            None => {
                if budget.is_exhausted() {
                    return Ok(Progress::Pending(ContinuationToken::empty()));
                }
                let Some(resource_id) = self.resolve(primary_id).await? else {
                    debug!("no association, nothing to delete");
                    return Ok(Progress::Complete(Deleted::AlreadyGone));
                };
                let request = SubmitRequest::Delete {
                    kind: self.kind.clone(),
                    resource_id,
                };
                match self.submit(&request, token).await {
                    Ok(task_id) => task_id,
                    Err(err) if err.is_not_found() => {
                        warn!(resource_id = %resource_id, "resource already gone");
                        self.forget(primary_id).await?;
                        return Ok(Progress::Complete(Deleted::AlreadyGone));
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let completion = match self.waiter.wait(budget, &task_id).await? {
            Progress::Complete(completion) => completion,
            Progress::Pending(pending) => return Ok(Progress::Pending(pending)),
        };
        self.forget(primary_id).await?;
        info!("resource deleted");
        Ok(Progress::Complete(Deleted::Completed(
            completion.task_id().clone(),
        )))
    }

    /// Fetches the representation of the resource behind `primary_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when there is no association or
    /// the resource answers 404.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn read(&self, primary_id: &PrimaryId) -> LifecycleResult<Value> {
        let resource_id = self.require(primary_id).await?;
        match self.api.fetch_resource(&self.kind, resource_id).await {
            Ok(resource) => Ok(resource),
            Err(err) if err.is_not_found() => Err(LifecycleError::NotFound(primary_id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Lists the primary ids with a live association, sorted.
    ///
    /// # Errors
    ///
    /// Returns association errors from the store, or transport errors when
    /// reconciling the task history.
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn list(&self) -> LifecycleResult<Vec<PrimaryId>> {
        match &self.associations {
            AssociationSource::Store(store) => Ok(store.keys().await?),
            AssociationSource::TaskHistory => Ok(self.scanner.primary_ids(&self.kind).await?),
        }
    }

    /// Resolves the resource id associated with `primary_id`.
    ///
    /// # Errors
    ///
    /// Returns association errors from the store, or transport errors when
    /// reconciling the task history.
    pub async fn resolve(&self, primary_id: &PrimaryId) -> LifecycleResult<Option<ResourceId>> {
        match &self.associations {
            AssociationSource::Store(store) => Ok(store.get(primary_id).await?),
            AssociationSource::TaskHistory => {
                Ok(self.scanner.resolve(&self.kind, primary_id).await?)
            }
        }
    }

    async fn require(&self, primary_id: &PrimaryId) -> LifecycleResult<ResourceId> {
        self.resolve(primary_id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(primary_id.clone()))
    }

    /// Submits `request` and stores the acknowledging task id in `token`.
    ///
    /// Not raced against the budget: an abandoned request may still create a
    /// task whose id would then be lost. It is bounded by the transport's
    /// request timeout.
    async fn submit(
        &self,
        request: &SubmitRequest,
        token: &mut ContinuationToken,
    ) -> Result<TaskId, RemoteApiError> {
        let ack = self.api.submit(request).await?;
        info!(
            operation = %request.operation(),
            task_id = %ack.task_id(),
            status = %ack.status(),
            "request submitted"
        );
        *token = ContinuationToken::from(ack.task_id());
        Ok(ack.task_id().clone())
    }

    async fn record(&self, primary_id: &PrimaryId, resource_id: ResourceId) -> LifecycleResult<()> {
        if let AssociationSource::Store(store) = &self.associations {
            store.put(primary_id, resource_id).await?;
        }
        Ok(())
    }

    async fn forget(&self, primary_id: &PrimaryId) -> LifecycleResult<()> {
        if let AssociationSource::Store(store) = &self.associations {
            store.delete(primary_id).await?;
        }
        Ok(())
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> LifecycleResult<Value> {
    serde_json::to_value(body).map_err(LifecycleError::Encoding)
}
