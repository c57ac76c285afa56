//! Client facade wiring one lifecycle controller per resource kind.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::association::{adapters::memory::InMemoryAssociationStore, ports::AssociationStore};
use crate::config::{ClientConfig, ConfigError};
use crate::lifecycle::{
    adapters::HttpRemoteApi,
    domain::ResourceKind,
    ports::{RemoteApi, RemoteApiError},
    services::ResourceLifecycle,
};

/// Errors raised while building a [`CloudClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The HTTP transport could not be built.
    #[error(transparent)]
    Remote(#[from] RemoteApiError),
}

/// Result type for client construction.
pub type ClientResult<T> = Result<T, ClientError>;

/// Lifecycle controllers for every supported resource kind over one API.
pub struct CloudClient<A = HttpRemoteApi, S = InMemoryAssociationStore>
where
    A: RemoteApi,
    S: AssociationStore,
{
    api: Arc<A>,
    cloud_accounts: ResourceLifecycle<A, S>,
    subscriptions: ResourceLifecycle<A, S>,
}

impl CloudClient<HttpRemoteApi, InMemoryAssociationStore> {
    /// Builds an HTTP client that lists and resolves resources from the task
    /// history instead of a store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Remote`] when the HTTP client cannot be built.
    pub fn from_task_history(config: &ClientConfig) -> ClientResult<Self> {
        let api = Arc::new(HttpRemoteApi::new(config)?);
        Ok(Self::reconciling(api, config.poll_interval()))
    }

    /// Builds a task-history client from `STRATUS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when configuration is incomplete.
    pub fn from_env() -> ClientResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::from_task_history(&config)
    }
}

impl<S> CloudClient<HttpRemoteApi, S>
where
    S: AssociationStore,
{
    /// Builds an HTTP client whose controllers record associations in
    /// per-kind namespaces of `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Remote`] when the HTTP client cannot be built.
    pub fn with_store(config: &ClientConfig, store: &S) -> ClientResult<Self> {
        let api = Arc::new(HttpRemoteApi::new(config)?);
        Ok(Self::from_parts(api, store, config.poll_interval()))
    }
}

impl<A> CloudClient<A, InMemoryAssociationStore>
where
    A: RemoteApi,
{
    /// Builds a client over `api` that reconciles the task history.
    #[must_use]
    pub fn reconciling(api: Arc<A>, poll_interval: Duration) -> Self {
        let controller = |kind: ResourceKind| {
            ResourceLifecycle::from_task_history(kind, Arc::clone(&api))
                .with_poll_interval(poll_interval)
        };
        Self {
            cloud_accounts: controller(ResourceKind::cloud_account()),
            subscriptions: controller(ResourceKind::subscription()),
            api,
        }
    }
}

impl<A, S> CloudClient<A, S>
where
    A: RemoteApi,
    S: AssociationStore,
{
    /// Builds a client over `api`, scoping `store` to each kind's
    /// namespace. Durable backends keep what earlier clients recorded.
    #[must_use]
    pub fn from_parts(api: Arc<A>, store: &S, poll_interval: Duration) -> Self {
        let accounts = ResourceKind::cloud_account();
        let subscriptions = ResourceKind::subscription();
        let account_store = Arc::new(store.scoped(accounts.namespace()));
        let subscription_store = Arc::new(store.scoped(subscriptions.namespace()));
        debug!(
            cloud_accounts = %accounts.namespace(),
            subscriptions = %subscriptions.namespace(),
            "scoped association stores per resource kind"
        );
        Self {
            cloud_accounts: ResourceLifecycle::new(accounts, Arc::clone(&api), account_store)
                .with_poll_interval(poll_interval),
            subscriptions: ResourceLifecycle::new(subscriptions, Arc::clone(&api), subscription_store)
                .with_poll_interval(poll_interval),
            api,
        }
    }

    /// Returns the cloud account controller.
    #[must_use]
    pub const fn cloud_accounts(&self) -> &ResourceLifecycle<A, S> {
        &self.cloud_accounts
    }

    /// Returns the subscription controller.
    #[must_use]
    pub const fn subscriptions(&self) -> &ResourceLifecycle<A, S> {
        &self.subscriptions
    }

    /// Returns the shared remote API.
    #[must_use]
    pub const fn api(&self) -> &Arc<A> {
        &self.api
    }
}
