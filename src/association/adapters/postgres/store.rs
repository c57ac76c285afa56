//! `PostgreSQL` association store.

use super::{models::AssociationRow, schema::associations};
use crate::association::{
    domain::{Namespace, PrimaryId, ResourceId},
    ports::{AssociationError, AssociationResult, AssociationStore},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// `PostgreSQL` connection pool type used by the association store.
pub type AssociationPgPool = Pool<ConnectionManager<PgConnection>>;

/// Durable association store over the `associations` table.
#[derive(Clone)]
pub struct PostgresAssociationStore {
    pool: AssociationPgPool,
    namespace: Namespace,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl std::fmt::Debug for PostgresAssociationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAssociationStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl PostgresAssociationStore {
    /// Creates a store in the root namespace.
    #[must_use]
    pub fn new(pool: AssociationPgPool) -> Self {
        Self {
            pool,
            namespace: Namespace::root(),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replaces the clock used for `recorded_at` timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    async fn run_blocking<F, T>(&self, f: F) -> AssociationResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AssociationResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AssociationError::backend)?;
            f(&mut connection)
        })
        .await
        .map_err(AssociationError::backend)?
    }

    fn row(&self, primary_id: &PrimaryId, resource_id: ResourceId) -> AssociationResult<AssociationRow> {
        Ok(AssociationRow {
            namespace: self.namespace.as_str().to_owned(),
            primary_id: primary_id.as_str().to_owned(),
            resource_id: to_column(resource_id)?,
            recorded_at: self.clock.utc(),
        })
    }
}

fn to_column(resource_id: ResourceId) -> AssociationResult<i64> {
    i64::try_from(resource_id.get()).map_err(AssociationError::backend)
}

/// Converts a stored column back into a resource id.
pub(super) fn from_column(primary_id: &PrimaryId, value: i64) -> AssociationResult<ResourceId> {
    u64::try_from(value)
        .ok()
        .and_then(ResourceId::new)
        .ok_or_else(|| AssociationError::malformed(primary_id, format!("stored value {value}")))
}

fn upsert(connection: &mut PgConnection, rows: &[AssociationRow]) -> Result<usize, DieselError> {
    use diesel::upsert::excluded;

    diesel::insert_into(associations::table)
        .values(rows)
        .on_conflict((associations::namespace, associations::primary_id))
        .do_update()
        .set((
            associations::resource_id.eq(excluded(associations::resource_id)),
            associations::recorded_at.eq(excluded(associations::recorded_at)),
        ))
        .execute(connection)
}

#[async_trait]
impl AssociationStore for PostgresAssociationStore {
    async fn put(&self, primary_id: &PrimaryId, resource_id: ResourceId) -> AssociationResult<()> {
        let row = self.row(primary_id, resource_id)?;
        self.run_blocking(move |connection| {
            upsert(connection, &[row]).map_err(AssociationError::backend)?;
            Ok(())
        })
        .await
    }

    async fn get(&self, primary_id: &PrimaryId) -> AssociationResult<Option<ResourceId>> {
        let namespace = self.namespace.as_str().to_owned();
        let key = primary_id.clone();
        self.run_blocking(move |connection| {
            let stored = associations::table
                .filter(associations::namespace.eq(&namespace))
                .filter(associations::primary_id.eq(key.as_str()))
                .select(associations::resource_id)
                .first::<i64>(connection)
                .optional()
                .map_err(AssociationError::backend)?;
            stored.map(|value| from_column(&key, value)).transpose()
        })
        .await
    }

    async fn delete(&self, primary_id: &PrimaryId) -> AssociationResult<()> {
        let namespace = self.namespace.as_str().to_owned();
        let key = primary_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            diesel::delete(
                associations::table
                    .filter(associations::namespace.eq(&namespace))
                    .filter(associations::primary_id.eq(&key)),
            )
            .execute(connection)
            .map_err(AssociationError::backend)?;
            Ok(())
        })
        .await
    }

    async fn keys(&self) -> AssociationResult<Vec<PrimaryId>> {
        let namespace = self.namespace.as_str().to_owned();
        self.run_blocking(move |connection| {
            let keys = associations::table
                .filter(associations::namespace.eq(&namespace))
                .select(associations::primary_id)
                .order(associations::primary_id.asc())
                .load::<String>(connection)
                .map_err(AssociationError::backend)?;
            Ok(keys
                .into_iter()
                .filter_map(|key| PrimaryId::new(key).ok())
                .collect())
        })
        .await
    }

    fn scoped(&self, namespace: &Namespace) -> Self {
        Self {
            pool: self.pool.clone(),
            namespace: namespace.clone(),
            clock: Arc::clone(&self.clock),
        }
    }

    async fn copy(&self, namespace: &Namespace) -> AssociationResult<Self> {
        let source = self.namespace.as_str().to_owned();
        let target = self.scoped(namespace);
        let target_namespace = namespace.as_str().to_owned();
        let recorded_at = self.clock.utc();
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::delete(
                        associations::table.filter(associations::namespace.eq(&target_namespace)),
                    )
                    .execute(tx)?;
                    let rows: Vec<AssociationRow> = associations::table
                        .filter(associations::namespace.eq(&source))
                        .select(AssociationRow::as_select())
                        .load(tx)?
                        .into_iter()
                        .map(|row| AssociationRow {
                            namespace: target_namespace.clone(),
                            recorded_at,
                            ..row
                        })
                        .collect();
                    if !rows.is_empty() {
                        upsert(tx, &rows)?;
                    }
                    Ok(())
                })
                .map_err(AssociationError::backend)
        })
        .await?;
        Ok(target)
    }
}
