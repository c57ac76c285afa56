//! Diesel row models for association persistence.

use super::schema::associations;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Insert and query model for association rows.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = associations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssociationRow {
    /// Store namespace.
    pub namespace: String,
    /// Primary identifier.
    pub primary_id: String,
    /// Resource identifier.
    pub resource_id: i64,
    /// Write timestamp.
    pub recorded_at: DateTime<Utc>,
}
