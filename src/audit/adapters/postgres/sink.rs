//! `PostgreSQL` audit sink implementation.

use super::{
    models::{AuditLogRow, NewAuditLogRow},
    schema::audit_logs,
};
use crate::audit::{
    domain::{AuditAction, AuditRecord, AuditRecordId},
    ports::{AuditSink, AuditSinkError, AuditSinkResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by audit adapters.
pub type AuditPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed audit sink.
#[derive(Debug, Clone)]
pub struct PostgresAuditSink {
    pool: AuditPgPool,
}

impl PostgresAuditSink {
    /// Creates a new sink from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AuditPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AuditSinkResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AuditSinkResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditSinkError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AuditSinkError::persistence)?
    }
}

#[async_trait]
impl AuditSink for PostgresAuditSink {
    async fn append(&self, record: &AuditRecord) -> AuditSinkResult<()> {
        let new_row = to_new_row(record);
        self.run_blocking(move |connection| {
            diesel::insert_into(audit_logs::table)
                .values(&new_row)
                .execute(connection)
                .map_err(AuditSinkError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> AuditSinkResult<Vec<AuditRecord>> {
        let lookup_type = entity_type.to_owned();
        let lookup_id = entity_id.to_owned();
        self.run_blocking(move |connection| {
            let rows = audit_logs::table
                .filter(audit_logs::entity_type.eq(&lookup_type))
                .filter(audit_logs::entity_id.eq(&lookup_id))
                .order(audit_logs::recorded_at.asc())
                .select(AuditLogRow::as_select())
                .load::<AuditLogRow>(connection)
                .map_err(AuditSinkError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }
}

fn to_new_row(record: &AuditRecord) -> NewAuditLogRow {
    NewAuditLogRow {
        id: record.id.into_inner(),
        entity_type: record.entity_type.clone(),
        entity_id: record.entity_id.clone(),
        action: record.action.as_str().to_owned(),
        performed_by: record.performed_by.clone(),
        old_value: record.old_value.clone(),
        new_value: record.new_value.clone(),
        details: record.details.clone(),
        recorded_at: record.recorded_at,
    }
}

fn row_to_record(row: AuditLogRow) -> AuditSinkResult<AuditRecord> {
    let action =
        AuditAction::try_from(row.action.as_str()).map_err(AuditSinkError::persistence)?;
    Ok(AuditRecord {
        id: AuditRecordId::from_uuid(row.id),
        entity_type: row.entity_type,
        entity_id: row.entity_id,
        action,
        performed_by: row.performed_by,
        old_value: row.old_value,
        new_value: row.new_value,
        details: row.details,
        recorded_at: row.recorded_at,
    })
}
