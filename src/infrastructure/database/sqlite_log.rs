use crate::application::ports::MutationLog;
use crate::domain::entities::{MutationDraft, QueueEntry};
use crate::domain::value_objects::{Operation, ResourcePath, TempId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, Pool, Row, Sqlite};

/// Durable mutation log on a SQLite pool.
///
/// The rowid is the total order: replay walks ascending ids, and nothing
/// ever updates an entry's position. Payloads are stored as JSON text and
/// parsed back on read; entries written by older app versions with
/// operation strings this build does not know surface as
/// `Operation::Unknown` instead of failing the load.
pub struct SqliteMutationLog {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, FromRow)]
struct QueueEntryRow {
    id: i64,
    resource: String,
    operation: String,
    payload: String,
    temp_id: Option<String>,
    enqueued_at: i64,
    attempt_count: i32,
    last_error: Option<String>,
}

impl QueueEntryRow {
    fn into_entry(self) -> Result<QueueEntry, AppError> {
        let resource = ResourcePath::new(self.resource).map_err(AppError::Internal)?;
        let payload: Value = serde_json::from_str(&self.payload)?;
        let temp_id = match self.temp_id {
            Some(value) => Some(TempId::parse(&value).map_err(AppError::Internal)?),
            None => None,
        };
        Ok(QueueEntry {
            id: self.id,
            resource,
            operation: Operation::from(self.operation.as_str()),
            payload,
            temp_id,
            enqueued_at: DateTime::<Utc>::from_timestamp_millis(self.enqueued_at)
                .unwrap_or_else(Utc::now),
            attempt_count: self.attempt_count,
            last_error: self.last_error,
        })
    }
}

impl SqliteMutationLog {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<QueueEntry, AppError> {
        let row = sqlx::query_as::<_, QueueEntryRow>("SELECT * FROM mutation_log WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        row.into_entry()
    }
}

#[async_trait]
impl MutationLog for SqliteMutationLog {
    async fn enqueue(&self, draft: MutationDraft) -> Result<QueueEntry, AppError> {
        let temp_id = draft.operation.is_create().then(TempId::generate);
        let payload = serde_json::to_string(&draft.payload)?;
        let enqueued_at = Utc::now().timestamp_millis();

        let result = sqlx::query(
            r#"
            INSERT INTO mutation_log (resource, operation, payload, temp_id, enqueued_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(draft.resource.as_str())
        .bind(draft.operation.as_str())
        .bind(&payload)
        .bind(temp_id.as_ref().map(TempId::as_str))
        .bind(enqueued_at)
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    async fn entries(&self) -> Result<Vec<QueueEntry>, AppError> {
        let rows =
            sqlx::query_as::<_, QueueEntryRow>("SELECT * FROM mutation_log ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(QueueEntryRow::into_entry).collect()
    }

    async fn peek_next(&self) -> Result<Option<QueueEntry>, AppError> {
        let row = sqlx::query_as::<_, QueueEntryRow>(
            "SELECT * FROM mutation_log ORDER BY id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(QueueEntryRow::into_entry).transpose()
    }

    async fn remove(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM mutation_log WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn record_failure(&self, id: i64, error: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE mutation_log
            SET attempt_count = attempt_count + 1, last_error = ?1
            WHERE id = ?2
            "#,
        )
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn rewrite_temp_id(&self, temp: &TempId, canonical: &str) -> Result<u64, AppError> {
        let rows = sqlx::query_as::<_, QueueEntryRow>(
            "SELECT * FROM mutation_log ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut rewritten = 0u64;
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let mut payload: Value = serde_json::from_str(&row.payload)?;
            let payload_changed = rewrite_value(&mut payload, temp.as_str(), canonical);
            // Entries addressed to the pending item carry the temp id in
            // their resource path too (`buildings/TEMP_x`, `visits/TEMP_x/close`).
            let resource = rewrite_path(&row.resource, temp.as_str(), canonical);
            if payload_changed || resource.is_some() {
                sqlx::query("UPDATE mutation_log SET resource = ?1, payload = ?2 WHERE id = ?3")
                    .bind(resource.as_deref().unwrap_or(&row.resource))
                    .bind(serde_json::to_string(&payload)?)
                    .bind(row.id)
                    .execute(&mut *tx)
                    .await?;
                rewritten += 1;
            }
        }
        tx.commit().await?;
        Ok(rewritten)
    }

    async fn len(&self) -> Result<u64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM mutation_log")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count").unwrap_or(0);
        Ok(count as u64)
    }
}

/// Replace every string equal to `temp` anywhere in the JSON tree.
/// Returns true when at least one replacement happened.
fn rewrite_value(value: &mut Value, temp: &str, canonical: &str) -> bool {
    match value {
        Value::String(s) if s == temp => {
            *s = canonical.to_string();
            true
        }
        Value::Array(items) => {
            let mut changed = false;
            for item in items {
                changed |= rewrite_value(item, temp, canonical);
            }
            changed
        }
        Value::Object(map) => {
            let mut changed = false;
            for (_, item) in map.iter_mut() {
                changed |= rewrite_value(item, temp, canonical);
            }
            changed
        }
        _ => false,
    }
}

/// Replace path segments that equal `temp` (whole-segment match only).
/// Returns `None` when the path does not reference the temp id.
fn rewrite_path(resource: &str, temp: &str, canonical: &str) -> Option<String> {
    if !resource.split('/').any(|segment| segment == temp) {
        return None;
    }
    Some(
        resource
            .split('/')
            .map(|segment| if segment == temp { canonical } else { segment })
            .collect::<Vec<_>>()
            .join("/"),
    )
}
