use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{ensure_owned, FieldMask};
use crate::error::{AppError, AppResult};
use crate::models::{Reminder, ReminderDraft};

#[derive(Clone)]
pub struct ReminderRepository {
    pool: SqlitePool,
}

impl ReminderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a reminder for an event owned by `user_id`.
    pub async fn create(&self, user_id: Uuid, event_id: Uuid, draft: &ReminderDraft) -> AppResult<Uuid> {
        let mut tx = self.pool.begin().await?;
        ensure_owned(&mut tx, "event", "event", event_id, user_id).await?;
        let ids = insert_reminders(&mut tx, user_id, event_id, std::slice::from_ref(draft)).await?;
        let id = ids.into_iter().next().ok_or_else(|| AppError::Integrity("reminder row was not inserted".into()))?;
        tx.commit().await?;
        Ok(id)
    }

    /// Creates several reminders for one event owned by `user_id` in one transaction.
    pub async fn create_bulk(&self, user_id: Uuid, event_id: Uuid, drafts: &[ReminderDraft]) -> AppResult<Vec<Uuid>> {
        let mut tx = self.pool.begin().await?;
        ensure_owned(&mut tx, "event", "event", event_id, user_id).await?;
        let ids = insert_reminders(&mut tx, user_id, event_id, drafts).await?;
        tx.commit().await?;
        Ok(ids)
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>("SELECT * FROM reminder WHERE user_id = ?1 ORDER BY rowid")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(reminders)
    }

    pub async fn get_by_event(&self, user_id: Uuid, event_id: Uuid) -> AppResult<Vec<Reminder>> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "event", "event", event_id, user_id).await?;
        let reminders = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminder WHERE event_id = ?1 AND user_id = ?2 ORDER BY rowid",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(reminders)
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Reminder>> {
        let reminder = sqlx::query_as::<_, Reminder>("SELECT * FROM reminder WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reminder)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, mask: FieldMask) -> AppResult<u64> {
        if mask.is_empty() {
            let mut conn = self.pool.acquire().await?;
            ensure_owned(&mut conn, "reminder", "reminder", id, user_id).await?;
            return Ok(1);
        }
        let res = mask
            .into_update("reminder", &[("id", id), ("user_id", user_id)])
            .build()
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM reminder WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}

/// Inserts reminders for `event_id` on an open connection or transaction.
pub(crate) async fn insert_reminders(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    event_id: Uuid,
    drafts: &[ReminderDraft],
) -> AppResult<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO reminder (id, minutes_until_event, is_active, event_id, user_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(id)
        .bind(draft.minutes_until_event)
        .bind(draft.is_active)
        .bind(event_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}
