use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{ensure_all_owned, ensure_owned, reminder::insert_reminders, FieldMask};
use crate::error::{AppError, AppResult};
use crate::models::{Event, Friend, Frequency, Reminder, ReminderDraft};

#[derive(sqlx::FromRow)]
struct EventFriendRow {
    event_id: Uuid,
    #[sqlx(flatten)]
    friend: Friend,
}

/// Validated event columns for an insert.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub frequency: Frequency,
}

/// Validated input of [`EventRepository::update_full`].
#[derive(Debug, Clone, Default)]
pub struct EventReplacement {
    pub fields: FieldMask,
    pub friend_ids: Option<Vec<Uuid>>,
    pub reminders: Option<Vec<ReminderDraft>>,
}

#[derive(Clone)]
pub struct EventRepository {
    pool: SqlitePool,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the event with its initial attendees and reminders in one transaction.
    pub async fn create(
        &self,
        user_id: Uuid,
        event: &NewEvent,
        friend_ids: &[Uuid],
        reminders: &[ReminderDraft],
    ) -> AppResult<Uuid> {
        let mut tx = self.pool.begin().await?;
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO event (id, title, description, start_date, end_date, frequency, user_id)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        )
        .bind(id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.frequency.as_str())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        insert_attendees(&mut tx, user_id, id, friend_ids).await?;
        insert_reminders(&mut tx, user_id, id, reminders).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Links every friend to the event; all or nothing. Returns the link row ids.
    pub async fn add_friends(&self, user_id: Uuid, event_id: Uuid, friend_ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let mut tx = self.pool.begin().await?;
        ensure_owned(&mut tx, "event", "event", event_id, user_id).await?;
        let ids = insert_attendees(&mut tx, user_id, event_id, friend_ids).await?;
        tx.commit().await?;
        Ok(ids)
    }

    /// Unlinks every friend from the event. Fails on the first friend that is not
    /// currently attending, in which case nothing is removed.
    pub async fn remove_friends(&self, user_id: Uuid, event_id: Uuid, friend_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        ensure_owned(&mut tx, "event", "event", event_id, user_id).await?;
        for friend_id in friend_ids {
            let res = sqlx::query("DELETE FROM friends_events WHERE event_id = ?1 AND friend_id = ?2")
                .bind(event_id)
                .bind(friend_id)
                .execute(&mut *tx)
                .await?;
            if res.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("friend {} is not attending event {}", friend_id, event_id)));
            }
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn get_by_friend(&self, user_id: Uuid, friend_id: Uuid) -> AppResult<Vec<Event>> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "friend", "friend", friend_id, user_id).await?;
        let events = sqlx::query_as::<_, Event>(
            r#"SELECT e.* FROM event e
               JOIN friends_events fe ON fe.event_id = e.id
               WHERE fe.friend_id = ?1 AND e.user_id = ?2
               ORDER BY e.start_date"#,
        )
        .bind(friend_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(events)
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>("SELECT * FROM event WHERE user_id = ?1 ORDER BY rowid")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM event WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    /// Attendees of the caller's events grouped by event id; `only` narrows to one event.
    pub async fn friends_by_event(&self, user_id: Uuid, only: Option<Uuid>) -> AppResult<HashMap<Uuid, Vec<Friend>>> {
        let rows = sqlx::query_as::<_, EventFriendRow>(
            r#"SELECT fe.event_id, f.id, f.first_name, f.last_name, f.dob, f.image_id, f.user_id
               FROM friends_events fe
               JOIN friend f ON f.id = fe.friend_id
               JOIN event e ON e.id = fe.event_id
               WHERE e.user_id = ?1 AND (?2 IS NULL OR e.id = ?2)
               ORDER BY fe.rowid"#,
        )
        .bind(user_id)
        .bind(only)
        .fetch_all(&self.pool)
        .await?;
        let mut grouped: HashMap<Uuid, Vec<Friend>> = HashMap::new();
        for row in rows {
            grouped.entry(row.event_id).or_default().push(row.friend);
        }
        Ok(grouped)
    }

    /// Reminders of the caller's events grouped by event id.
    pub async fn reminders_by_event(
        &self,
        user_id: Uuid,
        only: Option<Uuid>,
    ) -> AppResult<HashMap<Uuid, Vec<Reminder>>> {
        let reminders = sqlx::query_as::<_, Reminder>(
            r#"SELECT r.* FROM reminder r
               JOIN event e ON e.id = r.event_id
               WHERE e.user_id = ?1 AND (?2 IS NULL OR e.id = ?2)
               ORDER BY r.rowid"#,
        )
        .bind(user_id)
        .bind(only)
        .fetch_all(&self.pool)
        .await?;
        let mut grouped: HashMap<Uuid, Vec<Reminder>> = HashMap::new();
        for reminder in reminders {
            grouped.entry(reminder.event_id).or_default().push(reminder);
        }
        Ok(grouped)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, mask: FieldMask) -> AppResult<u64> {
        if mask.is_empty() {
            let mut conn = self.pool.acquire().await?;
            ensure_owned(&mut conn, "event", "event", id, user_id).await?;
            return Ok(1);
        }
        let res = mask
            .into_update("event", &[("id", id), ("user_id", user_id)])
            .build()
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    /// Scalar update plus replace-all of attendees and reminders, in one transaction.
    pub async fn update_full(&self, user_id: Uuid, id: Uuid, replacement: EventReplacement) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        ensure_owned(&mut tx, "event", "event", id, user_id).await?;

        if !replacement.fields.is_empty() {
            replacement
                .fields
                .into_update("event", &[("id", id), ("user_id", user_id)])
                .build()
                .execute(&mut *tx)
                .await?;
        }

        if let Some(friend_ids) = replacement.friend_ids {
            sqlx::query("DELETE FROM friends_events WHERE event_id = ?1").bind(id).execute(&mut *tx).await?;
            insert_attendees(&mut tx, user_id, id, &friend_ids).await?;
        }

        if let Some(reminders) = replacement.reminders {
            sqlx::query("DELETE FROM reminder WHERE event_id = ?1").bind(id).execute(&mut *tx).await?;
            insert_reminders(&mut tx, user_id, id, &reminders).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM event WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}

/// Inserts attendee links after checking every friend belongs to `user_id`.
async fn insert_attendees(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    event_id: Uuid,
    friend_ids: &[Uuid],
) -> AppResult<Vec<Uuid>> {
    ensure_all_owned(conn, "friend", "friend", friend_ids, user_id).await?;
    let mut ids = Vec::with_capacity(friend_ids.len());
    for friend_id in friend_ids {
        let id = Uuid::new_v4();
        let res = sqlx::query("INSERT INTO friends_events (id, friend_id, event_id) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(friend_id)
            .bind(event_id)
            .execute(&mut *conn)
            .await?;
        if res.rows_affected() == 1 {
            ids.push(id);
        }
    }
    if ids.len() != friend_ids.len() {
        return Err(AppError::Integrity(format!(
            "expected {} attendee rows, inserted {}",
            friend_ids.len(),
            ids.len()
        )));
    }
    Ok(ids)
}
