//! Persistence adapters, one per entity.
//!
//! Every statement that touches user-owned rows carries `user_id = ?` so a
//! caller can never observe or mutate another user's data; zero matched rows is
//! reported as `NotFound` by the services. Multi-statement writes run inside a
//! `pool.begin()` transaction that rolls back when dropped uncommitted.

pub mod additional_field;
pub mod event;
pub mod friend;
pub mod friendlist;
pub mod patch;
pub mod reminder;
pub mod tag;
pub mod user;

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub use additional_field::AdditionalFieldRepository;
pub use event::EventRepository;
pub use friend::FriendRepository;
pub use friendlist::FriendlistRepository;
pub use patch::{FieldMask, FieldValue};
pub use reminder::ReminderRepository;
pub use tag::TagRepository;
pub use user::UserRepository;

/// Result of adding a row to a link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    AlreadyLinked,
}

/// Result of removing a row from a link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkOutcome {
    Unlinked,
    AlreadyRemoved,
}

/// Fails with `NotFound("<entity> not found")` unless `id` exists in `table` for `user_id`.
pub(crate) async fn ensure_owned(
    conn: &mut SqliteConnection,
    table: &'static str,
    entity: &str,
    id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1 AND user_id = ?2", table);
    let found: Option<i64> = sqlx::query_scalar(&sql).bind(id).bind(user_id).fetch_optional(&mut *conn).await?;
    match found {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("{} not found", entity))),
    }
}

/// Fails with `NotFound` naming the first id in `ids` that `user_id` does not own.
pub(crate) async fn ensure_all_owned(
    conn: &mut SqliteConnection,
    table: &'static str,
    entity: &str,
    ids: &[Uuid],
    user_id: Uuid,
) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {} WHERE user_id = ", table));
    qb.push_bind(user_id);
    push_id_filter(&mut qb, "id", ids);
    let owned: Vec<Uuid> = qb.build_query_scalar().fetch_all(&mut *conn).await?;
    match ids.iter().find(|id| !owned.contains(id)) {
        Some(missing) => Err(AppError::NotFound(format!("{} {} not found", entity, missing))),
        None => Ok(()),
    }
}

/// Appends ` AND <column> IN (?, ...)`. `ids` must not be empty.
pub(crate) fn push_id_filter(qb: &mut QueryBuilder<'_, Sqlite>, column: &'static str, ids: &[Uuid]) {
    qb.push(" AND ").push(column).push(" IN (");
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");
}

/// Inserts `(left, right)` into a link table with a `UNIQUE(left, right)` constraint.
pub(crate) async fn link(
    conn: &mut SqliteConnection,
    table: &'static str,
    left: (&'static str, Uuid),
    right: (&'static str, Uuid),
) -> AppResult<LinkOutcome> {
    let sql = format!(
        "INSERT INTO {} (id, {}, {}) VALUES (?1, ?2, ?3) ON CONFLICT({}, {}) DO NOTHING",
        table, left.0, right.0, left.0, right.0
    );
    let res = sqlx::query(&sql).bind(Uuid::new_v4()).bind(left.1).bind(right.1).execute(&mut *conn).await?;
    Ok(if res.rows_affected() == 0 { LinkOutcome::AlreadyLinked } else { LinkOutcome::Linked })
}

pub(crate) async fn unlink(
    conn: &mut SqliteConnection,
    table: &'static str,
    left: (&'static str, Uuid),
    right: (&'static str, Uuid),
) -> AppResult<UnlinkOutcome> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1 AND {} = ?2", table, left.0, right.0);
    let res = sqlx::query(&sql).bind(left.1).bind(right.1).execute(&mut *conn).await?;
    Ok(if res.rows_affected() == 0 { UnlinkOutcome::AlreadyRemoved } else { UnlinkOutcome::Unlinked })
}
