use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{ensure_all_owned, ensure_owned, link, push_id_filter, unlink, FieldMask, LinkOutcome, UnlinkOutcome};
use crate::error::{AppError, AppResult};
use crate::models::{Friend, FriendFields, FriendFull, Tag, WorkInfo, WorkInfoFields};

#[derive(sqlx::FromRow)]
struct FriendTagRow {
    friend_id: Uuid,
    #[sqlx(flatten)]
    tag: Tag,
}

/// Ids of the rows written by [`FriendRepository::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedFriend {
    pub friend_id: Uuid,
    pub work_info_id: Uuid,
}

#[derive(Clone)]
pub struct FriendRepository {
    pool: SqlitePool,
}

impl FriendRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the friend, its work info (empty if `work_info` is `None`) and the
    /// initial tag links in one transaction. Every tag must belong to `user_id`.
    pub async fn create(
        &self,
        user_id: Uuid,
        friend: &FriendFields,
        work_info: Option<&WorkInfoFields>,
        tag_ids: &[Uuid],
    ) -> AppResult<CreatedFriend> {
        let mut tx = self.pool.begin().await?;

        let friend_id = Uuid::new_v4();
        let mut friend_mask = friend.field_mask();
        friend_mask.set("id", friend_id).set("user_id", user_id);
        friend_mask.into_insert("friend").build().execute(&mut *tx).await?;

        let work_info_id = Uuid::new_v4();
        let mut work_mask = work_info.map(WorkInfoFields::field_mask).unwrap_or_default();
        work_mask.set("id", work_info_id).set("friend_id", friend_id);
        work_mask.into_insert("work_info").build().execute(&mut *tx).await?;

        ensure_all_owned(&mut tx, "tag", "tag", tag_ids, user_id).await?;
        for tag_id in tag_ids {
            link(&mut tx, "friends_tags", ("friend_id", friend_id), ("tag_id", *tag_id)).await?;
        }

        tx.commit().await?;
        Ok(CreatedFriend { friend_id, work_info_id })
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Friend>> {
        let friend = sqlx::query_as::<_, Friend>("SELECT * FROM friend WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(friend)
    }

    pub async fn get_all_full(&self, user_id: Uuid) -> AppResult<Vec<FriendFull>> {
        let friends = sqlx::query_as::<_, Friend>("SELECT * FROM friend WHERE user_id = ?1 ORDER BY rowid")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.decorate(user_id, friends).await
    }

    pub async fn get_full(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<FriendFull>> {
        let Some(friend) = self.get_by_id(user_id, id).await? else {
            return Ok(None);
        };
        Ok(self.decorate(user_id, vec![friend]).await?.pop())
    }

    /// Full records for the given friend ids, in `ids` order. Ids not owned by `user_id` are skipped.
    pub async fn get_full_many(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<FriendFull>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM friend WHERE user_id = ");
        qb.push_bind(user_id);
        push_id_filter(&mut qb, "id", ids);
        let mut friends: Vec<Friend> = qb.build_query_as().fetch_all(&self.pool).await?;
        let position: HashMap<Uuid, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        friends.sort_by_key(|f| position.get(&f.id).copied().unwrap_or(usize::MAX));
        self.decorate(user_id, friends).await
    }

    /// Attaches work info and tags with one query each, grouped by friend id.
    async fn decorate(&self, user_id: Uuid, friends: Vec<Friend>) -> AppResult<Vec<FriendFull>> {
        if friends.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = friends.iter().map(|f| f.id).collect();

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT w.* FROM work_info w JOIN friend f ON f.id = w.friend_id WHERE f.user_id = ",
        );
        qb.push_bind(user_id);
        push_id_filter(&mut qb, "w.friend_id", &ids);
        let work_infos: Vec<WorkInfo> = qb.build_query_as().fetch_all(&self.pool).await?;
        let mut work_by_friend: HashMap<Uuid, WorkInfo> =
            work_infos.into_iter().map(|w| (w.friend_id, w)).collect();

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT ft.friend_id, t.id, t.title, t.user_id FROM friends_tags ft \
             JOIN tag t ON t.id = ft.tag_id WHERE t.user_id = ",
        );
        qb.push_bind(user_id);
        push_id_filter(&mut qb, "ft.friend_id", &ids);
        qb.push(" ORDER BY ft.rowid");
        let rows: Vec<FriendTagRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let mut tags_by_friend: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in rows {
            tags_by_friend.entry(row.friend_id).or_default().push(row.tag);
        }

        friends
            .into_iter()
            .map(|friend| {
                let work_info = work_by_friend.remove(&friend.id).ok_or_else(|| {
                    AppError::Integrity(format!("work info of friend {} is missing", friend.id))
                })?;
                let tags = tags_by_friend.remove(&friend.id).unwrap_or_default();
                Ok(FriendFull { friend, work_info, tags })
            })
            .collect()
    }

    /// Applies both masks in one transaction. Returns `NotFound` if the friend is not owned.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        friend: FieldMask,
        work_info: FieldMask,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        if friend.is_empty() {
            ensure_owned(&mut tx, "friend", "friend", id, user_id).await?;
        } else {
            let res = friend
                .into_update("friend", &[("id", id), ("user_id", user_id)])
                .build()
                .execute(&mut *tx)
                .await?;
            if res.rows_affected() == 0 {
                return Err(AppError::NotFound("friend not found".to_string()));
            }
        }
        if !work_info.is_empty() {
            work_info.into_update("work_info", &[("friend_id", id)]).build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM friend WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn add_tag(&self, user_id: Uuid, friend_id: Uuid, tag_id: Uuid) -> AppResult<LinkOutcome> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "friend", "friend", friend_id, user_id).await?;
        ensure_owned(&mut conn, "tag", "tag", tag_id, user_id).await?;
        link(&mut conn, "friends_tags", ("friend_id", friend_id), ("tag_id", tag_id)).await
    }

    pub async fn remove_tag(&self, user_id: Uuid, friend_id: Uuid, tag_id: Uuid) -> AppResult<UnlinkOutcome> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "friend", "friend", friend_id, user_id).await?;
        ensure_owned(&mut conn, "tag", "tag", tag_id, user_id).await?;
        unlink(&mut conn, "friends_tags", ("friend_id", friend_id), ("tag_id", tag_id)).await
    }
}
