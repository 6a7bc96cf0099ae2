use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{ensure_owned, link, unlink, FieldMask, LinkOutcome, UnlinkOutcome};
use crate::error::AppResult;
use crate::models::{Friend, Friendlist, Tag};

#[derive(sqlx::FromRow)]
struct FriendlistTagRow {
    friendlist_id: Uuid,
    #[sqlx(flatten)]
    tag: Tag,
}

#[derive(sqlx::FromRow)]
struct FriendlistFriendRow {
    friendlist_id: Uuid,
    #[sqlx(flatten)]
    friend: Friend,
}

#[derive(Clone)]
pub struct FriendlistRepository {
    pool: SqlitePool,
}

impl FriendlistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// `mask` must contain `title`.
    pub async fn create(&self, user_id: Uuid, mut mask: FieldMask) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        mask.set("id", id).set("user_id", user_id);
        mask.into_insert("friendlist").build().execute(&self.pool).await?;
        Ok(id)
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Friendlist>> {
        let lists = sqlx::query_as::<_, Friendlist>("SELECT * FROM friendlist WHERE user_id = ?1 ORDER BY rowid")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(lists)
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Friendlist>> {
        let list = sqlx::query_as::<_, Friendlist>("SELECT * FROM friendlist WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(list)
    }

    /// Tags of the caller's friendlists grouped by friendlist id; `only` narrows to one list.
    pub async fn tags_by_friendlist(&self, user_id: Uuid, only: Option<Uuid>) -> AppResult<HashMap<Uuid, Vec<Tag>>> {
        let rows = sqlx::query_as::<_, FriendlistTagRow>(
            r#"SELECT ft.friendlist_id, t.id, t.title, t.user_id
               FROM friendlists_tags ft
               JOIN tag t ON t.id = ft.tag_id
               JOIN friendlist fl ON fl.id = ft.friendlist_id
               WHERE fl.user_id = ?1 AND (?2 IS NULL OR fl.id = ?2)
               ORDER BY ft.rowid"#,
        )
        .bind(user_id)
        .bind(only)
        .fetch_all(&self.pool)
        .await?;
        let mut grouped: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in rows {
            grouped.entry(row.friendlist_id).or_default().push(row.tag);
        }
        Ok(grouped)
    }

    /// Member friends of the caller's friendlists grouped by friendlist id.
    pub async fn friends_by_friendlist(
        &self,
        user_id: Uuid,
        only: Option<Uuid>,
    ) -> AppResult<HashMap<Uuid, Vec<Friend>>> {
        let rows = sqlx::query_as::<_, FriendlistFriendRow>(
            r#"SELECT ff.friendlist_id, f.id, f.first_name, f.last_name, f.dob, f.image_id, f.user_id
               FROM friendlists_friends ff
               JOIN friend f ON f.id = ff.friend_id
               JOIN friendlist fl ON fl.id = ff.friendlist_id
               WHERE fl.user_id = ?1 AND (?2 IS NULL OR fl.id = ?2)
               ORDER BY ff.rowid"#,
        )
        .bind(user_id)
        .bind(only)
        .fetch_all(&self.pool)
        .await?;
        let mut grouped: HashMap<Uuid, Vec<Friend>> = HashMap::new();
        for row in rows {
            grouped.entry(row.friendlist_id).or_default().push(row.friend);
        }
        Ok(grouped)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, mask: FieldMask) -> AppResult<u64> {
        if mask.is_empty() {
            let mut conn = self.pool.acquire().await?;
            ensure_owned(&mut conn, "friendlist", "friendlist", id, user_id).await?;
            return Ok(1);
        }
        let res = mask
            .into_update("friendlist", &[("id", id), ("user_id", user_id)])
            .build()
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM friendlist WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn add_tag(&self, user_id: Uuid, friendlist_id: Uuid, tag_id: Uuid) -> AppResult<LinkOutcome> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "friendlist", "friendlist", friendlist_id, user_id).await?;
        ensure_owned(&mut conn, "tag", "tag", tag_id, user_id).await?;
        link(&mut conn, "friendlists_tags", ("friendlist_id", friendlist_id), ("tag_id", tag_id)).await
    }

    pub async fn remove_tag(&self, user_id: Uuid, friendlist_id: Uuid, tag_id: Uuid) -> AppResult<UnlinkOutcome> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "friendlist", "friendlist", friendlist_id, user_id).await?;
        ensure_owned(&mut conn, "tag", "tag", tag_id, user_id).await?;
        unlink(&mut conn, "friendlists_tags", ("friendlist_id", friendlist_id), ("tag_id", tag_id)).await
    }

    pub async fn add_friend(&self, user_id: Uuid, friendlist_id: Uuid, friend_id: Uuid) -> AppResult<LinkOutcome> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "friendlist", "friendlist", friendlist_id, user_id).await?;
        ensure_owned(&mut conn, "friend", "friend", friend_id, user_id).await?;
        link(&mut conn, "friendlists_friends", ("friendlist_id", friendlist_id), ("friend_id", friend_id)).await
    }

    pub async fn remove_friend(
        &self,
        user_id: Uuid,
        friendlist_id: Uuid,
        friend_id: Uuid,
    ) -> AppResult<UnlinkOutcome> {
        let mut conn = self.pool.acquire().await?;
        ensure_owned(&mut conn, "friendlist", "friendlist", friendlist_id, user_id).await?;
        ensure_owned(&mut conn, "friend", "friend", friend_id, user_id).await?;
        unlink(&mut conn, "friendlists_friends", ("friendlist_id", friendlist_id), ("friend_id", friend_id)).await
    }
}
