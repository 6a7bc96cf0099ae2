use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Tag;

#[derive(Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, title: &str) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO tag (id, title, user_id) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(title)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn find_by_title(&self, user_id: Uuid, title: &str) -> AppResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, title, user_id FROM tag WHERE user_id = ?1 AND title = ?2")
            .bind(user_id)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, title, user_id FROM tag WHERE user_id = ?1 ORDER BY rowid")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, title, user_id FROM tag WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, title: &str) -> AppResult<u64> {
        let res = sqlx::query("UPDATE tag SET title = ?1 WHERE id = ?2 AND user_id = ?3")
            .bind(title)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM tag WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
