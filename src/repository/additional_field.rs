use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::AdditionalField;

#[derive(Clone)]
pub struct AdditionalFieldRepository {
    pool: SqlitePool,
}

impl AdditionalFieldRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, title: &str) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO additional_info_field (id, title, user_id) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(title)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<AdditionalField>> {
        let fields = sqlx::query_as::<_, AdditionalField>(
            "SELECT id, title, user_id FROM additional_info_field WHERE user_id = ?1 ORDER BY rowid",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<AdditionalField>> {
        let field = sqlx::query_as::<_, AdditionalField>(
            "SELECT id, title, user_id FROM additional_info_field WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(field)
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, title: &str) -> AppResult<u64> {
        let res = sqlx::query("UPDATE additional_info_field SET title = ?1 WHERE id = ?2 AND user_id = ?3")
            .bind(title)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<u64> {
        let res = sqlx::query("DELETE FROM additional_info_field WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
