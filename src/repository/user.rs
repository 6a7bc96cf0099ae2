use sqlx::SqlitePool;
use uuid::Uuid;

use super::FieldMask;
use crate::error::AppResult;
use crate::models::User;

const USER_TABLE: &str = "\"user\"";

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a user. `profile` must already contain `mail`, `password_hash` and `salt`.
    pub async fn create(&self, mut profile: FieldMask) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        profile.set("id", id);
        profile.into_insert(USER_TABLE).build().execute(&self.pool).await?;
        Ok(id)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE id = ?1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_mail(&self, mail: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE mail = ?1"#)
            .bind(mail)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Returns the number of updated rows (0 or 1).
    pub async fn update(&self, id: Uuid, mask: FieldMask) -> AppResult<u64> {
        if mask.is_empty() {
            return Ok(1);
        }
        let res = mask.into_update(USER_TABLE, &[("id", id)]).build().execute(&self.pool).await?;
        Ok(res.rows_affected())
    }
}
