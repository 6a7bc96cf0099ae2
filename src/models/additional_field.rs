use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-defined custom field definition for friends.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdditionalField {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdditionalFieldPayload {
    pub title: Option<String>,
}
