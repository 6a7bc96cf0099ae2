use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagPayload {
    pub title: Option<String>,
}

/// `{ "tag_id": ... }` body of the link endpoints and of `tag_ids` lists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TagRef {
    pub tag_id: Uuid,
}
