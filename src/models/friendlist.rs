use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Friend, FriendFull, Tag};
use crate::repository::FieldMask;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Friendlist {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub image_id: Option<Uuid>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FriendlistPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub image_id: Option<Uuid>,
}

impl FriendlistPayload {
    pub fn field_mask(&self) -> FieldMask {
        let mut mask = FieldMask::new();
        mask.set_opt("title", self.title.clone())
            .set_opt("description", self.description.clone())
            .set_opt("color", self.color.clone())
            .set_opt("image_id", self.image_id);
        mask
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendlistWithTags {
    pub friendlist: Friendlist,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendlistWithFriends {
    pub friendlist: Friendlist,
    pub friends: Vec<Friend>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendlistFull {
    pub friendlist: Friendlist,
    pub tags: Vec<Tag>,
    pub friends: Vec<FriendFull>,
}
