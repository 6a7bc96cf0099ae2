use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Tag, TagRef};
use crate::repository::FieldMask;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Friend {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub dob: Option<DateTime<Utc>>,
    pub image_id: Option<Uuid>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct WorkInfo {
    pub id: Uuid,
    pub country: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub messenger: Option<String>,
    pub communication_method: Option<String>,
    pub nationality: Option<String>,
    pub language: Option<String>,
    pub friend_id: Uuid,
}

/// Friend with its 1:1 work info and attached tags.
#[derive(Debug, Clone, Serialize)]
pub struct FriendFull {
    pub friend: Friend,
    pub work_info: WorkInfo,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FriendFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<DateTime<Utc>>,
    pub image_id: Option<Uuid>,
}

impl FriendFields {
    pub fn field_mask(&self) -> FieldMask {
        let mut mask = FieldMask::new();
        mask.set_opt("first_name", self.first_name.clone())
            .set_opt("last_name", self.last_name.clone())
            .set_opt("dob", self.dob)
            .set_opt("image_id", self.image_id);
        mask
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkInfoFields {
    pub country: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub messenger: Option<String>,
    pub communication_method: Option<String>,
    pub nationality: Option<String>,
    pub language: Option<String>,
}

impl WorkInfoFields {
    pub fn field_mask(&self) -> FieldMask {
        let mut mask = FieldMask::new();
        mask.set_opt("country", self.country.clone())
            .set_opt("city", self.city.clone())
            .set_opt("company", self.company.clone())
            .set_opt("position", self.position.clone())
            .set_opt("messenger", self.messenger.clone())
            .set_opt("communication_method", self.communication_method.clone())
            .set_opt("nationality", self.nationality.clone())
            .set_opt("language", self.language.clone());
        mask
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFriendRequest {
    pub friend: FriendFields,
    #[serde(default)]
    pub work_info: Option<WorkInfoFields>,
    #[serde(default)]
    pub tag_ids: Vec<TagRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFriendRequest {
    #[serde(default)]
    pub friend: Option<FriendFields>,
    #[serde(default)]
    pub work_info: Option<WorkInfoFields>,
}

/// `{ "friend_id": ... }` body of the membership endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FriendRef {
    pub friend_id: Uuid,
}
