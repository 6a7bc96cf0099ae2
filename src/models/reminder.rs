use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::FieldMask;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub minutes_until_event: i64,
    pub is_active: bool,
    pub event_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReminderPayload {
    pub event_id: Uuid,
    pub minutes_until_event: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Reminder attached while creating or fully replacing an event.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderDraft {
    pub minutes_until_event: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReminderUpdate {
    pub minutes_until_event: Option<i64>,
    pub is_active: Option<bool>,
}

impl ReminderUpdate {
    pub fn field_mask(&self) -> FieldMask {
        let mut mask = FieldMask::new();
        mask.set_opt("minutes_until_event", self.minutes_until_event)
            .set_opt("is_active", self.is_active);
        mask
    }
}
