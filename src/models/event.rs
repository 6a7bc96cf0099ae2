use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Friend, FriendRef, Reminder, ReminderDraft};
use crate::repository::FieldMask;

/// Recurrence pattern of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    Once,
    Everyday,
    /// Monday to Friday.
    Weekdays,
    /// Every seven days.
    Weekly,
    /// Same day of the month.
    MonthlyDate,
    /// Same weekday position in the month, e.g. the fourth Tuesday.
    MonthlyDay,
    Annually,
}

impl Frequency {
    pub const ALL: [Frequency; 7] = [
        Frequency::Once,
        Frequency::Everyday,
        Frequency::Weekdays,
        Frequency::Weekly,
        Frequency::MonthlyDate,
        Frequency::MonthlyDay,
        Frequency::Annually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Everyday => "everyday",
            Frequency::Weekdays => "weekdays",
            Frequency::Weekly => "weekly",
            Frequency::MonthlyDate => "monthlyDate",
            Frequency::MonthlyDay => "monthlyDay",
            Frequency::Annually => "annually",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrequency(pub String);

impl fmt::Display for UnknownFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frequency '{}' is not valid", self.0)
    }
}

impl FromStr for Frequency {
    type Err = UnknownFrequency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFrequency(s.to_string()))
    }
}

/// `event` row. `frequency` holds one of [`Frequency::as_str`].
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub frequency: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventWithFriends {
    pub event: Event,
    pub friends: Vec<Friend>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventFull {
    pub event: Event,
    pub friends: Vec<Friend>,
    pub reminders: Vec<Reminder>,
}

/// Create payload. Frequency stays a raw string here so an unknown value
/// becomes a validation error rather than a JSON rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub frequency: String,
    #[serde(default)]
    pub friend_ids: Vec<FriendRef>,
    #[serde(default)]
    pub reminders: Vec<ReminderDraft>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub frequency: Option<String>,
}

impl EventUpdate {
    pub fn field_mask(&self) -> FieldMask {
        let mut mask = FieldMask::new();
        mask.set_opt("title", self.title.clone())
            .set_opt("description", self.description.clone())
            .set_opt("start_date", self.start_date)
            .set_opt("end_date", self.end_date)
            .set_opt("frequency", self.frequency.clone());
        mask
    }
}

/// Scalar update plus optional replace-all of attendees and reminders.
/// `None` leaves a collection untouched, `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFullUpdate {
    #[serde(default)]
    pub event: Option<EventUpdate>,
    #[serde(default)]
    pub friend_ids: Option<Vec<FriendRef>>,
    #[serde(default)]
    pub reminders: Option<Vec<ReminderDraft>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveFriendsRequest {
    pub friend_ids: Vec<Uuid>,
}
