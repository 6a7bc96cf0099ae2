use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use uuid::Uuid;

use super::friend::dedup;
use crate::error::{ensure_affected, validation::reject_blank, validation::require_non_blank, AppError, AppResult, OptionExt};
use crate::models::{
    CreateEventRequest, Event, EventFull, EventFullUpdate, EventUpdate, EventWithFriends, Frequency, FriendFull,
    FriendRef, ReminderDraft,
};
use crate::repository::event::{EventReplacement, NewEvent};
use crate::repository::EventRepository;

/// Length of an event created without an explicit end date.
pub fn default_event_length() -> Duration {
    Duration::minutes(5)
}

fn parse_frequency(raw: &str) -> AppResult<Frequency> {
    raw.parse::<Frequency>().map_err(|e| AppError::ValidationError {
        field: "frequency".to_string(),
        message: e.to_string(),
    })
}

fn friend_ids(refs: &[FriendRef]) -> Vec<Uuid> {
    dedup(refs.iter().map(|f| f.friend_id))
}

/// Next occurrence of the birthday `dob` at or after `now`, keeping the
/// month, day, hour and minute of `dob`. A 29 February birthday falls on
/// 1 March in non-leap years.
pub fn next_birthday(dob: DateTime<Utc>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let this_year = birthday_in(dob, now.year())?;
    if this_year < now {
        birthday_in(dob, now.year() + 1)
    } else {
        Some(this_year)
    }
}

fn birthday_in(dob: DateTime<Utc>, year: i32) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, dob.month(), dob.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))?;
    let naive = date.and_hms_opt(dob.hour(), dob.minute(), 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn birthday_title(friend: &FriendFull) -> String {
    let name = format!("{} {}", friend.friend.first_name, friend.friend.last_name.as_deref().unwrap_or(""));
    format!("Birthday: {}", name.trim())
}

fn birthday_description(friend: &FriendFull) -> Option<String> {
    let parts: Vec<&str> = [friend.work_info.city.as_deref(), friend.work_info.company.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[derive(Clone)]
pub struct EventService {
    repo: EventRepository,
}

impl EventService {
    pub fn new(repo: EventRepository) -> Self {
        Self { repo }
    }

    /// Creates the event with its attendees and reminders. The end date
    /// defaults to five minutes after the start.
    pub async fn create(&self, user_id: Uuid, req: &CreateEventRequest) -> AppResult<Uuid> {
        require_non_blank(req.title.as_deref(), "title")?;
        let frequency = parse_frequency(&req.frequency)?;
        let event = NewEvent {
            title: req.title.clone().unwrap_or_default(),
            description: req.description.clone(),
            start_date: req.start_date,
            end_date: req.end_date.unwrap_or(req.start_date + default_event_length()),
            frequency,
        };
        self.repo.create(user_id, &event, &friend_ids(&req.friend_ids), &req.reminders).await
    }

    /// Creates the annual birthday event for a freshly created friend, with the
    /// friend attending and a reminder at the event time. Returns `None` when
    /// the friend has no date of birth.
    pub async fn create_birthday(
        &self,
        user_id: Uuid,
        friend: &FriendFull,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Uuid>> {
        let Some(dob) = friend.friend.dob else {
            return Ok(None);
        };
        let start = next_birthday(dob, now)
            .ok_or_else(|| AppError::BadRequest(format!("date of birth {} has no next occurrence", dob)))?;
        let event = NewEvent {
            title: birthday_title(friend),
            description: birthday_description(friend),
            start_date: start,
            end_date: start + default_event_length(),
            frequency: Frequency::Annually,
        };
        let reminder = ReminderDraft { minutes_until_event: 0, is_active: true };
        let id = self.repo.create(user_id, &event, &[friend.friend.id], &[reminder]).await?;
        tracing::info!(event_id = %id, friend_id = %friend.friend.id, start = %start, "birthday event created");
        Ok(Some(id))
    }

    pub async fn add_friends(&self, user_id: Uuid, event_id: Uuid, refs: &[FriendRef]) -> AppResult<Vec<Uuid>> {
        self.repo.add_friends(user_id, event_id, &friend_ids(refs)).await
    }

    pub async fn remove_friends(&self, user_id: Uuid, event_id: Uuid, ids: &[Uuid]) -> AppResult<()> {
        self.repo.remove_friends(user_id, event_id, &dedup(ids.iter().copied())).await
    }

    pub async fn get_by_friend(&self, user_id: Uuid, friend_id: Uuid) -> AppResult<Vec<Event>> {
        self.repo.get_by_friend(user_id, friend_id).await
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Event>> {
        self.repo.get_all(user_id).await
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Event> {
        self.repo.get_by_id(user_id, id).await?.ok_or_not_found("event")
    }

    pub async fn get_all_with_friends(&self, user_id: Uuid) -> AppResult<Vec<EventWithFriends>> {
        let events = self.repo.get_all(user_id).await?;
        let mut friends = self.repo.friends_by_event(user_id, None).await?;
        Ok(events
            .into_iter()
            .map(|event| {
                let friends = friends.remove(&event.id).unwrap_or_default();
                EventWithFriends { event, friends }
            })
            .collect())
    }

    pub async fn get_with_friends(&self, user_id: Uuid, id: Uuid) -> AppResult<EventWithFriends> {
        let event = self.get_by_id(user_id, id).await?;
        let friends = self.repo.friends_by_event(user_id, Some(id)).await?.remove(&id).unwrap_or_default();
        Ok(EventWithFriends { event, friends })
    }

    pub async fn get_all_full(&self, user_id: Uuid) -> AppResult<Vec<EventFull>> {
        let events = self.repo.get_all(user_id).await?;
        let mut friends = self.repo.friends_by_event(user_id, None).await?;
        let mut reminders = self.repo.reminders_by_event(user_id, None).await?;
        Ok(events
            .into_iter()
            .map(|event| EventFull {
                friends: friends.remove(&event.id).unwrap_or_default(),
                reminders: reminders.remove(&event.id).unwrap_or_default(),
                event,
            })
            .collect())
    }

    pub async fn get_full(&self, user_id: Uuid, id: Uuid) -> AppResult<EventFull> {
        let event = self.get_by_id(user_id, id).await?;
        let friends = self.repo.friends_by_event(user_id, Some(id)).await?.remove(&id).unwrap_or_default();
        let reminders = self.repo.reminders_by_event(user_id, Some(id)).await?.remove(&id).unwrap_or_default();
        Ok(EventFull { event, friends, reminders })
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, update: &EventUpdate) -> AppResult<()> {
        validate_update(update)?;
        ensure_affected(self.repo.update(user_id, id, update.field_mask()).await?, "event")
    }

    /// Scalar update plus replace-all of attendees and reminders, atomically.
    pub async fn update_full(&self, user_id: Uuid, id: Uuid, req: &EventFullUpdate) -> AppResult<()> {
        let fields = match &req.event {
            Some(update) => {
                validate_update(update)?;
                update.field_mask()
            }
            None => Default::default(),
        };
        let replacement = EventReplacement {
            fields,
            friend_ids: req.friend_ids.as_deref().map(friend_ids),
            reminders: req.reminders.clone(),
        };
        self.repo.update_full(user_id, id, replacement).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        ensure_affected(self.repo.delete(user_id, id).await?, "event")
    }
}

fn validate_update(update: &EventUpdate) -> AppResult<()> {
    reject_blank(update.title.as_deref(), "title")?;
    if let Some(raw) = update.frequency.as_deref() {
        parse_frequency(raw)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Friend, WorkInfo};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn friend_full(first: &str, last: Option<&str>, city: Option<&str>, company: Option<&str>) -> FriendFull {
        let friend_id = Uuid::new_v4();
        FriendFull {
            friend: Friend {
                id: friend_id,
                first_name: first.to_string(),
                last_name: last.map(String::from),
                dob: None,
                image_id: None,
                user_id: Uuid::new_v4(),
            },
            work_info: WorkInfo {
                id: Uuid::new_v4(),
                country: None,
                city: city.map(String::from),
                company: company.map(String::from),
                position: None,
                messenger: None,
                communication_method: None,
                nationality: None,
                language: None,
                friend_id,
            },
            tags: Vec::new(),
        }
    }

    #[test]
    fn birthday_later_this_year_stays_in_current_year() {
        let now = at(2024, 3, 10, 12, 0);
        let next = next_birthday(at(1990, 8, 20, 9, 30), now).unwrap();
        assert_eq!(next, at(2024, 8, 20, 9, 30));
    }

    #[test]
    fn birthday_already_past_moves_to_next_year() {
        let now = at(2024, 9, 1, 0, 0);
        let next = next_birthday(at(1985, 1, 15, 0, 0), now).unwrap();
        assert_eq!(next, at(2025, 1, 15, 0, 0));
    }

    #[test]
    fn birthday_at_exactly_now_is_kept() {
        let now = at(2024, 5, 5, 10, 0);
        assert_eq!(next_birthday(at(2000, 5, 5, 10, 0), now).unwrap(), now);
    }

    #[test]
    fn leap_day_birthday_falls_on_first_of_march() {
        let now = at(2025, 1, 1, 0, 0);
        assert_eq!(next_birthday(at(2000, 2, 29, 0, 0), now).unwrap(), at(2025, 3, 1, 0, 0));
        let leap = at(2028, 1, 1, 0, 0);
        assert_eq!(next_birthday(at(2000, 2, 29, 0, 0), leap).unwrap(), at(2028, 2, 29, 0, 0));
    }

    #[test]
    fn birthday_title_and_description() {
        let full = friend_full("Ann", Some("Lee"), Some("Oslo"), Some("Acme"));
        assert_eq!(birthday_title(&full), "Birthday: Ann Lee");
        assert_eq!(birthday_description(&full).as_deref(), Some("Oslo Acme"));

        let bare = friend_full("Bo", None, None, Some("  "));
        assert_eq!(birthday_title(&bare), "Birthday: Bo");
        assert_eq!(birthday_description(&bare), None);
    }

    #[test]
    fn frequency_errors_name_the_field() {
        match parse_frequency("fortnightly") {
            Err(AppError::ValidationError { field, message }) => {
                assert_eq!(field, "frequency");
                assert!(message.contains("fortnightly"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(parse_frequency("weekdays").unwrap(), Frequency::Weekdays);
    }

    #[test]
    fn update_validation_rejects_blank_title_and_bad_frequency() {
        let blank = EventUpdate { title: Some(" ".into()), ..Default::default() };
        assert!(validate_update(&blank).is_err());
        let bad = EventUpdate { frequency: Some("hourly".into()), ..Default::default() };
        assert!(validate_update(&bad).is_err());
        assert!(validate_update(&EventUpdate::default()).is_ok());
    }
}
