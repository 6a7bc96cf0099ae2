use uuid::Uuid;

use crate::error::{ensure_affected, AppResult, OptionExt};
use crate::models::{Reminder, ReminderDraft, ReminderPayload, ReminderUpdate};
use crate::repository::ReminderRepository;

#[derive(Clone)]
pub struct ReminderService {
    repo: ReminderRepository,
}

impl ReminderService {
    pub fn new(repo: ReminderRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Uuid, payload: ReminderPayload) -> AppResult<Uuid> {
        let draft = ReminderDraft { minutes_until_event: payload.minutes_until_event, is_active: payload.is_active };
        self.repo.create(user_id, payload.event_id, &draft).await
    }

    pub async fn create_bulk(&self, user_id: Uuid, event_id: Uuid, drafts: &[ReminderDraft]) -> AppResult<Vec<Uuid>> {
        self.repo.create_bulk(user_id, event_id, drafts).await
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Reminder>> {
        self.repo.get_all(user_id).await
    }

    pub async fn get_by_event(&self, user_id: Uuid, event_id: Uuid) -> AppResult<Vec<Reminder>> {
        self.repo.get_by_event(user_id, event_id).await
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Reminder> {
        self.repo.get_by_id(user_id, id).await?.ok_or_not_found("reminder")
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, update: ReminderUpdate) -> AppResult<()> {
        ensure_affected(self.repo.update(user_id, id, update.field_mask()).await?, "reminder")
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        ensure_affected(self.repo.delete(user_id, id).await?, "reminder")
    }
}
