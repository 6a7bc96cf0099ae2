use uuid::Uuid;

use crate::error::{ensure_affected, validation::reject_blank, AppResult, OptionExt};
use crate::models::{Profile, ProfileUpdate};
use crate::repository::UserRepository;

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let user = self.users.get_by_id(user_id).await?.ok_or_not_found("user")?;
        Ok(user.into())
    }

    /// Partial profile update. Returns the previous image id when it was replaced.
    pub async fn update_profile(&self, user_id: Uuid, mut update: ProfileUpdate) -> AppResult<Option<Uuid>> {
        reject_blank(update.mail.as_deref(), "mail")?;
        update.mail = update.mail.map(|mail| mail.trim().to_string());
        let previous = self.users.get_by_id(user_id).await?.ok_or_not_found("user")?;
        let rows = self.users.update(user_id, update.field_mask()).await?;
        ensure_affected(rows, "user")?;
        Ok(replaced_image(previous.image_id, update.image_id))
    }
}

/// Old image id when `new` replaces a different, existing reference.
pub(crate) fn replaced_image(old: Option<Uuid>, new: Option<Uuid>) -> Option<Uuid> {
    match (old, new) {
        (Some(old), Some(new)) if old != new => Some(old),
        _ => None,
    }
}
