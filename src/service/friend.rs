use uuid::Uuid;

use super::user::replaced_image;
use crate::error::{ensure_affected, validation::reject_blank, validation::require_non_blank, AppResult, OptionExt};
use crate::models::{CreateFriendRequest, FriendFull, UpdateFriendRequest};
use crate::repository::friend::CreatedFriend;
use crate::repository::{FriendRepository, LinkOutcome, UnlinkOutcome};

#[derive(Clone)]
pub struct FriendService {
    repo: FriendRepository,
}

impl FriendService {
    pub fn new(repo: FriendRepository) -> Self {
        Self { repo }
    }

    /// Creates the friend, its work info and the initial tag links.
    pub async fn create(&self, user_id: Uuid, req: &CreateFriendRequest) -> AppResult<CreatedFriend> {
        require_non_blank(req.friend.first_name.as_deref(), "first_name")?;
        let tag_ids: Vec<Uuid> = dedup(req.tag_ids.iter().map(|t| t.tag_id));
        let created = self.repo.create(user_id, &req.friend, req.work_info.as_ref(), &tag_ids).await?;
        tracing::debug!(friend_id = %created.friend_id, tags = tag_ids.len(), "friend created");
        Ok(created)
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<FriendFull>> {
        self.repo.get_all_full(user_id).await
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<FriendFull> {
        self.repo.get_full(user_id, id).await?.ok_or_not_found("friend")
    }

    /// Partial update of friend and work info. Returns the replaced image id, if any.
    pub async fn update(&self, user_id: Uuid, id: Uuid, req: &UpdateFriendRequest) -> AppResult<Option<Uuid>> {
        let friend = req.friend.clone().unwrap_or_default();
        reject_blank(friend.first_name.as_deref(), "first_name")?;
        let previous = self.repo.get_by_id(user_id, id).await?.ok_or_not_found("friend")?;
        let work_mask = req.work_info.as_ref().map(|w| w.field_mask()).unwrap_or_default();
        self.repo.update(user_id, id, friend.field_mask(), work_mask).await?;
        Ok(replaced_image(previous.image_id, friend.image_id))
    }

    /// Deletes the friend and everything hanging off it. Returns its image id for cleanup.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Uuid>> {
        let previous = self.repo.get_by_id(user_id, id).await?.ok_or_not_found("friend")?;
        ensure_affected(self.repo.delete(user_id, id).await?, "friend")?;
        Ok(previous.image_id)
    }

    pub async fn add_tag(&self, user_id: Uuid, friend_id: Uuid, tag_id: Uuid) -> AppResult<LinkOutcome> {
        self.repo.add_tag(user_id, friend_id, tag_id).await
    }

    pub async fn remove_tag(&self, user_id: Uuid, friend_id: Uuid, tag_id: Uuid) -> AppResult<UnlinkOutcome> {
        self.repo.remove_tag(user_id, friend_id, tag_id).await
    }
}

/// Drops repeated ids, keeping first-seen order.
pub(crate) fn dedup(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(dedup([b, a, b, c, a]), vec![b, a, c]);
        assert!(dedup(Vec::new()).is_empty());
    }
}
