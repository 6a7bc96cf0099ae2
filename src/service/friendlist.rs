use std::collections::HashMap;

use uuid::Uuid;

use super::friend::dedup;
use super::user::replaced_image;
use crate::error::{ensure_affected, validation::reject_blank, validation::require_non_blank, AppResult, OptionExt};
use crate::models::{Friendlist, FriendlistFull, FriendlistPayload, FriendlistWithFriends, FriendlistWithTags};
use crate::repository::{FriendRepository, FriendlistRepository, LinkOutcome, UnlinkOutcome};

#[derive(Clone)]
pub struct FriendlistService {
    repo: FriendlistRepository,
    friends: FriendRepository,
}

impl FriendlistService {
    pub fn new(repo: FriendlistRepository, friends: FriendRepository) -> Self {
        Self { repo, friends }
    }

    pub async fn create(&self, user_id: Uuid, payload: &FriendlistPayload) -> AppResult<Uuid> {
        require_non_blank(payload.title.as_deref(), "title")?;
        self.repo.create(user_id, payload.field_mask()).await
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Friendlist>> {
        self.repo.get_all(user_id).await
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Friendlist> {
        self.repo.get_by_id(user_id, id).await?.ok_or_not_found("friendlist")
    }

    pub async fn get_all_with_tags(&self, user_id: Uuid) -> AppResult<Vec<FriendlistWithTags>> {
        let lists = self.repo.get_all(user_id).await?;
        let mut tags = self.repo.tags_by_friendlist(user_id, None).await?;
        Ok(lists
            .into_iter()
            .map(|friendlist| {
                let tags = tags.remove(&friendlist.id).unwrap_or_default();
                FriendlistWithTags { friendlist, tags }
            })
            .collect())
    }

    pub async fn get_with_tags(&self, user_id: Uuid, id: Uuid) -> AppResult<FriendlistWithTags> {
        let friendlist = self.get_by_id(user_id, id).await?;
        let tags = self.repo.tags_by_friendlist(user_id, Some(id)).await?.remove(&id).unwrap_or_default();
        Ok(FriendlistWithTags { friendlist, tags })
    }

    pub async fn get_all_with_friends(&self, user_id: Uuid) -> AppResult<Vec<FriendlistWithFriends>> {
        let lists = self.repo.get_all(user_id).await?;
        let mut friends = self.repo.friends_by_friendlist(user_id, None).await?;
        Ok(lists
            .into_iter()
            .map(|friendlist| {
                let friends = friends.remove(&friendlist.id).unwrap_or_default();
                FriendlistWithFriends { friendlist, friends }
            })
            .collect())
    }

    pub async fn get_with_friends(&self, user_id: Uuid, id: Uuid) -> AppResult<FriendlistWithFriends> {
        let friendlist = self.get_by_id(user_id, id).await?;
        let friends = self.repo.friends_by_friendlist(user_id, Some(id)).await?.remove(&id).unwrap_or_default();
        Ok(FriendlistWithFriends { friendlist, friends })
    }

    pub async fn get_all_full(&self, user_id: Uuid) -> AppResult<Vec<FriendlistFull>> {
        let lists = self.repo.get_all(user_id).await?;
        self.assemble_full(user_id, lists, None).await
    }

    pub async fn get_full(&self, user_id: Uuid, id: Uuid) -> AppResult<FriendlistFull> {
        let list = self.get_by_id(user_id, id).await?;
        let mut full = self.assemble_full(user_id, vec![list], Some(id)).await?;
        full.pop().ok_or_not_found("friendlist")
    }

    /// Tags and fully decorated members for `lists`. Each member friend is loaded
    /// once even when it belongs to several lists.
    async fn assemble_full(
        &self,
        user_id: Uuid,
        lists: Vec<Friendlist>,
        only: Option<Uuid>,
    ) -> AppResult<Vec<FriendlistFull>> {
        let mut tags = self.repo.tags_by_friendlist(user_id, only).await?;
        let members = self.repo.friends_by_friendlist(user_id, only).await?;

        let member_ids = dedup(members.values().flatten().map(|f| f.id));
        let decorated: HashMap<Uuid, _> = self
            .friends
            .get_full_many(user_id, &member_ids)
            .await?
            .into_iter()
            .map(|f| (f.friend.id, f))
            .collect();

        Ok(lists
            .into_iter()
            .map(|friendlist| {
                let friends = members
                    .get(&friendlist.id)
                    .map(|fs| fs.iter().filter_map(|f| decorated.get(&f.id).cloned()).collect())
                    .unwrap_or_default();
                let tags = tags.remove(&friendlist.id).unwrap_or_default();
                FriendlistFull { friendlist, tags, friends }
            })
            .collect())
    }

    /// Partial update. Returns the replaced image id, if any.
    pub async fn update(&self, user_id: Uuid, id: Uuid, payload: &FriendlistPayload) -> AppResult<Option<Uuid>> {
        reject_blank(payload.title.as_deref(), "title")?;
        let previous = self.get_by_id(user_id, id).await?;
        ensure_affected(self.repo.update(user_id, id, payload.field_mask()).await?, "friendlist")?;
        Ok(replaced_image(previous.image_id, payload.image_id))
    }

    /// Returns the deleted list's image id for cleanup.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Uuid>> {
        let previous = self.get_by_id(user_id, id).await?;
        ensure_affected(self.repo.delete(user_id, id).await?, "friendlist")?;
        Ok(previous.image_id)
    }

    pub async fn add_tag(&self, user_id: Uuid, id: Uuid, tag_id: Uuid) -> AppResult<LinkOutcome> {
        self.repo.add_tag(user_id, id, tag_id).await
    }

    pub async fn remove_tag(&self, user_id: Uuid, id: Uuid, tag_id: Uuid) -> AppResult<UnlinkOutcome> {
        self.repo.remove_tag(user_id, id, tag_id).await
    }

    pub async fn add_friend(&self, user_id: Uuid, id: Uuid, friend_id: Uuid) -> AppResult<LinkOutcome> {
        self.repo.add_friend(user_id, id, friend_id).await
    }

    pub async fn remove_friend(&self, user_id: Uuid, id: Uuid, friend_id: Uuid) -> AppResult<UnlinkOutcome> {
        self.repo.remove_friend(user_id, id, friend_id).await
    }
}
