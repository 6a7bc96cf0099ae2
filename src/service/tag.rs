use uuid::Uuid;

use crate::error::{ensure_affected, validation::require_non_blank, AppError, AppResult, OptionExt};
use crate::models::Tag;
use crate::repository::TagRepository;

/// Result of [`TagService::create`]. An existing title is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Uuid),
    AlreadyExists(Uuid),
}

#[derive(Clone)]
pub struct TagService {
    repo: TagRepository,
}

impl TagService {
    pub fn new(repo: TagRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Uuid, title: Option<&str>) -> AppResult<CreateOutcome> {
        require_non_blank(title, "title")?;
        let title = title.unwrap_or_default().trim();
        if let Some(existing) = self.repo.find_by_title(user_id, title).await? {
            return Ok(CreateOutcome::AlreadyExists(existing.id));
        }
        match self.repo.create(user_id, title).await {
            Ok(id) => Ok(CreateOutcome::Created(id)),
            // Lost a race against a concurrent create of the same title
            Err(AppError::Conflict(_)) => {
                let existing = self.repo.find_by_title(user_id, title).await?.ok_or_not_found("tag")?;
                Ok(CreateOutcome::AlreadyExists(existing.id))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<Tag>> {
        self.repo.get_all(user_id).await
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Tag> {
        self.repo.get_by_id(user_id, id).await?.ok_or_not_found("tag")
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, title: Option<&str>) -> AppResult<()> {
        require_non_blank(title, "title")?;
        let title = title.unwrap_or_default().trim();
        if let Some(existing) = self.repo.find_by_title(user_id, title).await? {
            if existing.id != id {
                return Err(AppError::Conflict("tag already exists".to_string()));
            }
        }
        ensure_affected(self.repo.update(user_id, id, title).await?, "tag")
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        ensure_affected(self.repo.delete(user_id, id).await?, "tag")
    }
}
