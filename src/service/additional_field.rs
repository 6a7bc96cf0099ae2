use uuid::Uuid;

use crate::error::{ensure_affected, validation::require_non_blank, AppResult, OptionExt};
use crate::models::AdditionalField;
use crate::repository::AdditionalFieldRepository;

#[derive(Clone)]
pub struct AdditionalFieldService {
    repo: AdditionalFieldRepository,
}

impl AdditionalFieldService {
    pub fn new(repo: AdditionalFieldRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Uuid, title: Option<&str>) -> AppResult<Uuid> {
        require_non_blank(title, "title")?;
        self.repo.create(user_id, title.unwrap_or_default().trim()).await
    }

    pub async fn get_all(&self, user_id: Uuid) -> AppResult<Vec<AdditionalField>> {
        self.repo.get_all(user_id).await
    }

    pub async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<AdditionalField> {
        self.repo.get_by_id(user_id, id).await?.ok_or_not_found("additional field")
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, title: Option<&str>) -> AppResult<()> {
        require_non_blank(title, "title")?;
        let rows = self.repo.update(user_id, id, title.unwrap_or_default().trim()).await?;
        ensure_affected(rows, "additional field")
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        ensure_affected(self.repo.delete(user_id, id).await?, "additional field")
    }
}
