use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::FieldMask;

/// Full `user` row including credentials. Never serialized; see [`Profile`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub image_id: Option<Uuid>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub tg_username: Option<String>,
    pub mail: String,
    pub password_hash: String,
    pub salt: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub profession: Option<String>,
    pub position: Option<String>,
    pub messenger: Option<String>,
    pub communication_method: Option<String>,
    pub nationality: Option<String>,
    pub resident: bool,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub image_id: Option<Uuid>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub tg_username: Option<String>,
    pub mail: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub profession: Option<String>,
    pub position: Option<String>,
    pub messenger: Option<String>,
    pub communication_method: Option<String>,
    pub nationality: Option<String>,
    pub resident: bool,
    pub language: Option<String>,
}

impl From<User> for Profile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            image_id: u.image_id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            middle_name: u.middle_name,
            tg_username: u.tg_username,
            mail: u.mail,
            country: u.country,
            city: u.city,
            company: u.company,
            profession: u.profession,
            position: u.position,
            messenger: u.messenger,
            communication_method: u.communication_method,
            nationality: u.nationality,
            resident: u.resident,
            language: u.language,
        }
    }
}

/// Profile columns shared by sign-up and profile update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub image_id: Option<Uuid>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub tg_username: Option<String>,
    pub mail: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub company: Option<String>,
    pub profession: Option<String>,
    pub position: Option<String>,
    pub messenger: Option<String>,
    pub communication_method: Option<String>,
    pub nationality: Option<String>,
    pub resident: Option<bool>,
    pub language: Option<String>,
}

impl ProfileUpdate {
    pub fn field_mask(&self) -> FieldMask {
        let mut mask = FieldMask::new();
        mask.set_opt("image_id", self.image_id)
            .set_opt("username", self.username.clone())
            .set_opt("first_name", self.first_name.clone())
            .set_opt("last_name", self.last_name.clone())
            .set_opt("middle_name", self.middle_name.clone())
            .set_opt("tg_username", self.tg_username.clone())
            .set_opt("mail", self.mail.clone())
            .set_opt("country", self.country.clone())
            .set_opt("city", self.city.clone())
            .set_opt("company", self.company.clone())
            .set_opt("profession", self.profession.clone())
            .set_opt("position", self.position.clone())
            .set_opt("messenger", self.messenger.clone())
            .set_opt("communication_method", self.communication_method.clone())
            .set_opt("nationality", self.nationality.clone())
            .set_opt("resident", self.resident)
            .set_opt("language", self.language.clone());
        mask
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileUpdate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub mail: Option<String>,
    pub password: Option<String>,
}
