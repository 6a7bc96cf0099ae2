//! Domain services, one per entity.
//!
//! Services validate payloads, translate them into repository calls and turn
//! zero-row results into `NotFound`. The only domain rules live in
//! [`event`]: frequency validation, the default end date and the birthday
//! event derived from a friend's date of birth.

pub mod additional_field;
pub mod auth;
pub mod event;
pub mod friend;
pub mod friendlist;
pub mod reminder;
pub mod tag;
pub mod user;

use sqlx::SqlitePool;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::repository::{
    AdditionalFieldRepository, EventRepository, FriendRepository, FriendlistRepository, ReminderRepository,
    TagRepository, UserRepository,
};

pub use additional_field::AdditionalFieldService;
pub use auth::AuthService;
pub use event::{next_birthday, EventService};
pub use friend::FriendService;
pub use friendlist::FriendlistService;
pub use reminder::ReminderService;
pub use tag::{CreateOutcome, TagService};
pub use user::UserService;

/// All services, wired to one pool.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub tags: TagService,
    pub friends: FriendService,
    pub friendlists: FriendlistService,
    pub events: EventService,
    pub reminders: ReminderService,
    pub additional_fields: AdditionalFieldService,
}

impl Services {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let users = UserRepository::new(pool.clone());
        let friends = FriendRepository::new(pool.clone());
        Self {
            auth: AuthService::new(users.clone(), TokenService::from_config(&config.auth), config.auth.bcrypt_cost),
            users: UserService::new(users),
            tags: TagService::new(TagRepository::new(pool.clone())),
            friends: FriendService::new(friends.clone()),
            friendlists: FriendlistService::new(FriendlistRepository::new(pool.clone()), friends),
            events: EventService::new(EventRepository::new(pool.clone())),
            reminders: ReminderService::new(ReminderRepository::new(pool.clone())),
            additional_fields: AdditionalFieldService::new(AdditionalFieldRepository::new(pool)),
        }
    }
}
