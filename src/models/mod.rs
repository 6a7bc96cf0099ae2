//! Row types, request payloads and composite read-models.
//!
//! Row types derive `sqlx::FromRow` and mirror the tables created in
//! [`crate::db`]. Payload types are the JSON bodies accepted by the handlers;
//! every optional field is `Option` so partial updates can be turned into a
//! [`crate::repository::FieldMask`].

pub mod additional_field;
pub mod event;
pub mod friend;
pub mod friendlist;
pub mod reminder;
pub mod tag;
pub mod user;

pub use additional_field::{AdditionalField, AdditionalFieldPayload};
pub use event::{
    CreateEventRequest, Event, EventFull, EventFullUpdate, EventUpdate, EventWithFriends, Frequency,
    RemoveFriendsRequest,
};
pub use friend::{
    CreateFriendRequest, Friend, FriendFields, FriendFull, FriendRef, UpdateFriendRequest, WorkInfo,
    WorkInfoFields,
};
pub use friendlist::{
    Friendlist, FriendlistFull, FriendlistPayload, FriendlistWithFriends, FriendlistWithTags,
};
pub use reminder::{Reminder, ReminderDraft, ReminderPayload, ReminderUpdate};
pub use tag::{Tag, TagPayload, TagRef};
pub use user::{Profile, ProfileUpdate, SignInRequest, SignUpRequest, User};
