//! Integration and unit tests for the Friendly application.
//!
//! The API tests drive the real router (all layers included) over a SQLite
//! file in a temporary directory, one database per test.
//!
//! ## Test Modules
//!
//! - **support**: test application setup and request helpers
//! - **api_tests**: auth, ownership and entity endpoints
//! - **event_api_tests**: events, attendees, reminders and the birthday event
//! - **image_tests**: multipart upload and resized delivery
//! - **health_api_tests**: liveness and readiness checks, version and response headers
//! - **error_tests**: status mapping and error conversions
//! - **config_tests**: configuration defaults, layering and validation
//! - **db_tests**: schema creation and cascades
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test api_tests
//! ```

pub mod error_tests;
pub mod event_api_tests;
pub mod image_tests;
pub mod support;
