use std::sync::Arc;

use crate::config::AppConfig;
use crate::images::ImageStore;
use crate::service::Services;

/// The shared application state.
///
/// Cloned into every handler; all fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool, used directly only by the readiness check.
    pub db: sqlx::SqlitePool,
    pub config: Arc<AppConfig>,
    /// Domain services, all sharing `db`.
    pub services: Arc<Services>,
    pub images: ImageStore,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let services = Services::new(db.clone(), &config);
        let images = ImageStore::from_config(&config.images);
        Self { db, config: Arc::new(config), services: Arc::new(services), images }
    }
}
