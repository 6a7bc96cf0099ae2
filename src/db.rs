use std::time::Duration;

use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};
use tracing::info;

use crate::config::DatabaseConfig;

/// Creates the SQLite file if needed and opens a pool with per-connection pragmas.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let db_url = &cfg.url;
    crate::config::ensure_sqlite_parent_dir(db_url)?;
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating SQLite database at {}", db_url);
        Sqlite::create_database(db_url).await?;
    }
    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // Cascades on link tables depend on this being set on every connection
                sqlx::query("PRAGMA foreign_keys=ON;").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout=10000;").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(db_url)
        .await?;
    Ok(pool)
}

const TABLES: &[(&str, &str)] = &[
    (
        "user",
        r#"CREATE TABLE IF NOT EXISTS "user" (
            id BLOB PRIMARY KEY,
            image_id BLOB NULL,
            username TEXT NULL,
            first_name TEXT NULL,
            last_name TEXT NULL,
            middle_name TEXT NULL,
            tg_username TEXT NULL,
            mail TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            salt TEXT NOT NULL,
            country TEXT NULL,
            city TEXT NULL,
            company TEXT NULL,
            profession TEXT NULL,
            position TEXT NULL,
            messenger TEXT NULL,
            communication_method TEXT NULL,
            nationality TEXT NULL,
            resident INTEGER NOT NULL DEFAULT 0,
            language TEXT NULL
        )"#,
    ),
    (
        "tag",
        r#"CREATE TABLE IF NOT EXISTS tag (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            user_id BLOB NOT NULL,
            UNIQUE(user_id, title),
            FOREIGN KEY(user_id) REFERENCES "user"(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "friend",
        r#"CREATE TABLE IF NOT EXISTS friend (
            id BLOB PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NULL,
            dob TEXT NULL,
            image_id BLOB NULL,
            user_id BLOB NOT NULL,
            FOREIGN KEY(user_id) REFERENCES "user"(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "work_info",
        r#"CREATE TABLE IF NOT EXISTS work_info (
            id BLOB PRIMARY KEY,
            country TEXT NULL,
            city TEXT NULL,
            company TEXT NULL,
            position TEXT NULL,
            messenger TEXT NULL,
            communication_method TEXT NULL,
            nationality TEXT NULL,
            language TEXT NULL,
            friend_id BLOB NOT NULL UNIQUE,
            FOREIGN KEY(friend_id) REFERENCES friend(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "friendlist",
        r#"CREATE TABLE IF NOT EXISTS friendlist (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NULL,
            color TEXT NULL,
            image_id BLOB NULL,
            user_id BLOB NOT NULL,
            FOREIGN KEY(user_id) REFERENCES "user"(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "friends_tags",
        r#"CREATE TABLE IF NOT EXISTS friends_tags (
            id BLOB PRIMARY KEY,
            friend_id BLOB NOT NULL,
            tag_id BLOB NOT NULL,
            UNIQUE(friend_id, tag_id),
            FOREIGN KEY(friend_id) REFERENCES friend(id) ON DELETE CASCADE,
            FOREIGN KEY(tag_id) REFERENCES tag(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "friendlists_tags",
        r#"CREATE TABLE IF NOT EXISTS friendlists_tags (
            id BLOB PRIMARY KEY,
            friendlist_id BLOB NOT NULL,
            tag_id BLOB NOT NULL,
            UNIQUE(friendlist_id, tag_id),
            FOREIGN KEY(friendlist_id) REFERENCES friendlist(id) ON DELETE CASCADE,
            FOREIGN KEY(tag_id) REFERENCES tag(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "friendlists_friends",
        r#"CREATE TABLE IF NOT EXISTS friendlists_friends (
            id BLOB PRIMARY KEY,
            friendlist_id BLOB NOT NULL,
            friend_id BLOB NOT NULL,
            UNIQUE(friendlist_id, friend_id),
            FOREIGN KEY(friendlist_id) REFERENCES friendlist(id) ON DELETE CASCADE,
            FOREIGN KEY(friend_id) REFERENCES friend(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "event",
        r#"CREATE TABLE IF NOT EXISTS event (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            frequency TEXT NOT NULL,
            user_id BLOB NOT NULL,
            FOREIGN KEY(user_id) REFERENCES "user"(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "friends_events",
        r#"CREATE TABLE IF NOT EXISTS friends_events (
            id BLOB PRIMARY KEY,
            friend_id BLOB NOT NULL,
            event_id BLOB NOT NULL,
            UNIQUE(friend_id, event_id),
            FOREIGN KEY(friend_id) REFERENCES friend(id) ON DELETE CASCADE,
            FOREIGN KEY(event_id) REFERENCES event(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "reminder",
        r#"CREATE TABLE IF NOT EXISTS reminder (
            id BLOB PRIMARY KEY,
            minutes_until_event INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            event_id BLOB NOT NULL,
            user_id BLOB NOT NULL,
            FOREIGN KEY(event_id) REFERENCES event(id) ON DELETE CASCADE,
            FOREIGN KEY(user_id) REFERENCES "user"(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "additional_info_field",
        r#"CREATE TABLE IF NOT EXISTS additional_info_field (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            user_id BLOB NOT NULL,
            FOREIGN KEY(user_id) REFERENCES "user"(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "friends_additional_info_fields",
        r#"CREATE TABLE IF NOT EXISTS friends_additional_info_fields (
            id BLOB PRIMARY KEY,
            friend_id BLOB NOT NULL,
            additional_info_field_id BLOB NOT NULL,
            FOREIGN KEY(friend_id) REFERENCES friend(id) ON DELETE CASCADE,
            FOREIGN KEY(additional_info_field_id) REFERENCES additional_info_field(id) ON DELETE CASCADE
        )"#,
    ),
    (
        "additional_info_field_text",
        r#"CREATE TABLE IF NOT EXISTS additional_info_field_text (
            id BLOB PRIMARY KEY,
            content TEXT NOT NULL,
            additional_info_field_id BLOB NOT NULL,
            friend_id BLOB NOT NULL,
            FOREIGN KEY(additional_info_field_id) REFERENCES additional_info_field(id) ON DELETE CASCADE,
            FOREIGN KEY(friend_id) REFERENCES friend(id) ON DELETE CASCADE
        )"#,
    ),
];

/// Table names in creation order (parents before children).
pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|(name, _)| *name)
}

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;

    for (name, ddl) in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("creating table {} failed: {}", name, e))?;
    }

    let indexes = [
        ("idx_tag_user", "CREATE INDEX IF NOT EXISTS idx_tag_user ON tag(user_id)"),
        ("idx_friend_user", "CREATE INDEX IF NOT EXISTS idx_friend_user ON friend(user_id)"),
        ("idx_friendlist_user", "CREATE INDEX IF NOT EXISTS idx_friendlist_user ON friendlist(user_id)"),
        ("idx_event_user", "CREATE INDEX IF NOT EXISTS idx_event_user ON event(user_id)"),
        ("idx_reminder_event", "CREATE INDEX IF NOT EXISTS idx_reminder_event ON reminder(event_id)"),
        ("idx_reminder_user", "CREATE INDEX IF NOT EXISTS idx_reminder_user ON reminder(user_id)"),
        ("idx_friends_tags_tag", "CREATE INDEX IF NOT EXISTS idx_friends_tags_tag ON friends_tags(tag_id)"),
        (
            "idx_friendlists_friends_friend",
            "CREATE INDEX IF NOT EXISTS idx_friendlists_friends_friend ON friendlists_friends(friend_id)",
        ),
        ("idx_friends_events_event", "CREATE INDEX IF NOT EXISTS idx_friends_events_event ON friends_events(event_id)"),
        (
            "idx_additional_info_field_user",
            "CREATE INDEX IF NOT EXISTS idx_additional_info_field_user ON additional_info_field(user_id)",
        ),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::error!("Failed to create index {}: {}", name, e);
            return Err(anyhow::anyhow!("Index creation failed for {}: {}", name, e));
        }
    }

    Ok(())
}
