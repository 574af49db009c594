use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::error::OverlayError;
use crate::hotkey::HotkeyBinding;

pub const DB_FILE: &str = "overlay.db";

/// Settings key holding the user's trigger accelerator.
pub const TRIGGER_KEY: &str = "launcher_trigger";

/// Persists the user's choices across restarts.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load_trigger(&self) -> Result<Option<String>, OverlayError>;

    async fn save_trigger(&self, accelerator: &str) -> Result<(), OverlayError>;
}

/// SQLite-backed store using a single key/value `settings` table.
#[derive(Clone)]
pub struct SqlitePreferences {
    pool: SqlitePool,
}

impl SqlitePreferences {
    /// Open (creating if needed) the database file inside `dir`.
    pub async fn open(dir: &Path) -> Result<Self, OverlayError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| OverlayError::Config(format!("{}: {e}", dir.display())))?;
        let options = SqliteConnectOptions::new()
            .filename(dir.join(DB_FILE))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Non-persistent store, used when the database file cannot be opened.
    pub async fn in_memory() -> Result<Self, OverlayError> {
        // The database lives only as long as its single connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if it is missing.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, OverlayError> {
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferences {
    async fn load_trigger(&self) -> Result<Option<String>, OverlayError> {
        get_setting_inner(&self.pool, TRIGGER_KEY).await
    }

    async fn save_trigger(&self, accelerator: &str) -> Result<(), OverlayError> {
        set_setting_inner(&self.pool, TRIGGER_KEY, accelerator).await
    }
}

/// Read the stored trigger, falling back to the default binding when none was
/// saved or the stored value no longer parses.
pub async fn load_binding(store: &dyn PreferenceStore) -> HotkeyBinding {
    match store.load_trigger().await {
        Ok(Some(accelerator)) => match HotkeyBinding::parse(&accelerator) {
            Ok(binding) => binding,
            Err(e) => {
                tracing::warn!("stored trigger ignored: {e}");
                HotkeyBinding::default()
            }
        },
        Ok(None) => HotkeyBinding::default(),
        Err(e) => {
            tracing::warn!("failed to read stored trigger: {e}");
            HotkeyBinding::default()
        }
    }
}

async fn ensure_schema(pool: &SqlitePool) -> Result<(), OverlayError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn get_setting_inner(pool: &SqlitePool, key: &str) -> Result<Option<String>, OverlayError> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = ?1")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.get("value")))
}

async fn set_setting_inner(pool: &SqlitePool, key: &str, value: &str) -> Result<(), OverlayError> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tauri_plugin_global_shortcut::{Code, Modifiers};

    async fn memory_store() -> SqlitePreferences {
        SqlitePreferences::in_memory()
            .await
            .expect("Failed to create in-memory pool")
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("grok-overlay-{tag}-{}-{nanos}", std::process::id()))
    }

    #[tokio::test]
    async fn test_fresh_store_has_no_trigger() {
        let store = memory_store().await;
        assert_eq!(store.load_trigger().await.unwrap(), None);
        assert_eq!(load_binding(&store).await, HotkeyBinding::default());
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let store = memory_store().await;
        store.save_trigger("ctrl+KeyG").await.unwrap();
        store.save_trigger("shift+alt+KeyK").await.unwrap();

        assert_eq!(
            store.load_trigger().await.unwrap(),
            Some("shift+alt+KeyK".to_string())
        );
    }

    #[tokio::test]
    async fn test_unparseable_stored_trigger_falls_back_to_default() {
        let store = memory_store().await;
        store.save_trigger("definitely not a key").await.unwrap();
        assert_eq!(load_binding(&store).await, HotkeyBinding::default());
    }

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let store = memory_store().await;
        store.save_trigger("ctrl+KeyG").await.unwrap();
        let again = SqlitePreferences::with_pool(store.pool.clone()).await.unwrap();
        assert_eq!(again.load_trigger().await.unwrap(), Some("ctrl+KeyG".into()));
    }

    #[tokio::test]
    async fn test_saved_binding_survives_restart() {
        let dir = temp_dir("restart");
        let chosen = HotkeyBinding::new(Modifiers::CONTROL | Modifiers::SHIFT, Code::KeyO);

        let first = SqlitePreferences::open(&dir).await.unwrap();
        assert_eq!(load_binding(&first).await, HotkeyBinding::default());
        first.save_trigger(&chosen.accelerator()).await.unwrap();
        first.close().await;

        let second = SqlitePreferences::open(&dir).await.unwrap();
        assert_eq!(load_binding(&second).await, chosen);
        second.close().await;

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
