//! SQLite backend via diesel.

use super::{KeyValueBackend, StoreError, schema};
use chrono::{NaiveDateTime, Utc};
use derive_new::new;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Insertable row for the key/value table.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::kv_entries)]
struct KvEntry {
    key: String,
    value: String,
    updated_at: NaiveDateTime,
}

/// Stores values in a single SQLite table.
///
/// A connection is opened per operation, so the path must name a file;
/// `":memory:"` would hand each call its own empty database.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db_path: String,
}

impl SqliteBackend {
    /// Opens (creating if needed) the database at `db_path` and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path))]
    pub fn open(db_path: impl Into<String>) -> Result<Self, StoreError> {
        let backend = Self {
            db_path: db_path.into(),
        };
        let mut conn = backend.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Failed to run migrations: {}", e)))?;
        info!(path = %backend.db_path, applied = applied.len(), "SQLite store ready");
        Ok(backend)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }
}

impl KeyValueBackend for SqliteBackend {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;
        let value = schema::kv_entries::table
            .find(key)
            .select(schema::kv_entries::value)
            .first::<String>(&mut conn)
            .optional()?;
        debug!(found = value.is_some(), "Read key");
        Ok(value)
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let row = KvEntry::new(key.to_string(), value.to_string(), Utc::now().naive_utc());
        diesel::replace_into(schema::kv_entries::table)
            .values(&row)
            .execute(&mut conn)?;
        debug!("Wrote key");
        Ok(())
    }
}
