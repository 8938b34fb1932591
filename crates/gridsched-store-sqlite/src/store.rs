// crates/gridsched-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Collaborator Stores
// Description: Durable device, source, and computed-value stores over SQLite.
// Purpose: Persist last-known device state and schedule series with
//          transactional writes.
// Dependencies: gridsched-core, rusqlite, thiserror, time
// ============================================================================

//! ## Overview
//! One database file holds three tables: `devices` for last-known event
//! state, `sources` for computation-source labels, and `computed_values`
//! for schedule series. Datetimes are stored as unix seconds; the 15-minute
//! grid makes second precision lossless. `commit_event` runs in a single
//! transaction so the three last-known fields never diverge.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use gridsched_core::AssetId;
use gridsched_core::ComputedValue;
use gridsched_core::Device;
use gridsched_core::DeviceStore;
use gridsched_core::DeviceUpdate;
use gridsched_core::EventId;
use gridsched_core::SourceDirectory;
use gridsched_core::SourceId;
use gridsched_core::StoreError;
use gridsched_core::TimeSeriesStore;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` collaborator stores.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config with default pragmas for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw device or series payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable collaborator stores over one `SQLite` database.
///
/// # Invariants
/// - All access serializes through one connection behind a mutex.
/// - `commit_event` updates the three last-known fields atomically.
pub struct SqliteStore {
    /// Single write-capable connection.
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or the schema version does not match.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Mutex::new(connection) })
    }

    /// Inserts or replaces a device record.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_device(&self, device: &Device) -> Result<(), SqliteStoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT OR REPLACE INTO devices
                 (asset_id, device_type, last_event_datetime, last_event_id, last_soc_mwh)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    encode_id(device.asset_id.get())?,
                    device.device_type,
                    device.last_event_datetime.map(OffsetDateTime::unix_timestamp),
                    device.last_event_id.map(EventId::get).map(encode_id).transpose()?,
                    device.last_soc_mwh,
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Registers a computation source under a label.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn register_source(
        &self,
        label: &str,
        source_id: SourceId,
    ) -> Result<(), SqliteStoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT OR REPLACE INTO sources (label, source_id) VALUES (?1, ?2)",
                params![label, encode_id(source_id.get())?],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Inserts computed values, replacing rows on the same grid point.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn insert_values(&self, rows: &[ComputedValue]) -> Result<(), SqliteStoreError> {
        let mut connection = self.lock()?;
        let tx =
            connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        for row in rows {
            tx.execute(
                "INSERT OR REPLACE INTO computed_values
                 (asset_id, source_id, datetime, value_mw)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    encode_id(row.asset_id.get())?,
                    encode_id(row.source_id.get())?,
                    row.datetime.unix_timestamp(),
                    row.value_mw,
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Locks the connection, failing closed on poison.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|err| SqliteStoreError::Db(err.to_string()))
    }
}

impl DeviceStore for SqliteStore {
    fn get(&self, asset_id: AssetId) -> Result<Option<Device>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let row = connection
            .query_row(
                "SELECT device_type, last_event_datetime, last_event_id, last_soc_mwh
                 FROM devices WHERE asset_id = ?1",
                params![encode_id(asset_id.get()).map_err(StoreError::from)?],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|err| StoreError::Store(err.to_string()))?;
        let Some((device_type, datetime, event_id, soc_mwh)) = row else {
            return Ok(None);
        };
        Ok(Some(Device {
            asset_id,
            device_type,
            last_event_datetime: datetime.map(decode_datetime).transpose()?,
            last_event_id: event_id.map(decode_event_id).transpose()?,
            last_soc_mwh: soc_mwh,
        }))
    }

    fn commit_event(&self, asset_id: AssetId, update: &DeviceUpdate) -> Result<(), StoreError> {
        let mut connection = self.lock().map_err(StoreError::from)?;
        let tx = connection
            .transaction()
            .map_err(|err| StoreError::Store(err.to_string()))?;
        let changed = tx
            .execute(
                "UPDATE devices
                 SET last_event_datetime = ?2, last_event_id = ?3, last_soc_mwh = ?4
                 WHERE asset_id = ?1",
                params![
                    encode_id(asset_id.get()).map_err(StoreError::from)?,
                    update.datetime.unix_timestamp(),
                    encode_id(update.event_id.get()).map_err(StoreError::from)?,
                    update.soc_mwh,
                ],
            )
            .map_err(|err| StoreError::Store(err.to_string()))?;
        if changed != 1 {
            return Err(StoreError::Invalid(format!("no device for asset {asset_id}")));
        }
        tx.commit().map_err(|err| StoreError::Store(err.to_string()))?;
        Ok(())
    }
}

impl SourceDirectory for SqliteStore {
    fn lookup(&self, label: &str) -> Result<Option<SourceId>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let raw = connection
            .query_row(
                "SELECT source_id FROM sources WHERE label = ?1",
                params![label],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(|err| StoreError::Store(err.to_string()))?;
        raw.map(decode_source_id).transpose()
    }
}

impl TimeSeriesStore for SqliteStore {
    fn query(
        &self,
        asset_id: AssetId,
        source_id: SourceId,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<ComputedValue>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let mut statement = connection
            .prepare(
                "SELECT datetime, value_mw FROM computed_values
                 WHERE asset_id = ?1 AND source_id = ?2 AND datetime >= ?3 AND datetime < ?4
                 ORDER BY datetime ASC",
            )
            .map_err(|err| StoreError::Store(err.to_string()))?;
        let mapped = statement
            .query_map(
                params![
                    encode_id(asset_id.get()).map_err(StoreError::from)?,
                    encode_id(source_id.get()).map_err(StoreError::from)?,
                    from.unix_timestamp(),
                    to.unix_timestamp(),
                ],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)),
            )
            .map_err(|err| StoreError::Store(err.to_string()))?;
        let mut rows = Vec::new();
        for item in mapped {
            let (datetime, value_mw) =
                item.map_err(|err| StoreError::Store(err.to_string()))?;
            rows.push(ComputedValue {
                asset_id,
                source_id,
                datetime: decode_datetime(datetime)?,
                value_mw,
            });
        }
        Ok(rows)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Creates the parent directory for the database file if needed.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS devices (
                    asset_id INTEGER NOT NULL PRIMARY KEY,
                    device_type TEXT NOT NULL,
                    last_event_datetime INTEGER,
                    last_event_id INTEGER,
                    last_soc_mwh REAL
                );
                CREATE TABLE IF NOT EXISTS sources (
                    label TEXT NOT NULL PRIMARY KEY,
                    source_id INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS computed_values (
                    asset_id INTEGER NOT NULL,
                    source_id INTEGER NOT NULL,
                    datetime INTEGER NOT NULL,
                    value_mw REAL NOT NULL,
                    PRIMARY KEY (asset_id, source_id, datetime)
                );
                CREATE INDEX IF NOT EXISTS idx_computed_values_window
                    ON computed_values (asset_id, source_id, datetime);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Encodes an unsigned identifier into the signed column type.
fn encode_id(value: u64) -> Result<i64, SqliteStoreError> {
    i64::try_from(value)
        .map_err(|_| SqliteStoreError::Invalid(format!("identifier out of range: {value}")))
}

/// Decodes a stored unix timestamp back into a datetime.
fn decode_datetime(value: i64) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::from_unix_timestamp(value)
        .map_err(|err| StoreError::Invalid(format!("stored datetime out of range: {err}")))
}

/// Decodes a stored event identifier.
fn decode_event_id(value: i64) -> Result<EventId, StoreError> {
    let raw = u64::try_from(value)
        .map_err(|_| StoreError::Invalid(format!("stored event id out of range: {value}")))?;
    Ok(EventId::new(raw))
}

/// Decodes a stored source identifier.
fn decode_source_id(value: i64) -> Result<SourceId, StoreError> {
    let raw = u64::try_from(value)
        .map_err(|_| StoreError::Invalid(format!("stored source id out of range: {value}")))?;
    SourceId::from_raw(raw)
        .ok_or_else(|| StoreError::Invalid("stored source id must be nonzero".to_string()))
}
