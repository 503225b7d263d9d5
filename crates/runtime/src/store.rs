use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

use crate::inputs::RawInputs;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub const SETTINGS_KEY: &str = "futures_calculator_settings_v2";
pub const SETTINGS_EXPIRY_DAYS: i64 = 20;
const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    InvalidKey(String),
    Poisoned,
    Encode(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "settings store I/O failed: {err}"),
            Self::InvalidKey(key) => {
                write!(f, "settings key {key:?} must be ASCII letters, digits, '-' or '_'")
            }
            Self::Poisoned => write!(f, "settings store lock is poisoned"),
            Self::Encode(err) => write!(f, "settings snapshot could not be encoded: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidKey(_) => None,
            Self::Poisoned => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// String key-value storage where each record is read or replaced as a whole.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per record under `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        fs::create_dir_all(&self.dir)?;

        // Readers see either the old record or the new one, never a partial write.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSettings {
    timestamp: i64,
    settings: RawInputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiryInfo {
    #[serde(with = "iso_date")]
    pub expires_on: Date,
    pub remaining_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoredSettings {
    pub settings: RawInputs,
    pub saved_at_ms: i64,
    pub expiry: ExpiryInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Absent,
    Expired { saved_at_ms: i64 },
    Unreadable(String),
    Restored(RestoredSettings),
}

pub fn unix_millis(moment: OffsetDateTime) -> i64 {
    i64::try_from(moment.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

pub fn save_settings(
    store: &dyn KeyValueStore,
    settings: &RawInputs,
    now: OffsetDateTime,
) -> Result<i64, StoreError> {
    let timestamp = unix_millis(now);
    let payload = serde_json::to_string(&StoredSettings {
        timestamp,
        settings: settings.clone(),
    })
    .map_err(StoreError::Encode)?;

    store.set(SETTINGS_KEY, &payload)?;
    debug!(timestamp, "settings snapshot written");
    Ok(timestamp)
}

fn expiry_info(saved_at_ms: i64, now: OffsetDateTime) -> Option<ExpiryInfo> {
    let expires_at_ms = saved_at_ms.checked_add(SETTINGS_EXPIRY_DAYS * MILLIS_PER_DAY)?;
    let expires_at =
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(expires_at_ms) * 1_000_000).ok()?;
    let remaining_ms = expires_at_ms.saturating_sub(unix_millis(now)).max(0);

    Some(ExpiryInfo {
        expires_on: expires_at.checked_to_offset(now.offset())?.date(),
        remaining_days: (remaining_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY,
    })
}

/// Reads the stored snapshot. Expired records are removed; unparseable ones are reported,
/// never raised.
pub fn load_settings(store: &dyn KeyValueStore, now: OffsetDateTime) -> LoadOutcome {
    let raw = match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return LoadOutcome::Absent,
        Err(err) => return LoadOutcome::Unreadable(err.to_string()),
    };

    let stored: StoredSettings = match serde_json::from_str(&raw) {
        Ok(stored) => stored,
        Err(err) => return LoadOutcome::Unreadable(err.to_string()),
    };

    let age_ms = unix_millis(now).saturating_sub(stored.timestamp);
    if age_ms > SETTINGS_EXPIRY_DAYS * MILLIS_PER_DAY {
        if let Err(err) = store.remove(SETTINGS_KEY) {
            warn!(error = %err, "expired settings snapshot could not be removed");
        }
        return LoadOutcome::Expired {
            saved_at_ms: stored.timestamp,
        };
    }

    match expiry_info(stored.timestamp, now) {
        Some(expiry) => LoadOutcome::Restored(RestoredSettings {
            settings: stored.settings,
            saved_at_ms: stored.timestamp,
            expiry,
        }),
        None => LoadOutcome::Unreadable(format!(
            "timestamp {} is out of range",
            stored.timestamp
        )),
    }
}
