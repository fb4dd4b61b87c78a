use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::Earthquake;

use super::StoreError;

/// Database directory name under the data dir
pub const DATABASE_NAME: &str = "EarthquakeData";

/// The single collection in the database
pub const COLLECTION_NAME: &str = "earthquakes";

/// On-disk schema version. Opening a file written by a newer version fails.
pub const SCHEMA_VERSION: u32 = 1;

/// Serialized form of the collection
#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    version: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    records: BTreeMap<String, Earthquake>,
}

impl Default for CollectionFile {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            updated_at: None,
            records: BTreeMap::new(),
        }
    }
}

/// Time of the last write to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedAt(pub DateTime<Utc>);

impl CachedAt {
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.0).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Local keyed store of earthquake records.
///
/// Records are keyed by feature `id`; writing a record whose id is already
/// present replaces it. Each public method is one transaction: it holds the
/// store lock for its whole read-modify-write and commits by renaming a
/// fully written temp file over the collection file.
pub struct QuakeStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl QuakeStore {
    /// Open the store under `data_dir`, creating the database if absent
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let db_dir = data_dir.join(DATABASE_NAME);
        std::fs::create_dir_all(&db_dir).map_err(|source| StoreError::Io {
            path: db_dir.clone(),
            source,
        })?;

        let store = Self {
            path: db_dir.join(format!("{}.json", COLLECTION_NAME)),
            lock: Mutex::new(()),
        };

        if store.path.exists() {
            // Validate schema version up front
            let file = store.read()?;
            debug!(path = ?store.path, records = file.records.len(), "Opened earthquake store");
        } else {
            store.write(&CollectionFile::default())?;
            info!(path = ?store.path, "Created earthquake store");
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn begin(&self) -> MutexGuard<'_, ()> {
        // A poisoned lock only means another transaction panicked; the file
        // itself is only ever replaced whole.
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self) -> Result<CollectionFile, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CollectionFile::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let file: CollectionFile =
            serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        if file.version > SCHEMA_VERSION {
            return Err(StoreError::Version {
                found: file.version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(file)
    }

    fn write(&self, file: &CollectionFile) -> Result<(), StoreError> {
        let contents = serde_json::to_string(file).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Upsert a batch of records in one transaction. Returns how many were written.
    pub fn put_all(&self, records: &[Earthquake]) -> Result<usize, StoreError> {
        let _tx = self.begin();
        let mut file = self.read()?;
        for record in records {
            file.records.insert(record.id.clone(), record.clone());
        }
        file.version = SCHEMA_VERSION;
        file.updated_at = Some(Utc::now());
        self.write(&file)?;

        debug!(written = records.len(), total = file.records.len(), "Upserted earthquakes");
        Ok(records.len())
    }

    /// Upsert a single record
    pub fn put(&self, record: &Earthquake) -> Result<(), StoreError> {
        self.put_all(std::slice::from_ref(record)).map(|_| ())
    }

    pub fn get(&self, id: &str) -> Result<Option<Earthquake>, StoreError> {
        let _tx = self.begin();
        Ok(self.read()?.records.remove(id))
    }

    /// Every stored record, in key order
    pub fn get_all(&self) -> Result<Vec<Earthquake>, StoreError> {
        let _tx = self.begin();
        Ok(self.read()?.records.into_values().collect())
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let _tx = self.begin();
        Ok(self.read()?.records.len())
    }

    /// Remove every record
    pub fn clear(&self) -> Result<(), StoreError> {
        let _tx = self.begin();
        let file = CollectionFile {
            updated_at: Some(Utc::now()),
            ..CollectionFile::default()
        };
        self.write(&file)?;
        info!("Cleared earthquake store");
        Ok(())
    }

    /// When the collection was last written, if ever
    pub fn last_written(&self) -> Result<Option<CachedAt>, StoreError> {
        let _tx = self.begin();
        Ok(self.read()?.updated_at.map(CachedAt))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::earthquake::tests::quake;
    use chrono::Duration;

    fn open_temp() -> (tempfile::TempDir, QuakeStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = QuakeStore::open(dir.path()).expect("store opens");
        (dir, store)
    }

    #[test]
    fn test_open_creates_database() {
        let (dir, store) = open_temp();
        assert!(dir.path().join(DATABASE_NAME).join("earthquakes.json").exists());
        assert_eq!(store.count().expect("count"), 0);
        assert_eq!(store.last_written().expect("read"), None);
    }

    #[test]
    fn test_upsert_same_id_keeps_latest() {
        let (_dir, store) = open_temp();
        store.put(&quake("ci1", Some("ml"), Some(1.0))).expect("put");
        store.put(&quake("ci1", Some("mw"), Some(3.4))).expect("put");

        let all = store.get_all().expect("get_all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].mag_type(), Some("mw"));
        assert_eq!(all[0].properties.mag, Some(3.4));
    }

    #[test]
    fn test_get_all_is_key_ordered() {
        let (_dir, store) = open_temp();
        store
            .put_all(&[quake("us3", None, None), quake("ak1", None, None), quake("nc2", None, None)])
            .expect("put_all");

        let ids: Vec<String> = store.get_all().expect("get_all").into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["ak1", "nc2", "us3"]);
        assert_eq!(store.get("nc2").expect("get").map(|q| q.id).as_deref(), Some("nc2"));
        assert_eq!(store.get("missing").expect("get"), None);
    }

    #[test]
    fn test_clear_then_query_is_empty() {
        let (_dir, store) = open_temp();
        store.put_all(&[quake("a", Some("md"), None), quake("b", Some("ml"), None)]).expect("put_all");
        store.clear().expect("clear");
        assert!(store.get_all().expect("get_all").is_empty());
    }

    #[test]
    fn test_records_persist_across_open() {
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let store = QuakeStore::open(dir.path()).expect("store opens");
            store.put(&quake("hv9", Some("md"), Some(2.2))).expect("put");
        }
        let reopened = QuakeStore::open(dir.path()).expect("store reopens");
        assert_eq!(reopened.count().expect("count"), 1);
        assert!(reopened.last_written().expect("read").is_some());
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db = dir.path().join(DATABASE_NAME);
        std::fs::create_dir_all(&db).expect("mkdir");
        std::fs::write(db.join("earthquakes.json"), r#"{"version": 99, "records": {}}"#).expect("write");

        assert!(matches!(
            QuakeStore::open(dir.path()),
            Err(StoreError::Version { found: 99, supported: SCHEMA_VERSION })
        ));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db = dir.path().join(DATABASE_NAME);
        std::fs::create_dir_all(&db).expect("mkdir");
        std::fs::write(db.join("earthquakes.json"), "{not json").expect("write");

        assert!(matches!(QuakeStore::open(dir.path()), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_cached_at_age_display() {
        assert_eq!(CachedAt(Utc::now()).age_display(), "just now");
        assert_eq!(CachedAt(Utc::now() - Duration::minutes(5)).age_display(), "5m ago");
        assert_eq!(CachedAt(Utc::now() - Duration::minutes(95)).age_display(), "2h ago");
        assert_eq!(CachedAt(Utc::now() - Duration::days(3)).age_display(), "3d ago");
        // Clock skew
        assert_eq!(CachedAt(Utc::now() + Duration::minutes(10)).age_display(), "just now");
    }
}
