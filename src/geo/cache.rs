//! Geocode result cache
//!
//! Keyed by the normalized query. Entries expire after a fixed lifetime
//! (24 hours by default). The cache lives in memory for the lifetime of the
//! process and can optionally be mirrored to a JSON file so that sequential
//! CLI invocations share it.

use crate::config::Config;
use crate::constants::cache::GEOCODE_CACHE_FILE;
use crate::error::Result;
use crate::geo::GeoLocation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::warn;

/// A cached lookup and when it was stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: GeoLocation,
    pub at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        // A timestamp in the future (clock skew) counts as fresh
        now.signed_duration_since(self.at)
            .to_std()
            .map_or(true, |age| age < ttl)
    }
}

/// Geocode cache with expiry
#[derive(Debug)]
pub struct GeocodeCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    path: Option<PathBuf>,
    ttl: Duration,
}

impl GeocodeCache {
    /// Cache that is dropped with the process
    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            path: None,
            ttl,
        }
    }

    /// Cache mirrored to `path`; existing fresh entries are loaded
    pub fn with_path(path: PathBuf, ttl: Duration) -> Self {
        let entries = Self::read_file(&path)
            .into_iter()
            .filter(|(_, entry)| entry.is_fresh(Utc::now(), ttl))
            .collect();

        Self {
            entries: Mutex::new(entries),
            path: Some(path),
            ttl,
        }
    }

    /// Default cache file location
    pub fn default_path() -> Result<PathBuf> {
        Ok(Config::cache_dir()?.join(GEOCODE_CACHE_FILE))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a normalized key
    pub fn get(&self, key: &str) -> Option<GeoLocation> {
        self.get_at(key, Utc::now())
    }

    /// Look up a normalized key as of `now`; expired entries are evicted
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<GeoLocation> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now, self.ttl) => Some(entry.result.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a result under a normalized key
    pub fn insert(&self, key: &str, result: GeoLocation) {
        self.insert_at(key, result, Utc::now());
    }

    pub fn insert_at(&self, key: &str, result: GeoLocation, at: DateTime<Utc>) {
        let snapshot = {
            let mut entries = self.lock();
            entries.insert(key.to_string(), CacheEntry { result, at });
            self.path.as_ref().map(|_| self.fresh_entries(&entries))
        };
        if let (Some(path), Some(snapshot)) = (&self.path, snapshot) {
            Self::write_file(path, &snapshot);
        }
    }

    /// Drop every entry (and the mirror file)
    pub fn clear(&self) {
        self.lock().clear();
        if let Some(path) = &self.path {
            if let Err(e) = Self::discard(path) {
                warn!(path = %path.display(), error = %e, "failed to remove geocode cache");
            }
        }
    }

    /// Remove a mirror file; a missing file is not an error
    pub fn discard(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_file(path: &Path) -> HashMap<String, CacheEntry> {
        let Ok(content) = fs::read_to_string(path) else {
            return HashMap::new();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "discarding unreadable geocode cache");
            HashMap::new()
        })
    }

    fn fresh_entries(&self, entries: &HashMap<String, CacheEntry>) -> HashMap<String, CacheEntry> {
        let now = Utc::now();
        entries
            .iter()
            .filter(|(_, entry)| entry.is_fresh(now, self.ttl))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    // Called without the lock held
    fn write_file(path: &Path, entries: &HashMap<String, CacheEntry>) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        match serde_json::to_string_pretty(entries) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    warn!(path = %path.display(), error = %e, "failed to write geocode cache");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize geocode cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn nyc() -> GeoLocation {
        GeoLocation {
            latitude: 40.7128,
            longitude: -74.0060,
            display_name: Some("New York".to_string()),
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = GeocodeCache::in_memory(DAY);
        let stored = Utc::now();
        cache.insert_at("new york", nyc(), stored);

        let later = stored + ChronoDuration::hours(23);
        assert_eq!(cache.get_at("new york", later), Some(nyc()));
    }

    #[test]
    fn test_expired_entry_evicted() {
        let cache = GeocodeCache::in_memory(DAY);
        let stored = Utc::now();
        cache.insert_at("new york", nyc(), stored);

        let later = stored + ChronoDuration::hours(24);
        assert_eq!(cache.get_at("new york", later), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_file_mirror() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("geocode.json");

        let cache = GeocodeCache::with_path(path.clone(), DAY);
        cache.insert("new york", nyc());
        assert!(path.exists());

        let reloaded = GeocodeCache::with_path(path.clone(), DAY);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("new york"), Some(nyc()));

        reloaded.clear();
        assert!(!path.exists());
        assert!(reloaded.get("new york").is_none());
    }

    #[test]
    fn test_stale_file_entries_skipped_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("geocode.json");

        let cache = GeocodeCache::with_path(path.clone(), DAY);
        cache.insert_at("boston", nyc(), Utc::now() - ChronoDuration::hours(1));

        let reloaded = GeocodeCache::with_path(path, Duration::from_secs(60));
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_discard_removes_mirror() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("geocode.json");

        GeocodeCache::with_path(path.clone(), DAY).insert("new york", nyc());
        assert!(path.exists());

        GeocodeCache::discard(&path).unwrap();
        assert!(!path.exists());
        assert!(GeocodeCache::with_path(path.clone(), DAY).is_empty());

        // Already gone
        GeocodeCache::discard(&path).unwrap();
    }

    #[test]
    fn test_corrupt_file_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("geocode.json");
        fs::write(&path, "not json").unwrap();

        let cache = GeocodeCache::with_path(path, DAY);
        assert!(cache.is_empty());
    }
}
