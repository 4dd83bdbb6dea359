use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::ast::node::SquigglyNode;
use crate::error::{CacheSpecError, ParseError};

/// Cache sizing and expiry policy.
///
/// Parseable from a `key=value` list for configuration surfaces:
/// `"max_entries=4096,ttl=30s"`. A `max_entries` of zero disables caching
/// entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSpec {
    pub max_entries: usize,
    pub ttl: Option<Duration>,
}

impl Default for CacheSpec {
    fn default() -> Self {
        CacheSpec {
            max_entries: 1024,
            ttl: None,
        }
    }
}

impl FromStr for CacheSpec {
    type Err = CacheSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = CacheSpec::default();

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| CacheSpecError::MalformedEntry(entry.to_string()))?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "max_entries" => {
                    spec.max_entries = value.parse().map_err(|_| CacheSpecError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
                }
                "ttl" => {
                    spec.ttl = Some(parse_duration(value).ok_or_else(|| {
                        CacheSpecError::InvalidValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        }
                    })?);
                }
                _ => return Err(CacheSpecError::UnknownKey(key.to_string())),
            }
        }

        Ok(spec)
    }
}

/// `"500ms"`, `"30s"`, `"5m"`; a bare number means seconds.
fn parse_duration(value: &str) -> Option<Duration> {
    let (digits, unit) = match value.find(|c: char| !c.is_ascii_digit()) {
        Some(index) => value.split_at(index),
        None => (value, "s"),
    };
    let amount: u64 = digits.parse().ok()?;
    match unit {
        "ms" => Some(Duration::from_millis(amount)),
        "s" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_secs(amount * 60)),
        _ => None,
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

struct CacheEntry {
    nodes: Arc<Vec<SquigglyNode>>,
    inserted: Instant,
}

/// Bounded, optionally expiring map from filter source text to its compiled
/// node list. Shared across threads behind a read-write lock; compiled lists
/// are handed out by `Arc` so readers never block on each other's results.
pub struct FilterCache {
    spec: CacheSpec,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl FilterCache {
    pub fn new(spec: CacheSpec) -> Self {
        FilterCache {
            spec,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Fetches a compiled filter. An expired entry counts as a miss; it is
    /// swept out on the next insert rather than here, keeping the read path
    /// on the shared lock.
    pub fn get(&self, key: &str) -> Result<Option<Arc<Vec<SquigglyNode>>>, ParseError> {
        if self.spec.max_entries == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        let entries = self
            .entries
            .read()
            .map_err(|_| ParseError::Structural("filter cache lock poisoned".to_string()))?;

        match entries.get(key) {
            Some(entry) if !self.expired(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(Arc::clone(&entry.nodes)))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    /// Stores a compiled filter, sweeping expired entries and evicting the
    /// oldest entry when full.
    pub fn insert(&self, key: String, nodes: Arc<Vec<SquigglyNode>>) -> Result<(), ParseError> {
        if self.spec.max_entries == 0 {
            return Ok(());
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| ParseError::Structural("filter cache lock poisoned".to_string()))?;

        if self.spec.ttl.is_some() {
            let before = entries.len();
            entries.retain(|_, entry| !self.expired(entry));
            let swept = before - entries.len();
            if swept > 0 {
                self.evictions.fetch_add(swept as u64, Ordering::Relaxed);
                log::debug!("swept {} expired filter cache entries", swept);
            }
        }

        if !entries.contains_key(&key) && entries.len() >= self.spec.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                log::debug!("evicted filter cache entry for '{}'", oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                nodes,
                inserted: Instant::now(),
            },
        );
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        let entries = match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(_) => 0,
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries,
        }
    }

    fn expired(&self, entry: &CacheEntry) -> bool {
        match self.spec.ttl {
            Some(ttl) => entry.inserted.elapsed() >= ttl,
            None => false,
        }
    }
}

impl Default for FilterCache {
    fn default() -> Self {
        FilterCache::new(CacheSpec::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_spec_parses() {
        let spec: CacheSpec = "max_entries=64,ttl=30s".parse().unwrap();
        assert_eq!(spec.max_entries, 64);
        assert_eq!(spec.ttl, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_cache_spec_rejects_unknown_key() {
        let err = "capacity=64".parse::<CacheSpec>().unwrap_err();
        assert_eq!(err, CacheSpecError::UnknownKey("capacity".to_string()));
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_duration("10h"), None);
    }
}
