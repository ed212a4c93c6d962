//! Filesystem cache store
//!
//! Entries live at `<root>/<domain>/<key>` and are addressed only by their
//! content-derived key. Restore is a read: a present entry is a hit, an
//! absent one a miss. Save replaces the keyed entry with freshly staged
//! content; concurrent writers race last-writer-wins, which is safe because
//! a key collision implies equivalent inputs.

use crate::cache::key::{CacheDomain, CacheKey};
use crate::error::{SlipwayError, SlipwayResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One restored cache entry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub domain: CacheDomain,
    pub key: CacheKey,
    pub path: PathBuf,
}

/// Outcome of a restore
#[derive(Debug, Clone)]
pub enum Restored {
    Hit(CacheEntry),
    Miss,
}

impl Restored {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Cache store rooted at a directory
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Path of the entry for a domain/key pair
    pub fn entry_path(&self, domain: CacheDomain, key: &CacheKey) -> PathBuf {
        self.root.join(domain.dir_name()).join(key.as_str())
    }

    /// Staging directory a build writes fresh cache content into
    pub fn staging_path(&self, domain: CacheDomain) -> PathBuf {
        self.root.join(domain.dir_name()).join(".staging")
    }

    /// Look up an entry; a miss is not an error
    pub fn restore(&self, domain: CacheDomain, key: &CacheKey) -> Restored {
        let path = self.entry_path(domain, key);
        if path.is_dir() {
            debug!("Cache hit for {} ({})", domain, key);
            Restored::Hit(CacheEntry {
                domain,
                key: key.clone(),
                path,
            })
        } else {
            info!("Cache miss for {} ({}), starting empty", domain, key);
            Restored::Miss
        }
    }

    /// Replace the keyed entry with staged content.
    ///
    /// The previous entry for the key, if any, is overwritten.
    pub fn save(&self, domain: CacheDomain, key: &CacheKey, staged: &Path) -> SlipwayResult<()> {
        if !staged.is_dir() {
            return Err(SlipwayError::CacheSave {
                domain: domain.to_string(),
                reason: format!("no staged content at {}", staged.display()),
            });
        }

        let entry = self.entry_path(domain, key);
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent).map_err(|e| SlipwayError::CacheSave {
                domain: domain.to_string(),
                reason: e.to_string(),
            })?;
        }

        if entry.exists() {
            fs::remove_dir_all(&entry).map_err(|e| SlipwayError::CacheSave {
                domain: domain.to_string(),
                reason: e.to_string(),
            })?;
        }

        fs::rename(staged, &entry).map_err(|e| SlipwayError::CacheSave {
            domain: domain.to_string(),
            reason: e.to_string(),
        })?;

        info!("Saved {} cache as {}", domain, key);
        Ok(())
    }

    /// Remove stored entries, all domains or just one. Returns removed count.
    pub fn clear(&self, domain: Option<CacheDomain>) -> SlipwayResult<usize> {
        let domains: Vec<CacheDomain> = match domain {
            Some(d) => vec![d],
            None => CacheDomain::all().to_vec(),
        };

        let mut removed = 0;
        for d in domains {
            let dir = self.root.join(d.dir_name());
            if !dir.is_dir() {
                continue;
            }
            let entries = fs::read_dir(&dir)
                .map_err(|e| SlipwayError::io(format!("listing cache dir {}", dir.display()), e))?;
            for entry in entries {
                let entry = entry
                    .map_err(|e| SlipwayError::io("reading cache dir entry".to_string(), e))?;
                fs::remove_dir_all(entry.path()).map_err(|e| {
                    SlipwayError::io(format!("removing {}", entry.path().display()), e)
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
