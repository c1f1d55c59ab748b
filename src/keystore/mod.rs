//! Content-addressed storage for RSA key records.
//!
//! Every record is persisted as `<sha256-hex>.json`, where the stem is the
//! hash of the record's trimmed canonical serialization. Two independently
//! obtained copies of the same key therefore collapse to the same file
//! name, and the store is verifiable by recomputing the hash and comparing
//! it to the file name. Files that fail to parse or validate are
//! quarantined in place by appending `.invalid`, so an operator can
//! inspect them later without them polluting future loads.
//!
//! All multi-file operations are best-effort per item: one corrupt or
//! locked file never prevents progress on the rest. None of this is safe
//! under concurrent invocation from multiple processes - a purge racing a
//! save can interleave deletions and writes - so callers introducing
//! concurrency must serialize access themselves.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::Result;
use crate::models::RsaKeyRecord;

/// Extension of live key record files.
pub const KEY_FILE_EXT: &str = "json";

/// Extension appended to quarantined files.
pub const QUARANTINE_EXT: &str = "invalid";

/// Result of scanning the storage directory.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Successfully parsed and validated records. Order is not significant.
    pub keys: Vec<RsaKeyRecord>,
    /// Files renamed aside because they were unparsable or invalid.
    pub quarantined: Vec<PathBuf>,
    /// Bad files left in place because the quarantine rename itself failed.
    pub skipped: Vec<PathBuf>,
}

/// Result of merging records into the store.
#[derive(Debug, Default)]
pub struct SaveOutcome {
    /// Files written this pass, named by content hash.
    pub written: Vec<PathBuf>,
    /// Incoming records dropped because an equal record already exists.
    pub deduplicated: usize,
    /// Incoming records dropped because they failed validation.
    pub rejected: usize,
    /// Files removed by a purge.
    pub purged: usize,
    /// Per-item delete or write failures that were tolerated.
    pub failed: usize,
}

/// A key ring rooted at one storage directory.
///
/// The directory comes from the resolved settings
/// ([`Settings::key_storage_dir`](crate::config::Settings::key_storage_dir));
/// the store never re-runs settings resolution itself.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Create a store over the given directory. The directory does not
    /// need to exist yet; a missing directory is an empty store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scan the storage directory.
    ///
    /// A missing directory is an empty result - a first run has no keys
    /// yet. Each bad file is quarantined (or, if even the rename fails,
    /// skipped); loading never aborts because of one file.
    pub fn load(&self) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(outcome),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(KEY_FILE_EXT) {
                continue;
            }
            match read_record(&path) {
                Some(key) => outcome.keys.push(key),
                None => self.quarantine(path, &mut outcome),
            }
        }

        debug!(
            dir = %self.dir.display(),
            keys = outcome.keys.len(),
            quarantined = outcome.quarantined.len(),
            "key store loaded"
        );
        Ok(outcome)
    }

    /// Find a stored record whose fingerprint starts with `prefix`.
    pub fn find(&self, prefix: &str) -> Result<Option<RsaKeyRecord>> {
        for key in self.load()?.keys {
            if key.fingerprint()?.starts_with(prefix) {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    /// Merge `new_keys` into the store.
    ///
    /// With `purge` set, every existing file is deleted first (best-effort
    /// per file) and the fresh set is written as if the store were empty.
    ///
    /// Otherwise the existing records are re-loaded, each valid incoming
    /// record is appended unless an existing record already compares equal
    /// to it, and the whole merged set is rewritten under content-hash
    /// names. Rewriting an unchanged record is a no-op in effect - same
    /// name, same bytes - but leaves the layout self-consistent even when
    /// prior writes used a different naming scheme.
    pub fn save(&self, new_keys: &[RsaKeyRecord], purge: bool) -> Result<SaveOutcome> {
        if purge {
            let (purged, failed) = self.purge_existing();
            let mut outcome = self.save(new_keys, false)?;
            outcome.purged = purged;
            outcome.failed += failed;
            return Ok(outcome);
        }

        fs::create_dir_all(&self.dir)?;

        let mut outcome = SaveOutcome::default();
        let mut merged = self.load()?.keys;

        for key in new_keys {
            if !key.is_valid() {
                warn!(label = %key.label, "rejecting invalid incoming key record");
                outcome.rejected += 1;
                continue;
            }
            if merged.iter().any(|existing| existing == key) {
                outcome.deduplicated += 1;
                continue;
            }
            merged.push(key.clone());
        }

        for key in &merged {
            match self.write_record(key) {
                Ok(path) => outcome.written.push(path),
                Err(e) => {
                    warn!(label = %key.label, error = %e, "could not write key record");
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    /// Delete every file in the storage directory, best-effort per file.
    /// Returns (deleted, failed) counts.
    fn purge_existing(&self) -> (usize, usize) {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return (0, 0),
        };

        let mut purged = 0;
        let mut failed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => purged += 1,
                Err(e) => {
                    // Leaving the directory half-cleared is worse than a
                    // few stale files, so keep deleting the rest.
                    warn!(path = %path.display(), error = %e, "could not delete key file");
                    failed += 1;
                }
            }
        }
        (purged, failed)
    }

    fn write_record(&self, key: &RsaKeyRecord) -> Result<PathBuf> {
        let canonical = key.canonical_json()?;
        let path = self
            .dir
            .join(format!("{}.{}", key.fingerprint()?, KEY_FILE_EXT));
        fs::write(&path, canonical)?;
        Ok(path)
    }

    /// Rename a bad file aside; if even the rename fails, record the skip
    /// and move on.
    fn quarantine(&self, path: PathBuf, outcome: &mut LoadOutcome) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = path.with_file_name(format!("{}.{}", name, QUARANTINE_EXT));
        match fs::rename(&path, &target) {
            Ok(()) => {
                warn!(path = %path.display(), "quarantined bad key file");
                outcome.quarantined.push(target);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not quarantine bad key file");
                outcome.skipped.push(path);
            }
        }
    }
}

/// Parse and validate one record file. Any failure means quarantine.
fn read_record(path: &Path) -> Option<RsaKeyRecord> {
    let contents = fs::read_to_string(path).ok()?;
    let key: RsaKeyRecord = serde_json::from_str(&contents).ok()?;
    key.is_valid().then_some(key)
}
