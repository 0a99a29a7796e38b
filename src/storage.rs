//! Per-build records on disk.
//!
//! Every build lives in `<dir>/<id>.json`. Each write goes to its own
//! `<id>.json.<random>.part` file first and is renamed into place, so readers
//! never observe a half-written record and concurrent writers of one id never
//! share a temp file.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tokio::{fs, task};

use crate::error::{BuildStatsError, Result};
use crate::models::BuildRecord;

const RECORD_EXTENSION: &str = "json";

/// Extension of in-progress writes; never counted as a persisted build.
const TEMP_SUFFIX: &str = ".part";

pub struct BuildStore {
    dir: PathBuf,
}

impl BuildStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn record_path(&self, id: u64) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// Ids of every build already on disk. A missing directory is an empty set.
    pub async fn persisted_ids(&self) -> Result<BTreeSet<u64>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(BuildStatsError::persistence(&self.dir, e)),
        };

        let mut ids = BTreeSet::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BuildStatsError::persistence(&self.dir, e))?
        {
            if let Some(id) = parse_record_id(&entry.path()) {
                ids.insert(id);
            }
        }

        Ok(ids)
    }

    /// The resume point: highest persisted build id, if any.
    pub async fn last_downloaded(&self) -> Result<Option<u64>> {
        Ok(self.persisted_ids().await?.last().copied())
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BuildStatsError::persistence(&self.dir, e))
    }

    pub async fn write(&self, record: &BuildRecord) -> Result<()> {
        let path = self.record_path(record.id);
        let body = serde_json::to_vec(record)
            .map_err(|e| BuildStatsError::persistence(&path, e.into()))?;

        let dir = self.dir.clone();
        let prefix = format!("{}.{RECORD_EXTENSION}.", record.id);
        let target = path.clone();
        task::spawn_blocking(move || persist_atomically(&dir, &prefix, &body, &target))
            .await
            .map_err(|e| BuildStatsError::persistence(&path, io::Error::other(e)))??;

        debug!("Persisted build {} to {}", record.id, path.display());
        Ok(())
    }
}

fn persist_atomically(dir: &Path, prefix: &str, body: &[u8], path: &Path) -> Result<()> {
    let mut temp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| BuildStatsError::persistence(dir, e))?;
    temp.write_all(body)
        .map_err(|e| BuildStatsError::persistence(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| BuildStatsError::persistence(path, e.error))?;
    Ok(())
}

fn parse_record_id(path: &Path) -> Option<u64> {
    if path.extension().and_then(OsStr::to_str) != Some(RECORD_EXTENSION) {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}
