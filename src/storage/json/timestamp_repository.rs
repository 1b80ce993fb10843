use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::{RelayError, RelayResult};
use crate::storage::traits::{TimestampMap, TimestampRepository};

/// Timestamps kept as a JSON object of ISO-8601 strings
pub struct JsonTimestampRepository {
    path: PathBuf,
}

impl JsonTimestampRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RelayResult<Option<TimestampMap>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let raw: BTreeMap<String, String> = serde_json::from_str(&content)?;
        let mut timestamps = TimestampMap::new();

        for (name, value) in raw {
            match parse_timestamp(&value) {
                Some(timestamp) => {
                    timestamps.insert(name, timestamp);
                }
                None => warn!("Ignoring unparsable timestamp for {}: {:?}", name, value),
            }
        }

        Ok(Some(timestamps))
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl TimestampRepository for JsonTimestampRepository {
    fn load(&self) -> TimestampMap {
        match self.read() {
            Ok(Some(timestamps)) => {
                debug!("Loaded timestamps.");
                timestamps
            }
            Ok(None) => {
                debug!("No timestamps file found. Starting fresh.");
                TimestampMap::new()
            }
            Err(e) => {
                warn!(
                    "Could not read timestamps from {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                TimestampMap::new()
            }
        }
    }

    fn save(&self, timestamps: &TimestampMap) -> RelayResult<()> {
        let raw: BTreeMap<&str, String> = timestamps
            .iter()
            .map(|(name, timestamp)| (name.as_str(), format_timestamp(timestamp)))
            .collect();

        let dir = self.directory();
        fs::create_dir_all(dir)?;

        // Write next to the target and rename over it, so a crash never
        // leaves a half-written state file
        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, &raw)?;
        file.write_all(b"\n")?;
        file.flush()?;
        file.persist(&self.path)
            .map_err(|e| RelayError::State(format!("{}: {}", self.path.display(), e.error)))?;

        debug!("Saved timestamps.");
        Ok(())
    }
}

/// Accepts RFC 3339 and offset-less ISO-8601, the latter read as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
