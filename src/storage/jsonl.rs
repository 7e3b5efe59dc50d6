use crate::storage::{CookieStand, MemoryStore, NewCookieStand, RecordStore, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// One line of the on-disk log
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum LogEntry {
    Put { record: CookieStand },
    Delete { id: u64 },
}

/// Append-only JSON Lines store.
///
/// Every mutation is appended to the log before it is applied in memory.
/// Opening the store replays the whole log.
pub struct JsonlStore {
    path: PathBuf,
    file: File,
    inner: MemoryStore,
}

impl JsonlStore {
    /// Open the log at `path`, creating it and its parent directory if needed
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = if path.exists() {
            fs::read(&path)?
        } else {
            Vec::new()
        };

        let mut inner = MemoryStore::new();
        let mut entries = 0usize;
        // end of the last line that replayed cleanly
        let mut good_len = 0usize;
        let mut offset = 0usize;
        let mut unterminated = false;
        let mut torn: Option<serde_json::Error> = None;

        for chunk in bytes.split_inclusive(|b| *b == b'\n') {
            offset += chunk.len();
            let line = chunk.strip_suffix(b"\n").unwrap_or(chunk);
            if line.iter().all(u8::is_ascii_whitespace) {
                if torn.is_none() {
                    good_len = offset;
                }
                continue;
            }
            // a bad line followed by more entries is corruption, not a torn write
            if let Some(err) = torn.take() {
                return Err(err.into());
            }
            match serde_json::from_slice::<LogEntry>(line) {
                Ok(LogEntry::Put { record }) => inner.put(record),
                Ok(LogEntry::Delete { id }) => inner.remove(id),
                Err(err) => {
                    torn = Some(err);
                    continue;
                }
            }
            entries += 1;
            good_len = offset;
            unterminated = !chunk.ends_with(b"\n");
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        if let Some(err) = torn {
            warn!(
                path = %path.display(),
                dropped_bytes = bytes.len() - good_len,
                error = %err,
                "Dropping torn entry at end of cookie stand log"
            );
            file.set_len(good_len as u64)?;
        } else if unterminated {
            file.write_all(b"\n")?;
            file.flush()?;
        }

        info!(
            path = %path.display(),
            entries,
            records = inner.count(),
            "Cookie stand log replayed"
        );

        Ok(Self { path, file, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. A failed write is truncated away so the log never
    /// keeps a partial line.
    fn append(&mut self, entry: &LogEntry) -> StoreResult<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let len = self.file.metadata()?.len();
        let written = self
            .file
            .write_all(&line)
            .and_then(|_| self.file.flush());
        if let Err(err) = written {
            if let Err(rollback) = self.file.set_len(len) {
                error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "Failed to roll back partial cookie stand log entry"
                );
            }
            return Err(err.into());
        }
        Ok(())
    }
}

impl RecordStore for JsonlStore {
    fn create(&mut self, new: NewCookieStand) -> StoreResult<CookieStand> {
        new.validate()?;
        let record = new.into_record(self.inner.allocate_id()?);
        self.append(&LogEntry::Put {
            record: record.clone(),
        })?;
        self.inner.put(record.clone());
        Ok(record)
    }

    fn get(&self, id: u64) -> StoreResult<CookieStand> {
        self.inner.get(id)
    }

    fn list(&self) -> Vec<CookieStand> {
        self.inner.list()
    }

    fn update(&mut self, id: u64, new: NewCookieStand) -> StoreResult<CookieStand> {
        self.inner.get(id)?;
        new.validate()?;
        let record = new.into_record(id);
        self.append(&LogEntry::Put {
            record: record.clone(),
        })?;
        self.inner.put(record.clone());
        Ok(record)
    }

    fn delete(&mut self, id: u64) -> StoreResult<()> {
        self.inner.get(id)?;
        self.append(&LogEntry::Delete { id })?;
        self.inner.remove(id);
        Ok(())
    }

    fn count(&self) -> usize {
        self.inner.count()
    }
}
