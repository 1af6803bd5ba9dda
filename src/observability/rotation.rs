//! Append-only line file with size-based rotation.
//!
//! Once the live file grows past the size limit it is renamed to
//! `<name>.<micros>` and a fresh file is started. Only the newest backups are
//! kept.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Rotate once the live file exceeds 10 MiB.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Rotated files retained next to the live one.
pub const MAX_BACKUP_FILES: usize = 3;

pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    keep: usize,
    handle: Mutex<Option<File>>,
}

impl RotatingFile {
    pub const fn new(path: PathBuf) -> Self {
        Self::with_limits(path, MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES)
    }

    pub const fn with_limits(path: PathBuf, max_bytes: u64, keep: usize) -> Self {
        Self {
            path,
            max_bytes,
            keep,
            handle: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline, rotating first if the file is full.
    ///
    /// # Errors
    ///
    /// Returns an error if rotating, opening or writing the file fails.
    pub fn append_line(&self, line: &str) -> io::Result<()> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|e| io::Error::other(format!("rotating file lock poisoned: {e}")))?;

        if fs::metadata(&self.path).is_ok_and(|m| m.len() > self.max_bytes) {
            *handle = None;
            self.rotate()?;
        }

        if handle.is_none() {
            *handle = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        let Some(file) = handle.as_mut() else {
            return Err(io::Error::other("trace file unavailable"));
        };
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn rotate(&self) -> io::Result<()> {
        let mut stamp = chrono::Utc::now().timestamp_micros();
        let mut backup = self.backup_path(stamp);
        while backup.exists() {
            stamp += 1;
            backup = self.backup_path(stamp);
        }
        fs::rename(&self.path, &backup)?;

        for stale in self.backups()?.into_iter().skip(self.keep) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }

    fn backup_path(&self, stamp: i64) -> PathBuf {
        let mut name = self.file_name().to_string();
        name.push_str(&format!(".{stamp}"));
        self.path.with_file_name(name)
    }

    fn file_name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// Rotated files, newest first.
    fn backups(&self) -> io::Result<Vec<PathBuf>> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let prefix = format!("{}.", self.file_name());

        let mut found: Vec<(i64, PathBuf)> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name();
                let stamp = name.to_str()?.strip_prefix(&prefix)?.parse::<i64>().ok()?;
                Some((stamp, entry.path()))
            })
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("keep", &self.keep)
            .finish_non_exhaustive()
    }
}
