use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

const EXPORT_FILE_PREFIX: &str = "code-snippet-";
const EXPORT_FILE_EXTENSION: &str = "png";
const PICTURES_SUBDIR: &str = "Pictures";
const PARTIAL_SUFFIX: &str = ".partial";
const MAX_NAME_ATTEMPTS: u32 = 1000;

static PARTIAL_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("system clock is before the unix epoch")]
    ClockBeforeEpoch,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no free export file name for timestamp {unix_millis} in {dir}")]
    NamesExhausted { dir: PathBuf, unix_millis: u128 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Where exported PNGs land.
#[derive(Debug, Clone)]
pub struct ExportStorage {
    export_dir: PathBuf,
}

impl ExportStorage {
    pub const fn with_dir(export_dir: PathBuf) -> Self {
        Self { export_dir }
    }

    /// `$HOME/Pictures`, created if missing.
    pub fn with_default_paths() -> StorageResult<Self> {
        let home = std::env::var_os("HOME").ok_or(StorageError::MissingHomeDirectory)?;
        let mut export_dir = PathBuf::from(home);
        export_dir.push(PICTURES_SUBDIR);
        fs::create_dir_all(&export_dir)?;
        Ok(Self::with_dir(export_dir))
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Writes `png_data` under a timestamped name and returns the final path.
    /// An existing file is never replaced: a taken name gets a `-1`, `-2`, ...
    /// suffix instead.
    pub fn save_png(&self, png_data: &[u8], unix_millis: u128) -> StorageResult<PathBuf> {
        fs::create_dir_all(&self.export_dir)?;

        let partial = self.partial_path(unix_millis);
        if let Err(source) = fs::write(&partial, png_data) {
            remove_partial(&partial);
            return Err(StorageError::Write {
                path: partial,
                source,
            });
        }

        let result = self.claim_target(unix_millis).and_then(|target| {
            match fs::rename(&partial, &target) {
                Ok(()) => Ok(target),
                Err(source) => {
                    let _ = fs::remove_file(&target);
                    Err(StorageError::Write {
                        path: target,
                        source,
                    })
                }
            }
        });
        match result {
            Ok(target) => {
                tracing::info!(path = %target.display(), bytes = png_data.len(), "exported snippet image");
                Ok(target)
            }
            Err(err) => {
                remove_partial(&partial);
                Err(err)
            }
        }
    }

    /// Hidden scratch file, unique per process and per call.
    fn partial_path(&self, unix_millis: u128) -> PathBuf {
        let sequence = PARTIAL_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.export_dir.join(format!(
            ".{}.{}-{sequence}{PARTIAL_SUFFIX}",
            export_file_name(unix_millis),
            std::process::id()
        ))
    }

    /// Reserves the first free name for `unix_millis` by creating it empty.
    fn claim_target(&self, unix_millis: u128) -> StorageResult<PathBuf> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self
                .export_dir
                .join(numbered_export_file_name(unix_millis, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(path),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(StorageError::Write { path, source }),
            }
        }
        Err(StorageError::NamesExhausted {
            dir: self.export_dir.clone(),
            unix_millis,
        })
    }
}

pub fn export_file_name(unix_millis: u128) -> String {
    numbered_export_file_name(unix_millis, 0)
}

fn numbered_export_file_name(unix_millis: u128, attempt: u32) -> String {
    if attempt == 0 {
        format!("{EXPORT_FILE_PREFIX}{unix_millis}.{EXPORT_FILE_EXTENSION}")
    } else {
        format!("{EXPORT_FILE_PREFIX}{unix_millis}-{attempt}.{EXPORT_FILE_EXTENSION}")
    }
}

pub fn unix_millis_now() -> StorageResult<u128> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .map_err(|_| StorageError::ClockBeforeEpoch)
}

fn remove_partial(partial: &Path) {
    if let Err(err) = fs::remove_file(partial) {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %partial.display(), ?err, "failed to remove partial export");
        }
    }
}
