//! Daily rotating file writer.
//!
//! # Responsibilities
//! - Keep exactly one `app-<YYYY-MM-DD>.log` open for appending
//! - Rotate transparently on the first write after the date changes
//! - Hand retired files to background compression and retention cleanup
//!
//! # Design Decisions
//! - All state changes happen under one mutex; background tasks only take it
//!   to read the current path, never while doing file I/O
//! - Maintenance failures are logged and counted, never returned to writers

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::error::{SinkError, SinkResult};
use crate::lifecycle::background;
use crate::logging::writer::LogWriter;
use crate::observability::metrics;
use crate::sink::clock::{Clock, SystemClock};
use crate::sink::compress;
use crate::sink::retention::{self, RetentionPolicy};

/// Configuration for the daily file sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyFileConfig {
    /// Directory holding the log files.
    pub directory: PathBuf,
    /// Days to keep rotated files (0 = forever).
    pub max_age: u32,
    /// Rotated files to keep (0 = unlimited).
    pub max_backups: usize,
    /// Gzip retired files.
    pub compress: bool,
    /// Use local time for file dates instead of UTC.
    pub local_time: bool,
}

impl Default for DailyFileConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            max_age: 30,
            max_backups: 10,
            compress: true,
            local_time: true,
        }
    }
}

impl DailyFileConfig {
    fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_age_days: self.max_age,
            max_backups: self.max_backups,
        }
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.directory.join(retention::file_name_for(date))
    }
}

struct State {
    file: Option<File>,
    path: PathBuf,
    date: NaiveDate,
}

struct Inner {
    config: DailyFileConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
    closed: AtomicBool,
    pending_tasks: AtomicUsize,
}

/// File writer that rotates at date boundaries.
///
/// Cloning yields another handle to the same file.
#[derive(Clone)]
pub struct DailyFileWriter {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for DailyFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyFileWriter")
            .field("config", &self.inner.config)
            .field("current", &self.current_file_name())
            .finish()
    }
}

impl DailyFileWriter {
    /// Create the directory if needed and open today's file.
    pub fn new(config: DailyFileConfig) -> SinkResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: DailyFileConfig, clock: Arc<dyn Clock>) -> SinkResult<Self> {
        fs::create_dir_all(&config.directory).map_err(|source| SinkError::CreateDirectory {
            path: config.directory.clone(),
            source,
        })?;

        let date = clock.today(config.local_time);
        let path = config.path_for(date);
        let file = open_append(&path)?;

        tracing::debug!(path = %path.display(), "Opened log file");

        let state = State {
            file: Some(file),
            path,
            date,
        };
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                clock,
                state: Mutex::new(state),
                closed: AtomicBool::new(false),
                pending_tasks: AtomicUsize::new(0),
            }),
        })
    }

    /// Append `buf` to the current day's file, rotating first if the date moved.
    pub fn write(&self, buf: &[u8]) -> SinkResult<usize> {
        let today = self.inner.clock.today(self.inner.config.local_time);

        let retired = {
            let mut state = self.inner.state.lock();
            if self.inner.closed.load(Ordering::Acquire) {
                return Err(SinkError::Closed);
            }
            let retired = if state.date != today || state.file.is_none() {
                Some(self.rotate_locked(&mut state, today)?)
            } else {
                None
            };
            let file = state.file.as_mut().ok_or(SinkError::Closed)?;
            file.write_all(buf)?;
            retired
        };

        if let Some(retired) = retired {
            self.schedule_maintenance(retired);
        }
        Ok(buf.len())
    }

    /// Close the current file and reopen the file for today.
    ///
    /// Within the same date this reopens the same file; cleanup still runs.
    pub fn rotate(&self) -> SinkResult<()> {
        let today = self.inner.clock.today(self.inner.config.local_time);
        let retired = {
            let mut state = self.inner.state.lock();
            if self.inner.closed.load(Ordering::Acquire) {
                return Err(SinkError::Closed);
            }
            self.rotate_locked(&mut state, today)?
        };
        self.schedule_maintenance(retired);
        Ok(())
    }

    /// Swap handles. Returns the path of the retired file.
    fn rotate_locked(&self, state: &mut State, date: NaiveDate) -> SinkResult<PathBuf> {
        if let Some(mut old) = state.file.take() {
            // Best effort; the handle is dropped either way.
            let _ = old.flush();
        }

        let retired = state.path.clone();
        let path = self.inner.config.path_for(date);
        state.file = Some(open_append(&path)?);
        state.path = path;
        state.date = date;

        metrics::record_rotation();
        Ok(retired)
    }

    /// Compress the retired file (if configured and no longer current) and
    /// prune old files, both off the caller's thread.
    fn schedule_maintenance(&self, retired: PathBuf) {
        let current = self.current_file_name();
        tracing::info!(
            retired = %retired.display(),
            current = %current.display(),
            "Rotated log file"
        );

        let compress = self.inner.config.compress && retired != current;
        let cleanup = !self.inner.config.retention().is_unbounded();
        if !compress && !cleanup {
            return;
        }

        let inner = Arc::clone(&self.inner);
        inner.pending_tasks.fetch_add(1, Ordering::AcqRel);
        background::spawn_blocking("logcore-maintenance", move || {
            if compress && !inner.closed.load(Ordering::Acquire) {
                compress_retired(&retired);
            }
            if cleanup {
                let current = inner.state.lock().path.clone();
                match retention::run_cleanup(
                    &inner.config.directory,
                    &current,
                    inner.config.retention(),
                    SystemTime::now(),
                ) {
                    Ok(removed) => metrics::record_files_removed(removed),
                    Err(e) => {
                        metrics::record_maintenance_failure("cleanup");
                        tracing::warn!(
                            directory = %inner.config.directory.display(),
                            error = %e,
                            "Log retention cleanup failed"
                        );
                    }
                }
            }
            inner.pending_tasks.fetch_sub(1, Ordering::AcqRel);
        });
    }

    /// Flush the current file to disk. A closed sink has nothing to flush.
    pub fn sync(&self) -> SinkResult<()> {
        let mut state = self.inner.state.lock();
        if let Some(file) = state.file.as_mut() {
            file.flush()?;
            file.sync_data()?;
        }
        Ok(())
    }

    /// Flush and release the file handle. Later writes fail with
    /// [`SinkError::Closed`]. Idempotent.
    pub fn close(&self) -> SinkResult<()> {
        self.inner.closed.store(true, Ordering::Release);
        let mut state = self.inner.state.lock();
        if let Some(mut file) = state.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }

    /// Path of the file currently being written (or last written, once closed).
    pub fn current_file_name(&self) -> PathBuf {
        self.inner.state.lock().path.clone()
    }

    /// All sink files in the directory, compressed ones included, newest first.
    pub fn list_files(&self) -> SinkResult<Vec<PathBuf>> {
        let files = retention::scan(&self.inner.config.directory)?;
        Ok(files.into_iter().map(|f| f.path).collect())
    }

    /// Apply the retention policy now, on the calling thread.
    pub fn cleanup(&self) -> SinkResult<()> {
        let current = self.current_file_name();
        let removed = retention::run_cleanup(
            &self.inner.config.directory,
            &current,
            self.inner.config.retention(),
            SystemTime::now(),
        )?;
        metrics::record_files_removed(removed);
        Ok(())
    }

    /// Number of background compression/cleanup tasks still running.
    pub fn pending_maintenance(&self) -> usize {
        self.inner.pending_tasks.load(Ordering::Acquire)
    }
}

fn open_append(path: &Path) -> SinkResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn compress_retired(path: &Path) {
    if !path.exists() {
        return;
    }
    match compress::compress_file(path) {
        Ok(archive) => {
            tracing::debug!(archive = %archive.display(), "Compressed rotated log file");
        }
        Err(e) => {
            metrics::record_maintenance_failure("compress");
            tracing::warn!(path = %path.display(), error = %e, "Failed to compress rotated log file");
        }
    }
}

impl LogWriter for DailyFileWriter {
    fn write_line(&self, line: &[u8]) -> io::Result<usize> {
        Ok(self.write(line)?)
    }

    fn sync(&self) -> io::Result<()> {
        Ok(DailyFileWriter::sync(self)?)
    }

    fn close(&self) -> io::Result<()> {
        Ok(DailyFileWriter::close(self)?)
    }
}

impl Write for &DailyFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(DailyFileWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(DailyFileWriter::sync(self)?)
    }
}
