//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use flate2::read::GzDecoder;
use logcore::logging::{BufferWriter, Level, Logger};
use logcore::sink::{DailyFileConfig, DailyFileWriter, ManualClock};

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Noon UTC on the given day.
pub fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

/// File sink on a manual clock, naming files in UTC.
pub fn manual_sink(
    dir: &Path,
    start: DateTime<Utc>,
    configure: impl FnOnce(&mut DailyFileConfig),
) -> (DailyFileWriter, Arc<ManualClock>) {
    let mut config = DailyFileConfig {
        directory: dir.to_path_buf(),
        max_age: 0,
        max_backups: 0,
        compress: false,
        local_time: false,
    };
    configure(&mut config);
    let clock = Arc::new(ManualClock::new(start));
    let sink = DailyFileWriter::with_clock(config, clock.clone()).unwrap();
    (sink, clock)
}

/// Logger writing JSON into an in-memory buffer.
pub fn buffer_logger(level: Level) -> (Logger, BufferWriter) {
    let buf = BufferWriter::new();
    (Logger::new(Arc::new(buf.clone()), level), buf)
}

/// Sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Contents of a plain or gzipped log file.
pub fn read_log(path: &Path) -> String {
    let mut contents = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(File::open(path).unwrap())
            .read_to_string(&mut contents)
            .unwrap();
    } else {
        File::open(path).unwrap().read_to_string(&mut contents).unwrap();
    }
    contents
}

/// Parse every line of a log file as JSON.
pub fn json_lines(path: &PathBuf) -> Vec<serde_json::Value> {
    read_log(path)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}
