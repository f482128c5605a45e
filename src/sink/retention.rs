//! Retention policy for rotated log files.
//!
//! A file is removed when it is older than `max_age_days` (if non-zero) or
//! when its rank among non-current files, newest first, is at least
//! `max_backups` (if non-zero). The currently open file is never a candidate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;

pub const FILE_PREFIX: &str = "app-";
pub const FILE_EXTENSION: &str = ".log";
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// File name for the log of a given day.
pub fn file_name_for(date: NaiveDate) -> String {
    format!("{}{}{}", FILE_PREFIX, date.format("%Y-%m-%d"), FILE_EXTENSION)
}

/// Whether `name` is a sink file: `app-YYYY-MM-DD.log` or the same with `.gz`.
pub fn is_log_file_name(name: &str) -> bool {
    let name = name.strip_suffix(".gz").unwrap_or(name);
    let Some(date) = name
        .strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILE_EXTENSION))
    else {
        return false;
    };
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Age and count limits. Zero disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age_days: u32,
    pub max_backups: usize,
}

impl RetentionPolicy {
    pub fn is_unbounded(&self) -> bool {
        self.max_age_days == 0 && self.max_backups == 0
    }
}

/// A log file found in the sink directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// List sink files in `dir`, newest first by modification time.
pub fn scan(dir: &Path) -> io::Result<Vec<LogFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_log_file_name(name) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        files.push(LogFile {
            path: entry.path(),
            modified: meta.modified()?,
        });
    }
    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
    Ok(files)
}

/// Pick the files the policy removes. `files` must be sorted newest first.
pub fn select_expired(
    files: &[LogFile],
    current: &Path,
    policy: RetentionPolicy,
    now: SystemTime,
) -> Vec<PathBuf> {
    let max_age = DAY * policy.max_age_days;

    files
        .iter()
        .filter(|f| f.path != current)
        .enumerate()
        .filter(|(rank, f)| {
            let too_old = policy.max_age_days > 0
                && now
                    .duration_since(f.modified)
                    .map(|age| age > max_age)
                    .unwrap_or(false);
            let too_many = policy.max_backups > 0 && *rank >= policy.max_backups;
            too_old || too_many
        })
        .map(|(_, f)| f.path.clone())
        .collect()
}

/// Apply the policy to `dir`. Returns the number of files removed.
///
/// Failing to list the directory is an error; failing to remove one file is
/// logged and the rest are still processed.
pub fn run_cleanup(
    dir: &Path,
    current: &Path,
    policy: RetentionPolicy,
    now: SystemTime,
) -> io::Result<usize> {
    if policy.is_unbounded() {
        return Ok(0);
    }

    let files = scan(dir)?;
    let mut removed = 0;
    for path in select_expired(&files, current, policy, now) {
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed expired log file");
                removed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove log file");
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, age_days: u64, now: SystemTime) -> LogFile {
        LogFile {
            path: PathBuf::from(name),
            modified: now - DAY * age_days as u32 - Duration::from_secs(60),
        }
    }

    #[test]
    fn test_file_name_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(file_name_for(date), "app-2024-02-29.log");
        assert!(is_log_file_name("app-2024-02-29.log"));
        assert!(is_log_file_name("app-2024-02-29.log.gz"));
        assert!(!is_log_file_name("app-2024-02-30.log"));
        assert!(!is_log_file_name("app-latest.log"));
        assert!(!is_log_file_name("other-2024-02-29.log"));
        assert!(!is_log_file_name("app-2024-02-29.log.bak"));
    }

    #[test]
    fn test_age_and_count_policies_union() {
        let now = SystemTime::now();
        let files = vec![
            file("current", 0, now),
            file("d1", 1, now),
            file("d2", 2, now),
            file("d3", 3, now),
            file("d10", 10, now),
        ];
        let policy = RetentionPolicy {
            max_age_days: 7,
            max_backups: 2,
        };

        let removed = select_expired(&files, Path::new("current"), policy, now);
        // d3 is over the backup count, d10 is over both limits.
        assert_eq!(removed, vec![PathBuf::from("d3"), PathBuf::from("d10")]);
    }

    #[test]
    fn test_current_file_is_never_removed() {
        let now = SystemTime::now();
        let files = vec![file("d1", 1, now), file("current", 40, now)];
        let policy = RetentionPolicy {
            max_age_days: 7,
            max_backups: 1,
        };

        let removed = select_expired(&files, Path::new("current"), policy, now);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_zero_means_unlimited() {
        let now = SystemTime::now();
        let files: Vec<_> = (1..20).map(|d| file(&format!("d{}", d), d, now)).collect();
        let policy = RetentionPolicy {
            max_age_days: 0,
            max_backups: 0,
        };
        assert!(select_expired(&files, Path::new("none"), policy, now).is_empty());
        assert!(policy.is_unbounded());
    }

    #[test]
    fn test_run_cleanup_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        let names = [
            "app-2024-01-05.log",
            "app-2024-01-04.log.gz",
            "app-2024-01-03.log.gz",
            "notes.txt",
        ];
        for (i, name) in names.iter().enumerate() {
            let path = dir.path().join(name);
            fs::write(&path, "x").unwrap();
            let f = fs::File::options().write(true).open(&path).unwrap();
            f.set_modified(now - DAY * i as u32).unwrap();
        }

        let policy = RetentionPolicy {
            max_age_days: 0,
            max_backups: 1,
        };
        let current = dir.path().join("app-2024-01-05.log");
        let removed = run_cleanup(dir.path(), &current, policy, now).unwrap();

        assert_eq!(removed, 1);
        assert!(current.exists());
        assert!(dir.path().join("app-2024-01-04.log.gz").exists());
        assert!(!dir.path().join("app-2024-01-03.log.gz").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
