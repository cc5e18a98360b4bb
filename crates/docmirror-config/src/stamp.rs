//! The "last check" timestamp record.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// State file name inside the conf directory.
const STATE_FILENAME: &str = "state.toml";

/// Time of the last completed update check.
///
/// Persisted as `<conf_dir>/state.toml`:
///
/// ```toml
/// update_check_time = 1700000000
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStamp {
    /// Unix seconds of the last check, absent if none was ever recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_check_time: Option<i64>,
}

impl CheckStamp {
    /// Stamp recording the given instant.
    #[must_use]
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            update_check_time: Some(time.timestamp()),
        }
    }

    /// Stamp recording the current time.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// State file path for a conf directory.
    #[must_use]
    pub fn path(conf_dir: &Path) -> PathBuf {
        conf_dir.join(STATE_FILENAME)
    }

    /// Recorded check time, if any.
    #[must_use]
    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        self.update_check_time
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Whether the record is absent or strictly older than `stale_after`.
    ///
    /// A record from the future is never stale.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        let Some(last) = self.last_check() else {
            return true;
        };
        match (now - last).to_std() {
            Ok(elapsed) => elapsed > stale_after,
            Err(_) => false,
        }
    }

    /// Load the stamp from a conf directory. A missing file yields an empty
    /// stamp.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(conf_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path(conf_dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save the stamp into a conf directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written.
    pub fn save(&self, conf_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(conf_dir)?;
        let path = Self::path(conf_dir);
        std::fs::write(&path, toml::to_string(self)?)?;
        tracing::debug!(
            path = %path.display(),
            time = ?self.update_check_time,
            "Saved check stamp"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const FIVE_MINUTES: Duration = Duration::from_secs(300);

    fn time(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_absent_stamp_is_stale() {
        assert!(CheckStamp::default().is_stale(time(1_000_000), FIVE_MINUTES));
    }

    #[test]
    fn test_staleness_threshold_is_strict() {
        let stamp = CheckStamp::at(time(1_000_000));
        assert!(!stamp.is_stale(time(1_000_100), FIVE_MINUTES));
        assert!(!stamp.is_stale(time(1_000_300), FIVE_MINUTES));
        assert!(stamp.is_stale(time(1_000_301), FIVE_MINUTES));
    }

    #[test]
    fn test_future_stamp_is_fresh() {
        let stamp = CheckStamp::at(time(2_000_000));
        assert!(!stamp.is_stale(time(1_000_000), FIVE_MINUTES));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(CheckStamp::load(tmp.path()).unwrap(), CheckStamp::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let conf = tmp.path().join("conf");
        let stamp = CheckStamp::at(time(1_700_000_000));

        stamp.save(&conf).unwrap();

        let content = std::fs::read_to_string(conf.join("state.toml")).unwrap();
        assert_eq!(content.trim(), "update_check_time = 1700000000");
        assert_eq!(CheckStamp::load(&conf).unwrap(), stamp);
    }

    #[test]
    fn test_load_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("state.toml"), "update_check_time = \"soon\"").unwrap();
        assert!(matches!(
            CheckStamp::load(tmp.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_now_is_recent() {
        let stamp = CheckStamp::now();
        assert!(!stamp.is_stale(Utc::now(), FIVE_MINUTES));
    }
}
