use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Outcome of the most recent completed build, as written by the build job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BuildOutcome {
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

impl BuildOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// The persisted record a build job leaves in `<data_dir>/status/<repo>.json`.
///
/// Fields the job may also write (`is_running`, `repository`) are ignored on
/// read: live activity comes from the supervisor and the identifier from
/// discovery.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildResult {
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_finish: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_status: Option<BuildOutcome>,
    #[serde(default)]
    pub last_commit: Option<String>,
}

/// Persisted history with the live `is_running` flag overlaid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildStatus {
    pub is_running: bool,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_finish: Option<DateTime<Utc>>,
    pub last_status: Option<BuildOutcome>,
    pub last_commit: Option<String>,
    pub repository: String,
}

impl BuildStatus {
    /// A unit nobody has built yet (or whose history is unreadable).
    pub fn never_built(repository: String, is_running: bool) -> Self {
        Self::from_result(repository, BuildResult::default(), is_running)
    }

    pub fn from_result(repository: String, result: BuildResult, is_running: bool) -> Self {
        Self {
            is_running,
            last_start: result.last_start,
            last_finish: result.last_finish,
            last_status: result.last_status,
            last_commit: result.last_commit,
            repository,
        }
    }
}

/// Build jobs write either RFC 3339 timestamps or naive ISO-8601 ones
/// (`2024-01-01T00:00:00`); the latter are taken as UTC.
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_naive_timestamp_as_utc() {
        let ts = parse_timestamp("2024-01-01T00:00:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_offset_timestamp() {
        let ts = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_fractional_seconds() {
        let ts = parse_timestamp("2024-03-05T10:11:12.345678").unwrap();
        assert_eq!(ts.timestamp_subsec_micros(), 345_678);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn result_ignores_live_fields() {
        let json = r#"{
            "is_running": true,
            "repository": "alpha",
            "last_status": "success",
            "last_finish": "2024-01-01T00:00:00",
            "last_commit": "abc123"
        }"#;
        let result: BuildResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.last_status, Some(BuildOutcome::Success));
        assert_eq!(result.last_commit.as_deref(), Some("abc123"));
        assert!(result.last_start.is_none());
    }

    #[test]
    fn unrecognised_outcome_is_unknown() {
        let result: BuildResult = serde_json::from_str(r#"{"last_status":"cancelled"}"#).unwrap();
        assert_eq!(result.last_status, Some(BuildOutcome::Unknown));
    }

    #[test]
    fn never_built_status_serializes_nulls() {
        let status = BuildStatus::never_built("beta".into(), true);
        insta::assert_json_snapshot!(status, @r#"
        {
          "is_running": true,
          "last_start": null,
          "last_finish": null,
          "last_status": null,
          "last_commit": null,
          "repository": "beta"
        }
        "#);
    }
}
