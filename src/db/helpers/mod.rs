use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{ffi, ErrorCode};

/// Fixed-width RFC 3339 so that string order in SQLite is time order.
pub fn to_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn to_count(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).with_context(|| format!("{field} contains negative value {value}"))
}

/// UNIQUE or PRIMARY KEY constraint failures.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, _) => {
            code.code == ErrorCode::ConstraintViolation
                && matches!(
                    code.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rusqlite::Connection;

    #[test]
    fn test_timestamps_sort_lexicographically() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let later = base + Duration::microseconds(1);
        assert!(to_timestamp(base) < to_timestamp(later));
        assert_eq!(to_timestamp(base), "2024-05-01T12:00:00.000000Z");
    }

    #[test]
    fn test_parse_round_trip() {
        let now = Utc::now();
        let parsed = parse_datetime(&to_timestamp(now), "created_at").unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
        assert!(parse_datetime("yesterday", "created_at").is_err());
    }

    #[test]
    fn test_detects_unique_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (slug TEXT NOT NULL UNIQUE, body TEXT NOT NULL);")
            .unwrap();
        conn.execute("INSERT INTO t (slug, body) VALUES ('a', 'x')", [])
            .unwrap();

        let dup = conn
            .execute("INSERT INTO t (slug, body) VALUES ('a', 'y')", [])
            .unwrap_err();
        assert!(is_unique_violation(&dup));

        let not_null = conn
            .execute("INSERT INTO t (slug, body) VALUES ('b', NULL)", [])
            .unwrap_err();
        assert!(!is_unique_violation(&not_null));
    }
}
