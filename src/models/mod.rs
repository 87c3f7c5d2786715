use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt;

/// Row identifier assigned by the remote store.
///
/// Tables keyed by `bigint` send numbers, tables keyed by `uuid` send
/// strings; both are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Int(i64),
    Text(String),
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for NoteId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// One row of the todo table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 (`timestamptz` columns) and offset-less values
/// (`timestamp` columns), the latter read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}

impl Note {
    /// Copy of this note with the completed flag set to `completed`.
    #[must_use]
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rows_with_numeric_and_uuid_ids() {
        let rows: Vec<Note> = serde_json::from_str(
            r#"[
                {"id": 7, "text": "buy milk", "completed": false, "created_at": "2024-03-01T10:00:00.123456+00:00"},
                {"id": "6f1c2a4e-0000-4000-8000-000000000001", "text": "walk", "completed": true, "created_at": "2024-02-29T09:00:00Z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows[0].id, NoteId::Int(7));
        assert_eq!(
            rows[1].id,
            NoteId::from("6f1c2a4e-0000-4000-8000-000000000001")
        );
        assert!(rows[1].completed);
        assert!(rows[0].created_at > rows[1].created_at);
    }

    #[test]
    fn decodes_timestamps_without_offset_as_utc() {
        let rows: Vec<Note> = serde_json::from_str(
            r#"[
                {"id": 1, "text": "a", "completed": false, "created_at": "2024-03-01T10:00:00.123456"},
                {"id": 2, "text": "b", "completed": false, "created_at": "2024-03-01 09:30:00"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            rows[0].created_at,
            DateTime::parse_from_rfc3339("2024-03-01T10:00:00.123456Z").unwrap()
        );
        assert_eq!(
            rows[1].created_at,
            DateTime::parse_from_rfc3339("2024-03-01T09:30:00Z").unwrap()
        );
    }

    #[test]
    fn rejects_unparseable_timestamp() {
        let err = serde_json::from_str::<Note>(
            r#"{"id": 1, "text": "a", "completed": false, "created_at": "yesterday"}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("invalid timestamp 'yesterday'"));
    }

    #[test]
    fn id_display_is_bare_value() {
        assert_eq!(NoteId::Int(42).to_string(), "42");
        assert_eq!(NoteId::from("abc").to_string(), "abc");
    }
}
