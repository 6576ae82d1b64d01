use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{parse_wire, timestamp};
use crate::error::Result;

const MICROS_PER_HOUR: f64 = 1_000_000.0 * 3600.0;

/// One execution run on a node.
///
/// `status` is kept verbatim; see [`crate::presentation::JobStatusCategory`]
/// for the display grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: i64,
    pub cluster_id: String,
    pub node_id: i64,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Hours; `Some(0.0)` is a real duration, not a missing one.
    pub duration_hours: Option<f64>,
    pub tag: Option<String>,
    pub error_text: Option<String>,
}

/// The shapes `duration_hours` arrives in.
///
/// Decoding never fails: shapes that are not understood land in
/// `Unrecognized` and normalize to `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum RawDuration {
    /// Already in hours.
    Hours(f64),
    /// Numeric text, e.g. `"7"`.
    Text(String),
    /// A Postgres interval, `{"Microseconds": ...}`.
    Interval { microseconds: f64 },
    Unrecognized(Value),
}

impl From<Value> for RawDuration {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => match n.as_f64() {
                Some(hours) => RawDuration::Hours(hours),
                None => RawDuration::Unrecognized(Value::Number(n)),
            },
            Value::String(s) => RawDuration::Text(s),
            Value::Object(map) => match map.get("Microseconds").and_then(Value::as_f64) {
                Some(microseconds) => RawDuration::Interval { microseconds },
                None => RawDuration::Unrecognized(Value::Object(map)),
            },
            other => RawDuration::Unrecognized(other),
        }
    }
}

impl RawDuration {
    /// Hours as a non-negative finite number, or `None` when unknown.
    pub fn to_hours(&self) -> Option<f64> {
        let hours = match self {
            RawDuration::Hours(hours) => *hours,
            RawDuration::Text(text) => match text.trim() {
                "" => 0.0,
                trimmed => trimmed.parse::<f64>().ok()?,
            },
            RawDuration::Interval { microseconds } => microseconds / MICROS_PER_HOUR,
            RawDuration::Unrecognized(_) => return None,
        };
        (hours.is_finite() && hours >= 0.0).then_some(hours)
    }
}

/// Normalize a raw `duration_hours` value. Total: never fails.
pub fn normalize_duration(raw: Option<&Value>) -> Option<f64> {
    match raw {
        None | Some(Value::Null) => None,
        Some(value) => RawDuration::from(value.clone()).to_hours(),
    }
}

#[derive(Deserialize)]
struct JobDto {
    id: i64,
    cluster_id: String,
    node_id: i64,
    status: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    started_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::option::deserialize")]
    finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    duration_hours: Option<RawDuration>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    error_text: Option<String>,
}

impl From<JobDto> for Job {
    fn from(dto: JobDto) -> Self {
        Job {
            id: dto.id,
            cluster_id: dto.cluster_id,
            node_id: dto.node_id,
            status: dto.status,
            started_at: dto.started_at,
            finished_at: dto.finished_at,
            duration_hours: dto.duration_hours.as_ref().and_then(RawDuration::to_hours),
            tag: dto.tag,
            error_text: dto.error_text,
        }
    }
}

pub fn from_wire_response(raw: Value) -> Result<Job> {
    let dto: JobDto = parse_wire("job", raw)?;
    Ok(dto.into())
}

pub fn list_from_wire_response(raw: Value) -> Result<Vec<Job>> {
    let dtos: Vec<JobDto> = parse_wire("job list", raw)?;
    Ok(dtos.into_iter().map(Job::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_json(duration: Value) -> Value {
        json!({
            "id": 10,
            "cluster_id": "c1",
            "node_id": 3,
            "status": "completed",
            "started_at": "2024-01-01T00:00:00Z",
            "finished_at": "2024-01-01T12:30:00Z",
            "duration_hours": duration,
            "tag": "nightly"
        })
    }

    #[test]
    fn duration_wire_encodings() {
        assert_eq!(normalize_duration(Some(&json!(12.5))), Some(12.5));
        assert_eq!(normalize_duration(Some(&json!("7"))), Some(7.0));
        assert_eq!(
            normalize_duration(Some(&json!({"Microseconds": 3_600_000_000i64}))),
            Some(1.0)
        );
        assert_eq!(normalize_duration(Some(&Value::Null)), None);
        assert_eq!(normalize_duration(None), None);
    }

    #[test]
    fn unrecognized_durations_degrade_to_none() {
        assert_eq!(normalize_duration(Some(&json!(true))), None);
        assert_eq!(normalize_duration(Some(&json!([1, 2]))), None);
        assert_eq!(normalize_duration(Some(&json!("soon"))), None);
        assert_eq!(normalize_duration(Some(&json!("inf"))), None);
        assert_eq!(normalize_duration(Some(&json!({"Microseconds": "lots"}))), None);
        assert_eq!(normalize_duration(Some(&json!({"Days": 1}))), None);
        assert_eq!(normalize_duration(Some(&json!(-1.0))), None);
    }

    #[test]
    fn zero_duration_is_kept() {
        assert_eq!(normalize_duration(Some(&json!(0))), Some(0.0));
        assert_eq!(normalize_duration(Some(&json!("0"))), Some(0.0));
    }

    #[test]
    fn blank_text_duration_reads_as_zero() {
        assert_eq!(normalize_duration(Some(&json!(""))), Some(0.0));
        assert_eq!(normalize_duration(Some(&json!("   "))), Some(0.0));
        assert_eq!(normalize_duration(Some(&json!(" 2.5 "))), Some(2.5));
    }

    #[test]
    fn interval_object_tolerates_extra_fields() {
        let raw = json!({"Microseconds": 5_400_000_000i64, "Days": 0, "Months": 0, "Valid": true});
        assert_eq!(normalize_duration(Some(&raw)), Some(1.5));
    }

    #[test]
    fn maps_full_job_record() {
        let job = from_wire_response(job_json(json!({"Microseconds": 45_000_000_000i64}))).unwrap();
        assert_eq!(job.id, 10);
        assert_eq!(job.cluster_id, "c1");
        assert_eq!(job.node_id, 3);
        assert_eq!(job.duration_hours, Some(12.5));
        assert!(job.finished_at.is_some());
        assert_eq!(job.tag.as_deref(), Some("nightly"));
        assert_eq!(job.error_text, None);
    }

    #[test]
    fn bad_duration_does_not_fail_the_record() {
        let job = from_wire_response(job_json(json!(false))).unwrap();
        assert_eq!(job.duration_hours, None);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let job = from_wire_response(json!({
            "id": 1,
            "cluster_id": "c1",
            "node_id": 2,
            "status": "running",
            "started_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(job.finished_at, None);
        assert_eq!(job.duration_hours, None);
        assert_eq!(job.tag, None);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let mut raw = job_json(Value::Null);
        raw["status"] = json!("queued");
        let job = from_wire_response(raw).unwrap();
        assert_eq!(job.status, "queued");
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let mut raw = job_json(Value::Null);
        raw.as_object_mut().unwrap().remove("cluster_id");
        assert!(from_wire_response(raw).unwrap_err().is_malformed());

        let mut raw = job_json(Value::Null);
        raw["node_id"] = json!("3");
        assert!(from_wire_response(raw).unwrap_err().is_malformed());

        let mut raw = job_json(Value::Null);
        raw["tag"] = json!(5);
        assert!(list_from_wire_response(json!([raw])).unwrap_err().is_malformed());
    }
}
