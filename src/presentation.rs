//! Display helpers layered over the domain types.

use chrono::{DateTime, Utc};

/// How a job status is displayed. Unknown statuses are `Other`, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatusCategory {
    Running,
    Completed,
    Failed,
    Other,
}

impl JobStatusCategory {
    pub fn of(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "running" => JobStatusCategory::Running,
            "completed" => JobStatusCategory::Completed,
            "failed" => JobStatusCategory::Failed,
            _ => JobStatusCategory::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatusCategory::Running => "running",
            JobStatusCategory::Completed => "completed",
            JobStatusCategory::Failed => "failed",
            JobStatusCategory::Other => "unknown",
        }
    }
}

/// `12.50h`, or `-` when the duration is unknown. Zero is a real value.
pub fn format_duration(hours: Option<f64>) -> String {
    match hours {
        Some(hours) => format!("{:.2}h", hours),
        None => "-".to_string(),
    }
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    }
}
