use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// A floor manager's scored observation of one presenter on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub gp_name: String,
    pub date: NaiveDate,
    pub fm_name: String,
    pub performance: u8,
    pub attitude: u8,
    pub error_count: u32,
    #[serde(default)]
    pub comments: String,
    pub team_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub gp_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub hours_worked: f64,
    pub team_id: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReportRecord {
    pub gp_name: String,
    pub error_type: ErrorType,
    pub description: String,
    pub severity: Severity,
    pub date: NaiveDate,
    pub team_id: String,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub resolution_notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    SickLeave,
    Vacation,
    Late,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 5] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::SickLeave,
        AttendanceStatus::Vacation,
        AttendanceStatus::Late,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::SickLeave => "sick_leave",
            AttendanceStatus::Vacation => "vacation",
            AttendanceStatus::Late => "late",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    GameError,
    ProcedureViolation,
    SystemError,
    Other,
}

impl ErrorType {
    pub const ALL: [ErrorType; 4] = [
        ErrorType::GameError,
        ErrorType::ProcedureViolation,
        ErrorType::SystemError,
        ErrorType::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ErrorType::GameError => "game_error",
            ErrorType::ProcedureViolation => "procedure_violation",
            ErrorType::SystemError => "system_error",
            ErrorType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Which upload a raw batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Evaluations,
    Attendance,
    Errors,
}

impl RecordKind {
    pub const fn label(self) -> &'static str {
        match self {
            RecordKind::Evaluations => "evaluations",
            RecordKind::Attendance => "attendance",
            RecordKind::Errors => "errors",
        }
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; the timestamp keeps only its UTC date.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc().date())
}
