use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::{
    parse_record_date, AttendanceRecord, AttendanceStatus, ErrorReportRecord, ErrorType,
    EvaluationRecord, Severity,
};

const SCORE_MAX: i64 = 10;
const LOW_PERFORMANCE_BELOW: u8 = 4;
const HIGH_ERROR_COUNT_ABOVE: u32 = 5;
const MAX_SHIFT_HOURS: f64 = 24.0;
const MIN_DESCRIPTION_CHARS: usize = 5;

/// A message attached to one field of a submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMessage {
    pub field: String,
    pub message: String,
}

impl FieldMessage {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one raw record. `data` is present only when `valid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport<T> {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub errors: Vec<FieldMessage>,
    pub warnings: Vec<FieldMessage>,
}

impl<T> ValidationReport<T> {
    fn accepted(data: T, warnings: Vec<FieldMessage>) -> Self {
        Self {
            valid: true,
            data: Some(data),
            errors: Vec::new(),
            warnings,
        }
    }

    fn rejected(errors: Vec<FieldMessage>) -> Self {
        Self {
            valid: false,
            data: None,
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Schema checks for uploaded rows plus advisory warnings that never block acceptance.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn evaluation(&self, raw: &Value) -> ValidationReport<EvaluationRecord> {
        let mut reader = match FieldReader::from_value(raw) {
            Ok(reader) => reader,
            Err(error) => return ValidationReport::rejected(vec![error]),
        };

        let gp_name = reader.required_text("gpName", "GP name is required");
        let date = reader.date("date");
        let fm_name = reader.required_text("fmName", "FM name is required");
        let performance = reader.integer("performance", "Performance", 0, Some(SCORE_MAX));
        let attitude = reader.integer("attitude", "Attitude", 0, Some(SCORE_MAX));
        let error_count = reader.count("errorCount", "Error count cannot be negative");
        let comments = reader.optional_text("comments");
        let team_id = reader.required_text("teamId", "Team ID is required");

        let errors = reader.finish();
        let (
            Some(gp_name),
            Some(date),
            Some(fm_name),
            Some(performance),
            Some(attitude),
            Some(error_count),
            Some(team_id),
        ) = (gp_name, date, fm_name, performance, attitude, error_count, team_id)
        else {
            return ValidationReport::rejected(errors);
        };
        if !errors.is_empty() {
            return ValidationReport::rejected(errors);
        }

        let record = EvaluationRecord {
            gp_name,
            date,
            fm_name,
            performance: performance as u8,
            attitude: attitude as u8,
            error_count,
            comments,
            team_id,
        };

        let mut warnings = Vec::new();
        if record.performance < LOW_PERFORMANCE_BELOW {
            warnings.push(FieldMessage::new(
                "performance",
                "Low performance score - consider follow-up",
            ));
        }
        if record.error_count > HIGH_ERROR_COUNT_ABOVE {
            warnings.push(FieldMessage::new(
                "errorCount",
                "High error count - may affect bonus eligibility",
            ));
        }

        ValidationReport::accepted(record, warnings)
    }

    pub fn attendance(&self, raw: &Value) -> ValidationReport<AttendanceRecord> {
        let mut reader = match FieldReader::from_value(raw) {
            Ok(reader) => reader,
            Err(error) => return ValidationReport::rejected(vec![error]),
        };

        let gp_name = reader.required_text("gpName", "GP name is required");
        let date = reader.date("date");
        let status = reader.choice("status", &AttendanceStatus::ALL, AttendanceStatus::label);
        let hours_worked = reader.hours("hoursWorked");
        let team_id = reader.required_text("teamId", "Team ID is required");
        let notes = reader.optional_text("notes");

        let errors = reader.finish();
        let (Some(gp_name), Some(date), Some(status), Some(hours_worked), Some(team_id)) =
            (gp_name, date, status, hours_worked, team_id)
        else {
            return ValidationReport::rejected(errors);
        };
        if !errors.is_empty() {
            return ValidationReport::rejected(errors);
        }

        let record = AttendanceRecord {
            gp_name,
            date,
            status,
            hours_worked,
            team_id,
            notes,
        };

        let mut warnings = Vec::new();
        if record.status == AttendanceStatus::Late {
            warnings.push(FieldMessage::new(
                "status",
                "Late attendance recorded - may affect bonus eligibility",
            ));
        }
        if record.status == AttendanceStatus::SickLeave && record.hours_worked > 0.0 {
            warnings.push(FieldMessage::new(
                "hoursWorked",
                "Hours recorded on sick leave day",
            ));
        }

        ValidationReport::accepted(record, warnings)
    }

    pub fn error_report(&self, raw: &Value) -> ValidationReport<ErrorReportRecord> {
        let mut reader = match FieldReader::from_value(raw) {
            Ok(reader) => reader,
            Err(error) => return ValidationReport::rejected(vec![error]),
        };

        let gp_name = reader.required_text("gpName", "GP name is required");
        let error_type = reader.choice("errorType", &ErrorType::ALL, ErrorType::label);
        let description = reader.description("description");
        let severity = reader.choice("severity", &Severity::ALL, Severity::label);
        let date = reader.date("date");
        let team_id = reader.required_text("teamId", "Team ID is required");
        let resolved = reader.flag("resolved");
        let resolution_notes = reader.optional_text("resolutionNotes");

        let errors = reader.finish();
        let (
            Some(gp_name),
            Some(error_type),
            Some(description),
            Some(severity),
            Some(date),
            Some(team_id),
            Some(resolved),
        ) = (
            gp_name,
            error_type,
            description,
            severity,
            date,
            team_id,
            resolved,
        )
        else {
            return ValidationReport::rejected(errors);
        };
        if !errors.is_empty() {
            return ValidationReport::rejected(errors);
        }

        let record = ErrorReportRecord {
            gp_name,
            error_type,
            description,
            severity,
            date,
            team_id,
            resolved,
            resolution_notes,
        };

        let mut warnings = Vec::new();
        if record.severity == Severity::Critical && !record.resolved {
            warnings.push(FieldMessage::new(
                "resolved",
                "Critical error not yet resolved",
            ));
        }

        ValidationReport::accepted(record, warnings)
    }
}

/// Row-level failure inside a batch; `index` is the zero-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub index: usize,
    pub errors: Vec<FieldMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowWarning {
    pub index: usize,
    pub field: String,
    pub message: String,
}

/// Accepted records, rejected rows, and advisory warnings for a whole upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchValidation<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<RejectedRow>,
    pub warnings: Vec<RowWarning>,
}

impl<T> BatchValidation<T> {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Runs `validate` over every row; the caller decides whether any rejection fails the batch.
pub fn validate_batch<T, F>(rows: &[Value], validate: F) -> BatchValidation<T>
where
    F: Fn(&Value) -> ValidationReport<T>,
{
    let mut batch = BatchValidation {
        accepted: Vec::new(),
        rejected: Vec::new(),
        warnings: Vec::new(),
    };

    for (index, row) in rows.iter().enumerate() {
        let report = validate(row);
        batch
            .warnings
            .extend(report.warnings.into_iter().map(|warning| RowWarning {
                index,
                field: warning.field,
                message: warning.message,
            }));

        match report.data {
            Some(record) if report.valid => batch.accepted.push(record),
            _ => batch.rejected.push(RejectedRow {
                index,
                errors: report.errors,
            }),
        }
    }

    batch
}

struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    errors: Vec<FieldMessage>,
}

impl<'a> FieldReader<'a> {
    fn from_value(raw: &'a Value) -> Result<Self, FieldMessage> {
        match raw {
            Value::Object(fields) => Ok(Self {
                fields,
                errors: Vec::new(),
            }),
            other => Err(FieldMessage::new(
                "unknown",
                format!("expected a record object, found {}", describe(other)),
            )),
        }
    }

    fn finish(self) -> Vec<FieldMessage> {
        self.errors
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldMessage::new(field, message));
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    fn required_text(&mut self, field: &str, missing: &str) -> Option<String> {
        let text = match self.present(field) {
            Some(Value::String(text)) => text.trim().to_string(),
            Some(Value::Number(number)) => number.to_string(),
            Some(other) => {
                self.fail(field, format!("Expected text, received {}", describe(other)));
                return None;
            }
            None => String::new(),
        };

        if text.is_empty() {
            self.fail(field, missing);
            return None;
        }
        Some(text)
    }

    fn optional_text(&mut self, field: &str) -> String {
        match self.present(field) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            Some(other) => {
                self.fail(field, format!("Expected text, received {}", describe(other)));
                String::new()
            }
            None => String::new(),
        }
    }

    fn description(&mut self, field: &str) -> Option<String> {
        let text = self.optional_text(field);
        if text.chars().count() < MIN_DESCRIPTION_CHARS {
            self.fail(
                field,
                format!("Description must be at least {MIN_DESCRIPTION_CHARS} characters"),
            );
            return None;
        }
        Some(text)
    }

    fn date(&mut self, field: &str) -> Option<NaiveDate> {
        match self.present(field) {
            Some(Value::String(raw)) => {
                let parsed = parse_record_date(raw);
                if parsed.is_none() {
                    self.fail(field, format!("Invalid date '{raw}'"));
                }
                parsed
            }
            Some(other) => {
                self.fail(field, format!("Expected a date, received {}", describe(other)));
                None
            }
            None => {
                self.fail(field, "Date is required");
                None
            }
        }
    }

    fn number(&mut self, field: &str, label: &str) -> Option<f64> {
        match self.present(field) {
            Some(Value::Number(number)) => number.as_f64(),
            Some(other) => {
                self.fail(
                    field,
                    format!("{label} must be a number, received {}", describe(other)),
                );
                None
            }
            None => {
                self.fail(field, format!("{label} is required"));
                None
            }
        }
    }

    fn integer(&mut self, field: &str, label: &str, min: i64, max: Option<i64>) -> Option<i64> {
        let value = self.number(field, label)?;
        if value.fract() != 0.0 || !value.is_finite() {
            self.fail(field, format!("{label} must be a whole number"));
            return None;
        }

        let value = value as i64;
        if value < min {
            self.fail(field, format!("{label} must be at least {min}"));
            return None;
        }
        if let Some(max) = max {
            if value > max {
                self.fail(field, format!("{label} must be at most {max}"));
                return None;
            }
        }
        Some(value)
    }

    fn count(&mut self, field: &str, negative: &str) -> Option<u32> {
        let value = self.number(field, "Error count")?;
        if value < 0.0 {
            self.fail(field, negative);
            return None;
        }
        if value.fract() != 0.0 || value > u32::MAX as f64 {
            self.fail(field, "Error count must be a whole number");
            return None;
        }
        Some(value as u32)
    }

    fn hours(&mut self, field: &str) -> Option<f64> {
        let value = self.number(field, "Hours worked")?;
        if !(0.0..=MAX_SHIFT_HOURS).contains(&value) {
            self.fail(field, "Hours must be between 0 and 24");
            return None;
        }
        Some(value)
    }

    fn choice<T: Copy>(&mut self, field: &str, options: &[T], label: fn(T) -> &'static str) -> Option<T> {
        let expected = || {
            options
                .iter()
                .map(|option| format!("'{}'", label(*option)))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        match self.present(field) {
            Some(Value::String(raw)) => {
                let wanted = raw.trim();
                let found = options.iter().copied().find(|option| label(*option) == wanted);
                if found.is_none() {
                    self.fail(
                        field,
                        format!("Invalid value '{wanted}', expected {}", expected()),
                    );
                }
                found
            }
            Some(other) => {
                self.fail(
                    field,
                    format!("Expected {}, received {}", expected(), describe(other)),
                );
                None
            }
            None => {
                self.fail(field, format!("Required, expected {}", expected()));
                None
            }
        }
    }

    fn flag(&mut self, field: &str) -> Option<bool> {
        match self.present(field) {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(other) => {
                self.fail(field, format!("Expected boolean, received {}", describe(other)));
                None
            }
            None => Some(false),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
