//! Upload intake: record types, schema validation with advisory warnings, cross-collection
//! consistency checks, and CSV import of raw rows.

pub mod consistency;
pub mod domain;
mod import;
pub mod router;
pub mod validation;

pub use consistency::{check as check_consistency, find_duplicates, ConsistencyReport, DuplicateGroups};
pub use domain::{
    parse_record_date, AttendanceRecord, AttendanceStatus, ErrorReportRecord, ErrorType,
    EvaluationRecord, RecordKind, Severity,
};
pub use import::{CsvIntakeImporter, IntakeImportError};
pub use router::intake_router;
pub use validation::{
    validate_batch, BatchValidation, FieldMessage, RecordValidator, RejectedRow, RowWarning,
    ValidationReport,
};
