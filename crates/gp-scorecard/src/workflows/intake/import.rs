use std::io::Read;
use std::path::Path;

use serde_json::{Map, Number, Value};

const NUMERIC_COLUMNS: [&str; 4] = ["performance", "attitude", "errorCount", "hoursWorked"];
const FLAG_COLUMNS: [&str; 1] = ["resolved"];

/// Failure to turn an export into raw rows. Row-level schema problems are not errors here.
#[derive(Debug, thiserror::Error)]
pub enum IntakeImportError {
    #[error("failed to read intake export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid intake CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads a CSV export with camelCase headers into raw JSON rows ready for validation.
pub struct CsvIntakeImporter;

impl CsvIntakeImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Value>, IntakeImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Value>, IntakeImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut rows = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let mut fields = Map::new();
            for (header, cell) in headers.iter().zip(record.iter()) {
                if header.is_empty() {
                    continue;
                }
                if let Some(value) = coerce_cell(header, cell) {
                    fields.insert(header.to_string(), value);
                }
            }
            rows.push(Value::Object(fields));
        }

        Ok(rows)
    }
}

/// Empty cells are dropped so optional fields fall back to their defaults. Only the
/// numeric and flag columns are converted; every other cell stays text.
fn coerce_cell(header: &str, cell: &str) -> Option<Value> {
    if cell.is_empty() {
        return None;
    }

    if FLAG_COLUMNS.contains(&header) {
        match cell.to_ascii_lowercase().as_str() {
            "true" => return Some(Value::Bool(true)),
            "false" => return Some(Value::Bool(false)),
            _ => {}
        }
    }

    if NUMERIC_COLUMNS.contains(&header) {
        if let Ok(integer) = cell.parse::<i64>() {
            return Some(Value::Number(integer.into()));
        }
        if let Some(number) = cell.parse::<f64>().ok().and_then(Number::from_f64) {
            return Some(Value::Number(number));
        }
    }

    Some(Value::String(cell.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_numbers_booleans_and_blanks() {
        let csv = "\
gpName,date,status,hoursWorked,teamId,notes,resolved
Sofia Barchan,2024-01-03,present,7.5,12,,TRUE
 Anna Maria ,2024-01-04,late,8,team-2,bus strike,false
";

        let rows = CsvIntakeImporter::from_reader(csv.as_bytes()).expect("csv parses");

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            json!({
                "gpName": "Sofia Barchan",
                "date": "2024-01-03",
                "status": "present",
                "hoursWorked": 7.5,
                "teamId": "12",
                "resolved": true
            })
        );
        assert_eq!(rows[1]["gpName"], json!("Anna Maria"));
        assert_eq!(rows[1]["hoursWorked"], json!(8));
        assert_eq!(rows[1]["resolved"], json!(false));
    }

    #[test]
    fn text_columns_keep_their_spelling() {
        let csv = "\
gpName,date,fmName,performance,attitude,errorCount,comments,teamId
Sofia Barchan,2024-01-05,Marek Tamm,8,9,0,TRUE,007
";

        let rows = CsvIntakeImporter::from_reader(csv.as_bytes()).expect("csv parses");

        assert_eq!(rows[0]["teamId"], json!("007"));
        assert_eq!(rows[0]["comments"], json!("TRUE"));
        assert_eq!(rows[0]["performance"], json!(8));

        let report = crate::workflows::intake::RecordValidator.evaluation(&rows[0]);
        assert!(report.valid, "unexpected errors: {:?}", report.errors);
        let record = report.data.expect("accepted record");
        assert_eq!(record.team_id, "007");
        assert_eq!(record.comments, "TRUE");
    }

    #[test]
    fn ragged_rows_surface_as_csv_errors() {
        let csv = "gpName,date\nSofia Barchan,2024-01-03,extra\n";

        let result = CsvIntakeImporter::from_reader(csv.as_bytes());

        assert!(matches!(result, Err(IntakeImportError::Csv(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = CsvIntakeImporter::from_path("/definitely/not/here.csv");
        assert!(matches!(result, Err(IntakeImportError::Io(_))));
    }
}
