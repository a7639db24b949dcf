//! Upload intake from CSV through validation, consistency checks, and roster matching.

use gp_scorecard::workflows::intake::{
    check_consistency, validate_batch, CsvIntakeImporter, RecordValidator,
};
use gp_scorecard::workflows::roster::{normalize_name, FuzzyMatcher};

const EVALUATIONS: &str = "\
gpName,date,fmName,performance,attitude,errorCount,comments,teamId
sofia  barchan,2024-01-05,Marek Tamm,8,9,0,,7
Sofia Barchan,2024-01-05,Marek Tamm,7,9,1,second shift,7
Anna Maria,2024-01-06,Marek Tamm,3,6,7,,7
Peeter Kask,2024-01-06,Marek Tamm,11,6,0,,7
";

#[test]
fn csv_upload_is_validated_row_by_row() {
    let rows = CsvIntakeImporter::from_reader(EVALUATIONS.as_bytes()).expect("csv parses");
    let batch = validate_batch(&rows, |row| RecordValidator.evaluation(row));

    assert_eq!(batch.accepted.len(), 3);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].index, 3);
    assert_eq!(batch.rejected[0].errors[0].message, "Performance must be at most 10");

    let warned: Vec<(usize, &str)> = batch
        .warnings
        .iter()
        .map(|warning| (warning.index, warning.field.as_str()))
        .collect();
    assert_eq!(warned, vec![(2, "performance"), (2, "errorCount")]);

    // Numeric team ids from spreadsheets are accepted as text.
    assert_eq!(batch.accepted[0].team_id, "7");
}

#[test]
fn accepted_rows_feed_the_consistency_check() {
    let rows = CsvIntakeImporter::from_reader(EVALUATIONS.as_bytes()).expect("csv parses");
    let batch = validate_batch(&rows, |row| RecordValidator.evaluation(row));

    let report = check_consistency(&batch.accepted, &[], &[]);

    assert_eq!(report.issues.len(), 1);
    assert!(report.issues[0].contains("Sofia Barchan|2024-01-05"));
    assert!(report.requires_review());
}

#[test]
fn uploaded_names_resolve_against_the_roster() {
    let roster = ["Sofia Barchan", "Anna-Maria Kuusk", "Peeter Kask"];
    let matcher = FuzzyMatcher::default();

    let found = matcher
        .best_match("Sofja  BARCHAN", &roster)
        .expect("close spelling resolves");
    assert_eq!(found.candidate, "Sofia Barchan");
    assert_eq!(normalize_name("  anna-maria KUUSK "), "Anna-maria Kuusk");
    assert!(matcher.best_match("Totally Unknown", &roster).is_none());
}
