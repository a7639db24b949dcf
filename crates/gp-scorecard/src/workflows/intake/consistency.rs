use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

use super::domain::{AttendanceRecord, ErrorReportRecord, EvaluationRecord};
use crate::workflows::roster::normalize_name;

/// Cross-collection findings. Issues block trust in aggregates; warnings are informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConsistencyReport {
    pub fn requires_review(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Items grouped by key: every group with more than one member, and the singletons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroups<K, T> {
    pub duplicates: Vec<(K, Vec<T>)>,
    pub unique: Vec<T>,
}

/// Groups `items` by `key`, preserving first-seen order for both groups and members.
pub fn find_duplicates<T, K, F>(items: &[T], key: F) -> DuplicateGroups<K, T>
where
    T: Clone,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut order: Vec<K> = Vec::new();
    let mut groups: HashMap<K, Vec<T>> = HashMap::new();

    for item in items {
        let item_key = key(item);
        groups
            .entry(item_key.clone())
            .or_insert_with(|| {
                order.push(item_key.clone());
                Vec::new()
            })
            .push(item.clone());
    }

    let mut duplicates = Vec::new();
    let mut unique = Vec::new();
    for group_key in order {
        let Some(mut members) = groups.remove(&group_key) else {
            continue;
        };
        if members.len() > 1 {
            duplicates.push((group_key, members));
        } else {
            unique.append(&mut members);
        }
    }

    DuplicateGroups { duplicates, unique }
}

/// Flags presenters with errors or attendance but no evaluations, and duplicate
/// evaluations for the same presenter on the same day.
pub fn check(
    evaluations: &[EvaluationRecord],
    errors: &[ErrorReportRecord],
    attendance: &[AttendanceRecord],
) -> ConsistencyReport {
    let mut report = ConsistencyReport::default();

    let evaluated: HashSet<String> = evaluations
        .iter()
        .map(|record| normalize_name(&record.gp_name))
        .collect();

    for name in first_seen_names(errors.iter().map(|record| record.gp_name.as_str())) {
        if !evaluated.contains(&name) {
            report
                .warnings
                .push(format!("GP \"{name}\" has errors but no evaluations"));
        }
    }

    for name in first_seen_names(attendance.iter().map(|record| record.gp_name.as_str())) {
        if !evaluated.contains(&name) {
            report
                .warnings
                .push(format!("GP \"{name}\" has attendance records but no evaluations"));
        }
    }

    let grouped = find_duplicates(evaluations, |record| {
        format!("{}|{}", normalize_name(&record.gp_name), record.date)
    });
    for (key, _) in grouped.duplicates {
        report
            .issues
            .push(format!("Duplicate evaluations for \"{key}\""));
    }

    report
}

fn first_seen_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .map(normalize_name)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::domain::{AttendanceStatus, ErrorType, Severity};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).expect("valid date")
    }

    fn evaluation(name: &str, date: NaiveDate) -> EvaluationRecord {
        EvaluationRecord {
            gp_name: name.to_string(),
            date,
            fm_name: "Marek Tamm".to_string(),
            performance: 8,
            attitude: 8,
            error_count: 0,
            comments: String::new(),
            team_id: "team-1".to_string(),
        }
    }

    fn error_report(name: &str) -> ErrorReportRecord {
        ErrorReportRecord {
            gp_name: name.to_string(),
            error_type: ErrorType::GameError,
            description: "Misdealt a card".to_string(),
            severity: Severity::Medium,
            date: day(3),
            team_id: "team-1".to_string(),
            resolved: true,
            resolution_notes: String::new(),
        }
    }

    fn attendance(name: &str) -> AttendanceRecord {
        AttendanceRecord {
            gp_name: name.to_string(),
            date: day(3),
            status: AttendanceStatus::Present,
            hours_worked: 8.0,
            team_id: "team-1".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn same_presenter_same_day_is_one_issue() {
        let evaluations = [
            evaluation("Sofia Barchan", day(5)),
            evaluation("sofia  barchan", day(5)),
            evaluation("Sofia Barchan", day(6)),
        ];

        let report = check(&evaluations, &[], &[]);

        assert_eq!(
            report.issues,
            vec!["Duplicate evaluations for \"Sofia Barchan|2024-01-05\"".to_string()]
        );
        assert!(report.requires_review());
    }

    #[test]
    fn distinct_dates_produce_no_issue() {
        let evaluations = [
            evaluation("Sofia Barchan", day(5)),
            evaluation("Sofia Barchan", day(6)),
        ];

        let report = check(&evaluations, &[], &[]);

        assert!(report.issues.is_empty());
        assert!(!report.requires_review());
    }

    #[test]
    fn orphaned_errors_and_attendance_only_warn() {
        let evaluations = [evaluation("Sofia Barchan", day(5))];
        let errors = [error_report("Anna Maria"), error_report("anna maria")];
        let presence = [attendance("SOFIA BARCHAN"), attendance("Peeter Kask")];

        let report = check(&evaluations, &errors, &presence);

        assert!(report.issues.is_empty());
        assert_eq!(
            report.warnings,
            vec![
                "GP \"Anna Maria\" has errors but no evaluations".to_string(),
                "GP \"Peeter Kask\" has attendance records but no evaluations".to_string(),
            ]
        );
    }

    #[test]
    fn find_duplicates_keeps_first_seen_order() {
        let items = ["b1", "a1", "b2", "c1", "a2", "b3"];

        let groups = find_duplicates(&items, |item| item.chars().next());

        assert_eq!(
            groups.duplicates,
            vec![(Some('b'), vec!["b1", "b2", "b3"]), (Some('a'), vec!["a1", "a2"])]
        );
        assert_eq!(groups.unique, vec!["c1"]);
    }
}
