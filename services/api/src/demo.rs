use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, ValueEnum};
use gp_scorecard::config::ReportScheduleConfig;
use gp_scorecard::error::AppError;
use gp_scorecard::workflows::bonus::{
    BonusCalculationInput, BonusCalculationResult, BonusCalculator, ProjectionInput, TargetLevel,
};
use gp_scorecard::workflows::intake::{
    check_consistency, validate_batch, BatchValidation, CsvIntakeImporter, RecordValidator,
};
use gp_scorecard::workflows::reports::{
    MonthlyReportRunner, ReportPeriod, RunOutcome, RunSummary, TeamOutcome,
};
use gp_scorecard::workflows::roster::FuzzyMatcher;
use serde_json::{json, Value};

use crate::infra::{parse_date, seeded_collaborators};

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Presenter identifier echoed in the result
    #[arg(long, default_value = "")]
    pub(crate) gp_id: String,
    /// Games dealt during the month
    #[arg(long)]
    pub(crate) games: u64,
    /// Recorded mistakes; the first one is free
    #[arg(long)]
    pub(crate) errors: u64,
    /// Hours worked during the month
    #[arg(long)]
    pub(crate) hours: f64,
    /// Month number (defaults to the current month)
    #[arg(long)]
    pub(crate) month: Option<u32>,
    /// Year (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Presenter has an active disciplinary case, warning, or PDP
    #[arg(long)]
    pub(crate) disciplinary: bool,
    /// Presenter broke lateness or sick leave procedure
    #[arg(long)]
    pub(crate) attendance_violation: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ProjectionArgs {
    /// Games dealt so far this month
    #[arg(long)]
    pub(crate) games: u64,
    /// Mistakes so far this month
    #[arg(long)]
    pub(crate) errors: u64,
    /// Hours worked so far this month
    #[arg(long)]
    pub(crate) hours: f64,
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct GapArgs {
    /// GGs achieved so far
    #[arg(long)]
    pub(crate) current_ggs: u64,
    /// Tier to reach: level1 or level2
    #[arg(long, value_parser = parse_target_level)]
    pub(crate) target: TargetLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum UploadKind {
    Evaluations,
    Attendance,
    Errors,
}

#[derive(Args, Debug)]
pub(crate) struct IntakeValidateArgs {
    /// Which record layout the CSV follows
    #[arg(long, value_enum)]
    pub(crate) kind: UploadKind,
    /// Path to the CSV upload
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportRunArgs {
    /// Month number; give both --month and --year, or neither for the previous month
    #[arg(long)]
    pub(crate) month: Option<u32>,
    #[arg(long)]
    pub(crate) year: Option<i32>,
}

fn parse_target_level(raw: &str) -> Result<TargetLevel, String> {
    TargetLevel::parse(raw).ok_or_else(|| format!("unknown target level '{raw}' (use level1 or level2)"))
}

pub(crate) fn run_bonus_eligibility(args: EligibilityArgs) -> Result<(), AppError> {
    let today = Local::now().date_naive();
    let input = BonusCalculationInput {
        gp_id: args.gp_id,
        month: args.month.unwrap_or_else(|| today.month()),
        year: args.year.unwrap_or_else(|| today.year()),
        total_games_played: args.games,
        error_count: args.errors,
        hours_worked: args.hours,
        has_disqualifying_factors: args.disciplinary,
        disciplinary_warnings: 0,
        sickleave_late_violations: args.attendance_violation,
    };

    let result = BonusCalculator::default().eligibility(&input);
    render_eligibility(&result);
    Ok(())
}

pub(crate) fn run_bonus_projection(args: ProjectionArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let input = ProjectionInput::for_date(today, args.games, args.errors, args.hours);
    let projection = BonusCalculator::default().projection(&input);

    println!(
        "Projection for {} (day {} of {})",
        period_label(input.month, input.year),
        input.days_elapsed,
        input.days_in_month
    );
    println!(
        "- {} games | {} effective errors | {:.1} hours",
        projection.projected_games, projection.projected_errors, projection.projected_hours
    );
    println!(
        "- {} GGs -> {} ({:.2})",
        projection.projected_ggs,
        projection.on_track_for_level.label(),
        projection.projected_bonus
    );
    Ok(())
}

pub(crate) fn run_bonus_gap(args: GapArgs) -> Result<(), AppError> {
    let gap = BonusCalculator::default().gap_to_level(args.current_ggs, args.target);
    if gap.gap_ggs == 0 {
        println!("Already at or above {}", args.target.label());
    } else {
        println!(
            "{} GGs short of {} (about {} more games, {:.2}% of the threshold)",
            gap.gap_ggs,
            args.target.label(),
            gap.estimated_games_needed,
            gap.recommended_error_rate * 100.0
        );
    }
    Ok(())
}

pub(crate) fn run_intake_validation(args: IntakeValidateArgs) -> Result<(), AppError> {
    let rows = CsvIntakeImporter::from_path(&args.csv)?;
    println!("Validating {} rows from {}", rows.len(), args.csv.display());

    match args.kind {
        UploadKind::Evaluations => {
            let batch = validate_batch(&rows, |row| RecordValidator.evaluation(row));
            render_batch(&batch);
            let report = check_consistency(&batch.accepted, &[], &[]);
            for issue in &report.issues {
                println!("  issue: {issue}");
            }
        }
        UploadKind::Attendance => {
            render_batch(&validate_batch(&rows, |row| RecordValidator.attendance(row)))
        }
        UploadKind::Errors => {
            render_batch(&validate_batch(&rows, |row| RecordValidator.error_report(row)))
        }
    }
    Ok(())
}

pub(crate) async fn run_monthly_reports(args: ReportRunArgs) -> Result<(), AppError> {
    let (collaborators, store) = seeded_collaborators();
    let runner = MonthlyReportRunner::new(collaborators, &ReportScheduleConfig::default());

    let period = match (args.month, args.year) {
        (Some(month), Some(year)) => ReportPeriod::new(month, year).ok_or_else(|| {
            AppError::InvalidInput(format!("month must be within 1..=12, found {month}"))
        })?,
        (None, None) => runner.period_at(chrono::Utc::now()),
        _ => {
            return Err(AppError::InvalidInput(
                "--month and --year must be given together".to_string(),
            ))
        }
    };

    match runner.run_for(period).await {
        RunOutcome::Completed(summary) => render_run(&summary),
        RunOutcome::AlreadyRunning => println!("A monthly run is already in progress"),
        RunOutcome::Aborted { period, reason } => {
            return Err(AppError::InvalidInput(format!(
                "monthly run for {period} aborted: {reason}"
            )))
        }
    }

    for report in store.reports() {
        println!("\nReport #{} ({})", report.id, report.team_id);
        print!("{}", report.content.render());
    }
    Ok(())
}

pub(crate) async fn run_demo() -> Result<(), AppError> {
    println!("GP scorecard demo");

    println!("\nUpload intake");
    let uploads: Vec<Value> = vec![
        json!({"gpName": "sofia  barchan", "date": "2024-01-05", "fmName": "Marek Tamm",
               "performance": 8, "attitude": 9, "errorCount": 0, "teamId": "aurora"}),
        json!({"gpName": "Peeter Kask", "date": "2024-01-05", "fmName": "Marek Tamm",
               "performance": 3, "attitude": 7, "errorCount": 6, "teamId": "aurora"}),
        json!({"gpName": "", "date": "05/01/2024", "fmName": "Marek Tamm",
               "performance": 12, "attitude": 7, "errorCount": -1, "teamId": "aurora"}),
    ];
    let batch = validate_batch(&uploads, |row| RecordValidator.evaluation(row));
    render_batch(&batch);

    println!("\nRoster matching");
    let roster = ["Sofia Barchan", "Anna-Maria Kuusk", "Peeter Kask"];
    let matcher = FuzzyMatcher::default();
    for query in ["Sofja Barchan", "anna maria kuusk", "Kadri Lepp"] {
        match matcher.best_match(query, &roster) {
            Some(found) => println!(
                "- '{query}' -> {} ({:.0}%)",
                found.candidate,
                found.score * 100.0
            ),
            None => println!("- '{query}' -> no roster match"),
        }
    }

    println!("\nBonus eligibility");
    let calculator = BonusCalculator::default();
    for (gp_id, games, errors, hours) in [
        ("sofia-barchan", 5400, 1, 152.0),
        ("anna-maria-kuusk", 2900, 2, 138.5),
        ("peeter-kask", 1800, 4, 120.0),
    ] {
        let result = calculator.eligibility(&BonusCalculationInput {
            gp_id: gp_id.to_string(),
            month: 1,
            year: 2024,
            total_games_played: games,
            error_count: errors,
            hours_worked: hours,
            has_disqualifying_factors: false,
            disciplinary_warnings: 0,
            sickleave_late_violations: false,
        });
        render_eligibility(&result);
    }

    println!("\nMonthly reports");
    run_monthly_reports(ReportRunArgs {
        month: Some(1),
        year: Some(2024),
    })
    .await
}

fn render_eligibility(result: &BonusCalculationResult) {
    println!(
        "- {} {}: {} GGs from {} games ({} effective errors) -> {} at {:.2}/h = {:.2}",
        if result.gp_id.is_empty() { "presenter" } else { result.gp_id.as_str() },
        period_label(result.month, result.year),
        result.achieved_ggs,
        result.total_games_played,
        result.calculations.effective_error_count,
        result.bonus_level.label(),
        result.bonus_rate,
        result.bonus_amount
    );
    for factor in &result.disqualifying_factors {
        println!("    disqualified: {}", factor.label());
    }
}

fn render_batch<T>(batch: &BatchValidation<T>) {
    println!(
        "- {} accepted, {} rejected, {} warnings",
        batch.accepted.len(),
        batch.rejected.len(),
        batch.warnings.len()
    );
    for row in &batch.rejected {
        for error in &row.errors {
            println!("    row {}: {} ({})", row.index + 1, error.message, error.field);
        }
    }
    for warning in &batch.warnings {
        println!("    row {} warning: {}", warning.index + 1, warning.message);
    }
}

fn render_run(summary: &RunSummary) {
    println!(
        "Run for {}: {} generated, {} skipped, {} failed",
        summary.period,
        summary.generated_count(),
        summary.skipped_count(),
        summary.failed_count()
    );
    for record in &summary.teams {
        let outcome = match &record.outcome {
            TeamOutcome::Generated { report_id } => format!("report #{report_id}"),
            TeamOutcome::SkippedExisting => "already reported".to_string(),
            TeamOutcome::SkippedNoData => "no evaluation data".to_string(),
            TeamOutcome::Failed { reason } => format!("failed: {reason}"),
        };
        println!("- {} / {}: {outcome}", record.owner, record.team_name);
    }
}

fn period_label(month: u32, year: i32) -> String {
    ReportPeriod::new(month, year)
        .map(|period| period.to_string())
        .unwrap_or_else(|| format!("{month}/{year}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_levels_parse_from_cli_values() {
        assert_eq!(parse_target_level("level2"), Ok(TargetLevel::Level2));
        assert_eq!(parse_target_level("1"), Ok(TargetLevel::Level1));
        assert!(parse_target_level("gold").is_err());
    }

    #[test]
    fn period_labels_fall_back_for_bad_months() {
        assert_eq!(period_label(3, 2024), "March 2024");
        assert_eq!(period_label(14, 2024), "14/2024");
    }

    #[tokio::test]
    async fn report_run_rejects_partial_bad_month() {
        let result = run_monthly_reports(ReportRunArgs {
            month: Some(0),
            year: Some(2024),
        })
        .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn report_run_rejects_month_without_year() {
        let result = run_monthly_reports(ReportRunArgs {
            month: Some(3),
            year: None,
        })
        .await;
        assert!(matches!(
            result,
            Err(AppError::InvalidInput(message)) if message.contains("together")
        ));
    }
}
