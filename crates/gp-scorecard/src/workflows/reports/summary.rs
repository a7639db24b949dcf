use std::fmt::Write as _;

use serde::Serialize;

use super::domain::{ManagedTeam, PresenterMonthlyStats, ReportPeriod};
use super::runner::{RunSummary, TeamOutcome};
use crate::workflows::bonus::{BonusCalculationInput, BonusCalculator, BonusLevel};

/// Presenters averaging below this total score are listed for follow-up.
pub const NEEDS_IMPROVEMENT_BELOW: f64 = 18.0;
const TOP_PERFORMER_COUNT: usize = 3;
const ERROR_LEADER_COUNT: usize = 5;
const AUTO_GENERATED_COMMENT: &str = "Auto-generated monthly report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRating {
    Excellent,
    Good,
    NeedsImprovement,
    Critical,
}

impl TeamRating {
    pub fn from_average(average_total: f64) -> Self {
        if average_total >= 20.0 {
            TeamRating::Excellent
        } else if average_total >= 18.0 {
            TeamRating::Good
        } else if average_total >= 16.0 {
            TeamRating::NeedsImprovement
        } else {
            TeamRating::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TeamRating::Excellent => "Excellent",
            TeamRating::Good => "Good",
            TeamRating::NeedsImprovement => "Needs Improvement",
            TeamRating::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformerLine {
    pub gp_name: String,
    pub avg_total_score: f64,
    pub avg_appearance_score: f64,
    pub avg_game_performance_score: f64,
    pub evaluation_count: u32,
    pub error_count: u64,
}

impl PerformerLine {
    fn from_stats(stats: &PresenterMonthlyStats) -> Self {
        Self {
            gp_name: stats.gp_name.clone(),
            avg_total_score: stats.avg_total_score,
            avg_appearance_score: stats.avg_appearance_score,
            avg_game_performance_score: stats.avg_game_performance_score,
            evaluation_count: stats.evaluation_count,
            error_count: stats.facts.error_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusLine {
    pub gp_name: String,
    pub bonus_level: BonusLevel,
    pub achieved_ggs: u64,
    pub bonus_amount: f64,
}

/// Synthesized body of a monthly team report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportContent {
    pub team_name: String,
    pub floor_manager: String,
    pub period: ReportPeriod,
    pub presenters_evaluated: usize,
    pub average_total_score: f64,
    pub average_appearance_score: f64,
    pub average_game_performance_score: f64,
    pub rating: TeamRating,
    pub top_performers: Vec<PerformerLine>,
    pub needs_improvement: Vec<PerformerLine>,
    pub error_leaders: Vec<PerformerLine>,
    pub total_errors: u64,
    pub bonus_lines: Vec<BonusLine>,
    pub comments: String,
}

pub fn compose(
    team: &ManagedTeam,
    period: ReportPeriod,
    stats: &[PresenterMonthlyStats],
    calculator: &BonusCalculator,
) -> ReportContent {
    let average_total_score = average(stats, |gp| gp.avg_total_score);

    let mut ranked: Vec<&PresenterMonthlyStats> = stats.iter().collect();
    ranked.sort_by(|a, b| b.avg_total_score.total_cmp(&a.avg_total_score));
    let top_performers = ranked
        .iter()
        .take(TOP_PERFORMER_COUNT)
        .map(|gp| PerformerLine::from_stats(gp))
        .collect();

    let needs_improvement = stats
        .iter()
        .filter(|gp| gp.avg_total_score < NEEDS_IMPROVEMENT_BELOW)
        .map(PerformerLine::from_stats)
        .collect();

    let mut with_errors: Vec<&PresenterMonthlyStats> =
        stats.iter().filter(|gp| gp.facts.error_count > 0).collect();
    with_errors.sort_by(|a, b| b.facts.error_count.cmp(&a.facts.error_count));
    let total_errors = with_errors.iter().map(|gp| gp.facts.error_count).sum();
    let error_leaders = with_errors
        .iter()
        .take(ERROR_LEADER_COUNT)
        .map(|gp| PerformerLine::from_stats(gp))
        .collect();

    let bonus_lines = stats
        .iter()
        .map(|gp| {
            let result = calculator.eligibility(&BonusCalculationInput::from(&gp.facts));
            BonusLine {
                gp_name: gp.gp_name.clone(),
                bonus_level: result.bonus_level,
                achieved_ggs: result.achieved_ggs,
                bonus_amount: result.bonus_amount,
            }
        })
        .collect();

    ReportContent {
        team_name: team.name.clone(),
        floor_manager: team.floor_manager.clone(),
        period,
        presenters_evaluated: stats.len(),
        average_total_score,
        average_appearance_score: average(stats, |gp| gp.avg_appearance_score),
        average_game_performance_score: average(stats, |gp| gp.avg_game_performance_score),
        rating: TeamRating::from_average(average_total_score),
        top_performers,
        needs_improvement,
        error_leaders,
        total_errors,
        bonus_lines,
        comments: AUTO_GENERATED_COMMENT.to_string(),
    }
}

fn average(stats: &[PresenterMonthlyStats], score: impl Fn(&PresenterMonthlyStats) -> f64) -> f64 {
    if stats.is_empty() {
        return 0.0;
    }
    stats.iter().map(score).sum::<f64>() / stats.len() as f64
}

impl ReportContent {
    /// Plain-text rendering used for e-mail bodies and CLI output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Team: {}", self.team_name);
        let _ = writeln!(out, "Floor Manager: {}", self.floor_manager);
        let _ = writeln!(out, "Period: {}", self.period);
        let _ = writeln!(out);

        let _ = writeln!(out, "=== EVALUATION STATISTICS ===");
        let _ = writeln!(out, "- Total GPs Evaluated: {}", self.presenters_evaluated);
        let _ = writeln!(
            out,
            "- Average Total Score: {:.1}/24 ({})",
            self.average_total_score,
            self.rating.label()
        );
        let _ = writeln!(
            out,
            "- Average Appearance Score: {:.1}/12",
            self.average_appearance_score
        );
        let _ = writeln!(
            out,
            "- Average Game Performance Score: {:.1}/10",
            self.average_game_performance_score
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "=== TOP PERFORMERS ===");
        for (rank, gp) in self.top_performers.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} - {:.1}/24 ({} evaluations, {} errors)",
                rank + 1,
                gp.gp_name,
                gp.avg_total_score,
                gp.evaluation_count,
                gp.error_count
            );
        }
        let _ = writeln!(out);

        if self.needs_improvement.is_empty() {
            let _ = writeln!(out, "=== All GPs are performing well (score >= 18) ===");
        } else {
            let _ = writeln!(out, "=== GPs NEEDING IMPROVEMENT (score < 18) ===");
            for gp in &self.needs_improvement {
                let _ = writeln!(
                    out,
                    "- {}: {:.1}/24 (Appearance: {:.1}/12, Game Perf: {:.1}/10)",
                    gp.gp_name,
                    gp.avg_total_score,
                    gp.avg_appearance_score,
                    gp.avg_game_performance_score
                );
            }
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "=== ERROR ANALYSIS ===");
        let _ = writeln!(out, "- Total Team Errors: {}", self.total_errors);
        if self.error_leaders.is_empty() {
            let _ = writeln!(out, "No errors recorded this month");
        } else {
            for gp in &self.error_leaders {
                let _ = writeln!(out, "- {}: {} errors", gp.gp_name, gp.error_count);
            }
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "=== BONUS ELIGIBILITY ===");
        for line in &self.bonus_lines {
            let _ = writeln!(
                out,
                "- {}: {} ({} GGs, {:.2})",
                line.gp_name,
                line.bonus_level.label(),
                line.achieved_ggs,
                line.bonus_amount
            );
        }

        out
    }
}

/// Notification addressed to the service owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerMessage {
    pub title: String,
    pub content: String,
}

pub fn run_summary_message(summary: &RunSummary) -> OwnerMessage {
    let generated = summary.generated_count();
    if generated == 0 {
        return OwnerMessage {
            title: format!("Monthly Reports: No Reports Generated for {}", summary.period),
            content: "Automated monthly report generation ran but no new reports were generated. \
                      Either all teams already have reports for this month, or no evaluation data \
                      was found."
                .to_string(),
        };
    }

    let lines: Vec<String> = summary
        .teams
        .iter()
        .filter_map(|record| match &record.outcome {
            TeamOutcome::Generated { report_id } => Some(format!(
                "- {}: {} (Report #{})",
                record.owner, record.team_name, report_id
            )),
            _ => None,
        })
        .collect();

    OwnerMessage {
        title: format!("Monthly Reports Generated: {}", summary.period),
        content: format!(
            "Automated monthly report generation completed.\n\nGenerated: {} reports\nSkipped: {} (no data, already exists, or failed)\n\nReports:\n{}",
            generated,
            summary.skipped_count(),
            lines.join("\n")
        ),
    }
}

pub fn run_failure_message(period: ReportPeriod, reason: &str) -> OwnerMessage {
    OwnerMessage {
        title: "Monthly Report Generation Failed".to_string(),
        content: format!(
            "The automated monthly report generation for {period} encountered an error: {reason}"
        ),
    }
}
