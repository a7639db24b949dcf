use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::summary::ReportContent;
use crate::workflows::bonus::MonthlyFacts;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar month a report covers. `month` is always within `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReportPeriod {
    month: u32,
    year: i32,
}

impl ReportPeriod {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    /// The calendar month before the one containing `date`.
    pub fn previous_month_of(date: NaiveDate) -> Self {
        if date.month() == 1 {
            Self {
                month: 12,
                year: date.year() - 1,
            }
        } else {
            Self {
                month: date.month() - 1,
                year: date.year(),
            }
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

impl<'de> Deserialize<'de> for ReportPeriod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            month: u32,
            year: i32,
        }

        let raw = Raw::deserialize(deserializer)?;
        ReportPeriod::new(raw.month, raw.year).ok_or_else(|| {
            serde::de::Error::custom(format!("month must be within 1..=12, found {}", raw.month))
        })
    }
}

/// Account whose teams get monthly reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveUser {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedTeam {
    pub id: TeamId,
    pub name: String,
    pub floor_manager: String,
}

/// Aggregated evaluation scores and bonus facts for one presenter in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenterMonthlyStats {
    pub gp_name: String,
    pub evaluation_count: u32,
    pub avg_total_score: f64,
    pub avg_appearance_score: f64,
    pub avg_game_performance_score: f64,
    pub facts: MonthlyFacts,
}

/// Everything the store needs to persist a freshly generated report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDraft {
    pub team_id: TeamId,
    pub period: ReportPeriod,
    pub generated_by: UserId,
    pub content: ReportContent,
    pub stats: Vec<PresenterMonthlyStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    pub id: ReportId,
    pub team_id: TeamId,
    pub period: ReportPeriod,
    pub generated_by: UserId,
    pub content: ReportContent,
}
