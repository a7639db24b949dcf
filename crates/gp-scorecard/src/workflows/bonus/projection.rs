use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::policy::{good_games, BonusLevel, BonusPolicy, TargetLevel};

/// Month-to-date figures to extrapolate. `days_elapsed == 0` is read as one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub month: u32,
    pub year: i32,
    pub games_so_far: u64,
    pub errors_so_far: u64,
    pub hours_so_far: f64,
    pub days_in_month: u32,
    pub days_elapsed: u32,
}

impl ProjectionInput {
    /// Derives the calendar figures from `today`, counting `today` as elapsed.
    pub fn for_date(today: NaiveDate, games_so_far: u64, errors_so_far: u64, hours_so_far: f64) -> Self {
        Self {
            month: today.month(),
            year: today.year(),
            games_so_far,
            errors_so_far,
            hours_so_far,
            days_in_month: days_in_month(today.year(), today.month()),
            days_elapsed: today.day(),
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(start), Some(next)) => (next - start).num_days() as u32,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionLevel {
    #[serde(rename = "level1")]
    Level1,
    #[serde(rename = "level2")]
    Level2,
    Neither,
}

impl ProjectionLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectionLevel::Level1 => "level1",
            ProjectionLevel::Level2 => "level2",
            ProjectionLevel::Neither => "neither",
        }
    }
}

impl From<BonusLevel> for ProjectionLevel {
    fn from(level: BonusLevel) -> Self {
        match level {
            BonusLevel::Level1 => ProjectionLevel::Level1,
            BonusLevel::Level2 => ProjectionLevel::Level2,
            BonusLevel::Ineligible => ProjectionLevel::Neither,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusProjection {
    pub month: u32,
    pub year: i32,
    pub projected_games: u64,
    pub projected_errors: u64,
    pub projected_hours: f64,
    pub projected_ggs: u64,
    /// Rounded to cents.
    pub projected_bonus: f64,
    pub pace: f64,
    pub on_track_for_level: ProjectionLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GgGap {
    pub target_level: TargetLevel,
    pub gap_ggs: u64,
    pub recommended_error_rate: f64,
    pub estimated_games_needed: u64,
}

pub(crate) fn project(policy: &BonusPolicy, input: &ProjectionInput) -> BonusProjection {
    let ratio = f64::from(input.days_in_month) / f64::from(input.days_elapsed.max(1));

    let projected_games = (input.games_so_far as f64 * ratio).floor() as u64;
    // Errors are scaled before the free mistake is taken off.
    let projected_errors = ((input.errors_so_far as f64 * ratio).floor() as u64).saturating_sub(1);
    let projected_hours = input.hours_so_far * ratio;
    let projected_ggs = good_games(projected_games, projected_errors);

    let billable_hours = if projected_hours.is_finite() && projected_hours > 0.0 {
        projected_hours
    } else {
        0.0
    };

    let (on_track_for_level, projected_bonus) = match policy.tier_for_ggs(projected_ggs) {
        Some(tier) => (tier.level.into(), round_to(tier.hourly_rate * billable_hours, 2)),
        None => (ProjectionLevel::Neither, 0.0),
    };

    BonusProjection {
        month: input.month,
        year: input.year,
        projected_games,
        projected_errors,
        projected_hours,
        projected_ggs,
        projected_bonus,
        pace: ratio,
        on_track_for_level,
    }
}

pub(crate) fn gap(policy: &BonusPolicy, current_ggs: u64, target_level: TargetLevel) -> GgGap {
    let target = policy.tier(target_level).minimum_ggs;
    let gap_ggs = target.saturating_sub(current_ggs);

    if gap_ggs == 0 || target == 0 {
        return GgGap {
            target_level,
            gap_ggs: 0,
            recommended_error_rate: 0.0,
            estimated_games_needed: 0,
        };
    }

    GgGap {
        target_level,
        gap_ggs,
        recommended_error_rate: round_to(gap_ggs as f64 / target as f64, 4),
        estimated_games_needed: gap_ggs,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
