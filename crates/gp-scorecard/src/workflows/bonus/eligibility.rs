use serde::{Deserialize, Serialize, Serializer};

use super::policy::{effective_error_count, good_games, BonusLevel, BonusPolicy, TargetLevel};

/// Monthly totals for one presenter.
///
/// Counts are unsigned, so a negative figure is rejected when the input is decoded.
/// `hours_worked` must be strictly positive for any tier; zero, negative, or NaN
/// hours simply leave the presenter ineligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusCalculationInput {
    #[serde(default)]
    pub gp_id: String,
    pub month: u32,
    pub year: i32,
    pub total_games_played: u64,
    pub error_count: u64,
    pub hours_worked: f64,
    #[serde(default)]
    pub has_disqualifying_factors: bool,
    /// Any outstanding warning disqualifies, like an active disciplinary case.
    #[serde(default)]
    pub disciplinary_warnings: u32,
    #[serde(default)]
    pub sickleave_late_violations: bool,
}

/// Aggregated per-presenter month produced by the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFacts {
    pub gp_id: String,
    pub month: u32,
    pub year: i32,
    pub total_games_played: u64,
    pub error_count: u64,
    pub hours_worked: f64,
    pub has_disqualifying_factors: bool,
    pub sickleave_late_violations: bool,
}

impl From<&MonthlyFacts> for BonusCalculationInput {
    fn from(facts: &MonthlyFacts) -> Self {
        Self {
            gp_id: facts.gp_id.clone(),
            month: facts.month,
            year: facts.year,
            total_games_played: facts.total_games_played,
            error_count: facts.error_count,
            hours_worked: facts.hours_worked,
            has_disqualifying_factors: facts.has_disqualifying_factors,
            disciplinary_warnings: 0,
            sickleave_late_violations: facts.sickleave_late_violations,
        }
    }
}

impl From<MonthlyFacts> for BonusCalculationInput {
    fn from(facts: MonthlyFacts) -> Self {
        Self::from(&facts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisqualifyingFactor {
    DisciplinaryAction,
    AttendanceViolation,
}

impl DisqualifyingFactor {
    pub const fn label(self) -> &'static str {
        match self {
            DisqualifyingFactor::DisciplinaryAction => {
                "Active disciplinary cases, warnings, or PDPs"
            }
            DisqualifyingFactor::AttendanceViolation => {
                "Lateness or sick leave procedure violations"
            }
        }
    }
}

impl Serialize for DisqualifyingFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GgsBreakdown {
    pub ggs: u64,
    pub qualified_games: u64,
    pub effective_error_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusCalculationResult {
    pub gp_id: String,
    pub month: u32,
    pub year: i32,
    pub total_games_played: u64,
    pub error_count: u64,
    pub hours_worked: f64,
    pub bonus_level: BonusLevel,
    pub minimum_ggs_required: u64,
    pub achieved_ggs: u64,
    pub bonus_rate: f64,
    pub bonus_amount: f64,
    pub is_eligible: bool,
    pub disqualifying_factors: Vec<DisqualifyingFactor>,
    pub calculations: GgsBreakdown,
}

pub(crate) fn decide(policy: &BonusPolicy, input: &BonusCalculationInput) -> BonusCalculationResult {
    let mut disqualifying_factors = Vec::new();
    if input.has_disqualifying_factors || input.disciplinary_warnings > 0 {
        disqualifying_factors.push(DisqualifyingFactor::DisciplinaryAction);
    }
    if input.sickleave_late_violations {
        disqualifying_factors.push(DisqualifyingFactor::AttendanceViolation);
    }

    let effective_errors = effective_error_count(input.error_count);
    let ggs = good_games(input.total_games_played, effective_errors);

    let qualifies = input.hours_worked > 0.0 && disqualifying_factors.is_empty();
    let tier = policy.tier_for_ggs(ggs).filter(|_| qualifies);

    let (bonus_level, bonus_rate, bonus_amount) = match tier {
        Some(tier) => (tier.level, tier.hourly_rate, tier.hourly_rate * input.hours_worked),
        None => (BonusLevel::Ineligible, 0.0, 0.0),
    };

    let minimum_ggs_required = match bonus_level {
        BonusLevel::Level2 => policy.tier(TargetLevel::Level2).minimum_ggs,
        BonusLevel::Level1 | BonusLevel::Ineligible => policy.tier(TargetLevel::Level1).minimum_ggs,
    };

    BonusCalculationResult {
        gp_id: input.gp_id.clone(),
        month: input.month,
        year: input.year,
        total_games_played: input.total_games_played,
        error_count: input.error_count,
        hours_worked: input.hours_worked,
        bonus_level,
        minimum_ggs_required,
        achieved_ggs: ggs,
        bonus_rate,
        bonus_amount,
        is_eligible: bonus_level != BonusLevel::Ineligible,
        disqualifying_factors,
        calculations: GgsBreakdown {
            ggs,
            qualified_games: input.total_games_played.saturating_sub(effective_errors),
            effective_error_count: effective_errors,
        },
    }
}
