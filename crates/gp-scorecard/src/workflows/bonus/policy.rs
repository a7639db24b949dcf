use serde::{Deserialize, Serialize};

/// Bonus tier reached for a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusLevel {
    #[serde(rename = "level1")]
    Level1,
    #[serde(rename = "level2")]
    Level2,
    #[serde(rename = "ineligible")]
    Ineligible,
}

impl BonusLevel {
    pub const fn label(self) -> &'static str {
        match self {
            BonusLevel::Level1 => "level1",
            BonusLevel::Level2 => "level2",
            BonusLevel::Ineligible => "ineligible",
        }
    }
}

/// A tier a presenter can aim for; `Ineligible` is never a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetLevel {
    #[serde(rename = "level1")]
    Level1,
    #[serde(rename = "level2")]
    Level2,
}

impl TargetLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "level1" | "1" => Some(TargetLevel::Level1),
            "level2" | "2" => Some(TargetLevel::Level2),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TargetLevel::Level1 => "level1",
            TargetLevel::Level2 => "level2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusTier {
    pub level: BonusLevel,
    pub minimum_ggs: u64,
    pub hourly_rate: f64,
}

/// Fixed tier table. Tiers are evaluated highest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusPolicy {
    level1: BonusTier,
    level2: BonusTier,
}

impl Default for BonusPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl BonusPolicy {
    pub const fn standard() -> Self {
        Self {
            level1: BonusTier {
                level: BonusLevel::Level1,
                minimum_ggs: 2500,
                hourly_rate: 1.50,
            },
            level2: BonusTier {
                level: BonusLevel::Level2,
                minimum_ggs: 5000,
                hourly_rate: 2.50,
            },
        }
    }

    pub fn tier(&self, target: TargetLevel) -> &BonusTier {
        match target {
            TargetLevel::Level1 => &self.level1,
            TargetLevel::Level2 => &self.level2,
        }
    }

    /// Highest tier whose GG threshold is met, ignoring hours and disqualifications.
    pub fn tier_for_ggs(&self, ggs: u64) -> Option<&BonusTier> {
        [&self.level2, &self.level1]
            .into_iter()
            .find(|tier| ggs >= tier.minimum_ggs)
    }
}

/// The first error in a month is excused.
pub fn effective_error_count(errors: u64) -> u64 {
    errors.saturating_sub(1)
}

/// Games divided by effective errors (floored); all games count when no effective errors.
pub fn good_games(total_games: u64, effective_errors: u64) -> u64 {
    if effective_errors == 0 {
        total_games
    } else {
        total_games / effective_errors
    }
}
