//! Monthly bonus eligibility from good-games (GGs), plus pace projection and gap helpers.
//!
//! Everything here is pure: no I/O, no errors, safe to call concurrently.

mod eligibility;
mod policy;
mod projection;
pub mod router;

pub use eligibility::{
    BonusCalculationInput, BonusCalculationResult, DisqualifyingFactor, GgsBreakdown, MonthlyFacts,
};
pub use policy::{effective_error_count, good_games, BonusLevel, BonusPolicy, BonusTier, TargetLevel};
pub use projection::{days_in_month, BonusProjection, GgGap, ProjectionInput, ProjectionLevel};
pub use router::bonus_router;

/// Applies a [`BonusPolicy`] to monthly and month-to-date figures.
#[derive(Debug, Clone, Copy, Default)]
pub struct BonusCalculator {
    policy: BonusPolicy,
}

impl BonusCalculator {
    pub fn new(policy: BonusPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BonusPolicy {
        &self.policy
    }

    pub fn eligibility(&self, input: &BonusCalculationInput) -> BonusCalculationResult {
        eligibility::decide(&self.policy, input)
    }

    /// Linear extrapolation of month-to-date figures. Tracks the tier only; hours and
    /// disqualifications are not checked.
    pub fn projection(&self, input: &ProjectionInput) -> BonusProjection {
        projection::project(&self.policy, input)
    }

    pub fn gap_to_level(&self, current_ggs: u64, target: TargetLevel) -> GgGap {
        projection::gap(&self.policy, current_ggs, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(games: u64, errors: u64, hours: f64) -> BonusCalculationInput {
        BonusCalculationInput {
            gp_id: "gp-1".to_string(),
            month: 1,
            year: 2024,
            total_games_played: games,
            error_count: errors,
            hours_worked: hours,
            has_disqualifying_factors: false,
            disciplinary_warnings: 0,
            sickleave_late_violations: false,
        }
    }

    #[test]
    fn first_error_is_free() {
        let calculator = BonusCalculator::default();
        let clean = calculator.eligibility(&input(3000, 0, 100.0));
        let one_error = calculator.eligibility(&input(3000, 1, 100.0));
        assert_eq!(clean.achieved_ggs, one_error.achieved_ggs);
        assert_eq!(one_error.calculations.effective_error_count, 0);
    }

    #[test]
    fn level2_boundary() {
        let result = BonusCalculator::default().eligibility(&input(5000, 1, 100.0));
        assert_eq!(result.bonus_level, BonusLevel::Level2);
        assert_eq!(result.bonus_rate, 2.5);
        assert_eq!(result.bonus_amount, 250.0);
        assert_eq!(result.achieved_ggs, 5000);
        assert_eq!(result.minimum_ggs_required, 5000);
        assert!(result.is_eligible);
    }

    #[test]
    fn level1_boundary() {
        let result = BonusCalculator::default().eligibility(&input(2500, 1, 100.0));
        assert_eq!(result.bonus_level, BonusLevel::Level1);
        assert_eq!(result.bonus_amount, 150.0);
        assert_eq!(result.minimum_ggs_required, 2500);
    }

    #[test]
    fn below_level1_is_ineligible() {
        let result = BonusCalculator::default().eligibility(&input(2000, 1, 100.0));
        assert_eq!(result.bonus_level, BonusLevel::Ineligible);
        assert_eq!(result.bonus_amount, 0.0);
        assert!(!result.is_eligible);
    }

    #[test]
    fn errors_divide_games() {
        let result = BonusCalculator::default().eligibility(&input(9000, 3, 10.0));
        assert_eq!(result.calculations.effective_error_count, 2);
        assert_eq!(result.achieved_ggs, 4500);
        assert_eq!(result.calculations.qualified_games, 8998);
        assert_eq!(result.bonus_level, BonusLevel::Level1);
        assert_eq!(result.bonus_amount, 15.0);
    }

    #[test]
    fn disqualifications_override_ggs() {
        let mut disciplined = input(5000, 1, 100.0);
        disciplined.has_disqualifying_factors = true;
        disciplined.sickleave_late_violations = true;

        let result = BonusCalculator::default().eligibility(&disciplined);

        assert_eq!(result.bonus_level, BonusLevel::Ineligible);
        assert_eq!(result.bonus_amount, 0.0);
        assert_eq!(
            result.disqualifying_factors,
            vec![
                DisqualifyingFactor::DisciplinaryAction,
                DisqualifyingFactor::AttendanceViolation
            ]
        );
        let wire = serde_json::to_value(&result).expect("serialize");
        assert_eq!(
            wire["disqualifying_factors"][0],
            serde_json::json!("Active disciplinary cases, warnings, or PDPs")
        );
        assert_eq!(wire["bonus_level"], serde_json::json!("ineligible"));
    }

    #[test]
    fn outstanding_warnings_count_as_disciplinary_action() {
        let mut warned = input(5000, 1, 100.0);
        warned.disciplinary_warnings = 2;

        let result = BonusCalculator::default().eligibility(&warned);

        assert_eq!(result.bonus_level, BonusLevel::Ineligible);
        assert_eq!(
            result.disqualifying_factors,
            vec![DisqualifyingFactor::DisciplinaryAction]
        );

        warned.has_disqualifying_factors = true;
        let both = BonusCalculator::default().eligibility(&warned);
        assert_eq!(both.disqualifying_factors.len(), 1);
    }

    #[test]
    fn non_positive_hours_are_ineligible() {
        let calculator = BonusCalculator::default();
        for hours in [0.0, -4.0, f64::NAN] {
            let result = calculator.eligibility(&input(8000, 0, hours));
            assert_eq!(result.bonus_level, BonusLevel::Ineligible);
            assert_eq!(result.bonus_amount, 0.0);
        }
    }

    #[test]
    fn zero_games_is_ineligible() {
        let result = BonusCalculator::default().eligibility(&input(0, 0, 100.0));
        assert_eq!(result.achieved_ggs, 0);
        assert_eq!(result.bonus_level, BonusLevel::Ineligible);
    }

    #[test]
    fn fractional_hours_are_paid_exactly() {
        let result = BonusCalculator::default().eligibility(&input(2600, 0, 10.5));
        assert_eq!(result.bonus_amount, 15.75);
    }

    #[test]
    fn monthly_facts_feed_the_calculator() {
        let facts = MonthlyFacts {
            gp_id: "gp-9".to_string(),
            month: 2,
            year: 2024,
            total_games_played: 5200,
            error_count: 1,
            hours_worked: 120.0,
            has_disqualifying_factors: false,
            sickleave_late_violations: true,
        };

        let result = BonusCalculator::default().eligibility(&BonusCalculationInput::from(&facts));

        assert_eq!(result.gp_id, "gp-9");
        assert_eq!(result.achieved_ggs, 5200);
        assert_eq!(result.bonus_level, BonusLevel::Ineligible);
    }

    #[test]
    fn gap_is_zero_once_target_reached() {
        let gap = BonusCalculator::default().gap_to_level(5000, TargetLevel::Level2);
        assert_eq!(gap.gap_ggs, 0);
        assert_eq!(gap.recommended_error_rate, 0.0);
        assert_eq!(gap.estimated_games_needed, 0);
    }

    #[test]
    fn gap_reports_shortfall() {
        let gap = BonusCalculator::default().gap_to_level(3000, TargetLevel::Level2);
        assert_eq!(gap.gap_ggs, 2000);
        assert_eq!(gap.recommended_error_rate, 0.4);
        assert_eq!(gap.estimated_games_needed, 2000);

        let level1 = BonusCalculator::default().gap_to_level(1000, TargetLevel::Level1);
        assert_eq!(level1.gap_ggs, 1500);
        assert_eq!(level1.recommended_error_rate, 0.6);
    }

    #[test]
    fn projection_extrapolates_to_month_end() {
        let projection = BonusCalculator::default().projection(&ProjectionInput {
            month: 4,
            year: 2024,
            games_so_far: 1000,
            errors_so_far: 1,
            hours_so_far: 50.0,
            days_in_month: 30,
            days_elapsed: 10,
        });

        assert_eq!(projection.pace, 3.0);
        assert_eq!(projection.projected_games, 3000);
        assert_eq!(projection.projected_errors, 2);
        assert_eq!(projection.projected_ggs, 1500);
        assert_eq!(projection.on_track_for_level, ProjectionLevel::Neither);
        assert_eq!(projection.projected_bonus, 0.0);
    }

    #[test]
    fn projection_rounds_bonus_to_cents() {
        let projection = BonusCalculator::default().projection(&ProjectionInput {
            month: 1,
            year: 2024,
            games_so_far: 2000,
            errors_so_far: 0,
            hours_so_far: 40.0,
            days_in_month: 31,
            days_elapsed: 12,
        });

        assert_eq!(projection.projected_games, 5166);
        assert_eq!(projection.projected_errors, 0);
        assert_eq!(projection.on_track_for_level, ProjectionLevel::Level2);
        assert_eq!(projection.projected_bonus, 258.33);
    }

    #[test]
    fn projection_treats_zero_elapsed_days_as_one() {
        let projection = BonusCalculator::default().projection(&ProjectionInput {
            month: 1,
            year: 2024,
            games_so_far: 100,
            errors_so_far: 0,
            hours_so_far: 8.0,
            days_in_month: 31,
            days_elapsed: 0,
        });

        assert_eq!(projection.pace, 31.0);
        assert_eq!(projection.projected_games, 3100);
        assert_eq!(projection.on_track_for_level, ProjectionLevel::Level1);
    }
}
