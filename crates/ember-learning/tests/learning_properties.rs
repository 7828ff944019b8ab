use ember_core::types::{CycleOutcome, InstallationType};
use ember_learning::contribution::ContributionState;
use ember_learning::{
    ConfidenceContributionTracker, CycleWeightCalculator, HeatingRateLearner, LearningSnapshot,
};
use proptest::prelude::*;

fn arb_installation() -> impl Strategy<Value = InstallationType> {
    prop_oneof![
        Just(InstallationType::FloorHydronic),
        Just(InstallationType::Radiator),
        Just(InstallationType::Convector),
        Just(InstallationType::ForcedAir),
    ]
}

fn arb_outcome() -> impl Strategy<Value = CycleOutcome> {
    prop_oneof![
        Just(CycleOutcome::Clean),
        Just(CycleOutcome::Overshoot),
        Just(CycleOutcome::Undershoot),
    ]
}

proptest! {
    #[test]
    fn weight_non_decreasing_in_starting_delta(
        installation in arb_installation(),
        outcome in arb_outcome(),
        is_stable in any::<bool>(),
        a in 0.0f64..10.0,
        b in 0.0f64..10.0,
        duty in proptest::option::of(0.0f64..1.0),
        outdoor in proptest::option::of(-20.0f64..25.0),
        night in any::<bool>(),
    ) {
        let calc = CycleWeightCalculator::new(installation);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assume!(calc.is_recovery_cycle(lo, is_stable) == calc.is_recovery_cycle(hi, is_stable));
        let w_lo = calc.calculate_weight(lo, is_stable, outcome, duty, outdoor, night);
        let w_hi = calc.calculate_weight(hi, is_stable, outcome, duty, outdoor, night);
        prop_assert!(w_lo <= w_hi + 1e-12, "w({}) = {} > w({}) = {}", lo, w_lo, hi, w_hi);
        prop_assert!(w_hi <= 2.0 + 0.5 + 1e-12);
    }

    #[test]
    fn maintenance_gain_bounded_per_call(
        installation in arb_installation(),
        gains in prop::collection::vec(0.0f64..0.5, 1..60),
    ) {
        let mut t = ConfidenceContributionTracker::new(installation);
        let cap = t.maintenance_cap();
        for gain in gains {
            let before = t.maintenance_contribution();
            t.apply_maintenance_gain(gain);
            let after = t.maintenance_contribution();
            prop_assert!(after >= before);
            prop_assert!(after <= before.max(cap) + gain * 0.1 + 1e-12);
            prop_assert!(after <= cap * 1.1 + 1e-12);
        }
    }

    #[test]
    fn maintenance_increments_shrink_at_cap(
        installation in arb_installation(),
        gain in 0.01f64..0.5,
    ) {
        let mut t = ConfidenceContributionTracker::new(installation);
        t.apply_maintenance_gain(t.maintenance_cap());
        let mut last = f64::INFINITY;
        for _ in 0..50 {
            let applied = t.apply_maintenance_gain(gain);
            prop_assert!(applied <= last + 1e-15);
            last = applied;
        }
    }

    #[test]
    fn tier_one_gated_exactly_at_requirement(
        installation in arb_installation(),
        cycles in 0u32..40,
        recovery_gain in 0.0f64..2.0,
    ) {
        let mut t = ConfidenceContributionTracker::new(installation);
        t.apply_recovery_gain(recovery_gain);
        for _ in 0..cycles {
            t.add_recovery_cycle();
        }
        let required = installation.tier_requirements().tier1_recovery_cycles;
        prop_assert_eq!(t.can_reach_tier(1), cycles >= required);
        prop_assert!(t.can_reach_tier(0));
        prop_assert!(t.can_reach_tier(3));
    }

    #[test]
    fn tracker_state_round_trips(
        maintenance in 0.0f64..0.5,
        heating_rate in 0.0f64..0.05,
        recovery in 0.0f64..3.0,
        count in 0u32..1000,
    ) {
        let state = ContributionState {
            maintenance_contribution: maintenance,
            heating_rate_contribution: heating_rate,
            recovery_cycle_count: count,
            recovery_contribution: recovery,
        };
        let tracker = ConfidenceContributionTracker::from_state(InstallationType::ForcedAir, state);
        let learner = HeatingRateLearner::new(InstallationType::ForcedAir);
        let json = LearningSnapshot::capture(&tracker, &learner).to_json().unwrap();
        let back = LearningSnapshot::from_json(&json).unwrap().tracker;
        prop_assert_eq!(back.recovery_cycle_count, count);
        prop_assert!((back.maintenance_contribution - maintenance).abs() < 1e-12);
        prop_assert!((back.heating_rate_contribution - heating_rate).abs() < 1e-12);
        prop_assert!((back.recovery_contribution - recovery).abs() < 1e-12);
    }

    #[test]
    fn consistency_score_in_unit_interval(
        rises in prop::collection::vec((0.01f64..5.0, 1.0f64..240.0), 0..40),
    ) {
        let mut l = HeatingRateLearner::new(InstallationType::Radiator);
        for (rise, minutes) in rises {
            l.add_cycle_observation(rise, minutes, 1.0, Some(8.0));
        }
        let score = l.get_rate_consistency_score();
        prop_assert!((0.0..=1.0).contains(&score));
    }
}

#[test]
fn floor_hydronic_tier_one_flips_on_twelfth_recovery() {
    let mut t = ConfidenceContributionTracker::new(InstallationType::FloorHydronic);
    for n in 1..=12 {
        assert!(!t.can_reach_tier(1), "reachable after only {} cycles", n - 1);
        t.add_recovery_cycle();
    }
    assert!(t.can_reach_tier(1));
    assert!(!t.can_reach_tier(2));
}
