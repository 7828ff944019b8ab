//! Criterion benchmarks for ember-learning.
//!
//! The cycle pipeline runs once per PWM period per zone; rate queries run on
//! every preheat estimate. Both should stay well under a millisecond.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ember_core::types::InstallationType;
use ember_learning::{CycleMetrics, HeatingRateLearner, LearningEngine};

fn recovery_metrics(at: f64) -> CycleMetrics {
    CycleMetrics {
        start_temp: 19.2,
        setpoint: 21.0,
        peak_temp: 21.3,
        end_temp: 21.1,
        peak_duty: 0.85,
        committed_heat_seconds: 240.0,
        committed_heat_ratio: 0.25,
        rise_time_minutes: Some(70.0),
        outdoor_temp: Some(2.0),
        night_setback_recovery: false,
        ended_at: at,
    }
}

fn bench_complete_cycle(c: &mut Criterion) {
    let mut engine = LearningEngine::new(InstallationType::Radiator);
    let mut at = 0.0;
    c.bench_function("complete_cycle", |b| {
        b.iter(|| {
            at += 900.0;
            black_box(engine.complete_cycle(&recovery_metrics(at)))
        })
    });
}

fn bench_rate_query(c: &mut Criterion) {
    let mut learner = HeatingRateLearner::new(InstallationType::FloorHydronic);
    for i in 0..240 {
        let delta = (i % 8) as f64;
        let outdoor = (i % 20) as f64 - 5.0;
        learner.add_cycle_observation(0.4 + (i % 5) as f64 * 0.05, 60.0, delta, Some(outdoor));
    }
    c.bench_function("get_heating_rate", |b| {
        b.iter(|| black_box(learner.get_heating_rate(black_box(3.0), black_box(Some(4.0)))))
    });
    c.bench_function("get_rate_consistency_score", |b| {
        b.iter(|| black_box(learner.get_rate_consistency_score()))
    });
}

criterion_group!(benches, bench_complete_cycle, bench_rate_query);
criterion_main!(benches);
