use ember_delivery::{DemandEvent, DemandSignaler, DemandState, HeatPipeline, PwmScheduler};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum PipeOp {
    Open(f64),
    Close(f64),
    Reset,
}

fn arb_op() -> impl Strategy<Value = PipeOp> {
    prop_oneof![
        (0.0f64..10_000.0).prop_map(PipeOp::Open),
        (0.0f64..10_000.0).prop_map(PipeOp::Close),
        Just(PipeOp::Reset),
    ]
}

proptest! {
    #[test]
    fn committed_heat_stays_within_transport_delay(
        delay in 0.0f64..3600.0,
        valve in 0.0f64..600.0,
        ops in prop::collection::vec(arb_op(), 0..20),
        probes in prop::collection::vec(-1000.0f64..20_000.0, 1..10),
    ) {
        let mut pipeline = HeatPipeline::new(delay, valve);
        for op in ops {
            match op {
                PipeOp::Open(at) => pipeline.valve_opened(at),
                PipeOp::Close(at) => pipeline.valve_closed(at),
                PipeOp::Reset => pipeline.reset(),
            }
            for &now in &probes {
                let c = pipeline.committed_heat_remaining(now);
                prop_assert!((0.0..=delay).contains(&c), "committed {} outside [0, {}]", c, delay);
            }
        }
    }

    #[test]
    fn open_duration_is_zero_or_at_least_half_travel(
        duty in 0.0f64..=1.0,
        period in 1.0f64..3600.0,
        committed in 0.0f64..3600.0,
        valve in 0.0f64..600.0,
    ) {
        let pipeline = HeatPipeline::new(600.0, valve);
        let d = pipeline.calculate_valve_open_duration(duty, period, committed);
        if duty * period <= committed {
            prop_assert_eq!(d, 0.0);
        } else {
            prop_assert!(d >= valve / 2.0);
            prop_assert!(d > 0.0);
        }
    }

    #[test]
    fn close_command_never_precedes_open(
        output in -200.0f64..200.0,
        difference in 1.0f64..200.0,
        valve in 0.0f64..600.0,
        now in 0.0f64..100_000.0,
    ) {
        let pipeline = HeatPipeline::new(0.0, valve);
        let s = PwmScheduler::new(900.0, valve).plan(output, difference, now, &pipeline);
        prop_assert!(s.close_command_at >= s.open_at);
        prop_assert!(s.close_command_at <= s.open_at + 900.0);
        prop_assert!((0.0..=1.0).contains(&s.duty));
    }

    #[test]
    fn demand_edges_alternate(commands in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut d = DemandSignaler::new(120.0);
        let mut now = 0.0;
        let mut last_started: Option<bool> = None;
        for on in commands {
            let mut events = d.command(on, now);
            now += 45.0;
            events.extend(d.poll(now));
            for e in events {
                let started = matches!(e, DemandEvent::HeatingStarted(_));
                if let Some(prev) = last_started {
                    prop_assert_ne!(prev, started, "two identical edges in a row");
                } else {
                    prop_assert!(started, "first edge must be a start");
                }
                last_started = Some(started);
            }
        }
    }
}

#[test]
fn hydronic_cycle_with_demand_edges() {
    let valve = 120.0;
    let mut pipeline = HeatPipeline::new(600.0, valve);
    let scheduler = PwmScheduler::new(900.0, valve);
    let mut demand = DemandSignaler::new(valve);

    let plan = scheduler.plan(50.0, 100.0, 0.0, &pipeline);
    assert_eq!(plan.on_time, 450.0 + 60.0);

    pipeline.valve_opened(plan.open_at);
    demand.command(true, plan.open_at);
    let started = demand.poll(valve);
    assert_eq!(started.len(), 1);

    demand.command(false, plan.close_command_at);
    let ended = demand.poll(plan.close_command_at + valve);
    assert_eq!(ended.len(), 1);
    pipeline.valve_closed(ended[0].at());
    assert_eq!(demand.state(), DemandState::Idle);

    // Next period starts with a full pipe draining from the half-close point.
    let next = scheduler.plan(50.0, 100.0, 900.0, &pipeline);
    let committed = pipeline.committed_heat_remaining(900.0);
    assert_eq!(ended[0].at(), 450.0 + 60.0);
    assert_eq!(committed, 600.0 - (900.0 - 510.0));
    assert_eq!(next.on_time, 450.0 - committed + 60.0);
}
