use crate::{
    accumulate,
    error::{ErrorClass, ErrorOrigin, InternalError},
    governor::{GovernorError, MemoryConfig, MemoryDecision, MemoryGovernor},
    obs::{metrics_report, metrics_reset_all},
    sketch::{DenseHll, Sketch},
    state::{
        GroupedAccumulatorState, HyperLogLogState, HyperLogLogStateFactory, StateFactory,
    },
};

#[test]
fn config_clamps_threshold_to_hard_limit() {
    let config = MemoryConfig::with_limits(500, 100);

    assert_eq!(config.spill_threshold(), 100);
    assert_eq!(config.hard_limit(), 100);
    assert_eq!(MemoryConfig::default(), MemoryConfig::unbounded());
}

#[test]
fn check_bytes_boundaries_are_inclusive() {
    let governor = MemoryGovernor::new(MemoryConfig::with_limits(100, 200));

    assert_eq!(
        governor.check_bytes(100).expect("threshold should continue"),
        MemoryDecision::Continue
    );
    assert_eq!(
        governor.check_bytes(101).expect("above threshold should spill"),
        MemoryDecision::Spill
    );
    assert_eq!(
        governor.check_bytes(200).expect("hard limit should still spill"),
        MemoryDecision::Spill
    );

    let err = governor
        .check_bytes(201)
        .expect_err("above hard limit should abort");
    assert!(matches!(
        err,
        GovernorError::MemoryLimitExceeded {
            resource: "estimated_bytes",
            attempted: 201,
            limit: 200,
        }
    ));
}

#[test]
fn unbounded_governor_never_spills() {
    let governor = MemoryGovernor::default();

    assert_eq!(
        governor.check_bytes(u64::MAX).expect("unbounded should continue"),
        MemoryDecision::Continue
    );
}

#[test]
fn governor_tracks_grouped_state_growth() {
    metrics_reset_all();
    let factory = HyperLogLogStateFactory::<DenseHll>::new();
    let mut state = factory.create_grouped_state();
    let empty = state.estimated_size();
    let sketch_bytes = DenseHll::default().size_bytes();

    let governor = MemoryGovernor::new(MemoryConfig::with_limits(
        empty + sketch_bytes * 2,
        empty + sketch_bytes * 64,
    ));
    assert_eq!(
        governor.check(&state).expect("empty state should continue"),
        MemoryDecision::Continue
    );

    state.ensure_capacity(8);
    for group in 0..8 {
        state.set_current_group(group);
        state
            .set(Some(DenseHll::default()))
            .expect("set should succeed");
    }
    assert_eq!(
        governor.check(&state).expect("eight sketches should spill"),
        MemoryDecision::Spill
    );

    let report = metrics_report();
    assert_eq!(report.counters.governor.checks, 2);
    assert_eq!(report.counters.governor.spills, 1);
    assert_eq!(
        report.counters.governor.max_observed_bytes,
        state.estimated_size()
    );
}

fn governed_input(
    governor: &MemoryGovernor,
    values: &[&[u8]],
) -> Result<MemoryDecision, GovernorError> {
    let factory = HyperLogLogStateFactory::<DenseHll>::new();
    let mut state = factory.create_single_state();
    let mut scratch = accumulate::HashScratch::new();
    accumulate::input_values(&mut state, &mut scratch, values, || {
        DenseHll::with_precision(3)
    })?;

    governor.check(&state)
}

#[test]
fn internal_errors_propagate_through_governor_surface() {
    let err = governed_input(&MemoryGovernor::default(), &[b"a"])
        .expect_err("invalid precision should surface as internal error");

    let GovernorError::Internal(inner) = err else {
        panic!("expected internal error, got {err:?}");
    };
    assert!(inner.is_invalid_argument());
}

#[test]
fn limit_breach_maps_to_resource_exhausted() {
    let err = MemoryGovernor::new(MemoryConfig::with_limits(0, 0))
        .check_bytes(1)
        .expect_err("one byte over zero limit should abort");

    let internal = InternalError::from(err);
    assert_eq!(internal.class, ErrorClass::ResourceExhausted);
    assert_eq!(internal.origin, ErrorOrigin::Governor);
    assert!(internal.message.contains("attempted=1"));
}
