//! Property-based tests for the physics pipeline using proptest.
//!
//! These tests verify integration invariants across a wide range of starting
//! states, plus the ring buffer against a `VecDeque` model.

use std::collections::VecDeque;

use bevy::math::DVec3;
use proptest::prelude::*;

use crate::orbit::compute_orbit_elements;
use crate::physics::{integrate, GravityField, IntegratorConfig};
use crate::test_utils::{assertions, fixtures};
use crate::timeline::{RingBuffer, Timeline};
use crate::types::{Body, TimelineSample};

fn short_horizon(capacity: usize) -> IntegratorConfig {
    IntegratorConfig {
        capacity,
        ..Default::default()
    }
}

fn run(bodies: &[Body], seed: TimelineSample, config: &IntegratorConfig) -> Timeline {
    let mut timeline = Timeline::new(config.capacity);
    timeline.append(seed).unwrap();
    integrate(
        &mut timeline,
        &GravityField::new(bodies),
        fixtures::BALL_RADIUS,
        None,
        config,
    );
    timeline
}

#[derive(Clone, Debug)]
enum Op {
    Append(i32),
    Prepend(i32),
    PopHead,
    PopTail,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::Append),
        any::<i32>().prop_map(Op::Prepend),
        Just(Op::PopHead),
        Just(Op::PopTail),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Same inputs, same samples, bit for bit.
    #[test]
    fn prop_integration_is_deterministic(
        x in -15.0f64..15.0,
        z in 2.0f64..15.0,
        vx in -20.0f64..20.0,
        vz in -20.0f64..20.0,
    ) {
        let bodies = [fixtures::planet(30000.0, 20.0)];
        let seed = TimelineSample::new(DVec3::new(x, 0.0, z), DVec3::new(vx, 0.0, vz), 0.0);
        let config = short_horizon(400);

        let first: Vec<_> = run(&bodies, seed, &config).iter().copied().collect();
        let second: Vec<_> = run(&bodies, seed, &config).iter().copied().collect();
        prop_assert_eq!(first, second);
    }

    /// No stored sample overlaps a body, time runs forward, Y stays zero.
    #[test]
    fn prop_samples_clear_of_bodies(
        angle in 0.0f64..std::f64::consts::TAU,
        r in 2.0f64..18.0,
        vx in -30.0f64..30.0,
        vz in -30.0f64..30.0,
    ) {
        let bodies = [
            fixtures::planet(30000.0, 20.0),
            Body::new(DVec3::new(12.0, 0.0, 12.0), -5000.0, 1.0, 6.0),
        ];
        let start = DVec3::new(r * angle.cos(), 0.0, r * angle.sin());
        prop_assume!(!bodies[1].overlaps(start, fixtures::BALL_RADIUS));

        let seed = TimelineSample::new(start, DVec3::new(vx, 0.0, vz), 0.0);
        let config = short_horizon(600);
        let timeline = run(&bodies, seed, &config);

        assertions::assert_clear_of_bodies(timeline.iter(), &bodies, fixtures::BALL_RADIUS);
        assertions::assert_monotonic(timeline.iter());
        prop_assert!(timeline.iter().all(|s| s.position.y == 0.0 && s.velocity.y == 0.0));
        let steps_within_max = timeline.iter().zip(timeline.iter().skip(1)).all(|(a, b)| {
            (b.position - a.position).length() <= config.max_step_distance + 1e-9
        });
        prop_assert!(steps_within_max);
    }

    /// Near-circular orbits keep their energy over a short horizon.
    #[test]
    fn prop_energy_drift_small_near_circular(
        r in 6.0f64..15.0,
        eccentricity in 0.0f64..0.3,
    ) {
        let body = fixtures::planet(30000.0, 50.0);
        let ball = fixtures::elliptical_orbit(&body, r, eccentricity);
        let seed = TimelineSample::new(ball.position, ball.velocity, 0.0);
        let timeline = run(std::slice::from_ref(&body), seed, &short_horizon(500));

        let initial = assertions::orbital_energy(&body, &seed);
        let last = assertions::orbital_energy(&body, timeline.tail().unwrap());
        assertions::assert_conserved("energy", initial, last, 0.01);
    }

    /// The semi-major axis from the elements agrees with vis-viva.
    #[test]
    fn prop_elements_match_vis_viva(
        r in 2.0f64..40.0,
        speed_factor in 0.2f64..1.35,
        angle in 0.0f64..std::f64::consts::TAU,
    ) {
        let body = fixtures::planet(30000.0, 50.0);
        let position = DVec3::new(r, 0.0, 0.0);
        let v_circular = (body.mu() / r).sqrt();
        let velocity = DVec3::new(angle.cos(), 0.0, angle.sin()) * v_circular * speed_factor;

        let elements = compute_orbit_elements(position, velocity, body.mu()).unwrap();
        // v² = mu (2/r - 1/a)
        let expected = 1.0 / (2.0 / r - velocity.length_squared() / body.mu());
        prop_assert!((elements.semi_major_axis - expected).abs() <= 1e-6 * expected.abs());
        prop_assert!(elements.is_bound());
        prop_assert!(elements.periapsis <= r + 1e-6 && r <= elements.apoapsis + 1e-6);
    }

    /// Ring buffer behaves like a bounded deque.
    #[test]
    fn prop_ring_buffer_matches_model(
        capacity in 0usize..8,
        ops in prop::collection::vec(op(), 0..64),
    ) {
        let mut buffer = RingBuffer::new(capacity);
        let mut model: VecDeque<i32> = VecDeque::new();

        for op in ops {
            match op {
                Op::Append(v) => {
                    let ok = buffer.append(v).is_ok();
                    prop_assert_eq!(ok, model.len() < capacity);
                    if ok { model.push_back(v); }
                }
                Op::Prepend(v) => {
                    let ok = buffer.prepend(v).is_ok();
                    prop_assert_eq!(ok, model.len() < capacity);
                    if ok { model.push_front(v); }
                }
                Op::PopHead => prop_assert_eq!(buffer.pop_head().ok(), model.pop_front()),
                Op::PopTail => prop_assert_eq!(buffer.pop_tail().ok(), model.pop_back()),
            }
            prop_assert_eq!(buffer.len(), model.len());
            prop_assert!(buffer.len() <= capacity);
            prop_assert_eq!(buffer.head().ok(), model.front());
            prop_assert_eq!(buffer.tail().ok(), model.back());
            prop_assert!(buffer.iter().eq(model.iter()));
        }
    }
}
