//! Common test utilities for integration tests.
#![allow(dead_code)]

use bevy::math::DVec3;
use orbit_golf::course::Course;
use orbit_golf::physics::{GravityField, IntegratorConfig};
use orbit_golf::trajectory::Trajectory;
use orbit_golf::types::{BallState, Body, BodyId, G};

pub const BALL_RADIUS: f64 = 0.5;

/// Planet at the origin.
pub fn planet(mass: f64, radius: f64, radius_gravity: f64) -> Body {
    Body::new(DVec3::ZERO, mass, radius, radius_gravity)
}

/// Ball at `(r, 0, 0)` moving along +Z at `factor` times circular speed.
pub fn ball_around(body: &Body, r: f64, factor: f64) -> BallState {
    let v = (G * body.mass / r).sqrt() * factor;
    BallState::new(
        body.position + DVec3::new(r, 0.0, 0.0),
        DVec3::new(0.0, 0.0, v),
        BALL_RADIUS,
    )
}

/// Integrate a fresh trajectory for `ball` with no stroke applied.
pub fn simulate(ball: &BallState, bodies: &[Body], config: &IntegratorConfig) -> Trajectory {
    let mut trajectory = Trajectory::new(config.capacity);
    trajectory.continue_from(DVec3::ZERO, ball, None, &GravityField::new(bodies), config);
    trajectory
}

pub fn horizon(capacity: usize) -> IntegratorConfig {
    IntegratorConfig {
        capacity,
        ..Default::default()
    }
}

/// One planet that is both start and goal.
pub fn single_planet_course() -> Course {
    Course::new(vec![planet(30000.0, 2.0, 50.0)])
        .and_then(|course| course.with_start(BodyId(0)))
        .and_then(|course| course.with_goal(BodyId(0)))
        .expect("valid course")
}

/// Specific orbital energy of `ball` around `body`.
pub fn orbital_energy(body: &Body, position: DVec3, velocity: DVec3) -> f64 {
    0.5 * velocity.length_squared() - G * body.mass / body.offset_to(position).length()
}
