//! Test utilities for trajectory and flight tests.
//!
//! Provides fixtures for bodies, balls and courses, and assertions for the
//! physical invariants the integrator is expected to keep.

use bevy::math::DVec3;

use crate::course::Course;
use crate::types::{BallState, Body, BodyId, TimelineSample, G};

/// Fixtures for creating test bodies and orbital states.
pub mod fixtures {
    use super::*;

    pub const BALL_RADIUS: f64 = 0.5;

    /// A planet at the origin with the given mass and well radius.
    pub fn planet(mass: f64, radius_gravity: f64) -> Body {
        Body::new(DVec3::ZERO, mass, 1.0, radius_gravity)
    }

    /// A ball at distance `r` on +X with circular velocity along +Z.
    pub fn circular_orbit(body: &Body, r: f64) -> BallState {
        let v = (body.mu() / r).sqrt();
        BallState::new(
            body.position + DVec3::new(r, 0.0, 0.0),
            DVec3::new(0.0, 0.0, v),
            BALL_RADIUS,
        )
    }

    /// A ball at periapsis `r_p` of an ellipse with eccentricity `e`.
    pub fn elliptical_orbit(body: &Body, r_p: f64, eccentricity: f64) -> BallState {
        assert!(
            (0.0..1.0).contains(&eccentricity),
            "Eccentricity must be in [0, 1) for elliptical orbit"
        );
        let a = r_p / (1.0 - eccentricity);
        let v = (body.mu() * (2.0 / r_p - 1.0 / a)).sqrt();
        BallState::new(
            body.position + DVec3::new(r_p, 0.0, 0.0),
            DVec3::new(0.0, 0.0, v),
            BALL_RADIUS,
        )
    }

    /// Single-planet course with the planet as start and goal.
    pub fn single_planet_course(mass: f64, radius_gravity: f64) -> Course {
        Course::new(vec![planet(mass, radius_gravity)])
            .and_then(|course| course.with_start(BodyId(0)))
            .and_then(|course| course.with_goal(BodyId(0)))
            .expect("valid single-planet course")
    }
}

/// Assertions for verifying physical invariants.
pub mod assertions {
    use super::*;

    /// Specific orbital energy relative to `body`: `v²/2 - mu/r`.
    pub fn orbital_energy(body: &Body, sample: &TimelineSample) -> f64 {
        let r = body.offset_to(sample.position).length();
        0.5 * sample.velocity.length_squared() - G * body.mass / r
    }

    /// Planar angular momentum about `body` (Y component of `r × v`).
    pub fn angular_momentum(body: &Body, sample: &TimelineSample) -> f64 {
        body.offset_to(sample.position).cross(sample.velocity).y
    }

    /// Assert two values agree within a relative tolerance.
    ///
    /// # Panics
    /// Panics if the relative drift exceeds tolerance.
    pub fn assert_conserved(what: &str, initial: f64, last: f64, tolerance: f64) {
        let drift = if initial.abs() > 1e-10 {
            ((last - initial) / initial).abs()
        } else {
            (last - initial).abs()
        };
        assert!(
            drift <= tolerance,
            "{what} not conserved: initial={initial:.6e}, final={last:.6e}, drift={drift:.6e}, tolerance={tolerance:.6e}"
        );
    }

    /// Assert no sample overlaps any body.
    pub fn assert_clear_of_bodies<'a>(
        samples: impl IntoIterator<Item = &'a TimelineSample>,
        bodies: &[Body],
        ball_radius: f64,
    ) {
        for sample in samples {
            for (i, body) in bodies.iter().enumerate() {
                assert!(
                    !body.overlaps(sample.position, ball_radius),
                    "sample at t={} overlaps body {i}",
                    sample.t
                );
            }
        }
    }

    /// Assert timestamps strictly increase.
    pub fn assert_monotonic<'a>(samples: impl IntoIterator<Item = &'a TimelineSample>) {
        let mut last = f64::NEG_INFINITY;
        for sample in samples {
            assert!(sample.t > last, "time went from {last} to {}", sample.t);
            last = sample.t;
        }
    }
}

/// Utilities for creating headless Bevy apps for testing.
pub mod bevy_test {
    use bevy::prelude::*;

    /// Create a minimal Bevy app for testing without rendering.
    pub fn headless_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circular_orbit_energy_matches_vis_viva() {
        let body = fixtures::planet(30000.0, 50.0);
        let ball = fixtures::circular_orbit(&body, 10.0);
        let sample = TimelineSample::new(ball.position, ball.velocity, 0.0);
        // Circular: E = -mu / 2r
        assert_relative_eq!(
            assertions::orbital_energy(&body, &sample),
            -body.mu() / 20.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_prograde_orbit_has_signed_momentum() {
        let body = fixtures::planet(30000.0, 50.0);
        let ball = fixtures::circular_orbit(&body, 10.0);
        let sample = TimelineSample::new(ball.position, ball.velocity, 0.0);
        // (r, 0, 0) × (0, 0, v) = (0, -r v, 0)
        assert!(assertions::angular_momentum(&body, &sample) < 0.0);
    }

    #[test]
    fn test_single_planet_course_fixture() {
        let course = fixtures::single_planet_course(30000.0, 50.0);
        assert_eq!(course.start(), Some(BodyId(0)));
        assert_eq!(course.goal(), Some(BodyId(0)));
    }
}
