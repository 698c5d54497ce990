//! Gravity field evaluation over a course's bodies.
//!
//! Pure functions of (position, traveler radius, bodies): nothing here keeps
//! state between calls, so the integrator and the per-frame orbit check can
//! share them freely.

use bevy::math::DVec3;

use crate::types::{Body, BodyId, G};

/// Distances below this (squared) are treated as coincident with a body centre.
const MIN_DISTANCE_SQUARED: f64 = 1e-12;

/// Result of evaluating the field at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravitySample {
    /// Net planar acceleration. Zero when `collided` is set.
    pub acceleration: DVec3,
    /// Body the traveler overlaps, if any.
    pub collided: Option<BodyId>,
}

/// Read-only view of the bodies a trajectory is simulated against.
#[derive(Clone, Copy, Debug)]
pub struct GravityField<'a> {
    bodies: &'a [Body],
}

impl<'a> GravityField<'a> {
    pub fn new(bodies: &'a [Body]) -> Self {
        Self { bodies }
    }

    pub fn bodies(&self) -> &'a [Body] {
        self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&'a Body> {
        self.bodies.get(id.index())
    }

    /// Net acceleration on a traveler at `position`.
    ///
    /// Collision takes precedence: if the traveler overlaps any body, that body
    /// is reported and no acceleration is accumulated. Otherwise every body whose
    /// gravity well contains the traveler contributes `G * mass / d²` toward its
    /// centre (away from it for negative mass). The traveler's own mass cancels
    /// out of `F / m` and is not needed.
    pub fn acceleration_at(&self, position: DVec3, traveler_radius: f64) -> GravitySample {
        if let Some(collided) = self.collision_at(position, traveler_radius) {
            return GravitySample {
                acceleration: DVec3::ZERO,
                collided: Some(collided),
            };
        }

        let acceleration: DVec3 = self
            .bodies
            .iter()
            .map(|body| body_acceleration(body, position))
            .sum();

        GravitySample {
            acceleration,
            collided: None,
        }
    }

    /// First body the traveler overlaps, if any.
    pub fn collision_at(&self, position: DVec3, traveler_radius: f64) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|body| body.overlaps(position, traveler_radius))
            .map(BodyId)
    }

    /// Body whose gravity well currently holds the traveler.
    ///
    /// See [`dominant_body`].
    pub fn dominant_body(&self, position: DVec3, previous: Option<BodyId>) -> Option<BodyId> {
        dominant_body(self.bodies, position, previous)
    }
}

/// Acceleration contributed by a single body, zero outside its well.
#[inline]
pub fn body_acceleration(body: &Body, position: DVec3) -> DVec3 {
    // Points from the traveler toward the body centre
    let delta = -body.offset_to(position);
    let r_squared = delta.length_squared();

    if r_squared >= body.radius_gravity * body.radius_gravity || r_squared < MIN_DISTANCE_SQUARED {
        return DVec3::ZERO;
    }

    let r = r_squared.sqrt();
    // a = G*m/r² along delta/r
    delta * (G * body.mass / (r_squared * r))
}

/// The dominant-body policy shared by the integrator and the flight controller.
///
/// A body dominates when the traveler is inside its gravity well. When wells
/// overlap, the previously dominant body keeps the role for as long as it still
/// qualifies; only then does the first qualifying body in course order win.
/// This keeps the orbited body from flickering between overlapping wells.
pub fn dominant_body(bodies: &[Body], position: DVec3, previous: Option<BodyId>) -> Option<BodyId> {
    if let Some(id) = previous
        && bodies
            .get(id.index())
            .is_some_and(|body| body.well_contains(position))
    {
        return Some(id);
    }

    bodies
        .iter()
        .position(|body| body.well_contains(position))
        .map(BodyId)
}
