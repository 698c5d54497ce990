//! Core physics types and constants for the orbital golf simulation.

use bevy::math::{DVec2, DVec3};

/// Gravitational constant in course units.
///
/// The game works in its own unit system (course units, unit masses, seconds),
/// so this is a tuning constant rather than the SI value.
pub const G: f64 = 0.1;

/// Index of a body within a [`Course`](crate::course::Course).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A gravity source: a planet (positive mass) or a repulsor (negative mass).
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    /// Centre of the body. Only X and Z are used by the physics.
    pub position: DVec3,
    /// Mass; the sign selects attraction (+) or repulsion (-).
    pub mass: f64,
    /// Hard collision radius.
    pub radius: f64,
    /// Radius of the gravity well. Outside it the body exerts no force.
    pub radius_gravity: f64,
}

impl Body {
    pub fn new(position: DVec3, mass: f64, radius: f64, radius_gravity: f64) -> Self {
        Self {
            position: flatten(position),
            mass,
            radius,
            radius_gravity,
        }
    }

    /// Standard gravitational parameter `G * mass`.
    pub fn mu(&self) -> f64 {
        G * self.mass
    }

    pub fn is_attractor(&self) -> bool {
        self.mass > 0.0
    }

    /// Planar vector from the body centre to `point`.
    pub fn offset_to(&self, point: DVec3) -> DVec3 {
        flatten(point - self.position)
    }

    /// Whether `point` lies strictly inside the gravity well.
    pub fn well_contains(&self, point: DVec3) -> bool {
        within(self.offset_to(point), self.radius_gravity)
    }

    /// Whether a traveler of `traveler_radius` centred at `point` overlaps the body.
    pub fn overlaps(&self, point: DVec3, traveler_radius: f64) -> bool {
        within(self.offset_to(point), self.radius + traveler_radius)
    }
}

/// One point on a simulated trajectory.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimelineSample {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Seconds since the start of the trajectory.
    pub t: f64,
}

impl TimelineSample {
    pub fn new(position: DVec3, velocity: DVec3, t: f64) -> Self {
        Self { position, velocity, t }
    }
}

/// Kinematic state of the ball at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BallState {
    pub position: DVec3,
    pub velocity: DVec3,
    /// Hard collision radius.
    pub radius: f64,
}

impl BallState {
    pub fn new(position: DVec3, velocity: DVec3, radius: f64) -> Self {
        Self {
            position: flatten(position),
            velocity: flatten(velocity),
            radius,
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.velocity.length_squared() == 0.0
    }
}

/// Drop the vertical component.
#[inline]
pub fn flatten(v: DVec3) -> DVec3 {
    DVec3::new(v.x, 0.0, v.z)
}

/// Project onto the physics plane as a 2D vector `(x, z)`.
#[inline]
pub fn planar(v: DVec3) -> DVec2 {
    DVec2::new(v.x, v.z)
}

/// Lift a plane vector `(x, z)` back into 3D.
#[inline]
pub fn from_planar(v: DVec2) -> DVec3 {
    DVec3::new(v.x, 0.0, v.y)
}

/// `|delta| < radius`, compared on squared lengths.
#[inline]
pub fn within(delta: DVec3, radius: f64) -> bool {
    delta.length_squared() < radius * radius
}
