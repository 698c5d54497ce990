//! Orbit stability analysis.
//!
//! Two strategies classify whether a ball will stay in orbit around a body:
//! - Analytic: orbital elements from a single state sample (eccentricity
//!   vector, semi-major axis, apsides), checked against the body's stable band.
//! - Geometric: count crossings of a reference ray from the body centre; an
//!   orbit that keeps crossing at the same point is closed.
//!
//! The analytic strategy is the default. The geometric one needs a trajectory
//! history but has no singularities, and works incrementally as samples arrive.

use bevy::math::{DVec2, DVec3};

use crate::types::{planar, Body};

/// Periapsis must clear the body by this multiple of its radius.
pub const PERIAPSIS_CLEARANCE: f64 = 1.5;

/// Which stability test a trajectory applies.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StabilityStrategy {
    /// Closed-form orbital elements from the head sample.
    #[default]
    Analytic,
    /// Repeated crossings of the reference ray within `orbit_point_size`.
    Geometric { orbit_point_size: f64 },
}

/// Orbital elements computed from state vectors relative to the orbited body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitElements {
    /// Points at periapsis; its length is the eccentricity.
    pub eccentricity_vector: DVec3,
    /// 0 = circular, <1 = elliptical, >=1 = unbound.
    pub eccentricity: f64,
    /// Negative for hyperbolic orbits, infinite for parabolic ones.
    pub semi_major_axis: f64,
    pub apoapsis: f64,
    pub periapsis: f64,
    /// Specific orbital energy `v²/2 - mu/r`.
    pub energy: f64,
}

impl OrbitElements {
    pub fn is_bound(&self) -> bool {
        self.eccentricity < 1.0
    }
}

/// Compute orbital elements.
///
/// # Arguments
/// * `r` - Position relative to the body centre
/// * `v` - Velocity
/// * `mu` - Standard gravitational parameter of the body
///
/// # Returns
/// `None` for a non-attracting body or a position at the body centre.
pub fn compute_orbit_elements(r: DVec3, v: DVec3, mu: f64) -> Option<OrbitElements> {
    let r_len = r.length();
    if mu <= 0.0 || r_len < 1e-9 {
        return None;
    }

    let v_sq = v.length_squared();
    let eccentricity_vector = ((v_sq - mu / r_len) * r - r.dot(v) * v) / mu;
    let eccentricity = eccentricity_vector.length();

    let inverse_a = 2.0 / r_len - v_sq / mu;
    let semi_major_axis = if inverse_a.abs() > 1e-12 {
        1.0 / inverse_a
    } else {
        f64::INFINITY
    };

    Some(OrbitElements {
        eccentricity_vector,
        eccentricity,
        semi_major_axis,
        apoapsis: semi_major_axis * (1.0 + eccentricity),
        periapsis: semi_major_axis * (1.0 - eccentricity),
        energy: 0.5 * v_sq - mu / r_len,
    })
}

/// Radii an orbit around `body` has to stay between: clear of the surface by
/// [`PERIAPSIS_CLEARANCE`] and inside the gravity well.
pub fn stable_band(body: &Body, ball_radius: f64) -> (f64, f64) {
    (
        body.radius * PERIAPSIS_CLEARANCE + ball_radius,
        body.radius_gravity - ball_radius,
    )
}

/// Whether an orbit with these elements stays inside the stable band.
pub fn is_stable_orbit(elements: &OrbitElements, body: &Body, ball_radius: f64) -> bool {
    let (inner, outer) = stable_band(body, ball_radius);
    elements.is_bound() && elements.apoapsis < outer && elements.periapsis > inner
}

/// Intersection point of segments `a1-a2` and `b1-b2`, if they cross.
pub fn segment_intersection(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> Option<DVec2> {
    let da = a2 - a1;
    let db = b2 - b1;
    let denominator = da.perp_dot(db);
    if denominator.abs() < 1e-15 {
        // Parallel or degenerate
        return None;
    }

    let offset = b1 - a1;
    let t = offset.perp_dot(db) / denominator;
    let u = offset.perp_dot(da) / denominator;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + da * t)
    } else {
        None
    }
}

/// Incremental revolution counter for the geometric strategy.
///
/// The reference ray runs from the body centre to the edge of its gravity well
/// along +Z. Each time the path crosses it, the crossing point is compared with
/// the remembered orbit point: a repeat counts a revolution, anything else
/// restarts the count from the new point.
#[derive(Clone, Debug)]
pub struct RevolutionCounter {
    ray_start: DVec2,
    ray_end: DVec2,
    orbit_point: DVec2,
    orbit_point_size: f64,
    last: Option<DVec2>,
    revolutions: u32,
}

impl RevolutionCounter {
    /// Revolutions in a row needed before an orbit counts as closed.
    pub const REQUIRED_REVOLUTIONS: u32 = 2;

    /// Start counting around `body`, with `start` as the initial orbit point.
    pub fn new(body: &Body, start: DVec3, orbit_point_size: f64) -> Self {
        let ray_start = planar(body.position);
        Self {
            ray_start,
            ray_end: ray_start + DVec2::new(0.0, body.radius_gravity),
            orbit_point: planar(start),
            orbit_point_size,
            last: None,
            revolutions: 0,
        }
    }

    /// Feed the next position. Returns `true` once the orbit is closed.
    pub fn observe(&mut self, position: DVec3) -> bool {
        let next = planar(position);
        if let Some(last) = self.last.replace(next)
            && let Some(crossing) = segment_intersection(last, next, self.ray_start, self.ray_end)
        {
            if (self.orbit_point - crossing).length_squared()
                < self.orbit_point_size * self.orbit_point_size
            {
                self.revolutions += 1;
            } else {
                self.orbit_point = crossing;
                self.revolutions = 0;
            }
        }
        self.is_closed()
    }

    pub fn is_closed(&self) -> bool {
        self.revolutions >= Self::REQUIRED_REVOLUTIONS
    }

    pub fn revolutions(&self) -> u32 {
        self.revolutions
    }

    pub fn orbit_point(&self) -> DVec2 {
        self.orbit_point
    }
}
