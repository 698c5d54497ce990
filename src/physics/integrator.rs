//! Adaptive-step trajectory integrator.
//!
//! Advances a [`Timeline`] from its tail sample with semi-implicit Euler steps
//! whose length adapts to the local speed, acceleration and distance from the
//! dominant body. Dense sampling near bodies, sparse sampling in open space.
//!
//! The loop ends when the timeline is full (the planning horizon), when the next
//! sample would overlap a body, or when the traveler is at rest. None of these
//! are errors; the caller reads them from [`IntegrationReport`].

use bevy::log::{debug, error};
use bevy::math::DVec3;

use crate::physics::gravity::GravityField;
use crate::timeline::Timeline;
use crate::types::{Body, BodyId, TimelineSample};

/// Speeds and accelerations below this count as zero.
const REST_EPSILON: f64 = 1e-12;

// =============================================================================
// Configuration
// =============================================================================

/// Tuning for trajectory integration.
///
/// The step-size constants are empirically tuned for course-scale play, not
/// physically derived.
#[derive(Clone, Debug)]
pub struct IntegratorConfig {
    /// Samples per trajectory (the planning horizon). Default: 10000.
    pub capacity: usize,
    /// Distance covered per step in open space. Default: 0.7.
    pub free_step_distance: f64,
    /// Distance the step-size quadratic aims for inside a gravity well. Default: 0.1.
    pub target_step_distance: f64,
    /// Smallest step inside a gravity well (seconds). Default: 1e-4.
    pub min_dt: f64,
    /// Largest step inside a gravity well (seconds). Default: 0.25.
    pub max_dt: f64,
    /// Clamp for the `(distance / radius_gravity)²` step multiplier. Default: (0.01, 1.0).
    pub step_scale_range: (f64, f64),
    /// Fraction of velocity kept per second inside the atmosphere band. Default: 0.5.
    pub atmosphere: f64,
    /// Atmosphere band as a multiple of the body radius. Default: 1.5.
    pub atmosphere_band: f64,
    /// Longest allowed distance between consecutive samples. Default: 1.0.
    pub max_step_distance: f64,
    /// How often a step may be halved to respect `max_step_distance`. Default: 32.
    pub max_step_halvings: u32,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            free_step_distance: 0.7,
            target_step_distance: 0.1,
            min_dt: 1e-4,
            max_dt: 0.25,
            step_scale_range: (0.01, 1.0),
            atmosphere: 0.5,
            atmosphere_band: 1.5,
            max_step_distance: 1.0,
            max_step_halvings: 32,
        }
    }
}

// =============================================================================
// Step size
// =============================================================================

/// Body the step size is adapted to, with the traveler's planar distance from it.
#[derive(Clone, Copy, Debug)]
pub struct StepFocus<'a> {
    pub body: &'a Body,
    pub distance: f64,
}

/// Compute the next step length in seconds.
///
/// Without a focus body the step covers `free_step_distance` at the current speed.
/// With one, solve `(½·a·t + v)·t = d` for `t`, scale it by
/// `(distance / radius_gravity)²` (clamped to `step_scale_range`) and clamp into
/// `[min_dt, max_dt]`.
///
/// Returns `None` when there is nothing left to simulate (no speed, no force).
pub fn compute_step_size(
    speed: f64,
    acceleration: f64,
    focus: Option<StepFocus<'_>>,
    config: &IntegratorConfig,
) -> Option<f64> {
    if speed <= REST_EPSILON && acceleration <= REST_EPSILON {
        return None;
    }

    let Some(focus) = focus else {
        if speed <= REST_EPSILON {
            return None;
        }
        return Some(config.free_step_distance / speed);
    };

    let d = config.target_step_distance;
    let dt = if acceleration <= REST_EPSILON {
        d / speed
    } else {
        // Positive root of ½·a·t² + v·t - d = 0
        ((speed * speed + 2.0 * acceleration * d).sqrt() - speed) / acceleration
    };

    let (scale_min, scale_max) = config.step_scale_range;
    let proximity = focus.distance / focus.body.radius_gravity;
    let scale = (proximity * proximity).clamp(scale_min, scale_max);

    Some((dt * scale).clamp(config.min_dt, config.max_dt))
}

/// Velocity multiplier for a step of `dt` seconds, `atmosphere^dt` inside the band.
pub fn drag_factor(focus: Option<StepFocus<'_>>, dt: f64, config: &IntegratorConfig) -> f64 {
    match focus {
        Some(focus) if focus.distance < focus.body.radius * config.atmosphere_band => {
            config.atmosphere.powf(dt)
        }
        _ => 1.0,
    }
}

/// One semi-implicit Euler step.
#[inline]
pub fn advance(last: &TimelineSample, acceleration: DVec3, dt: f64, drag: f64) -> TimelineSample {
    let velocity = (last.velocity + acceleration * dt) * drag;
    let position = last.position + velocity * dt;
    TimelineSample::new(position, velocity, last.t + dt)
}

// =============================================================================
// Integration loop
// =============================================================================

/// Why an integration run stopped short of filling the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The next step would have overlapped this body.
    Collision(BodyId),
    /// No speed and no net force: the traveler will never move again.
    Rest,
}

/// Summary of one [`integrate`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrationReport {
    /// Samples appended by this call.
    pub appended: usize,
    /// Dominant body at the new tail.
    pub dominant: Option<BodyId>,
    /// Set when the run ended before the timeline was full.
    pub termination: Option<Termination>,
}

/// Extend `timeline` from its tail until it is full, a collision is imminent, or
/// the traveler is at rest.
///
/// `dominant` is the body that dominated at the tail on the previous run; it feeds
/// the hysteresis of the dominant-body policy. An empty timeline is left untouched.
pub fn integrate(
    timeline: &mut Timeline,
    field: &GravityField<'_>,
    traveler_radius: f64,
    dominant: Option<BodyId>,
    config: &IntegratorConfig,
) -> IntegrationReport {
    let mut report = IntegrationReport {
        dominant,
        ..Default::default()
    };

    let Ok(&tail) = timeline.tail() else {
        return report;
    };
    let mut last = tail;

    if let Some(body) = field.collision_at(last.position, traveler_radius) {
        report.termination = Some(Termination::Collision(body));
        return report;
    }

    while !timeline.is_full() {
        report.dominant = field.dominant_body(last.position, report.dominant);
        let gravity = field.acceleration_at(last.position, traveler_radius);
        let focus = report
            .dominant
            .and_then(|id| field.body(id))
            .map(|body| StepFocus {
                body,
                distance: body.offset_to(last.position).length(),
            });

        let speed = last.velocity.length();
        let Some(mut dt) =
            compute_step_size(speed, gravity.acceleration.length(), focus, config)
        else {
            report.termination = Some(Termination::Rest);
            break;
        };

        let mut next = advance(&last, gravity.acceleration, dt, drag_factor(focus, dt, config));
        let max_jump_squared = config.max_step_distance * config.max_step_distance;
        let mut halvings = 0;
        while (next.position - last.position).length_squared() > max_jump_squared
            && halvings < config.max_step_halvings
        {
            dt *= 0.5;
            halvings += 1;
            next = advance(&last, gravity.acceleration, dt, drag_factor(focus, dt, config));
        }
        debug_assert!(
            (next.position - last.position).length_squared() <= max_jump_squared,
            "integration step of {dt}s still jumps {} units",
            (next.position - last.position).length()
        );

        if let Some(body) = field.collision_at(next.position, traveler_radius) {
            debug!("trajectory stops before colliding with {:?} at t={:.3}", body, next.t);
            report.termination = Some(Termination::Collision(body));
            break;
        }

        if let Err(e) = timeline.append(next) {
            error!("trajectory integration stopped: {e}");
            break;
        }
        report.appended += 1;
        last = next;
    }

    report
}

// =============================================================================
// Tests
// =============================================================================
