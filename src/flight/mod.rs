//! Ball flight control.
//!
//! [`FlightController`] owns the ball state, the committed trajectory the ball
//! follows and the planned trajectory previewed while the player aims. It is
//! driven by explicit calls: planning actions from the input layer and
//! [`FlightController::tick`] once per frame. [`FlightPlugin`] wires the tick
//! into a Bevy app; nothing in the controller depends on it.

pub mod bump;

use std::f64::consts::TAU;

use bevy::log::info;
use bevy::math::DVec3;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::course::Course;
use crate::orbit::{stable_band, StabilityStrategy};
use crate::physics::{dominant_body, GravityField, IntegratorConfig};
use crate::trajectory::Trajectory;
use crate::types::{BallState, BodyId};

pub use bump::{calc_bump_speed, triangle_wave, BumpConfig};

/// Draws `place_in_orbit` makes before giving up on a crowded body.
pub const PLACE_ATTEMPTS: usize = 16;

/// Plugin advancing every [`FlightController`] once per frame.
pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Course>()
            .init_resource::<FlightConfig>()
            .add_systems(Update, advance_flight);
    }
}

/// Tick every ball against the current course.
fn advance_flight(mut balls: Query<&mut FlightController>, course: Res<Course>, time: Res<Time>) {
    let dt = time.delta_secs_f64();
    if dt <= 0.0 {
        return;
    }
    for mut ball in balls.iter_mut() {
        ball.tick(dt, &course);
    }
}

/// Errors from placing the ball.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FlightError {
    #[error("the course has no attracting body to orbit")]
    NoAttractor,

    #[error("body {0:?} has no room for a stable orbit")]
    NoOrbitRoom(BodyId),
}

/// Configuration for a ball.
#[derive(Resource, Clone, Debug)]
pub struct FlightConfig {
    /// Hard collision radius of the ball. Default: 0.5.
    pub ball_radius: f64,
    /// Velocity multiplier applied by the brakes. Default: 0.8.
    pub brake_factor: f64,
    /// Stability test for trajectories. Default: analytic.
    pub strategy: StabilityStrategy,
    /// Fraction of the stable band kept clear on each side when placing the
    /// ball in orbit. Default: 0.1.
    pub place_margin: f64,
    /// Seed for orbit placement. Default: 0.
    pub seed: u64,
    pub integrator: IntegratorConfig,
    pub bump: BumpConfig,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            ball_radius: 0.5,
            brake_factor: 0.8,
            strategy: StabilityStrategy::Analytic,
            place_margin: 0.1,
            seed: 0,
            integrator: IntegratorConfig::default(),
            bump: BumpConfig::default(),
        }
    }
}

/// Coarse phase of play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightState {
    /// Frozen, or coasting in a stable orbit without a plan.
    Idle,
    /// The player is aiming a stroke.
    Planning,
    /// Following a trajectory that is not a stable orbit.
    Flight,
    /// Collided; needs an explicit revive.
    Dead,
}

/// Last known-good state the ball returns to after a collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavePoint {
    pub position: DVec3,
    pub velocity: DVec3,
}

#[derive(Component, Clone, Debug)]
pub struct FlightController {
    config: FlightConfig,
    ball: BallState,
    frozen: bool,
    dead: bool,
    save: SavePoint,
    in_orbit_around: Option<BodyId>,
    committed: Trajectory,
    planned: Trajectory,
    planning: bool,
    /// Pull-back vector of the current plan.
    bump: DVec3,
    /// Seconds since the committed trajectory started.
    time_since_start: f64,
    strokes: u32,
    goal_reached: bool,
    rng: StdRng,
}

impl FlightController {
    /// A frozen ball at the origin. Call [`place_in_orbit`](Self::place_in_orbit)
    /// before play.
    pub fn new(config: FlightConfig) -> Self {
        let capacity = config.integrator.capacity;
        Self {
            ball: BallState::new(DVec3::ZERO, DVec3::ZERO, config.ball_radius),
            frozen: true,
            dead: false,
            save: SavePoint {
                position: DVec3::ZERO,
                velocity: DVec3::ZERO,
            },
            in_orbit_around: None,
            committed: Trajectory::new(capacity),
            planned: Trajectory::new(capacity),
            planning: false,
            bump: DVec3::ZERO,
            time_since_start: 0.0,
            strokes: 0,
            goal_reached: false,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Put the ball on a stable elliptical orbit around the start body.
    ///
    /// Uses the course start body, or a random attractor when none is set. The
    /// ball's distance and the opposite apsis are both drawn from the body's
    /// stable band; the speed then follows from vis-viva,
    /// `v² = G·M·(2/r - 1/a)`. Spots overlapping any body are redrawn, up to
    /// [`PLACE_ATTEMPTS`] times.
    pub fn place_in_orbit(&mut self, course: &Course) -> Result<(), FlightError> {
        let id = match course.start().filter(|&id| course.body(id).is_some_and(|b| b.is_attractor())) {
            Some(id) => id,
            None => *course
                .attractors()
                .choose(&mut self.rng)
                .ok_or(FlightError::NoAttractor)?,
        };
        let body = course.body(id).ok_or(FlightError::NoAttractor)?;

        let (inner, outer) = stable_band(body, self.ball.radius);
        let margin = (outer - inner) * self.config.place_margin;
        let (low, high) = (inner + margin, outer - margin);
        if low >= high {
            return Err(FlightError::NoOrbitRoom(id));
        }

        let field = GravityField::new(course.bodies());
        let mut placement = None;
        for _ in 0..PLACE_ATTEMPTS {
            let r = self.rng.gen_range(low..high);
            let angle = self.rng.gen_range(0.0..TAU);
            let (sin, cos) = angle.sin_cos();
            let position = body.position + DVec3::new(cos, 0.0, sin) * r;
            if field.collision_at(position, self.ball.radius).is_none() {
                placement = Some((r, position, DVec3::new(-sin, 0.0, cos)));
                break;
            }
        }
        let (r, position, tangent) = placement.ok_or(FlightError::NoOrbitRoom(id))?;

        let opposite_apsis = self.rng.gen_range(low..high);
        let a = 0.5 * (r + opposite_apsis);
        let speed = (body.mu() * (2.0 / r - 1.0 / a)).sqrt();

        self.ball.position = position;
        self.ball.velocity = tangent * speed;
        self.dead = false;
        self.frozen = false;
        self.planning = false;
        self.planned.reset();
        self.in_orbit_around = Some(id);
        self.save = SavePoint {
            position: self.ball.position,
            velocity: self.ball.velocity,
        };
        self.recompute_committed(course);

        info!(
            "ball placed around {:?} at r={:.2}, a={:.2}, stable={}",
            id,
            r,
            a,
            self.committed.is_stable()
        );
        Ok(())
    }

    /// Begin aiming a stroke.
    ///
    /// A ball in a stable orbit saves its state first; a dead ball is revived
    /// from its save point. The ball then freezes until the plan is submitted
    /// or scrapped.
    pub fn start_planning(&mut self, course: &Course) -> Result<(), FlightError> {
        if self.dead {
            self.restore(course)?;
        } else if self.is_in_stable_orbit() {
            self.snapshot();
        }
        self.frozen = true;
        self.planning = true;
        self.bump = DVec3::ZERO;
        self.planned.reset();
        Ok(())
    }

    /// Rebuild the planned trajectory for the current aim.
    ///
    /// Recomputed from scratch on every call; the cost is bounded by the
    /// trajectory capacity. Ignored unless planning.
    pub fn plan_trajectory(&mut self, hover: DVec3, holding_time: f64, course: &Course) {
        if !self.planning {
            return;
        }
        self.bump = calc_bump_speed(&self.ball, hover, holding_time, &self.config.bump);

        let field = GravityField::new(course.bodies());
        let orbited = dominant_body(course.bodies(), self.ball.position, self.in_orbit_around);
        self.planned
            .reset()
            .continue_from(self.bump, &self.ball, orbited, &field, &self.config.integrator);
        self.planned.analyze(
            orbited.and_then(|id| course.body(id)),
            self.ball.radius,
            self.config.strategy,
        );
    }

    /// Commit the planned trajectory as a stroke.
    ///
    /// Returns `false` and changes nothing when there is no computed plan.
    pub fn submit_plan(&mut self) -> bool {
        if !self.planning || self.planned.is_empty() {
            return false;
        }
        std::mem::swap(&mut self.committed, &mut self.planned);
        self.planned.reset();
        self.planning = false;
        self.frozen = false;
        self.time_since_start = 0.0;
        if let Ok(head) = self.committed.timeline().head() {
            self.ball.velocity = head.velocity;
        }
        self.strokes += 1;

        info!(
            "stroke {}: bump {:.2}, trajectory {} samples{}",
            self.strokes,
            self.bump.length(),
            self.committed.len(),
            if self.committed.is_stable() { ", stable" } else { "" }
        );
        true
    }

    /// Drop the plan and resume the committed trajectory. Always safe to call.
    pub fn scrap_plan(&mut self, course: &Course) {
        self.planned.reset();
        self.planning = false;
        self.bump = DVec3::ZERO;
        self.frozen = self.dead;
        self.committed.invalidate_analysis();
        self.analyze_committed(course);
    }

    /// Slow the ball down and rebuild the committed trajectory.
    pub fn engage_brakes(&mut self, course: &Course) {
        if self.dead {
            return;
        }
        self.ball.velocity *= self.config.brake_factor;
        self.recompute_committed(course);
    }

    /// Mark the ball as crashed into `body`. It stays down until revived.
    pub fn on_collided(&mut self, body: BodyId) {
        if self.dead {
            return;
        }
        self.frozen = true;
        self.dead = true;
        info!("ball collided with {:?} after {} strokes", body, self.strokes);
    }

    /// Bring a crashed ball back to its save point and resume flight.
    pub fn revive(&mut self, course: &Course) -> Result<(), FlightError> {
        self.restore(course)?;
        self.frozen = false;
        Ok(())
    }

    /// Debug teleport: park the ball at `position` with no velocity.
    pub fn cheat_jump_to(&mut self, position: DVec3, course: &Course) {
        self.ball = BallState::new(position, DVec3::ZERO, self.ball.radius);
        self.frozen = true;
        self.dead = false;
        self.planning = false;
        self.planned.reset();
        self.save = SavePoint {
            position: self.ball.position,
            velocity: DVec3::ZERO,
        };
        self.in_orbit_around = None;
        self.recompute_committed(course);
    }

    // =========================================================================
    // Per-frame update
    // =========================================================================

    /// Advance the ball by `dt` seconds along the committed trajectory.
    ///
    /// Follows the trajectory first, then updates orbit membership, stability,
    /// collision and goal state from the new position.
    pub fn tick(&mut self, dt: f64, course: &Course) {
        if self.frozen || self.dead {
            return;
        }
        self.follow_trajectory(dt, course);

        let field = GravityField::new(course.bodies());
        let collided = field.collision_at(self.ball.position, self.ball.radius).or_else(|| {
            self.committed.collision().filter(|_| {
                self.committed
                    .timeline()
                    .tail()
                    .is_ok_and(|tail| tail.t <= self.time_since_start)
            })
        });
        if let Some(body) = collided {
            self.on_collided(body);
            return;
        }

        if !self.goal_reached && self.has_reached_goal(course) {
            self.goal_reached = true;
            info!(
                "goal reached in {} strokes (par {})",
                self.strokes,
                course.par()
            );
        }
    }

    fn follow_trajectory(&mut self, dt: f64, course: &Course) {
        self.time_since_start += dt;
        if let Some(sample) = self.committed.sample_at(self.time_since_start) {
            self.ball.position = sample.position;
            self.ball.velocity = sample.velocity;
        }

        let field = GravityField::new(course.bodies());
        self.committed
            .extend(self.ball.radius, &field, &self.config.integrator);
        self.analyze_committed(course);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Refresh `in_orbit_around` and analyze the committed trajectory against it.
    ///
    /// A change of orbited body invalidates the previous verdict.
    fn analyze_committed(&mut self, course: &Course) {
        let orbited = dominant_body(course.bodies(), self.ball.position, self.in_orbit_around);
        if orbited != self.in_orbit_around {
            self.in_orbit_around = orbited;
            self.committed.invalidate_analysis();
        }
        self.committed.analyze(
            orbited.and_then(|id| course.body(id)),
            self.ball.radius,
            self.config.strategy,
        );
    }

    fn recompute_committed(&mut self, course: &Course) {
        let field = GravityField::new(course.bodies());
        self.time_since_start = 0.0;
        self.committed
            .reset()
            .continue_from(
                DVec3::ZERO,
                &self.ball,
                self.in_orbit_around,
                &field,
                &self.config.integrator,
            );
        self.analyze_committed(course);
    }

    fn snapshot(&mut self) {
        self.save = SavePoint {
            position: self.ball.position,
            velocity: self.ball.velocity,
        };
    }

    /// Return to the save point, or to a fresh orbit when it has no velocity.
    ///
    /// On error the ball stays dead.
    fn restore(&mut self, course: &Course) -> Result<(), FlightError> {
        if self.save.velocity == DVec3::ZERO {
            self.place_in_orbit(course)?;
        } else {
            self.dead = false;
            self.ball.position = self.save.position;
            self.ball.velocity = self.save.velocity;
            self.recompute_committed(course);
        }
        info!("ball revived at {:?}", self.ball.position);
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn has_plan(&self) -> bool {
        self.planning
    }

    pub fn is_in_stable_orbit(&self) -> bool {
        !self.dead && self.in_orbit_around.is_some() && self.committed.is_stable()
    }

    /// In a stable orbit around the course goal.
    pub fn has_reached_goal(&self, course: &Course) -> bool {
        self.is_in_stable_orbit() && course.goal().is_some() && self.in_orbit_around == course.goal()
    }

    pub fn state(&self) -> FlightState {
        if self.dead {
            FlightState::Dead
        } else if self.planning {
            FlightState::Planning
        } else if self.frozen || self.is_in_stable_orbit() {
            FlightState::Idle
        } else {
            FlightState::Flight
        }
    }

    pub fn ball(&self) -> &BallState {
        &self.ball
    }

    pub fn position(&self) -> DVec3 {
        self.ball.position
    }

    pub fn velocity(&self) -> DVec3 {
        self.ball.velocity
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn in_orbit_around(&self) -> Option<BodyId> {
        self.in_orbit_around
    }

    pub fn committed(&self) -> &Trajectory {
        &self.committed
    }

    pub fn planned(&self) -> &Trajectory {
        &self.planned
    }

    /// Pull-back vector of the current plan.
    pub fn bump(&self) -> DVec3 {
        self.bump
    }

    pub fn save_point(&self) -> SavePoint {
        self.save
    }

    pub fn strokes(&self) -> u32 {
        self.strokes
    }

    pub fn time_since_start(&self) -> f64 {
        self.time_since_start
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }
}
