//! Simulated ball trajectories.
//!
//! A [`Trajectory`] owns a bounded [`Timeline`] of samples plus the stability
//! verdict derived from it. The flight controller keeps two: the committed one
//! the ball is following and a planned one previewed while aiming.

use bevy::log::{debug, error};
use bevy::math::DVec3;

use crate::orbit::{
    compute_orbit_elements, is_stable_orbit, OrbitElements, RevolutionCounter, StabilityStrategy,
};
use crate::physics::{integrate, GravityField, IntegratorConfig, Termination};
use crate::timeline::Timeline;
use crate::types::{BallState, Body, BodyId, TimelineSample};

#[derive(Clone, Debug)]
pub struct Trajectory {
    timeline: Timeline,
    analyzed: bool,
    stable: bool,
    /// Last analytic result, if the analytic strategy ran.
    elements: Option<OrbitElements>,
    /// Dominant body at the tail, carried between integration runs.
    dominant: Option<BodyId>,
    termination: Option<Termination>,
}

impl Trajectory {
    pub fn new(capacity: usize) -> Self {
        Self {
            timeline: Timeline::new(capacity),
            analyzed: false,
            stable: false,
            elements: None,
            dominant: None,
            termination: None,
        }
    }

    /// Forget all samples and analysis.
    pub fn reset(&mut self) -> &mut Self {
        self.timeline.clear();
        self.analyzed = false;
        self.stable = false;
        self.elements = None;
        self.dominant = None;
        self.termination = None;
        self
    }

    /// Fill the timeline forward from the ball's state.
    ///
    /// An empty timeline is seeded at `t = 0` with the ball's position and
    /// `velocity - bump`; `bump` is the pull-back vector of a stroke. `orbited`
    /// is the body the ball is currently held by and wins ties between
    /// overlapping wells on the first step. A timeline that already has samples
    /// is extended from its tail and both `bump` and `orbited` are ignored.
    pub fn continue_from(
        &mut self,
        bump: DVec3,
        ball: &BallState,
        orbited: Option<BodyId>,
        field: &GravityField<'_>,
        config: &IntegratorConfig,
    ) -> &mut Self {
        if self.timeline.is_empty() {
            let seed = TimelineSample::new(ball.position, ball.velocity - bump, 0.0);
            if let Err(e) = self.timeline.append(seed) {
                error!("cannot seed trajectory: {e}");
                return self;
            }
            self.dominant = orbited;
        }
        self.extend(ball.radius, field, config)
    }

    /// Top the timeline back up to capacity unless it already ended.
    pub fn extend(
        &mut self,
        ball_radius: f64,
        field: &GravityField<'_>,
        config: &IntegratorConfig,
    ) -> &mut Self {
        if self.termination.is_some() || self.timeline.is_full() {
            return self;
        }
        let report = integrate(&mut self.timeline, field, ball_radius, self.dominant, config);
        self.dominant = report.dominant;
        self.termination = report.termination;
        self
    }

    /// Classify stability around `orbited`, once per reset cycle.
    ///
    /// Does nothing while already analyzed or when there is no orbited body. The
    /// analytic strategy always settles the verdict; the geometric one only does
    /// once it sees a closed orbit and otherwise retries on the next call.
    pub fn analyze(
        &mut self,
        orbited: Option<&Body>,
        ball_radius: f64,
        strategy: StabilityStrategy,
    ) -> bool {
        let Some(body) = orbited else {
            return self.stable;
        };
        if self.analyzed {
            return self.stable;
        }
        let Ok(&head) = self.timeline.head() else {
            return self.stable;
        };

        match strategy {
            StabilityStrategy::Analytic => {
                self.elements =
                    compute_orbit_elements(body.offset_to(head.position), head.velocity, body.mu());
                self.stable = self
                    .elements
                    .is_some_and(|elements| is_stable_orbit(&elements, body, ball_radius));
                self.analyzed = true;
            }
            StabilityStrategy::Geometric { orbit_point_size } => {
                let mut counter = RevolutionCounter::new(body, head.position, orbit_point_size);
                self.stable = self.timeline.iter().any(|s| counter.observe(s.position));
                self.analyzed = self.stable;
            }
        }
        self.stable
    }

    /// Mark the verdict stale so the next [`analyze`](Self::analyze) recomputes it.
    pub fn invalidate_analysis(&mut self) {
        self.analyzed = false;
        self.stable = false;
        self.elements = None;
    }

    /// Position and velocity at `time`, consuming samples that lie in the past.
    ///
    /// Samples strictly before `time` are dropped from the head except the latest
    /// of them, which is put back as the interpolation anchor. Past the last
    /// sample the anchor's values are returned. When even the head lies after
    /// `time` there is nothing to interpolate from and the head's values are
    /// returned as they are.
    pub fn sample_at(&mut self, time: f64) -> Option<TimelineSample> {
        let mut previous = None;
        while let Ok(head) = self.timeline.head() {
            if head.t >= time {
                break;
            }
            previous = self.timeline.pop_head().ok();
        }
        let next = self.timeline.head().ok().copied();

        let sample = match (previous, next) {
            (Some(previous), Some(next)) => {
                let span = next.t - previous.t;
                let factor = if span > 0.0 {
                    (time - previous.t) / span
                } else {
                    0.0
                };
                TimelineSample::new(
                    previous.position.lerp(next.position, factor),
                    previous.velocity.lerp(next.velocity, factor),
                    time,
                )
            }
            (Some(previous), None) => previous,
            (None, Some(next)) => {
                debug!("trajectory has no sample before t={time:.4}, using t={:.4}", next.t);
                next
            }
            (None, None) => return None,
        };

        if let Some(anchor) = previous
            && let Err(e) = self.timeline.prepend(anchor)
        {
            error!("lost interpolation anchor: {e}");
        }
        Some(sample)
    }

    /// Sample positions for drawing, keeping every `stride`-th one plus the last.
    pub fn positions(&self, stride: usize) -> Vec<DVec3> {
        let stride = stride.max(1);
        let last = self.timeline.len().saturating_sub(1);
        self.timeline
            .iter()
            .enumerate()
            .filter(|(i, _)| i % stride == 0 || *i == last)
            .map(|(_, sample)| sample.position)
            .collect()
    }

    /// Shorter than the full horizon, because it hit something, came to rest or
    /// had samples consumed.
    pub fn is_interrupted(&self) -> bool {
        self.timeline.len() < self.timeline.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    pub fn elements(&self) -> Option<&OrbitElements> {
        self.elements.as_ref()
    }

    /// Body the trajectory runs into, if it ends in a collision.
    pub fn collision(&self) -> Option<BodyId> {
        match self.termination {
            Some(Termination::Collision(body)) => Some(body),
            _ => None,
        }
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn dominant(&self) -> Option<BodyId> {
        self.dominant
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn capacity(&self) -> usize {
        self.timeline.capacity()
    }
}
