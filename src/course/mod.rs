//! The course: the set of gravity bodies a ball flies through.
//!
//! A [`Course`] is the single owner of body data. Everything downstream
//! (gravity evaluation, integration, stability analysis) borrows the body
//! slice read-only, so one course can serve any number of trajectory
//! computations per frame.

pub mod presets;

use bevy::math::DVec3;
use bevy::prelude::Resource;

use crate::types::{Body, BodyId};

pub use presets::{BodySpec, CourseLayout, COURSES};

/// Errors raised while assembling a course.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CourseError {
    #[error("body {id:?} is invalid: {reason}")]
    InvalidBody { id: BodyId, reason: &'static str },

    #[error("no body with id {0:?} on this course")]
    UnknownBody(BodyId),
}

/// Bodies plus the start and goal designations of one hole.
#[derive(Resource, Clone, Debug, Default)]
pub struct Course {
    bodies: Vec<Body>,
    start: Option<BodyId>,
    goal: Option<BodyId>,
    par: u32,
}

impl Course {
    /// Build a course, validating every body.
    ///
    /// A body needs a positive finite radius and a gravity well at least twice
    /// as wide as the body itself, otherwise no orbit fits between surface and
    /// well edge.
    pub fn new(bodies: Vec<Body>) -> Result<Self, CourseError> {
        for (index, body) in bodies.iter().enumerate() {
            validate_body(BodyId(index), body)?;
        }
        Ok(Self {
            bodies,
            start: None,
            goal: None,
            par: 0,
        })
    }

    /// Instantiate a preset layout.
    pub fn from_layout(layout: &CourseLayout) -> Result<Self, CourseError> {
        let bodies = layout
            .bodies
            .iter()
            .map(|spec| {
                Body::new(
                    DVec3::new(spec.x, 0.0, spec.z),
                    spec.mass,
                    spec.radius,
                    spec.radius_gravity,
                )
            })
            .collect();
        Self::new(bodies)?
            .with_start(BodyId(layout.start))?
            .with_goal(BodyId(layout.goal))
            .map(|course| course.with_par(layout.par))
    }

    pub fn with_start(mut self, id: BodyId) -> Result<Self, CourseError> {
        self.check(id)?;
        self.start = Some(id);
        Ok(self)
    }

    pub fn with_goal(mut self, id: BodyId) -> Result<Self, CourseError> {
        self.check(id)?;
        self.goal = Some(id);
        Ok(self)
    }

    pub fn with_par(mut self, par: u32) -> Self {
        self.par = par;
        self
    }

    fn check(&self, id: BodyId) -> Result<(), CourseError> {
        if id.index() < self.bodies.len() {
            Ok(())
        } else {
            Err(CourseError::UnknownBody(id))
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// Body the ball is placed around at the start of the hole.
    pub fn start(&self) -> Option<BodyId> {
        self.start
    }

    /// Body the ball has to settle into a stable orbit around.
    pub fn goal(&self) -> Option<BodyId> {
        self.goal
    }

    pub fn par(&self) -> u32 {
        self.par
    }

    /// Ids of every body with positive mass.
    pub fn attractors(&self) -> Vec<BodyId> {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, body)| body.is_attractor())
            .map(|(index, _)| BodyId(index))
            .collect()
    }
}

fn validate_body(id: BodyId, body: &Body) -> Result<(), CourseError> {
    let finite = body.position.is_finite()
        && body.mass.is_finite()
        && body.radius.is_finite()
        && body.radius_gravity.is_finite();
    if !finite {
        return Err(CourseError::InvalidBody {
            id,
            reason: "non-finite value",
        });
    }
    if body.radius <= 0.0 {
        return Err(CourseError::InvalidBody {
            id,
            reason: "radius must be positive",
        });
    }
    if body.radius_gravity < 2.0 * body.radius {
        return Err(CourseError::InvalidBody {
            id,
            reason: "gravity radius must be at least twice the body radius",
        });
    }
    Ok(())
}
