//! Orbit Golf - trajectory and stability engine
//!
//! A library crate for a top-down orbital mini-golf game: bounded trajectory
//! timelines, gravity evaluation over a course of bodies, adaptive integration,
//! orbit stability analysis and the ball flight controller that ties them
//! together.

pub mod course;
pub mod flight;
pub mod orbit;
pub mod physics;
pub mod timeline;
pub mod trajectory;
pub mod types;

#[cfg(test)]
pub mod test_utils;
