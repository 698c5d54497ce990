//! Physics for ball flight.
//!
//! Gravity evaluation over the course bodies and the adaptive-step integrator
//! that turns a ball state into a trajectory. Everything here is pure with
//! respect to the body list, so the same course can be read by any number of
//! trajectory computations in one frame.

mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

pub use gravity::{body_acceleration, dominant_body, GravityField, GravitySample};
pub use integrator::{
    advance, compute_step_size, drag_factor, integrate, IntegrationReport, IntegratorConfig,
    StepFocus, Termination,
};
