//! Turning the player's aim into a stroke.

use bevy::math::DVec3;

use crate::types::{flatten, BallState};

/// Tuning for stroke strength.
#[derive(Clone, Debug)]
pub struct BumpConfig {
    /// Weakest stroke. Default: 0.5.
    pub min_speed: f64,
    /// Strongest stroke. Default: 10.
    pub max_speed: f64,
    /// Seconds of holding for one full weak-strong-weak power cycle. Default: 10.
    pub period: f64,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            min_speed: 0.5,
            max_speed: 10.0,
            period: 10.0,
        }
    }
}

/// Triangle wave in `[0, 1]`: 0 at whole periods, 1 at half periods.
pub fn triangle_wave(x: f64, period: f64) -> f64 {
    if period <= 0.0 {
        return 1.0;
    }
    let phase = (x / period).rem_euclid(1.0);
    1.0 - (2.0 * phase - 1.0).abs()
}

/// Pull-back vector of a stroke.
///
/// The ball's new velocity is `velocity - bump`. A resting ball is pulled toward
/// the aim point, so it flies away from it like a slingshot; a moving ball is
/// pulled against its motion, so the stroke always adds speed along the current
/// heading. Strength cycles with `holding_time` between `min_speed` and
/// `max_speed`.
pub fn calc_bump_speed(
    ball: &BallState,
    hover: DVec3,
    holding_time: f64,
    config: &BumpConfig,
) -> DVec3 {
    let direction = if ball.is_stationary() {
        flatten(hover - ball.position).normalize_or_zero()
    } else {
        -ball.velocity.normalize_or_zero()
    };

    let power = triangle_wave(holding_time, config.period);
    let speed = (config.min_speed + (config.max_speed - config.min_speed) * power)
        .clamp(config.min_speed, config.max_speed);

    direction * speed
}
