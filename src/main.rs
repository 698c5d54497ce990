//! Orbit Golf - headless course runner
//!
//! Loads a preset course, places a ball in orbit around its start body and lets
//! it coast, logging what the flight controller reports.

use bevy::log::LogPlugin;
use bevy::prelude::*;

use orbit_golf::course::{COURSES, Course};
use orbit_golf::flight::{FlightConfig, FlightController, FlightPlugin};

fn main() {
    let layout = &COURSES[0];
    let course = match Course::from_layout(layout) {
        Ok(course) => course,
        Err(e) => {
            eprintln!("course {} is invalid: {e}", layout.id);
            std::process::exit(1);
        }
    };

    App::new()
        .add_plugins((MinimalPlugins, LogPlugin::default()))
        // Insert resources before plugins that depend on them
        .insert_resource(course)
        .insert_resource(FlightConfig::default())
        .add_plugins(FlightPlugin)
        .add_systems(Startup, spawn_ball)
        .run();
}

fn spawn_ball(mut commands: Commands, course: Res<Course>, config: Res<FlightConfig>) {
    let mut ball = FlightController::new(config.clone());
    if let Err(e) = ball.place_in_orbit(&course) {
        error!("cannot place ball: {e}");
        return;
    }
    info!(
        "ball ready at {:?}, orbiting {:?}",
        ball.position(),
        ball.in_orbit_around()
    );
    commands.spawn(ball);
}
