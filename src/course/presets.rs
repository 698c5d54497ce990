//! Preset course layouts.
//!
//! Hand-placed holes used by the binary and by integration tests.

/// A body in a preset layout, positioned on the X/Z plane.
#[derive(Clone, Copy, Debug)]
pub struct BodySpec {
    pub x: f64,
    pub z: f64,
    pub mass: f64,
    pub radius: f64,
    pub radius_gravity: f64,
}

impl BodySpec {
    pub const fn new(x: f64, z: f64, mass: f64, radius: f64, radius_gravity: f64) -> Self {
        Self {
            x,
            z,
            mass,
            radius,
            radius_gravity,
        }
    }
}

/// A predefined hole.
#[derive(Clone, Copy, Debug)]
pub struct CourseLayout {
    /// Unique identifier for the layout.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    pub bodies: &'static [BodySpec],
    /// Index of the tee body.
    pub start: usize,
    /// Index of the goal body.
    pub goal: usize,
    pub par: u32,
}

/// All available preset courses.
pub static COURSES: &[CourseLayout] = &[FIRST_HOLE, DETOUR];

/// Hole 1: two planets and nothing in between.
pub static FIRST_HOLE: CourseLayout = CourseLayout {
    id: "first_hole",
    name: "First Hole",
    bodies: &[
        BodySpec::new(-20.0, 0.0, 30000.0, 1.5, 12.0),
        BodySpec::new(20.0, 0.0, 40000.0, 2.0, 16.0),
    ],
    start: 0,
    goal: 1,
    par: 2,
};

/// Hole 2: a repulsor sits on the direct line to the goal.
pub static DETOUR: CourseLayout = CourseLayout {
    id: "detour",
    name: "Detour",
    bodies: &[
        BodySpec::new(-30.0, 0.0, 30000.0, 1.5, 12.0),
        BodySpec::new(0.0, 2.0, -15000.0, 1.0, 8.0),
        BodySpec::new(5.0, -22.0, 25000.0, 1.2, 10.0),
        BodySpec::new(30.0, 5.0, 40000.0, 2.0, 16.0),
    ],
    start: 0,
    goal: 3,
    par: 3,
};
