//! Updraft - a vertical climbing platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (generation, physics, collisions, game state)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio playback, and key-to-intent mapping are host concerns:
//! the host calls [`sim::tick`] once per frame with an input snapshot, then
//! reads the public state fields and drains [`sim::GameEvent`]s for
//! presentation.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matching display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// World dimensions in logical units
    pub const WORLD_WIDTH: f32 = 480.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 20.0;
    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.5;
    /// Horizontal speed cap (before the speed-boost multiplier)
    pub const BASE_MOVE_SPEED: f32 = 4.0;
    /// Horizontal acceleration per tick while a direction is held
    pub const MOVE_ACCEL: f32 = 0.1;
    /// Multiplier applied to dx every tick
    pub const VELOCITY_DAMPING: f32 = 0.9;
    /// Horizontal speed snaps to zero below this while coasting
    pub const MOVE_STOP_EPSILON: f32 = 0.05;
    /// Fraction of horizontal speed retained when bouncing off a wall
    pub const WALL_BOUNCE: f32 = 0.25;
    /// Absolute vertical speed clamp
    pub const MAX_VERTICAL_SPEED: f32 = 20.0;

    /// Jump force magnitudes (dy is negative-up)
    pub const JUMP_FORCE_BASE: f32 = 7.0;
    pub const JUMP_FORCE_MAX: f32 = 7.5;
    /// Charge gained per tick while the jump intent is held on the ground
    pub const JUMP_CHARGE_STEP: f32 = 0.9;

    /// Speed-boost passive skill multiplier
    pub const SPEED_BOOST_MULT: f32 = 1.5;
    /// Gravity retained while gravity resistance is active
    pub const GRAVITY_RESIST_MULT: f32 = 0.85;

    /// Gravity-well pre-pass: influence radius for gravity-force modulation,
    /// and the anti-gravity reversal zone inside it
    pub const GRAVITY_INFLUENCE_RADIUS: f32 = 100.0;
    pub const ANTI_GRAVITY_ZONE: f32 = 30.0;

    /// Gravity-well field (collision pass)
    pub const FIELD_RADIUS: f32 = 60.0;
    /// Inside this radius the field force reverses per the reversal formula
    pub const FIELD_INNER_RADIUS: f32 = 15.0;
    /// Inside this radius position eases toward the center and velocity damps
    pub const FIELD_CAPTURE_RADIUS: f32 = 6.0;
    pub const FIELD_STRENGTH: f32 = 0.12;
    /// Ball speed cap after field force application
    pub const FIELD_SPEED_CAP: f32 = 5.5;

    /// Windblast proximity float
    pub const FLOAT_RADIUS: f32 = 50.0;
    pub const FLOAT_LIFT: f32 = 0.1;
    /// Timed gust engaged by landing on a windblast platform
    pub const GUST_DURATION_TICKS: u32 = 240;

    /// Hazards
    pub const SPIKE_DAMAGE: f32 = 0.5;
    pub const GRASS_SPIKE_DAMAGE: f32 = 0.3;
    pub const INVULNERABILITY_TICKS: u32 = 60;
    pub const POISON_TICKS: u32 = 150;
    pub const POISON_DAMAGE_INTERVAL: u32 = 30;

    /// Hit points
    pub const HP_MAX: f32 = 3.0;

    /// Coin combo window
    pub const COMBO_WINDOW_TICKS: u32 = 60;

    /// Landing braking ramp length
    pub const BRAKE_TICKS: u32 = 100;

    /// Live platform count maintained by the generator
    pub const TARGET_PLATFORM_COUNT: usize = 18;
    /// Platforms are recycled this far below the bottom edge
    pub const RECYCLE_MARGIN: f32 = 50.0;
}
