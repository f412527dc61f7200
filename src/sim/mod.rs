//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick order only
//! - Seeded RNG only
//! - One monotonic session clock for every wall-clock timer
//! - No rendering or platform dependencies

pub mod collision;
pub mod generate;
pub mod platform;
pub mod state;
pub mod tick;

pub use collision::{circle_intersects_rect, landing_on_top};
pub use generate::{Spawner, replenish};
pub use platform::{Platform, PlatformKind, Rect};
pub use state::{
    Ball, BrakeState, Coin, CoinCombo, CoinKind, GameEvent, GameState, GustState, PoisonState,
    SkillCycle,
};
pub use tick::{TickInput, tick};
