//! Platform catalog and per-platform runtime state
//!
//! Each platform has exactly one [`PlatformKind`], fixed at construction.
//! The kind drives collision response (see `tick`), spawn policy (see
//! `generate`), and the small amount of ambient motion handled here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle in world units (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Overlap test with both rectangles grown by `pad` on every side
    pub fn overlaps_padded(&self, other: &Rect, pad: f32) -> bool {
        !(self.right() + pad < other.x
            || other.right() + pad < self.x
            || self.bottom() + pad < other.y
            || other.bottom() + pad < self.y)
    }
}

/// Platform varieties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    Static,
    Bouncy,
    Fragile,
    Moving,
    /// Slippery surface; the soap sub-variant auto-bounces and multiplies speed
    Slip {
        soap: bool,
    },
    Ice,
    /// Projects an attraction/repulsion field around itself
    Gravity,
    /// Landing engages a timed gust; proximity induces floating
    Windblast,
    Spikes,
    GrassSpikes,
}

impl PlatformKind {
    /// Hazards damage on contact, never receive coins, and force a static
    /// platform directly above them
    pub fn is_hazard(self) -> bool {
        matches!(self, PlatformKind::Spikes | PlatformKind::GrassSpikes)
    }

    /// Spawn cooldown set when the generator picks this kind (None = static,
    /// which is never suppressed)
    pub fn spawn_cooldown(self) -> Option<f32> {
        match self {
            PlatformKind::Static => None,
            PlatformKind::Spikes => Some(10.0),
            PlatformKind::GrassSpikes => Some(12.0),
            _ => Some(7.0),
        }
    }

    /// Stable name for logs
    pub fn name(self) -> &'static str {
        match self {
            PlatformKind::Static => "static",
            PlatformKind::Bouncy => "bouncy",
            PlatformKind::Fragile => "fragile",
            PlatformKind::Moving => "moving",
            PlatformKind::Slip { soap: true } => "soap",
            PlatformKind::Slip { soap: false } => "slip",
            PlatformKind::Ice => "ice",
            PlatformKind::Gravity => "gravity",
            PlatformKind::Windblast => "windblast",
            PlatformKind::Spikes => "spikes",
            PlatformKind::GrassSpikes => "grassspikes",
        }
    }
}

/// Break duration for fragile platforms (ticks until the platform re-forms)
pub const BREAK_DURATION_TICKS: u32 = 100;
/// Warning countdown armed by the first landing on a fragile platform
pub const WARNING_TICKS: u32 = 30;
/// Opacity lost per tick while broken
const OPACITY_DECAY: f32 = 0.02;
/// Horizontal sweep speed of moving platforms
const MOVE_SPEED: f32 = 1.5;

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub rect: Rect,
    pub kind: PlatformKind,
    /// Fragile state: broken platforms fade out, then re-form
    pub broken: bool,
    pub opacity: f32,
    break_ticks: u32,
    /// Fragile landing warning countdown (armed by the first landing)
    pub warning: Option<u32>,
    /// Sweep direction for moving platforms (+1 right, -1 left)
    pub direction: f32,
    /// Oscillation phase for bouncy platforms
    pub pulse: f32,
    /// Shared oscillation phase for slip and ice platforms
    pub slip_pulse: f32,
    /// One-shot trigger flag for windblast platforms
    pub collected: bool,
}

impl Platform {
    pub fn new(id: u32, rect: Rect, kind: PlatformKind) -> Self {
        Self {
            id,
            rect,
            kind,
            broken: false,
            opacity: 1.0,
            break_ticks: 0,
            warning: None,
            direction: 1.0,
            pulse: 0.0,
            slip_pulse: 0.0,
            collected: false,
        }
    }

    /// Broken platforms stay collidable while fading; only fully transparent
    /// ones are passed through
    pub fn is_solid(&self) -> bool {
        !(self.broken && self.opacity <= 0.0)
    }

    /// Start the break cycle (fragile only, no-op while already broken)
    pub fn break_temporarily(&mut self) {
        if self.kind != PlatformKind::Fragile || self.broken {
            return;
        }
        self.broken = true;
        self.break_ticks = BREAK_DURATION_TICKS;
        self.opacity = 1.0;
        self.warning = None;
    }

    /// Fragile landing bookkeeping: arm the warning on first landing,
    /// decrement on each subsequent contact tick, break at zero.
    /// Returns true if the platform broke this contact.
    pub fn register_fragile_landing(&mut self) -> bool {
        if self.kind != PlatformKind::Fragile || self.broken {
            return false;
        }
        match self.warning {
            None | Some(0) => {
                self.warning = Some(WARNING_TICKS);
                false
            }
            Some(ref mut t) => {
                *t -= 1;
                if *t == 0 {
                    self.break_temporarily();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Per-tick ambient update: sweep, oscillation phases, break decay
    pub fn update(&mut self) {
        if self.kind == PlatformKind::Moving && !self.broken {
            self.rect.x += MOVE_SPEED * self.direction;
            if self.rect.x < 0.0 || self.rect.right() > WORLD_WIDTH {
                self.direction = -self.direction;
            }
        }

        if self.broken {
            self.opacity = (self.opacity - OPACITY_DECAY).max(0.0);
            self.break_ticks = self.break_ticks.saturating_sub(1);
            if self.break_ticks == 0 {
                self.broken = false;
                self.opacity = 1.0;
            }
        }

        if self.kind == PlatformKind::Bouncy {
            self.pulse += 0.05;
        }

        if matches!(self.kind, PlatformKind::Slip { .. } | PlatformKind::Ice) {
            self.slip_pulse += 0.1;
        }

        if matches!(self.kind, PlatformKind::Slip { .. }) {
            self.rect.x += self.slip_pulse.sin() * 0.3;
        }
    }
}
