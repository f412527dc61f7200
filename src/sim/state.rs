//! Game state and core simulation types
//!
//! Everything a session owns lives here: the ball with its statically-typed
//! transient effects, the platform and coin lists, score and session
//! counters, the seeded RNG, and the event queue drained by the host.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::generate::{self, Spawner};
use super::platform::{Platform, PlatformKind};
use crate::consts::*;
use crate::tuning::{SkillTiming, Tuning};

/// Coin varieties; value and radius derive from the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinKind {
    Normal,
    Gold,
    /// Rare bonus coin; grants the one-shot rescue charge
    Star,
}

impl CoinKind {
    pub fn value(self) -> u64 {
        match self {
            CoinKind::Normal => 10,
            CoinKind::Gold => 50,
            CoinKind::Star => 25,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            CoinKind::Normal => 7.0,
            CoinKind::Gold => 10.0,
            CoinKind::Star => 8.0,
        }
    }
}

/// A collectible coin
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coin {
    pub pos: Vec2,
    pub kind: CoinKind,
    pub collected: bool,
}

impl Coin {
    pub fn new(pos: Vec2, kind: CoinKind) -> Self {
        Self {
            pos,
            kind,
            collected: false,
        }
    }
}

/// Poison damage-over-time: damage lands every `POISON_DAMAGE_INTERVAL`
/// ticks while the countdown runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoisonState {
    pub ticks_left: u32,
}

/// Landing braking ramp: dx interpolates from its value at landing toward
/// zero while grounded, and blends back toward the snapshot once airborne
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrakeState {
    pub ticks_left: u32,
    pub original_dx: f32,
}

/// Timed wind gust engaged by landing on a windblast platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GustState {
    pub ticks_left: u32,
}

/// Rolling coin-combo window: successive pickups multiply in value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinCombo {
    pub count: u32,
    pub ticks_left: u32,
}

/// The player entity. A single persistent instance per session; every
/// transient effect is a statically-typed field, none appear dynamically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Hit points, clamped to [0, HP_MAX] unconditionally every tick
    pub hp: f32,
    /// Set by landings, cleared when airborne; gates jumping
    pub can_jump: bool,
    /// Recomputed every tick from windblast proximity or an active gust;
    /// suppresses gravity and jumping
    pub floating: bool,
    /// Damage immunity window, decremented unconditionally each tick
    pub invulnerable_ticks: u32,
    pub poison: Option<PoisonState>,
    pub brake: Option<BrakeState>,
    pub gust: Option<GustState>,
    /// Slip countdown also gates ice friction, so it lives in the core
    pub slip_ticks: u32,
    pub soap_ticks: u32,
    pub bounce_ticks: u32,
    pub combo: CoinCombo,
    /// One-shot: consumed instead of a fall-out death
    pub rescue_charge: bool,
    /// Accumulates toward JUMP_FORCE_MAX while the jump intent is held on
    /// the ground
    pub jump_charge: f32,
}

impl Ball {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            hp: HP_MAX,
            can_jump: false,
            floating: false,
            invulnerable_ticks: 0,
            poison: None,
            brake: None,
            gust: None,
            slip_ticks: 0,
            soap_ticks: 0,
            bounce_ticks: 0,
            combo: CoinCombo::default(),
            rescue_charge: false,
            jump_charge: JUMP_FORCE_BASE,
        }
    }
}

/// Auto-reactivating passive skill: cycles active-duration then
/// cooldown-duration against the session clock
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SkillCycle {
    pub active: bool,
    pub last_activated: f64,
}

impl SkillCycle {
    pub fn update(&mut self, now: f64, timing: SkillTiming) {
        if self.active {
            if now - self.last_activated >= timing.active_secs {
                self.active = false;
            }
        } else if now - self.last_activated >= timing.cycle_secs() {
            self.active = true;
            self.last_activated = now;
        }
    }
}

/// Player-activated jump power-up
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JumpPower {
    pub active: bool,
    /// None until the first activation, so the power-up starts ready
    pub last_used: Option<f64>,
}

impl JumpPower {
    pub fn ready(&self, now: f64, cooldown_secs: f64) -> bool {
        !self.active
            && self
                .last_used
                .is_none_or(|last| now - last >= cooldown_secs)
    }
}

/// Discrete events emitted during a tick, for the host's audio/FX layer.
/// The core never blocks on their consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    LandedOnBouncy,
    PowerUpActivated,
    CoinCollected { kind: CoinKind, combo: u32 },
    Damaged { hazard: PlatformKind },
    PlatformBroke { id: u32 },
    GustStarted,
    Rescued,
    GameOver,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete session state, mutated serially by `tick` only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
    /// Simulation tick counter
    pub tick_count: u64,
    /// Monotonic elapsed time, the single source for all wall-clock timers
    pub time_secs: f64,
    pub ball: Ball,
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    /// Non-decreasing
    pub score: u64,
    /// Total upward camera scroll; non-decreasing
    pub max_height: f32,
    /// Scroll applied on the most recent tick (for host parallax)
    pub last_scroll: f32,
    /// One-way until restart
    pub game_over: bool,
    pub spawner: Spawner,
    pub speed_boost: SkillCycle,
    pub gravity_resistance: SkillCycle,
    pub jump_power: JumpPower,
    pub tuning: Tuning,
    pub(crate) last_hp_regen: f64,
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh session with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a fresh session with custom balance
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tick_count: 0,
            time_secs: 0.0,
            ball: Ball::new(Vec2::ZERO),
            platforms: Vec::new(),
            coins: Vec::new(),
            score: 0,
            max_height: 0.0,
            last_scroll: 0.0,
            game_over: false,
            spawner: Spawner::new(),
            speed_boost: SkillCycle::default(),
            gravity_resistance: SkillCycle::default(),
            jump_power: JumpPower::default(),
            tuning,
            last_hp_regen: 0.0,
            events: Vec::new(),
            next_id: 1,
        };
        generate::build_world(&mut state);
        state
    }

    /// Re-initialize the session in place (same seed, identical layout)
    pub fn restart(&mut self) {
        *self = Self::with_tuning(self.seed, self.tuning.clone());
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// End the session (idempotent)
    pub(crate) fn end_game(&mut self) {
        if !self.game_over {
            self.game_over = true;
            self.push_event(GameEvent::GameOver);
            log::info!(
                "game over: score={} height={:.0} ticks={}",
                self.score,
                self.max_height,
                self.tick_count
            );
        }
    }
}
