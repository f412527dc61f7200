//! Procedural platform and coin generation
//!
//! Two entry points: [`build_world`] lays out the initial spiral column and
//! [`replenish`] tops the platform list back up to the target count as
//! platforms scroll off the bottom. Kind selection for incremental spawns is
//! a difficulty-weighted table with per-kind cooldowns and recency caps so
//! runs never degenerate into repeated hazards.

use std::mem::discriminant;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::platform::{Platform, PlatformKind, Rect};
use super::state::{Coin, CoinKind, GameState};
use crate::consts::*;

/// Initial layout
const INITIAL_SLOTS: usize = 20;
const INITIAL_MIN_GAP: f32 = 100.0;
const INITIAL_GAP_SPAN: f32 = 40.0;
const INITIAL_TOP_MARGIN: f32 = 50.0;
const PLACEMENT_PAD: f32 = 40.0;
const SPIRAL_BASE_RADIUS: f32 = 120.0;
const SPIRAL_RADIUS_STEP: f32 = 5.0;
const GROUND_HEIGHT: f32 = 40.0;
const START_WIDTH: f32 = 100.0;
const START_HEIGHT: f32 = 12.0;

/// Incremental spawning
const SPAWN_MIN_GAP: f32 = 90.0;
const SPAWN_MAX_GAP: f32 = 130.0;
const COOLDOWN_DECAY: f32 = 0.5;
const COOLDOWN_PENALTY: f32 = 0.1;
const RECENT_WINDOW: usize = 5;
const DIVERSITY_WINDOW: usize = 3;
/// Minimum vertical separation between grassspikes platforms
const GRASS_MIN_SEPARATION: f32 = 300.0;

/// Per-kind spawn cooldown counters, decremented by 0.5 per spawn call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cooldowns {
    spikes: f32,
    grassspikes: f32,
    fragile: f32,
    bouncy: f32,
    moving: f32,
    slip: f32,
    ice: f32,
    gravity: f32,
    windblast: f32,
}

impl Cooldowns {
    fn slot(&mut self, kind: PlatformKind) -> Option<&mut f32> {
        match kind {
            PlatformKind::Spikes => Some(&mut self.spikes),
            PlatformKind::GrassSpikes => Some(&mut self.grassspikes),
            PlatformKind::Fragile => Some(&mut self.fragile),
            PlatformKind::Bouncy => Some(&mut self.bouncy),
            PlatformKind::Moving => Some(&mut self.moving),
            PlatformKind::Slip { .. } => Some(&mut self.slip),
            PlatformKind::Ice => Some(&mut self.ice),
            PlatformKind::Gravity => Some(&mut self.gravity),
            PlatformKind::Windblast => Some(&mut self.windblast),
            PlatformKind::Static => None,
        }
    }

    fn remaining(&self, kind: PlatformKind) -> f32 {
        match kind {
            PlatformKind::Spikes => self.spikes,
            PlatformKind::GrassSpikes => self.grassspikes,
            PlatformKind::Fragile => self.fragile,
            PlatformKind::Bouncy => self.bouncy,
            PlatformKind::Moving => self.moving,
            PlatformKind::Slip { .. } => self.slip,
            PlatformKind::Ice => self.ice,
            PlatformKind::Gravity => self.gravity,
            PlatformKind::Windblast => self.windblast,
            PlatformKind::Static => 0.0,
        }
    }

    fn arm(&mut self, kind: PlatformKind) {
        if let (Some(slot), Some(cd)) = (self.slot(kind), kind.spawn_cooldown()) {
            *slot = cd;
        }
    }

    fn decay(&mut self) {
        for slot in [
            &mut self.spikes,
            &mut self.grassspikes,
            &mut self.fragile,
            &mut self.bouncy,
            &mut self.moving,
            &mut self.slip,
            &mut self.ice,
            &mut self.gravity,
            &mut self.windblast,
        ] {
            *slot = (*slot - COOLDOWN_DECAY).max(0.0);
        }
    }
}

/// Generator state owned by the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    pub cooldowns: Cooldowns,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_kind(a: PlatformKind, b: PlatformKind) -> bool {
    // Slip and soap count as one family for recency purposes
    discriminant(&a) == discriminant(&b)
}

/// Build the initial world: hazardous ground, fixed starting platform, then
/// a center-biased spiral of platforms with coins. Resets the ball onto the
/// starting platform.
pub fn build_world(state: &mut GameState) {
    state.platforms.clear();
    state.coins.clear();

    // Ground hazard spans the full width
    let id = state.next_entity_id();
    state.platforms.push(Platform::new(
        id,
        Rect::new(0.0, WORLD_HEIGHT - GROUND_HEIGHT, WORLD_WIDTH, GROUND_HEIGHT),
        PlatformKind::Spikes,
    ));

    // Fixed starting platform just above the ground
    let start_x = (WORLD_WIDTH - START_WIDTH) / 2.0;
    let start_y = WORLD_HEIGHT - GROUND_HEIGHT - 60.0;
    let start_rect = Rect::new(start_x, start_y, START_WIDTH, START_HEIGHT);
    let id = state.next_entity_id();
    state
        .platforms
        .push(Platform::new(id, start_rect, PlatformKind::Static));

    let mut used = vec![start_rect];
    let mut y = start_y;

    for i in 0..INITIAL_SLOTS {
        let gap = INITIAL_MIN_GAP + (state.rng.random::<f32>() * INITIAL_GAP_SPAN).floor();
        y -= gap;
        if y < INITIAL_TOP_MARGIN {
            break;
        }

        let width = 80.0 + (state.rng.random::<f32>() * 60.0).floor();
        let height = 10.0;

        // Center-biased spiral: radius grows and the angle advances with a
        // slight random variation per step
        let radius = SPIRAL_BASE_RADIUS + i as f32 * SPIRAL_RADIUS_STEP;
        let angle = i as f32 * (0.4 + state.rng.random::<f32>() * 0.2);
        let x = (WORLD_WIDTH / 2.0 + angle.cos() * radius - width / 2.0)
            .clamp(0.0, WORLD_WIDTH - width);

        let candidate = Rect::new(x, y, width, height);
        // Reject overlapping slots outright; no retry
        if used.iter().any(|r| r.overlaps_padded(&candidate, PLACEMENT_PAD)) {
            continue;
        }

        let kind = initial_kind(state, y, i);
        let id = state.next_entity_id();
        state.platforms.push(Platform::new(id, candidate, kind));
        used.push(candidate);

        if !kind.is_hazard() {
            let coin_chance = (width / 140.0).min(0.5);
            let coin_count = if state.rng.random::<f32>() < coin_chance { 2 } else { 1 };
            for c in 0..coin_count {
                let coin_x =
                    x + 20.0 + (c as f32 * (width - 40.0)) / (coin_count as f32 - 1.0).max(1.0);
                let kind = if state.rng.random::<f32>() < 0.12 {
                    CoinKind::Gold
                } else {
                    CoinKind::Normal
                };
                state
                    .coins
                    .push(Coin::new(Vec2::new(coin_x.floor(), (y - 15.0).floor()), kind));
            }
        }

        // Rare bonus star high up the column
        if y < WORLD_HEIGHT / 3.0 && state.rng.random::<f32>() < 0.1 {
            state
                .coins
                .push(Coin::new(Vec2::new(x + width / 2.0, y - 25.0), CoinKind::Star));
        }
    }

    // Ball starts resting on the starting platform
    let spawn = Vec2::new(start_x + START_WIDTH / 2.0, start_y - BALL_RADIUS);
    state.ball = super::state::Ball::new(spawn);

    log::info!(
        "world built: {} platforms, {} coins",
        state.platforms.len(),
        state.coins.len()
    );
}

/// Elevation-dependent kind table for the initial layout. Hazard bands only
/// open in the lower half of the column, and never for the first two slots.
fn initial_kind(state: &mut GameState, y: f32, slot: usize) -> PlatformKind {
    let r = state.rng.random::<f32>();
    if y < WORLD_HEIGHT / 2.0 {
        match r {
            r if r < 0.12 => PlatformKind::Bouncy,
            r if r < 0.22 => PlatformKind::Moving,
            r if r < 0.30 => PlatformKind::Fragile,
            r if r < 0.40 => PlatformKind::Ice,
            r if r < 0.48 => PlatformKind::Slip { soap: true },
            r if r < 0.55 => PlatformKind::Slip { soap: false },
            r if r < 0.62 => PlatformKind::Gravity,
            r if r < 0.70 => PlatformKind::Windblast,
            _ => PlatformKind::Static,
        }
    } else {
        match r {
            r if r < 0.10 => PlatformKind::Bouncy,
            r if r < 0.18 => PlatformKind::Moving,
            r if r < 0.26 => PlatformKind::Fragile,
            r if r < 0.34 => PlatformKind::Ice,
            r if r < 0.42 => PlatformKind::Slip { soap: true },
            r if r < 0.50 => PlatformKind::Slip { soap: false },
            r if r < 0.58 => PlatformKind::Gravity,
            r if r < 0.65 => PlatformKind::Windblast,
            r if r < 0.68 && slot >= 2 => PlatformKind::Spikes,
            r if r < 0.75 && slot >= 2 => PlatformKind::GrassSpikes,
            _ => PlatformKind::Static,
        }
    }
}

/// Remove platforms and coins scrolled past the bottom, then spawn above the
/// frontier until the target count is restored. Idempotent at the target.
pub fn replenish(state: &mut GameState) {
    let cutoff = WORLD_HEIGHT + RECYCLE_MARGIN;
    state.platforms.retain(|p| p.rect.y < cutoff);
    state.coins.retain(|c| !c.collected && c.pos.y < cutoff);

    while state.platforms.len() < TARGET_PLATFORM_COUNT {
        spawn_above(state);
    }
}

/// Spawn exactly one platform above the current frontier
fn spawn_above(state: &mut GameState) {
    // Defensive: an empty world gets a plain anchor to build from
    let Some(frontier) = state.platforms.last() else {
        let id = state.next_entity_id();
        state.platforms.push(Platform::new(
            id,
            Rect::new(
                (WORLD_WIDTH - START_WIDTH) / 2.0,
                WORLD_HEIGHT - GROUND_HEIGHT - 60.0,
                START_WIDTH,
                10.0,
            ),
            PlatformKind::Static,
        ));
        return;
    };

    let frontier_kind = frontier.kind;
    let frontier_y = frontier.rect.y;
    let recent: Vec<PlatformKind> = state
        .platforms
        .iter()
        .rev()
        .take(RECENT_WINDOW)
        .map(|p| p.kind)
        .collect();
    let last_kinds: Vec<PlatformKind> = recent.iter().take(DIVERSITY_WINDOW).copied().collect();
    let last_grass_y = state
        .platforms
        .iter()
        .rev()
        .find(|p| p.kind == PlatformKind::GrassSpikes)
        .map(|p| p.rect.y);

    let difficulty = state.tuning.difficulty(state.score);
    state.spawner.cooldowns.decay();

    let count_recent =
        |kind: PlatformKind| recent.iter().filter(|k| same_kind(**k, kind)).count();

    let max_spikes = 2 + (difficulty * 3.0) as usize;
    let spike_chance = 0.08 + (difficulty * std::f32::consts::FRAC_PI_2).sin() * 0.17;

    let mut weights: Vec<(PlatformKind, f32)> = vec![
        (PlatformKind::Spikes, spike_chance * (1.0 - difficulty * 0.3)),
        (
            PlatformKind::GrassSpikes,
            (0.05 + difficulty * 0.08) * (1.0 - difficulty * 0.2),
        ),
        (PlatformKind::Fragile, 0.13 + difficulty * 0.1),
        (PlatformKind::Bouncy, 0.13 + difficulty * 0.1),
        (PlatformKind::Moving, 0.13 + difficulty * 0.1),
        (PlatformKind::Slip { soap: false }, 0.1 + difficulty * 0.05),
        (PlatformKind::Ice, 0.08 + difficulty * 0.04),
        (PlatformKind::Gravity, 0.07 + difficulty * 0.05),
        (PlatformKind::Windblast, 0.09 + difficulty * 0.04),
        (PlatformKind::Static, (0.4 - difficulty * 0.3).max(0.1)),
    ];

    // Suppress kinds that are cooling down or over-represented recently
    for (kind, weight) in weights.iter_mut() {
        let over_cap = match kind {
            PlatformKind::Spikes => count_recent(*kind) >= max_spikes,
            PlatformKind::GrassSpikes => count_recent(*kind) >= 1,
            PlatformKind::Fragile | PlatformKind::Bouncy | PlatformKind::Moving => {
                count_recent(*kind) >= 3
            }
            PlatformKind::Slip { .. }
            | PlatformKind::Ice
            | PlatformKind::Gravity
            | PlatformKind::Windblast => count_recent(*kind) >= 2,
            PlatformKind::Static => false,
        };
        if over_cap || state.spawner.cooldowns.remaining(*kind) > 0.0 {
            *weight *= COOLDOWN_PENALTY;
        }
    }

    let mut total: f32 = weights.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        weights.push((PlatformKind::Static, 1.0));
        total = 1.0;
    }
    for (_, w) in weights.iter_mut() {
        *w /= total;
    }

    // Cumulative sampling against one uniform draw. A grassspikes platform
    // too close below the frontier is skipped outright, its mass unreachable.
    let grass_too_close = last_grass_y
        .map(|gy| (frontier_y - gy).abs() < GRASS_MIN_SEPARATION)
        .unwrap_or(false);
    let roll = state.rng.random::<f32>();
    let mut kind = PlatformKind::Static;
    let mut acc = 0.0;
    for (k, w) in &weights {
        if *k == PlatformKind::GrassSpikes && grass_too_close {
            continue;
        }
        acc += w;
        if roll < acc {
            kind = *k;
            break;
        }
    }

    // Hard overrides: never repeat spikes/grassspikes from the last three,
    // and only static directly above a hazard
    if last_kinds.contains(&kind) && kind.is_hazard() {
        kind = PlatformKind::Static;
    }
    if frontier_kind.is_hazard() && kind != PlatformKind::Static {
        kind = PlatformKind::Static;
    }

    state.spawner.cooldowns.arm(kind);

    // Spacing widens and platforms narrow as difficulty rises
    let gap = SPAWN_MIN_GAP + difficulty * (SPAWN_MAX_GAP - SPAWN_MIN_GAP);
    let y = frontier_y - gap;
    let min_width = 50.0 + (1.0 - difficulty) * 30.0;
    let max_width = 90.0 + (1.0 - difficulty) * 50.0;
    let width = min_width + state.rng.random::<f32>() * (max_width - min_width).max(0.0);
    let x = state.rng.random::<f32>() * (WORLD_WIDTH - width);

    let id = state.next_entity_id();
    state
        .platforms
        .push(Platform::new(id, Rect::new(x, y, width, 10.0), kind));
    log::debug!(
        "spawned {} at y={:.0} (difficulty {:.2})",
        kind.name(),
        y,
        difficulty
    );

    if !kind.is_hazard() {
        let coin_count = if state.rng.random::<f32>() < 0.2 { 3 } else { 1 };
        for i in 0..coin_count {
            let base_x = x + (width / (coin_count as f32 + 1.0)) * (i as f32 + 1.0);
            let jitter = (state.rng.random::<f32>() - 0.5) * 15.0;
            let coin_kind = if state.rng.random::<f32>() < 0.1 {
                CoinKind::Gold
            } else {
                CoinKind::Normal
            };
            state
                .coins
                .push(Coin::new(Vec2::new(base_x + jitter, y - 15.0), coin_kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_layout_shape() {
        let state = GameState::new(42);
        // Ground spans the full width at the bottom
        let ground = &state.platforms[0];
        assert_eq!(ground.rect.w, WORLD_WIDTH);
        assert_eq!(ground.rect.y, WORLD_HEIGHT - GROUND_HEIGHT);
        // Platforms above the start never overlap each other (padded check
        // is what placement enforces; plain overlap must certainly hold)
        for (i, a) in state.platforms.iter().enumerate().skip(2) {
            for b in state.platforms.iter().skip(i + 1) {
                assert!(
                    !a.rect.overlaps_padded(&b.rect, 0.0),
                    "platforms {} and {} overlap",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn test_hazards_receive_no_coins() {
        for seed in 0..20 {
            let state = GameState::new(seed);
            for p in state.platforms.iter().filter(|p| p.kind.is_hazard()) {
                for c in &state.coins {
                    let above = c.pos.y < p.rect.y && c.pos.y > p.rect.y - 30.0;
                    let within = c.pos.x >= p.rect.x && c.pos.x <= p.rect.right();
                    assert!(
                        !(above && within && p.id > 1),
                        "coin above hazard platform {} (seed {})",
                        p.id,
                        seed
                    );
                }
            }
        }
    }

    #[test]
    fn test_replenish_is_idempotent_at_target() {
        let mut state = GameState::new(5);
        replenish(&mut state);
        let count = state.platforms.len();
        assert!(count >= TARGET_PLATFORM_COUNT);
        replenish(&mut state);
        assert_eq!(state.platforms.len(), count);
    }

    #[test]
    fn test_no_hazard_repeat_after_recent_spikes() {
        for seed in 0..50 {
            let mut state = GameState::new(seed);
            // Force a frontier ending in spikes
            let id = state.next_entity_id();
            state.platforms.push(Platform::new(
                id,
                Rect::new(100.0, 80.0, 60.0, 10.0),
                PlatformKind::Spikes,
            ));
            let before = state.platforms.len();
            spawn_above(&mut state);
            let spawned = &state.platforms[before];
            // Directly above a hazard only static may appear
            assert_eq!(spawned.kind, PlatformKind::Static, "seed {}", seed);
        }
    }

    #[test]
    fn test_spawn_sets_cooldown() {
        let mut state = GameState::new(9);
        // Drive many spawns; whenever a non-static kind is chosen its
        // cooldown must be armed immediately afterwards
        for _ in 0..40 {
            let before = state.platforms.len();
            spawn_above(&mut state);
            let kind = state.platforms[before].kind;
            if kind != PlatformKind::Static {
                assert!(state.spawner.cooldowns.remaining(kind) > 0.0);
            }
        }
    }

    #[test]
    fn test_spawn_always_advances_frontier() {
        let mut state = GameState::new(11);
        for _ in 0..30 {
            let frontier_y = state.platforms.last().unwrap().rect.y;
            spawn_above(&mut state);
            let new_y = state.platforms.last().unwrap().rect.y;
            assert!(new_y < frontier_y);
        }
    }

    #[test]
    fn test_spawn_from_empty_world_recovers() {
        let mut state = GameState::new(3);
        state.platforms.clear();
        replenish(&mut state);
        assert!(state.platforms.len() >= TARGET_PLATFORM_COUNT);
    }
}
