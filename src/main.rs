//! Updraft headless demo
//!
//! Drives the simulation with a naive autopilot for a fixed number of ticks
//! and prints a JSON session summary. Useful for balance smoke-testing:
//!
//! ```text
//! updraft [seed] [ticks]
//! RUST_LOG=debug updraft 42 7200
//! ```

use serde::Serialize;

use updraft::consts::SIM_DT;
use updraft::sim::{GameState, PlatformKind, TickInput, tick};

#[derive(Serialize)]
struct SessionSummary {
    seed: u64,
    ticks: u64,
    score: u64,
    max_height: f32,
    hp: f32,
    game_over: bool,
    coins_collected: usize,
}

/// Steer toward the nearest platform above the ball and jump when grounded
fn autopilot(state: &GameState) -> TickInput {
    let ball = &state.ball;
    let target = state
        .platforms
        .iter()
        .filter(|p| p.rect.y < ball.pos.y && !p.kind.is_hazard())
        .min_by(|a, b| {
            let da = (ball.pos.y - a.rect.y) + (ball.pos.x - a.rect.center().x).abs();
            let db = (ball.pos.y - b.rect.y) + (ball.pos.x - b.rect.center().x).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    let mut input = TickInput {
        jump_held: ball.can_jump,
        jump_pressed: ball.can_jump,
        ..Default::default()
    };
    if let Some(platform) = target {
        let dx = platform.rect.center().x - ball.pos.x;
        if dx < -10.0 {
            input.move_left = true;
        } else if dx > 10.0 {
            input.move_right = true;
        }
        // Save the power-up for gravity wells, where jumps are strongest
        input.activate_power_up = platform.kind == PlatformKind::Gravity;
    }
    input
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(42);
    let max_ticks: u64 = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(3600);

    log::info!("starting session: seed={seed} ticks={max_ticks}");
    let mut state = GameState::new(seed);
    let mut coins_collected = 0usize;

    for _ in 0..max_ticks {
        if state.game_over {
            break;
        }
        let input = autopilot(&state);
        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            log::debug!("event: {event:?}");
            if matches!(event, updraft::sim::GameEvent::CoinCollected { .. }) {
                coins_collected += 1;
            }
        }
        if state.tick_count.is_multiple_of(600) {
            log::info!(
                "t={:.0}s score={} height={:.0} hp={:.1}",
                state.time_secs,
                state.score,
                state.max_height,
                state.ball.hp
            );
        }
    }

    let summary = SessionSummary {
        seed,
        ticks: state.tick_count,
        score: state.score,
        max_height: state.max_height,
        hp: state.ball.hp,
        game_over: state.game_over,
        coins_collected,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize summary: {err}"),
    }
}
