//! Data-driven game balance
//!
//! Wall-clock timings and the difficulty curve live here rather than in
//! `consts` so a host can load alternative balance from JSON. Everything else
//! (per-tick physics constants) is fixed.

use serde::{Deserialize, Serialize};

/// Active/cooldown cycle of an auto-reactivating passive skill, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillTiming {
    pub active_secs: f64,
    pub cooldown_secs: f64,
}

impl SkillTiming {
    /// Full cycle length: active phase followed by cooldown
    pub fn cycle_secs(&self) -> f64 {
        self.active_secs + self.cooldown_secs
    }
}

/// Player-activated jump power-up timing, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTiming {
    pub duration_secs: f64,
    pub cooldown_secs: f64,
}

/// Balance knobs read by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    /// Score at which the difficulty curve reaches its knee
    pub difficulty_score_divisor: f64,
    /// Exponent of the saturating difficulty power curve
    pub difficulty_exponent: f64,
    /// Speed boost: 6.25 s active, 2.9 s cooldown
    pub speed_boost: SkillTiming,
    /// Gravity resistance: 5.5 s active, 7.65 s cooldown
    pub gravity_resistance: SkillTiming,
    /// Jump power-up: 7 s duration, 5 s activation cooldown
    pub jump_power: PowerUpTiming,
    /// Hit points regained every regen interval
    pub hp_regen_amount: f32,
    pub hp_regen_interval_secs: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty_score_divisor: 1000.0,
            difficulty_exponent: 1.3,
            speed_boost: SkillTiming {
                active_secs: 6.25,
                cooldown_secs: 2.9,
            },
            gravity_resistance: SkillTiming {
                active_secs: 5.5,
                cooldown_secs: 7.65,
            },
            jump_power: PowerUpTiming {
                duration_secs: 7.0,
                cooldown_secs: 5.0,
            },
            hp_regen_amount: 0.2,
            hp_regen_interval_secs: 5.0,
        }
    }
}

impl Tuning {
    /// Difficulty scalar in [0, 1] for a given score: a saturating power
    /// curve that drives spawn weights and platform spacing
    pub fn difficulty(&self, score: u64) -> f32 {
        let x = (score as f64 / self.difficulty_score_divisor).powf(self.difficulty_exponent);
        x.min(1.0) as f32
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
