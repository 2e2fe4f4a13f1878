//! Data-driven game balance
//!
//! Everything here is tweakable without touching simulation code. Geometry
//! lives in [`crate::consts`]; this is the balance layer on top of it.

use serde::{Deserialize, Serialize};

/// Gameplay balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Balls ===
    /// Launch speed (pixels/s), constant for the whole flight
    pub ball_speed: f32,
    pub ball_radius: f32,
    /// Delay between consecutive launches of one volley (seconds)
    pub launch_stagger: f32,
    /// Upper bound on balls per volley
    pub max_balls: u32,

    // === Aiming ===
    /// Minimum upward component of the normalized aim direction
    pub min_aim_up: f32,
    /// Aim vectors shorter than this (pixels) are rejected
    pub min_aim_length: f32,

    // === Paddle ===
    /// Paddle width (pixels)
    pub paddle_width: f32,
    /// Paddle deflections allowed per ball before it falls through
    pub max_paddle_bounces: u32,
    /// Horizontal share of speed at a paddle edge hit (0-1)
    pub paddle_deflection: f32,

    // === Blocks ===
    /// Hit-flash duration in ticks
    pub hit_flash_ticks: u32,
    /// Blocks reaching this row after a descent end the game
    pub game_over_row: i32,
    /// Bomb blast radius in cells (square neighborhood)
    pub bomb_radius: i32,
    /// Pause between the last ball returning and the descent (seconds)
    pub descent_delay: f32,

    // === Combo ===
    /// Scoring events closer than this (seconds) extend the combo
    pub combo_window: f32,
    pub combo_step: f32,
    pub combo_cap: f32,

    // === Aim preview ===
    pub preview_dt: f32,
    pub preview_max_points: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ball_speed: 400.0,
            ball_radius: 8.0,
            launch_stagger: 0.15,
            max_balls: 5,

            min_aim_up: 0.1,
            min_aim_length: 4.0,

            paddle_width: 80.0,
            max_paddle_bounces: 3,
            paddle_deflection: 0.75,

            hit_flash_ticks: 12,
            game_over_row: 10,
            bomb_radius: 2,
            descent_delay: 0.2,

            combo_window: 2.0,
            combo_step: 0.1,
            combo_cap: 3.0,

            preview_dt: 0.016,
            preview_max_points: 100,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Tuning>(json).map(Tuning::validated)
    }

    /// Clamp values that would make the simulation degenerate
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.ball_speed > 0.0) {
            self.ball_speed = defaults.ball_speed;
        }
        if !(self.ball_radius > 0.0) {
            self.ball_radius = defaults.ball_radius;
        }
        self.launch_stagger = self.launch_stagger.max(0.0);
        self.max_balls = self.max_balls.max(1);
        self.min_aim_up = self.min_aim_up.clamp(0.0, 0.99);
        self.min_aim_length = self.min_aim_length.max(f32::EPSILON);
        self.paddle_width = self.paddle_width.max(0.0);
        self.paddle_deflection = self.paddle_deflection.clamp(0.0, 0.95);
        self.game_over_row = self.game_over_row.max(1);
        self.bomb_radius = self.bomb_radius.max(0);
        self.descent_delay = self.descent_delay.max(0.0);
        self.combo_window = self.combo_window.max(0.0);
        self.combo_step = self.combo_step.max(0.0);
        self.combo_cap = self.combo_cap.max(1.0);
        if !(self.preview_dt > 0.0) {
            self.preview_dt = defaults.preview_dt;
        }
        self
    }

    /// Load tuning from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning file {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "ball_speed": 250.0, "max_balls": 3 }"#).unwrap();
        assert_eq!(tuning.ball_speed, 250.0);
        assert_eq!(tuning.max_balls, 3);
        assert_eq!(tuning.combo_window, 2.0);
        assert_eq!(tuning.game_over_row, 10);
    }

    #[test]
    fn test_validated_repairs_degenerate_values() {
        let tuning = Tuning::from_json(
            r#"{ "ball_speed": 0.0, "ball_radius": -3.0, "combo_cap": 0.5, "max_balls": 0 }"#,
        )
        .unwrap();
        assert_eq!(tuning.ball_speed, 400.0);
        assert_eq!(tuning.ball_radius, 8.0);
        assert_eq!(tuning.combo_cap, 1.0);
        assert_eq!(tuning.max_balls, 1);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let tuning = Tuning::load(std::path::Path::new("/nonexistent/layer-breaker/tuning.json"));
        assert_eq!(tuning, Tuning::default());
    }
}
