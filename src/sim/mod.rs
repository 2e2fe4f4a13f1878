//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed sub-steps only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod balls;
pub mod collision;
pub mod color;
pub mod effects;
pub mod grid;
pub mod score;
pub mod session;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use balls::{BallSet, BlockContact, PendingLaunch};
pub use collision::{bounce_off_rect, bounce_off_walls, circle_rect_collision};
pub use color::{Color, color_of};
pub use effects::{Effect, EffectReport, EffectResolver};
pub use grid::BlockGrid;
pub use score::{ScoreKeeper, points_for};
pub use session::GameSession;
pub use state::{
    Ball, Block, BlockKind, Combo, GameEvent, GamePhase, GameState, Paddle, Snapshot,
};
pub use trajectory::{TrajectoryPoint, TrajectoryPredictor};
