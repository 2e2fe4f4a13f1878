//! Layer Breaker - a layered block-breaking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, effects, scoring, phases)
//! - `record`: Persistent best-score store
//! - `tuning`: Data-driven game balance

pub mod record;
pub mod sim;
pub mod tuning;

pub use record::{MemoryRecordStore, RecordStore};
pub use sim::GameSession;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Largest simulation sub-step (seconds); keeps fast balls from tunnelling
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Frame deltas above this are clamped (host backgrounding, debugger stalls)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Block grid
    pub const GRID_COLS: u32 = 7;
    pub const BLOCK_SIZE: f32 = 50.0;
    pub const BLOCK_GAP: f32 = 4.0;
    pub const ROW_HEIGHT: f32 = BLOCK_SIZE + BLOCK_GAP;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = GRID_COLS as f32 * ROW_HEIGHT;
    pub const ARENA_HEIGHT: f32 = 640.0;
    /// Balls crossing this line while falling are returned
    pub const BASE_LINE_Y: f32 = 600.0;

    /// Paddle/launcher sits just above the base line
    pub const PADDLE_Y: f32 = 570.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
}
