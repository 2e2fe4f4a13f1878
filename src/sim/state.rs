//! Game state and core simulation types
//!
//! Everything a renderer needs to draw a frame lives here, plus the
//! aggregate [`GameState`] the session mutates.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::{Color, color_of};
use super::effects::Effect;
use super::trajectory::TrajectoryPoint;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to commit an aim vector
    Aiming,
    /// A volley is in flight
    Shooting,
    /// All balls are back; rows are about to descend
    MovingBlocks,
    /// Run ended. Terminal until restart.
    GameOver,
}

/// Block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Normal,
    /// Damages the square neighborhood on destruction
    Bomb,
    /// Damages its whole column
    VerticalLaser,
    /// Damages its whole row
    HorizontalLaser,
    /// Damages both diagonals through it
    DiagonalLaser,
}

impl BlockKind {
    pub fn is_special(self) -> bool {
        self != BlockKind::Normal
    }
}

/// A grid block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub row: i32,
    pub col: i32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: BlockKind,
    /// Remaining hit points. Destroyed once this reaches zero.
    pub layers: i32,
    /// Starting layers of a special block; its chain damage amount
    pub original_layers: Option<i32>,
    pub color: Color,
    /// Ticks left on the hit flash
    pub hit_ticks: u32,
}

impl Block {
    /// Block at grid cell (row, col) with standard geometry
    pub fn new(id: u32, row: i32, col: i32, kind: BlockKind, layers: i32) -> Self {
        Self {
            id,
            row,
            col,
            pos: Self::cell_origin(row, col),
            size: Vec2::splat(BLOCK_SIZE),
            kind,
            layers,
            original_layers: kind.is_special().then_some(layers),
            color: color_of(layers),
            hit_ticks: 0,
        }
    }

    /// Top-left pixel of a grid cell
    pub fn cell_origin(row: i32, col: i32) -> Vec2 {
        Vec2::new(col as f32 * ROW_HEIGHT, row as f32 * ROW_HEIGHT)
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.layers <= 0
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        self.hit_ticks > 0
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Remove up to `amount` layers and start the hit flash.
    /// Returns the layers actually removed (0 if already destroyed).
    pub fn damage(&mut self, amount: i32, flash_ticks: u32) -> i32 {
        if self.is_destroyed() || amount <= 0 {
            return 0;
        }
        let dealt = amount.min(self.layers);
        self.layers -= amount;
        self.color = color_of(self.layers);
        self.hit_ticks = flash_ticks;
        dealt
    }

    /// Count the hit flash down by one tick
    pub fn decay_hit(&mut self) {
        self.hit_ticks = self.hit_ticks.saturating_sub(1);
    }

    /// Shift the block down by `rows` grid rows
    pub fn shift_rows(&mut self, rows: i32) {
        self.row += rows;
        self.pos.y += rows as f32 * ROW_HEIGHT;
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Still in flight
    pub active: bool,
    /// Crossed the base line (as opposed to leaving the arena)
    pub returned: bool,
    /// Paddle deflections used so far
    pub paddle_bounces: u32,
}

impl Ball {
    /// Ball at `pos` heading along `dir` (normalized internally)
    pub fn new(id: u32, pos: Vec2, dir: Vec2, speed: f32, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: dir.normalize_or_zero() * speed,
            radius,
            active: true,
            returned: false,
            paddle_bounces: 0,
        }
    }

    /// Integrate position
    #[inline]
    pub fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// The player's paddle, which doubles as the launcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Center x (pixels)
    pub x: f32,
    pub width: f32,
}

impl Paddle {
    pub fn new(width: f32) -> Self {
        Self {
            x: ARENA_WIDTH / 2.0,
            width,
        }
    }

    /// Place the paddle from a normalized [0, 1] position, kept inside the arena
    pub fn set_normalized(&mut self, nx: f32) {
        let nx = if nx.is_finite() { nx.clamp(0.0, 1.0) } else { 0.5 };
        let half = (self.width / 2.0).min(ARENA_WIDTH / 2.0);
        self.x = (nx * ARENA_WIDTH).clamp(half, ARENA_WIDTH - half);
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    /// Top-left corner
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.left(), PADDLE_Y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, PADDLE_HEIGHT)
    }

    /// Where volleys leave from: just above the paddle center
    pub fn launch_origin(&self, ball_radius: f32) -> Vec2 {
        Vec2::new(self.x, PADDLE_Y - ball_radius - 1.0)
    }
}

/// Combo bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    pub multiplier: f32,
    /// Session time of the last scoring event
    pub last_score_time: Option<f64>,
}

impl Default for Combo {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            last_score_time: None,
        }
    }
}

/// Aggregate game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub level: u32,
    pub score: u64,
    /// Best score known to the record store
    pub record: u64,
    /// Balls in the next volley
    pub balls_count: u32,
    pub phase: GamePhase,
    pub combo: Combo,
    /// Set once at game over when the final score beat the record
    pub new_record: bool,
    /// Session clock (seconds of simulated time)
    pub time: f64,
    /// Simulation ticks elapsed
    pub time_ticks: u64,
}

impl GameState {
    pub fn new(record: u64) -> Self {
        Self {
            level: 1,
            score: 0,
            record,
            balls_count: 1,
            phase: GamePhase::Aiming,
            combo: Combo::default(),
            new_record: false,
            time: 0.0,
            time_ticks: 0,
        }
    }
}

/// Things that happened during a tick, for FX/audio layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BallLaunched { ball_id: u32 },
    BlockHit { block_id: u32, layers_left: i32 },
    BlockDestroyed { block_id: u32, kind: BlockKind, points: u64 },
    Detonation { block_id: u32, effect: Effect },
    VolleyFinished,
    RowsDescended,
    LevelUp { level: u32 },
    GameOver { score: u64, new_record: bool },
}

/// Read-only view of everything a renderer draws
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub blocks: &'a [Block],
    pub balls: &'a [Ball],
    pub paddle: &'a Paddle,
    pub state: &'a GameState,
    /// Aim preview (empty outside aiming)
    pub trajectory: &'a [TrajectoryPoint],
    pub paused: bool,
}
