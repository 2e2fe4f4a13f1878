//! Aim preview
//!
//! Flies a ghost ball through the current block layout using the same
//! collision geometry as live balls. Blocks are only read, never damaged.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{bounce_off_rect, bounce_off_walls, crossed_base_line, out_of_bounds};
use super::state::Block;
use crate::consts::ARENA_WIDTH;
use crate::tuning::Tuning;

/// One sample of the predicted path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub pos: Vec2,
    /// Direction changed at this sample (wall or block)
    pub bounce: bool,
    /// The change came from a block
    pub hit: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TrajectoryPredictor {
    pub speed: f32,
    pub radius: f32,
    /// Fixed step between samples (seconds)
    pub dt: f32,
    pub max_points: usize,
}

impl TrajectoryPredictor {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            speed: tuning.ball_speed,
            radius: tuning.ball_radius,
            dt: tuning.preview_dt,
            max_points: tuning.preview_max_points,
        }
    }

    /// Sample the path of a ball launched from `origin` along `dir`.
    ///
    /// Stops at the base line or after `max_points` samples. A zero
    /// direction yields an empty path.
    pub fn predict(&self, origin: Vec2, dir: Vec2, blocks: &[Block]) -> Vec<TrajectoryPoint> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return Vec::new();
        }

        let mut points = Vec::with_capacity(self.max_points);
        let mut pos = origin;
        let mut vel = dir * self.speed;

        while points.len() < self.max_points {
            pos += vel * self.dt;

            let mut bounce = bounce_off_walls(&mut pos, &mut vel, self.radius, ARENA_WIDTH);

            if crossed_base_line(pos, vel) || out_of_bounds(pos, self.radius) {
                points.push(TrajectoryPoint { pos, bounce, hit: false });
                break;
            }

            let hit = blocks
                .iter()
                .filter(|b| !b.is_destroyed())
                .any(|b| bounce_off_rect(&mut pos, &mut vel, self.radius, b.pos, b.size));
            bounce |= hit;

            points.push(TrajectoryPoint { pos, bounce, hit });
        }

        points
    }
}
