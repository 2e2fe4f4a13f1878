//! Balls in flight and the volley launch queue
//!
//! A volley is a queue of timed launches sharing one origin and direction.
//! Launches are consulted each tick against the session clock, so cancelling
//! a volley is just clearing the queue.

use std::collections::VecDeque;

use glam::Vec2;

use super::collision::{
    bounce_off_rect, bounce_off_walls, crossed_base_line, deflect_off_paddle, out_of_bounds,
};
use super::grid::BlockGrid;
use super::state::{Ball, Paddle};
use crate::consts::ARENA_WIDTH;
use crate::tuning::Tuning;

/// Layers a ball removes per contact
pub const BALL_DAMAGE: i32 = 1;

/// A ball waiting for its launch time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingLaunch {
    /// Session time the ball leaves the launcher
    pub due: f64,
    pub origin: Vec2,
    pub dir: Vec2,
}

/// A ball striking a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContact {
    pub ball_id: u32,
    pub block_id: u32,
    /// Layers removed
    pub dealt: i32,
    pub destroyed: bool,
}

/// Owner of every ball in play
#[derive(Debug, Clone)]
pub struct BallSet {
    balls: Vec<Ball>,
    /// Sorted by due time
    pending: VecDeque<PendingLaunch>,
    next_id: u32,
    pub speed: f32,
    pub radius: f32,
}

impl BallSet {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            balls: Vec::new(),
            pending: VecDeque::new(),
            next_id: 1,
            speed: tuning.ball_speed,
            radius: tuning.ball_radius,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Launches still waiting
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Nothing in flight and nothing queued
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.balls.iter().all(|b| !b.active)
    }

    /// Queue `count` launches `stagger` seconds apart, the first at `now`
    pub fn schedule_volley(&mut self, origin: Vec2, dir: Vec2, count: u32, now: f64, stagger: f32) {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        for i in 0..count {
            self.pending.push_back(PendingLaunch {
                due: now + i as f64 * stagger as f64,
                origin,
                dir,
            });
        }
    }

    /// Drop queued launches
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    /// Remove every ball and queued launch
    pub fn clear(&mut self) {
        self.balls.clear();
        self.pending.clear();
    }

    /// Put a ball in flight immediately. Returns its id.
    pub fn spawn(&mut self, pos: Vec2, dir: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.balls.push(Ball::new(id, pos, dir, self.speed, self.radius));
        id
    }

    /// Launch every queued ball due at or before `now`. Returns the new ids.
    pub fn launch_due(&mut self, now: f64) -> Vec<u32> {
        let mut launched = Vec::new();
        while self.pending.front().is_some_and(|p| p.due <= now) {
            if let Some(launch) = self.pending.pop_front() {
                launched.push(self.spawn(launch.origin, launch.dir));
            }
        }
        launched
    }

    /// Move every active ball
    pub fn integrate(&mut self, dt: f32) {
        for ball in self.balls.iter_mut().filter(|b| b.active) {
            ball.step(dt);
        }
    }

    /// Side/top walls, then the open bottom: falling past the base line
    /// returns a ball, leaving the arena loses it
    pub fn resolve_walls(&mut self) {
        for ball in self.balls.iter_mut().filter(|b| b.active) {
            bounce_off_walls(&mut ball.pos, &mut ball.vel, ball.radius, ARENA_WIDTH);
            if crossed_base_line(ball.pos, ball.vel) {
                ball.active = false;
                ball.returned = true;
            } else if out_of_bounds(ball.pos, ball.radius) {
                ball.active = false;
            }
        }
    }

    /// Paddle deflections, limited to `max_bounces` per ball
    pub fn resolve_paddle(&mut self, paddle: &Paddle, max_bounces: u32, deflection: f32) -> usize {
        let mut deflected = 0;
        for ball in self.balls.iter_mut().filter(|b| b.active) {
            if ball.paddle_bounces >= max_bounces {
                continue;
            }
            if deflect_off_paddle(&mut ball.pos, &mut ball.vel, ball.radius, paddle, deflection) {
                ball.paddle_bounces += 1;
                deflected += 1;
            }
        }
        deflected
    }

    /// Block contacts. Each ball resolves at most its first contact per
    /// call, in block id order.
    pub fn resolve_blocks(&mut self, grid: &mut BlockGrid, flash_ticks: u32) -> Vec<BlockContact> {
        let mut contacts = Vec::new();
        for ball in self.balls.iter_mut().filter(|b| b.active) {
            for block in grid.blocks_mut().iter_mut().filter(|b| !b.is_destroyed()) {
                let hit = bounce_off_rect(
                    &mut ball.pos,
                    &mut ball.vel,
                    ball.radius,
                    block.pos,
                    block.size,
                );
                if !hit {
                    continue;
                }
                let dealt = block.damage(BALL_DAMAGE, flash_ticks);
                contacts.push(BlockContact {
                    ball_id: ball.id,
                    block_id: block.id,
                    dealt,
                    destroyed: block.is_destroyed(),
                });
                break;
            }
        }
        contacts
    }

    /// Forget balls that are no longer in flight. Returns how many were removed.
    pub fn retire(&mut self) -> usize {
        let before = self.balls.len();
        self.balls.retain(|b| b.active);
        before - self.balls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{Block, BlockKind};
    use proptest::prelude::*;

    fn ball_set() -> BallSet {
        BallSet::new(&Tuning::default())
    }

    #[test]
    fn test_volley_launches_are_staggered() {
        let mut set = ball_set();
        set.schedule_volley(Vec2::new(100.0, 500.0), Vec2::new(0.0, -1.0), 3, 1.0, 0.15);
        assert_eq!(set.pending(), 3);

        assert!(set.launch_due(0.99).is_empty());
        assert_eq!(set.launch_due(1.0).len(), 1);
        assert_eq!(set.launch_due(1.2).len(), 1);
        assert_eq!(set.launch_due(1.31).len(), 1);
        assert_eq!(set.pending(), 0);

        let ids: Vec<u32> = set.balls().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(set.balls().iter().all(|b| b.vel == Vec2::new(0.0, -400.0)));
    }

    #[test]
    fn test_cancel_pending_stops_launches() {
        let mut set = ball_set();
        set.schedule_volley(Vec2::new(100.0, 500.0), Vec2::new(0.0, -1.0), 5, 0.0, 0.15);
        set.launch_due(0.0);
        set.cancel_pending();
        assert!(set.launch_due(10.0).is_empty());
        assert_eq!(set.balls().len(), 1);
        assert!(!set.is_idle());
    }

    #[test]
    fn test_ball_returns_at_base_line() {
        let mut set = ball_set();
        set.spawn(Vec2::new(50.0, BASE_LINE_Y - 1.0), Vec2::new(0.0, 1.0));
        set.integrate(1.0 / 120.0);
        set.resolve_walls();
        let ball = &set.balls()[0];
        assert!(!ball.active);
        assert!(ball.returned);
        assert!(set.is_idle());
        assert_eq!(set.retire(), 1);
    }

    #[test]
    fn test_block_contact_damages_first_block_only() {
        // Two overlapping blocks under the same ball
        let mut first = Block::new(1, 0, 0, BlockKind::Normal, 3);
        let mut second = Block::new(2, 0, 0, BlockKind::Normal, 3);
        first.pos = Vec2::new(100.0, 100.0);
        second.pos = Vec2::new(100.0, 100.0);
        let mut grid = BlockGrid::from_blocks(vec![first, second]);

        let mut set = ball_set();
        set.spawn(Vec2::new(125.0, 155.0), Vec2::new(0.0, -1.0));
        let contacts = set.resolve_blocks(&mut grid, 12);

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].block_id, 1);
        assert_eq!(grid.get(1).unwrap().layers, 2);
        assert_eq!(grid.get(2).unwrap().layers, 3);
        assert!(set.balls()[0].vel.y > 0.0);
    }

    #[test]
    fn test_paddle_bounce_allowance() {
        let paddle = Paddle::new(80.0);
        let mut set = ball_set();
        set.spawn(Vec2::new(paddle.x, PADDLE_Y), Vec2::new(0.0, 1.0));

        assert_eq!(set.resolve_paddle(&paddle, 1, 0.75), 1);
        assert!(set.balls()[0].vel.y < 0.0);
        assert!((set.balls()[0].speed() - 400.0).abs() < 1e-3);

        // Send it back down: the allowance is spent
        set.balls[0].vel = Vec2::new(0.0, 400.0);
        assert_eq!(set.resolve_paddle(&paddle, 1, 0.75), 0);
        assert!(set.balls()[0].vel.y > 0.0);
    }

    proptest! {
        #[test]
        fn prop_step_displacement_bounded(
            x in 10.0f32..360.0,
            y in 10.0f32..590.0,
            angle in 0.0f32..std::f32::consts::TAU,
            dt in 0.0f32..(1.0 / 60.0),
        ) {
            let mut set = ball_set();
            let start = Vec2::new(x, y);
            set.spawn(start, Vec2::new(angle.cos(), angle.sin()));
            set.integrate(dt);
            let moved = (set.balls()[0].pos - start).length();
            prop_assert!(moved <= 400.0 * dt + 1e-3);
        }

        #[test]
        fn prop_walls_keep_balls_inside(
            x in -20.0f32..400.0,
            y in -20.0f32..590.0,
            vx in -400.0f32..400.0,
            vy in -400.0f32..400.0,
        ) {
            let mut set = ball_set();
            set.spawn(Vec2::new(x, y), Vec2::new(1.0, 0.0));
            set.balls[0].vel = Vec2::new(vx, vy);
            set.resolve_walls();
            let ball = &set.balls()[0];
            prop_assert!(ball.pos.x >= ball.radius && ball.pos.x <= ARENA_WIDTH - ball.radius);
            prop_assert!(ball.pos.y >= ball.radius);
        }
    }
}
