//! Frame stepping
//!
//! Advances a session by one host frame. The frame delta is split into
//! fixed-size sub-steps; within a sub-step every ball moves before any
//! collision is resolved, and every collision is resolved before the
//! volley-finished check runs.

use super::effects::EffectReport;
use super::session::GameSession;
use super::state::{GameEvent, GamePhase};
use crate::consts::*;

impl GameSession {
    /// Advance by one host frame of `delta` seconds. Paused sessions don't move.
    pub fn tick(&mut self, delta: f32) {
        if self.paused || self.state.phase == GamePhase::GameOver {
            return;
        }
        if !delta.is_finite() || delta <= 0.0 {
            return;
        }

        let mut remaining = delta.min(MAX_FRAME_DT);
        while remaining > 1e-6 {
            let dt = remaining.min(SIM_DT);
            self.step(dt);
            remaining -= dt;
        }

        // Hit flashes count host frames
        self.grid.decay_hits();
    }

    /// One fixed sub-step
    fn step(&mut self, dt: f32) {
        if self.state.phase == GamePhase::GameOver {
            return;
        }
        self.state.time += dt as f64;
        self.state.time_ticks += 1;

        match self.state.phase {
            GamePhase::Aiming | GamePhase::GameOver => {}
            GamePhase::Shooting => self.step_volley(dt),
            GamePhase::MovingBlocks => {
                self.descent_timer -= dt;
                if self.descent_timer <= 0.0 {
                    self.finish_descent();
                }
            }
        }
    }

    fn step_volley(&mut self, dt: f32) {
        for ball_id in self.balls.launch_due(self.state.time) {
            self.events.push(GameEvent::BallLaunched { ball_id });
        }

        self.balls.integrate(dt);
        self.balls.resolve_walls();
        self.balls.resolve_paddle(
            &self.paddle,
            self.tuning.max_paddle_bounces,
            self.tuning.paddle_deflection,
        );

        let contacts = self.balls.resolve_blocks(&mut self.grid, self.tuning.hit_flash_ticks);
        let mut detonating = Vec::new();
        for contact in contacts {
            let Some(block) = self.grid.get(contact.block_id) else {
                continue;
            };
            let points = self.scorer.award(&mut self.state, block, contact.dealt);
            self.events.push(GameEvent::BlockHit {
                block_id: block.id,
                layers_left: block.layers.max(0),
            });
            if !contact.destroyed {
                continue;
            }
            self.events.push(GameEvent::BlockDestroyed {
                block_id: block.id,
                kind: block.kind,
                points,
            });
            if block.kind.is_special() {
                detonating.push(block.id);
            }
        }

        // Every contact is scored before any detonation changes the grid
        for block_id in detonating {
            let report = self.resolver.resolve(&mut self.grid, block_id);
            self.apply_effects(&report);
        }

        self.grid.sweep_destroyed();
        self.balls.retire();

        if self.balls.is_idle() {
            self.state.phase = GamePhase::MovingBlocks;
            self.descent_timer = self.tuning.descent_delay;
            self.events.push(GameEvent::VolleyFinished);
        }
    }

    /// Score and report what a chain of detonations destroyed
    fn apply_effects(&mut self, report: &EffectReport) {
        for detonation in &report.detonations {
            self.events.push(GameEvent::Detonation {
                block_id: detonation.source_id,
                effect: detonation.effect,
            });
        }
        for damage in report.destroyed() {
            let Some(block) = self.grid.get(damage.block_id) else {
                continue;
            };
            let points = self.scorer.award(&mut self.state, block, damage.dealt);
            self.events.push(GameEvent::BlockDestroyed {
                block_id: block.id,
                kind: block.kind,
                points,
            });
        }
    }

    /// Rows come down one step; the run ends or the next level begins
    fn finish_descent(&mut self) {
        self.grid.descend();
        let added = self.grid.inject_row(&mut self.rng, self.state.level);
        self.events.push(GameEvent::RowsDescended);
        log::debug!("Rows descended, {} new blocks", added);

        if self.grid.reaches_row(self.tuning.game_over_row) {
            self.game_over();
            return;
        }

        self.state.level += 1;
        self.state.balls_count = self.state.level.min(self.tuning.max_balls);
        self.scorer.reset(&mut self.state.combo);
        self.state.phase = GamePhase::Aiming;
        self.events.push(GameEvent::LevelUp {
            level: self.state.level,
        });
        log::info!(
            "Level {} (score {}, {} balls)",
            self.state.level,
            self.state.score,
            self.state.balls_count
        );
    }

    fn game_over(&mut self) {
        self.balls.clear();
        self.state.phase = GamePhase::GameOver;
        self.state.new_record = self.store.save(self.state.score);
        if self.state.new_record {
            self.state.record = self.state.score;
        }
        self.events.push(GameEvent::GameOver {
            score: self.state.score,
            new_record: self.state.new_record,
        });
        log::info!(
            "Game over at level {}: score {}{}",
            self.state.level,
            self.state.score,
            if self.state.new_record { " (new record)" } else { "" }
        );
    }
}
