//! Game session: the owner of all simulation state
//!
//! The host feeds input through the aim/paddle methods, drives time through
//! [`GameSession::tick`] (see `tick.rs`) and reads frames back through
//! [`GameSession::snapshot`]. Nothing else mutates the grid or the balls.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::balls::BallSet;
use super::effects::EffectResolver;
use super::grid::BlockGrid;
use super::score::ScoreKeeper;
use super::state::{Ball, GameEvent, GamePhase, GameState, Paddle, Snapshot};
use super::trajectory::{TrajectoryPoint, TrajectoryPredictor};
use crate::record::{MemoryRecordStore, RecordStore};
use crate::tuning::Tuning;

pub struct GameSession {
    pub(super) tuning: Tuning,
    pub(super) state: GameState,
    pub(super) grid: BlockGrid,
    pub(super) balls: BallSet,
    pub(super) paddle: Paddle,
    pub(super) rng: Pcg32,
    pub(super) store: Box<dyn RecordStore>,
    pub(super) resolver: EffectResolver,
    pub(super) scorer: ScoreKeeper,
    pub(super) predictor: TrajectoryPredictor,
    /// Current aim point while the player is aiming
    pub(super) aim: Option<Vec2>,
    pub(super) trajectory: Vec<TrajectoryPoint>,
    pub(super) events: Vec<GameEvent>,
    /// Seconds left in the MovingBlocks pause
    pub(super) descent_timer: f32,
    /// Host pause: the clock and input are frozen, the phase is kept
    pub(super) paused: bool,
}

impl GameSession {
    /// New session at level 1
    pub fn new(seed: u64, tuning: Tuning, mut store: Box<dyn RecordStore>) -> Self {
        let tuning = tuning.validated();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut grid = BlockGrid::new();
        grid.init_level(&mut rng, 1);
        let record = store.load();
        log::info!("Session started (seed {}, record {})", seed, record);

        Self {
            state: GameState::new(record),
            grid,
            balls: BallSet::new(&tuning),
            paddle: Paddle::new(tuning.paddle_width),
            rng,
            store,
            resolver: EffectResolver::new(tuning.bomb_radius, tuning.hit_flash_ticks),
            scorer: ScoreKeeper::new(&tuning),
            predictor: TrajectoryPredictor::new(&tuning),
            aim: None,
            trajectory: Vec::new(),
            events: Vec::new(),
            descent_timer: 0.0,
            paused: false,
            tuning,
        }
    }

    /// Default tuning and an in-memory record
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), Box::new(MemoryRecordStore::new()))
    }

    /// Throw the run away and start over at level 1.
    /// Pending launches and hit flashes go with it.
    pub fn restart(&mut self) {
        self.balls.clear();
        self.grid.init_level(&mut self.rng, 1);
        self.state = GameState::new(self.store.load());
        self.aim = None;
        self.trajectory.clear();
        self.events.clear();
        self.descent_timer = 0.0;
        self.paused = false;
        log::info!("Session restarted (record {})", self.state.record);
    }

    /// Swap in a prepared block layout (fixtures, level editors).
    /// Only takes effect while aiming.
    pub fn load_grid(&mut self, grid: BlockGrid) -> bool {
        if self.state.phase != GamePhase::Aiming {
            return false;
        }
        self.grid = grid;
        self.refresh_trajectory();
        true
    }

    // === Pause ===

    /// Freeze the session. No effect once the game is over.
    pub fn pause(&mut self) {
        if self.paused || self.state.phase == GamePhase::GameOver {
            return;
        }
        self.paused = true;
        log::info!("Paused at {:.2}s ({:?})", self.state.time, self.state.phase);
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        log::info!("Resumed at {:.2}s", self.state.time);
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Aim input is live only while aiming and not paused
    fn aiming(&self) -> bool {
        !self.paused && self.state.phase == GamePhase::Aiming
    }

    // === Input ===

    /// Move the paddle/launcher to a normalized [0, 1] position
    pub fn set_paddle_x(&mut self, normalized_x: f32) {
        if self.paused || self.state.phase == GamePhase::GameOver {
            return;
        }
        self.paddle.set_normalized(normalized_x);
        self.refresh_trajectory();
    }

    /// Start aiming at arena point (x, y)
    pub fn begin_aim(&mut self, x: f32, y: f32) {
        if !self.aiming() {
            return;
        }
        self.aim = Some(Vec2::new(x, y));
        self.refresh_trajectory();
    }

    /// Move the aim point. Ignored unless aiming has begun.
    pub fn update_aim(&mut self, x: f32, y: f32) {
        if !self.aiming() || self.aim.is_none() {
            return;
        }
        self.aim = Some(Vec2::new(x, y));
        self.refresh_trajectory();
    }

    /// Fire the volley along the current aim. Returns false (and keeps
    /// aiming) if there is no usable aim.
    pub fn release_aim(&mut self) -> bool {
        if !self.aiming() {
            return false;
        }
        let Some(point) = self.aim else {
            return false;
        };
        let Some(dir) = self.aim_direction(point) else {
            log::debug!("Aim at {:?} too short, no shot", point);
            return false;
        };
        self.aim = None;
        self.trajectory.clear();

        let origin = self.launch_origin();
        self.balls.schedule_volley(
            origin,
            dir,
            self.state.balls_count,
            self.state.time,
            self.tuning.launch_stagger,
        );
        self.state.phase = GamePhase::Shooting;
        log::info!(
            "Level {}: volley of {} along ({:.2}, {:.2})",
            self.state.level,
            self.state.balls_count,
            dir.x,
            dir.y
        );
        true
    }

    /// Abandon the current aim without shooting
    pub fn cancel_aim(&mut self) {
        if self.paused {
            return;
        }
        self.aim = None;
        self.trajectory.clear();
    }

    /// Launch direction toward `point`, with the upward clamp applied.
    /// `None` if the point is too close to the launcher to define a direction.
    pub fn aim_direction(&self, point: Vec2) -> Option<Vec2> {
        let v = point - self.launch_origin();
        let len = v.length();
        if !len.is_finite() || len < self.tuning.min_aim_length {
            return None;
        }
        let mut dir = v / len;
        let min_up = self.tuning.min_aim_up;
        if dir.y > -min_up {
            let side = if dir.x < 0.0 { -1.0 } else { 1.0 };
            dir = Vec2::new(side * (1.0 - min_up * min_up).sqrt(), -min_up);
        }
        Some(dir)
    }

    pub fn launch_origin(&self) -> Vec2 {
        self.paddle.launch_origin(self.tuning.ball_radius)
    }

    pub(super) fn refresh_trajectory(&mut self) {
        self.trajectory.clear();
        if self.state.phase != GamePhase::Aiming {
            return;
        }
        let Some(point) = self.aim else {
            return;
        };
        if let Some(dir) = self.aim_direction(point) {
            self.trajectory = self.predictor.predict(self.launch_origin(), dir, self.grid.blocks());
        }
    }

    // === Reads ===

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            blocks: self.grid.blocks(),
            balls: self.balls.balls(),
            paddle: &self.paddle,
            state: &self.state,
            trajectory: &self.trajectory,
            paused: self.paused,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub fn balls(&self) -> &[Ball] {
        self.balls.balls()
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Launches queued but not yet fired
    pub fn pending_launches(&self) -> usize {
        self.balls.pending()
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_new_session_starts_aiming() {
        let session = GameSession::with_seed(1);
        let state = session.state();
        assert_eq!(state.phase, GamePhase::Aiming);
        assert_eq!(state.level, 1);
        assert_eq!(state.balls_count, 1);
        assert_eq!(state.score, 0);
        assert!(!session.grid().blocks().is_empty());
        assert!(session.grid().blocks().iter().all(|b| b.row < 4));
    }

    #[test]
    fn test_record_loaded_at_start() {
        let store = Box::new(MemoryRecordStore::with_record(77));
        let session = GameSession::new(1, Tuning::default(), store);
        assert_eq!(session.state().record, 77);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = GameSession::with_seed(42);
        let b = GameSession::with_seed(42);
        assert_eq!(a.grid().blocks(), b.grid().blocks());
    }

    #[test]
    fn test_aim_below_horizon_is_clamped_upward() {
        let session = GameSession::with_seed(1);
        let origin = session.launch_origin();
        let dir = session.aim_direction(origin + Vec2::new(100.0, 50.0)).unwrap();
        assert!((dir.y + 0.1).abs() < 1e-6);
        assert!(dir.x > 0.0);
        assert!((dir.length() - 1.0).abs() < 1e-5);

        let dir = session.aim_direction(origin + Vec2::new(-100.0, 0.0)).unwrap();
        assert!(dir.x < 0.0 && dir.y < 0.0);
    }

    #[test]
    fn test_near_zero_aim_is_rejected() {
        let mut session = GameSession::with_seed(1);
        let origin = session.launch_origin();
        session.begin_aim(origin.x + 1.0, origin.y);
        assert!(!session.release_aim());
        assert_eq!(session.phase(), GamePhase::Aiming);
        assert_eq!(session.pending_launches(), 0);
    }

    #[test]
    fn test_aiming_builds_preview_and_release_fires() {
        let mut session = GameSession::with_seed(1);
        session.begin_aim(ARENA_WIDTH / 2.0, 100.0);
        assert!(!session.snapshot().trajectory.is_empty());
        session.update_aim(ARENA_WIDTH / 4.0, 100.0);
        assert!(!session.snapshot().trajectory.is_empty());

        assert!(session.release_aim());
        assert_eq!(session.phase(), GamePhase::Shooting);
        assert_eq!(session.pending_launches(), 1);
        assert!(session.snapshot().trajectory.is_empty());

        // Input is ignored mid-volley
        session.begin_aim(10.0, 10.0);
        assert!(!session.release_aim());
    }

    #[test]
    fn test_rejected_release_keeps_aiming() {
        let mut session = GameSession::with_seed(1);
        let origin = session.launch_origin();
        session.begin_aim(origin.x + 1.0, origin.y);
        assert!(!session.release_aim());

        session.update_aim(ARENA_WIDTH / 4.0, 100.0);
        assert!(!session.snapshot().trajectory.is_empty());
        assert!(session.release_aim());
        assert_eq!(session.phase(), GamePhase::Shooting);
    }

    #[test]
    fn test_cancel_aim_clears_preview() {
        let mut session = GameSession::with_seed(1);
        session.begin_aim(ARENA_WIDTH / 2.0, 100.0);
        assert!(!session.snapshot().trajectory.is_empty());

        session.cancel_aim();
        assert!(session.snapshot().trajectory.is_empty());
        session.update_aim(ARENA_WIDTH / 3.0, 100.0);
        assert!(!session.release_aim());
        assert_eq!(session.phase(), GamePhase::Aiming);
    }

    #[test]
    fn test_paused_session_ignores_input() {
        let mut session = GameSession::with_seed(1);
        let paddle = session.paddle().x;
        session.pause();

        session.set_paddle_x(0.0);
        session.begin_aim(ARENA_WIDTH / 2.0, 100.0);
        assert_eq!(session.paddle().x, paddle);
        assert!(session.snapshot().trajectory.is_empty());
        assert!(!session.release_aim());

        session.resume();
        session.begin_aim(ARENA_WIDTH / 2.0, 100.0);
        assert!(session.release_aim());
    }

    #[test]
    fn test_restart_clears_pause() {
        let mut session = GameSession::with_seed(1);
        session.pause();
        session.restart();
        assert!(!session.is_paused());
    }

    #[test]
    fn test_update_without_begin_is_ignored() {
        let mut session = GameSession::with_seed(1);
        session.update_aim(100.0, 100.0);
        assert!(!session.release_aim());
        assert!(session.snapshot().trajectory.is_empty());
    }

    #[test]
    fn test_restart_cancels_pending_launches() {
        let mut session = GameSession::with_seed(9);
        session.begin_aim(ARENA_WIDTH / 2.0, 0.0);
        assert!(session.release_aim());
        assert_eq!(session.pending_launches(), 1);

        session.restart();
        assert_eq!(session.pending_launches(), 0);
        assert!(session.balls().is_empty());
        assert_eq!(session.phase(), GamePhase::Aiming);
        assert!(session.grid().blocks().iter().all(|b| !b.is_hit()));
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = GameSession::with_seed(3);
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert!(json.contains("\"blocks\""));
        assert!(json.contains("\"Aiming\""));
    }
}
