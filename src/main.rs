//! Layer Breaker headless driver
//!
//! Plays a seeded run with a simple auto-aim and prints the final snapshot
//! as JSON.
//!
//! Usage:
//!   layer-breaker [--seed N] [--tuning tuning.json] [--record record.json]

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec2;
    use layer_breaker::consts::*;
    use layer_breaker::record::{FileRecordStore, MemoryRecordStore, RecordStore};
    use layer_breaker::sim::{GamePhase, GameSession};
    use layer_breaker::tuning::Tuning;

    const FRAME_DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES_PER_VOLLEY: u32 = 60 * 60;

    #[derive(Parser)]
    #[command(name = "layer-breaker")]
    #[command(about = "Play a seeded Layer Breaker run headlessly and print the final state")]
    struct Args {
        /// RNG seed for block generation
        #[arg(long, default_value_t = 0x5EED)]
        seed: u64,
        /// Tuning JSON file (missing keys use defaults)
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Best-score file; in-memory only when omitted
        #[arg(long, env = "LAYER_BREAKER_RECORD")]
        record: Option<PathBuf>,
        /// Stop after this many volleys even if the run is still alive
        #[arg(long, default_value_t = 500)]
        max_volleys: u32,
    }

    /// Lowest live block, or straight up when the field is empty
    fn auto_aim_target(session: &GameSession) -> Vec2 {
        session
            .grid()
            .alive()
            .max_by(|a, b| a.row.cmp(&b.row).then(b.id.cmp(&a.id)))
            .map(|b| b.center())
            .unwrap_or(Vec2::new(ARENA_WIDTH / 2.0, 0.0))
    }

    pub fn run() {
        env_logger::init();
        let args = Args::parse();

        let tuning = args.tuning.as_deref().map(Tuning::load).unwrap_or_default();
        let store: Box<dyn RecordStore> = match args.record {
            Some(path) => Box::new(FileRecordStore::new(path)),
            None => Box::new(MemoryRecordStore::new()),
        };

        log::info!("Layer Breaker (headless) starting, seed {}", args.seed);
        let mut session = GameSession::new(args.seed, tuning, store);

        let mut volleys = 0;
        while session.phase() == GamePhase::Aiming && volleys < args.max_volleys {
            let target = auto_aim_target(&session);
            session.set_paddle_x(target.x / ARENA_WIDTH);
            session.begin_aim(target.x, target.y);
            if !session.release_aim() {
                log::warn!("Auto-aim rejected at {:?}, stopping", target);
                break;
            }
            volleys += 1;

            let mut frames = 0;
            while session.phase() != GamePhase::Aiming && session.phase() != GamePhase::GameOver {
                if frames >= MAX_FRAMES_PER_VOLLEY {
                    log::warn!("Volley {} did not settle in {} frames", volleys, frames);
                    break;
                }
                session.tick(FRAME_DT);
                frames += 1;
            }
            for event in session.drain_events() {
                log::debug!("{:?}", event);
            }
        }

        let state = session.state();
        log::info!(
            "Finished after {} volleys: level {}, score {}, record {}",
            volleys,
            state.level,
            state.score,
            state.record
        );
        match serde_json::to_string_pretty(&session.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives GameSession through the library
}
