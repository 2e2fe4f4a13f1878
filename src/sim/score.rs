//! Points and combo bookkeeping
//!
//! Every ball contact and every block destroyed by a detonation is a scoring
//! event. Events arriving within the combo window of the previous one grow
//! the combo; a longer gap starts a new one.

use super::state::{Block, BlockKind, Combo, GameState};
use crate::tuning::Tuning;

/// Combo count above which the combo bonus kicks in
pub const COMBO_BONUS_THRESHOLD: u32 = 2;
/// Bonus points per combo step, before the multiplier
pub const COMBO_BONUS_PER_STEP: f32 = 10.0;

/// Base points for destroying a special block, per original layer
pub fn special_weight(kind: BlockKind) -> i32 {
    match kind {
        BlockKind::Normal => 1,
        BlockKind::Bomb => 3,
        BlockKind::VerticalLaser | BlockKind::HorizontalLaser => 5,
        BlockKind::DiagonalLaser => 7,
    }
}

/// Points for an event that removed `layers_removed` from `block`.
///
/// Normal blocks and non-lethal hits are worth the layers removed. A
/// destroyed special block is worth its original layers times its weight.
/// Combos past the threshold add `count * 10 * multiplier`.
pub fn points_for(
    block: &Block,
    layers_removed: i32,
    combo_count: u32,
    combo_multiplier: f32,
) -> u64 {
    let base = match (block.kind.is_special(), block.is_destroyed()) {
        (true, true) => {
            block.original_layers.unwrap_or(layers_removed) * special_weight(block.kind)
        }
        _ => layers_removed,
    };
    let mut points = base.max(0) as f32;
    if combo_count > COMBO_BONUS_THRESHOLD {
        points += combo_count as f32 * COMBO_BONUS_PER_STEP * combo_multiplier;
    }
    points.round() as u64
}

/// Applies the combo rules from [`Tuning`]
#[derive(Debug, Clone, Copy)]
pub struct ScoreKeeper {
    pub window: f64,
    pub step: f32,
    pub cap: f32,
}

impl ScoreKeeper {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            window: tuning.combo_window as f64,
            step: tuning.combo_step,
            cap: tuning.combo_cap,
        }
    }

    /// Record a scoring event at session time `now`
    pub fn register(&self, combo: &mut Combo, now: f64) {
        let chained = combo
            .last_score_time
            .is_some_and(|last| now - last < self.window);
        if chained {
            combo.count += 1;
            combo.multiplier = (combo.multiplier + self.step).min(self.cap);
        } else {
            combo.count = 1;
            combo.multiplier = 1.0;
        }
        combo.last_score_time = Some(now);
    }

    /// Register the event, then add its points to the score
    pub fn award(&self, state: &mut GameState, block: &Block, layers_removed: i32) -> u64 {
        let now = state.time;
        self.register(&mut state.combo, now);
        let points = points_for(block, layers_removed, state.combo.count, state.combo.multiplier);
        state.score += points;
        points
    }

    /// Drop the combo (between volleys)
    pub fn reset(&self, combo: &mut Combo) {
        *combo = Combo::default();
    }
}
