//! Special-block detonations and chain reactions
//!
//! A destroyed special block damages a region of the grid by its original
//! layer count. Anything that region destroys is checked in turn, so bombs can
//! set off lasers that set off more bombs. Detonations are drained from a work
//! queue; each block detonates at most once per resolution pass.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::grid::BlockGrid;
use super::state::{Block, BlockKind};

/// Area of effect of a detonation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Square neighborhood around the bomb
    Explosion { row: i32, col: i32, radius: i32 },
    VerticalLaser { col: i32 },
    HorizontalLaser { row: i32 },
    /// Both diagonals through (row, col)
    DiagonalLaser { row: i32, col: i32 },
}

impl Effect {
    /// Effect released by `block`, `None` for normal blocks
    pub fn for_block(block: &Block, bomb_radius: i32) -> Option<Effect> {
        match block.kind {
            BlockKind::Normal => None,
            BlockKind::Bomb => Some(Effect::Explosion {
                row: block.row,
                col: block.col,
                radius: bomb_radius,
            }),
            BlockKind::VerticalLaser => Some(Effect::VerticalLaser { col: block.col }),
            BlockKind::HorizontalLaser => Some(Effect::HorizontalLaser { row: block.row }),
            BlockKind::DiagonalLaser => Some(Effect::DiagonalLaser {
                row: block.row,
                col: block.col,
            }),
        }
    }

    /// Standing blocks inside the area
    pub fn targets(&self, grid: &BlockGrid) -> Vec<u32> {
        match *self {
            Effect::Explosion { row, col, radius } => grid.blocks_in_radius(row, col, radius),
            Effect::VerticalLaser { col } => grid.blocks_in_column(col),
            Effect::HorizontalLaser { row } => grid.blocks_in_row(row),
            Effect::DiagonalLaser { row, col } => grid.blocks_on_diagonals(row, col),
        }
    }
}

/// One special block going off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detonation {
    pub source_id: u32,
    /// Layers removed from every target
    pub damage: i32,
    pub effect: Effect,
}

/// Damage one detonation did to one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectDamage {
    pub block_id: u32,
    pub source_id: u32,
    /// Layers actually removed (bounded by what the block had left)
    pub dealt: i32,
    pub destroyed: bool,
}

/// Everything a resolution pass did, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectReport {
    pub detonations: Vec<Detonation>,
    pub damaged: Vec<EffectDamage>,
}

impl EffectReport {
    /// Damage entries that destroyed their block, in resolution order
    pub fn destroyed(&self) -> impl Iterator<Item = &EffectDamage> + '_ {
        self.damaged.iter().filter(|d| d.destroyed)
    }

    pub fn is_empty(&self) -> bool {
        self.detonations.is_empty()
    }
}

/// Resolves detonations against the grid
#[derive(Debug, Clone, Copy)]
pub struct EffectResolver {
    pub bomb_radius: i32,
    /// Hit flash given to every damaged block
    pub flash_ticks: u32,
}

impl EffectResolver {
    pub fn new(bomb_radius: i32, flash_ticks: u32) -> Self {
        Self {
            bomb_radius,
            flash_ticks,
        }
    }

    /// Detonate the destroyed special block `origin_id` and everything it sets off.
    ///
    /// Does nothing if the block is missing, still standing, or normal.
    pub fn resolve(&self, grid: &mut BlockGrid, origin_id: u32) -> EffectReport {
        let mut report = EffectReport::default();
        let mut processed: HashSet<u32> = HashSet::new();
        let mut queue: VecDeque<u32> = VecDeque::from([origin_id]);

        while let Some(id) = queue.pop_front() {
            if !processed.insert(id) {
                continue;
            }
            let Some(source) = grid.get(id) else {
                continue;
            };
            if !source.is_destroyed() {
                continue;
            }
            let Some(effect) = Effect::for_block(source, self.bomb_radius) else {
                continue;
            };
            let damage = source.original_layers.unwrap_or(0);
            if damage <= 0 {
                continue;
            }

            log::debug!("Block {} detonates: {:?} for {}", id, effect, damage);
            report.detonations.push(Detonation {
                source_id: id,
                damage,
                effect,
            });

            for target_id in effect.targets(grid) {
                let Some(target) = grid.get_mut(target_id) else {
                    continue;
                };
                let dealt = target.damage(damage, self.flash_ticks);
                let destroyed = target.is_destroyed();
                report.damaged.push(EffectDamage {
                    block_id: target_id,
                    source_id: id,
                    dealt,
                    destroyed,
                });
                if destroyed && target.kind.is_special() && !processed.contains(&target_id) {
                    queue.push_back(target_id);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLASH: u32 = 12;

    /// 5x5 grid of normal blocks with `layers`, with overrides
    fn grid_with(layers: i32, specials: &[(i32, i32, BlockKind, i32)]) -> BlockGrid {
        let mut blocks = Vec::new();
        let mut id = 1;
        for row in 0..5 {
            for col in 0..5 {
                let (kind, l) = specials
                    .iter()
                    .find(|(r, c, _, _)| *r == row && *c == col)
                    .map(|&(_, _, k, l)| (k, l))
                    .unwrap_or((BlockKind::Normal, layers));
                blocks.push(Block::new(id, row, col, kind, l));
                id += 1;
            }
        }
        BlockGrid::from_blocks(blocks)
    }

    fn id_at(grid: &BlockGrid, row: i32, col: i32) -> u32 {
        grid.blocks().iter().find(|b| b.row == row && b.col == col).unwrap().id
    }

    fn destroy(grid: &mut BlockGrid, id: u32) {
        let block = grid.get_mut(id).unwrap();
        let layers = block.layers;
        block.damage(layers, FLASH);
    }

    #[test]
    fn test_bomb_clears_its_neighborhood() {
        let mut grid = grid_with(5, &[(2, 2, BlockKind::Bomb, 5)]);
        let bomb = id_at(&grid, 2, 2);
        destroy(&mut grid, bomb);

        let report = EffectResolver::new(2, FLASH).resolve(&mut grid, bomb);

        assert_eq!(report.detonations.len(), 1);
        assert_eq!(report.damaged.len(), 24);
        for block in grid.blocks() {
            assert_eq!(block.layers, 0, "{:?}", block);
            assert!(block.is_destroyed());
        }
        assert!(report.damaged.iter().all(|d| d.dealt == 5 && d.destroyed));
    }

    #[test]
    fn test_damage_equals_original_layers_even_after_hits() {
        let mut grid = grid_with(10, &[(0, 0, BlockKind::VerticalLaser, 4)]);
        let laser = id_at(&grid, 0, 0);
        grid.get_mut(laser).unwrap().damage(1, FLASH);
        destroy(&mut grid, laser);

        EffectResolver::new(2, FLASH).resolve(&mut grid, laser);

        for row in 1..5 {
            assert_eq!(grid.get(id_at(&grid, row, 0)).unwrap().layers, 6);
        }
        assert_eq!(grid.get(id_at(&grid, 0, 1)).unwrap().layers, 10);
    }

    #[test]
    fn test_horizontal_laser_hits_only_its_row() {
        let mut grid = grid_with(9, &[(3, 1, BlockKind::HorizontalLaser, 4)]);
        let laser = id_at(&grid, 3, 1);
        destroy(&mut grid, laser);
        EffectResolver::new(2, FLASH).resolve(&mut grid, laser);

        for block in grid.alive() {
            let expected = if block.row == 3 { 5 } else { 9 };
            assert_eq!(block.layers, expected);
        }
        assert!(grid.alive().filter(|b| b.row == 3).all(|b| b.is_hit()));
    }

    #[test]
    fn test_diagonal_laser_hits_both_diagonals() {
        let mut grid = grid_with(9, &[(2, 2, BlockKind::DiagonalLaser, 4)]);
        let laser = id_at(&grid, 2, 2);
        destroy(&mut grid, laser);
        let report = EffectResolver::new(2, FLASH).resolve(&mut grid, laser);

        assert_eq!(report.damaged.len(), 8);
        for block in grid.alive() {
            let dr = block.row - 2;
            let dc = block.col - 2;
            let expected = if dr == dc || dr == -dc { 5 } else { 9 };
            assert_eq!(block.layers, expected);
        }
    }

    #[test]
    fn test_chained_bomb_detonates_exactly_once() {
        let mut grid = grid_with(20, &[(1, 1, BlockKind::Bomb, 5), (2, 3, BlockKind::Bomb, 4)]);
        let first = id_at(&grid, 1, 1);
        let second = id_at(&grid, 2, 3);
        destroy(&mut grid, first);

        let report = EffectResolver::new(2, FLASH).resolve(&mut grid, first);

        let sources: Vec<u32> = report.detonations.iter().map(|d| d.source_id).collect();
        assert_eq!(sources, vec![first, second]);
        let destroyed: Vec<(u32, i32)> =
            report.destroyed().map(|d| (d.block_id, d.dealt)).collect();
        assert_eq!(destroyed, vec![(second, 4)]);
        // Cell in both blasts took both hits
        assert_eq!(grid.get(id_at(&grid, 2, 2)).unwrap().layers, 20 - 5 - 4);
        // Cell only in the second blast
        assert_eq!(grid.get(id_at(&grid, 4, 4)).unwrap().layers, 20 - 4);
        // Cell only in the first blast
        assert_eq!(grid.get(id_at(&grid, 0, 0)).unwrap().layers, 20 - 5);
    }

    #[test]
    fn test_laser_sets_off_bomb() {
        let mut grid = grid_with(
            30,
            &[(0, 4, BlockKind::VerticalLaser, 9), (4, 4, BlockKind::Bomb, 3)],
        );
        let laser = id_at(&grid, 0, 4);
        destroy(&mut grid, laser);

        let report = EffectResolver::new(2, FLASH).resolve(&mut grid, laser);

        assert_eq!(report.detonations.len(), 2);
        assert!(matches!(
            report.detonations[1].effect,
            Effect::Explosion { row: 4, col: 4, radius: 2 }
        ));
        assert_eq!(grid.get(id_at(&grid, 3, 3)).unwrap().layers, 27);
    }

    #[test]
    fn test_standing_or_normal_origin_does_nothing() {
        let mut grid = grid_with(5, &[(2, 2, BlockKind::Bomb, 5)]);
        let bomb = id_at(&grid, 2, 2);
        assert!(EffectResolver::new(2, FLASH).resolve(&mut grid, bomb).is_empty());

        let normal = id_at(&grid, 0, 0);
        destroy(&mut grid, normal);
        assert!(EffectResolver::new(2, FLASH).resolve(&mut grid, normal).is_empty());
        assert!(EffectResolver::new(2, FLASH).resolve(&mut grid, 9999).is_empty());
    }

    #[test]
    fn test_dense_bomb_field_terminates() {
        let mut blocks = Vec::new();
        let mut id = 1;
        for row in 0..10 {
            for col in 0..7 {
                blocks.push(Block::new(id, row, col, BlockKind::Bomb, 3));
                id += 1;
            }
        }
        let mut grid = BlockGrid::from_blocks(blocks);
        destroy(&mut grid, 1);

        let report = EffectResolver::new(2, FLASH).resolve(&mut grid, 1);

        assert_eq!(report.detonations.len(), 70);
        assert!(grid.blocks().iter().all(|b| b.is_destroyed()));
        let mut sources: Vec<u32> = report.detonations.iter().map(|d| d.source_id).collect();
        sources.sort();
        sources.dedup();
        assert_eq!(sources.len(), 70);
    }
}
