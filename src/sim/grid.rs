//! Block grid: generation, descent and spatial queries
//!
//! Blocks are kept in ascending id order so every pass over the grid is
//! deterministic. Destroyed blocks stay in place until the end-of-tick sweep
//! and are ignored by all queries.

use rand::Rng;

use super::state::{Block, BlockKind};
use crate::consts::GRID_COLS;

/// Normal block layers are capped at this, however high the level
pub const MAX_NORMAL_LAYERS: i32 = 50;
/// Rows generated for a fresh level never exceed this
pub const MAX_INITIAL_ROWS: u32 = 6;

/// Owner of every block in play
#[derive(Debug, Clone)]
pub struct BlockGrid {
    blocks: Vec<Block>,
    next_id: u32,
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGrid {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            next_id: 1,
        }
    }

    /// Grid from hand-placed blocks (fixtures, editors)
    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        blocks.sort_by_key(|b| b.id);
        let next_id = blocks.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        Self { blocks, next_id }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn get(&self, id: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Blocks still standing
    pub fn alive(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| !b.is_destroyed())
    }

    fn next_block_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Roll one row of blocks at `row_index`. Empty slots are omitted.
    ///
    /// Per column: 5% empty, 7% bomb, 5% each laser, 73% normal.
    pub fn generate_row<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        level: u32,
        row_index: i32,
    ) -> Vec<Block> {
        let max_layers = (level as i32 + 2).min(MAX_NORMAL_LAYERS);
        let mut row = Vec::with_capacity(GRID_COLS as usize);

        for col in 0..GRID_COLS as i32 {
            let roll: f32 = rng.random();
            let (kind, layers) = if roll < 0.05 {
                continue;
            } else if roll < 0.12 {
                (BlockKind::Bomb, rng.random_range(3..8))
            } else if roll < 0.17 {
                (BlockKind::VerticalLaser, rng.random_range(4..10))
            } else if roll < 0.22 {
                (BlockKind::HorizontalLaser, rng.random_range(4..10))
            } else if roll < 0.27 {
                (BlockKind::DiagonalLaser, rng.random_range(4..10))
            } else {
                (BlockKind::Normal, rng.random_range(1..max_layers + 1))
            };
            let id = self.next_block_id();
            row.push(Block::new(id, row_index, col, kind, layers));
        }

        row
    }

    /// Replace the grid with a fresh level's opening rows
    pub fn init_level<R: Rng + ?Sized>(&mut self, rng: &mut R, level: u32) {
        self.blocks.clear();
        let rows = (4 + level / 3).min(MAX_INITIAL_ROWS);
        for row in 0..rows as i32 {
            let generated = self.generate_row(rng, level, row);
            self.blocks.extend(generated);
        }
        log::debug!("Level {}: {} rows, {} blocks", level, rows, self.blocks.len());
    }

    /// Move every block down one row
    pub fn descend(&mut self) {
        for block in &mut self.blocks {
            block.shift_rows(1);
        }
    }

    /// Add a freshly rolled top row. Returns the number of blocks added.
    pub fn inject_row<R: Rng + ?Sized>(&mut self, rng: &mut R, level: u32) -> usize {
        let row = self.generate_row(rng, level, 0);
        let added = row.len();
        self.blocks.extend(row);
        added
    }

    /// Drop destroyed blocks. Returns how many were removed.
    pub fn sweep_destroyed(&mut self) -> usize {
        let before = self.blocks.len();
        self.blocks.retain(|b| !b.is_destroyed());
        before - self.blocks.len()
    }

    /// Count every hit flash down one tick
    pub fn decay_hits(&mut self) {
        for block in &mut self.blocks {
            block.decay_hit();
        }
    }

    /// Any standing block at or below `row`
    pub fn reaches_row(&self, row: i32) -> bool {
        self.alive().any(|b| b.row >= row)
    }

    fn ids_where(&self, pred: impl Fn(&Block) -> bool) -> Vec<u32> {
        self.alive().filter(|b| pred(b)).map(|b| b.id).collect()
    }

    /// Square neighborhood (Chebyshev distance <= radius)
    pub fn blocks_in_radius(&self, row: i32, col: i32, radius: i32) -> Vec<u32> {
        self.ids_where(|b| (b.row - row).abs() <= radius && (b.col - col).abs() <= radius)
    }

    pub fn blocks_in_column(&self, col: i32) -> Vec<u32> {
        self.ids_where(|b| b.col == col)
    }

    pub fn blocks_in_row(&self, row: i32) -> Vec<u32> {
        self.ids_where(|b| b.row == row)
    }

    /// Both diagonals through (row, col)
    pub fn blocks_on_diagonals(&self, row: i32, col: i32) -> Vec<u32> {
        self.ids_where(|b| {
            let dr = b.row - row;
            let dc = b.col - col;
            dr == dc || dr == -dc
        })
    }
}
