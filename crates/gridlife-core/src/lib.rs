//! Simulation core for GridLife: cell grid storage, the Conway engine behind
//! the [`Automaton`] seam, the pattern catalog, and the control-command
//! vocabulary shared with front-ends.
//!
//! Nothing in this crate touches a terminal or a window; every type here is
//! drivable headless, which is what the test suite does.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced when constructing or driving the simulation core.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Randomize was requested with a probability outside `[0, 1]`.
    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
}

/// Errors raised while loading a pattern catalog from disk.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read pattern catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse pattern catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Monotonic generation counter, advanced once per full rule application.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// 2D boolean cell store with dimensions fixed at construction.
///
/// The direct accessors ([`Grid::get`], [`Grid::set`]) treat an out-of-range
/// index as a caller bug and panic; coordinates derived from imprecise
/// sources (pointer clicks) go through [`Grid::cell`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Construct an all-dead grid with `rows * cols` cells.
    pub fn new(rows: usize, cols: usize) -> Result<Self, EngineError> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidConfig(
                "grid dimensions must be non-zero",
            ));
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major cell slice, for renderers that want the whole board.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Returns the flat index for `(row, col)` without bounds checks.
    #[inline]
    const fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn assert_bounds(&self, row: usize, col: usize) {
        assert!(
            row < self.rows && col < self.cols,
            "cell index out of range: ({row}, {col}) on a {}x{} grid",
            self.rows,
            self.cols,
        );
    }

    /// Read one cell.
    ///
    /// # Panics
    ///
    /// Panics when `(row, col)` is outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.assert_bounds(row, col);
        self.cells[self.offset(row, col)]
    }

    /// Write one cell; the side effect is limited to that cell.
    ///
    /// # Panics
    ///
    /// Panics when `(row, col)` is outside the grid.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        self.assert_bounds(row, col);
        let idx = self.offset(row, col);
        self.cells[idx] = alive;
    }

    /// Bounds-checked read for coordinates that may legitimately miss the
    /// grid (screen clicks landing on a border).
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<bool> {
        if row < self.rows && col < self.cols {
            Some(self.cells[self.offset(row, col)])
        } else {
            None
        }
    }

    /// Fills the whole grid with the provided state.
    pub fn fill(&mut self, alive: bool) {
        self.cells.fill(alive);
    }

    /// Number of live cells on the board.
    #[must_use]
    pub fn count_live(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Counts live cells among the 8 neighbors of `(row, col)` under the
    /// bounded policy: neighbors outside the grid are dead, never wrapped
    /// to the opposite edge.
    ///
    /// # Panics
    ///
    /// Panics when the center cell itself is outside the grid.
    #[must_use]
    pub fn live_neighbors(&self, row: usize, col: usize) -> usize {
        self.assert_bounds(row, col);
        let mut live = 0;
        for dr in [-1isize, 0, 1] {
            for dc in [-1isize, 0, 1] {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let Some(r) = row.checked_add_signed(dr) else {
                    continue;
                };
                let Some(c) = col.checked_add_signed(dc) else {
                    continue;
                };
                if r < self.rows && c < self.cols && self.cells[self.offset(r, c)] {
                    live += 1;
                }
            }
        }
        live
    }
}

/// Static configuration for a GridLife session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LifeConfig {
    /// Width of the render surface in pixels.
    pub width: u32,
    /// Height of the render surface in pixels.
    pub height: u32,
    /// Legacy generation cap; consumed only as the headless frame budget.
    pub generations: u32,
    /// Edge length of one cell in pixels.
    pub cell_size: u32,
    /// Initial tick interval in milliseconds.
    pub frame_delay_ms: u64,
    /// Optional RNG seed for reproducible randomize commands.
    pub rng_seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            generations: 1_000,
            cell_size: 10,
            frame_delay_ms: 500,
            rng_seed: None,
        }
    }
}

impl LifeConfig {
    /// Validates the configuration, returning the derived `(rows, cols)`.
    pub fn grid_dimensions(&self) -> Result<(usize, usize), EngineError> {
        if self.cell_size == 0 {
            return Err(EngineError::InvalidConfig("cell_size must be non-zero"));
        }
        let rows = (self.height / self.cell_size) as usize;
        let cols = (self.width / self.cell_size) as usize;
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidConfig(
                "render surface too small for a single cell",
            ));
        }
        Ok((rows, cols))
    }
}

/// Bounding box of a pattern, in cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternSize {
    pub w: u32,
    pub h: u32,
}

/// One live cell's offset within a pattern's bounding box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternCell {
    pub x: u32,
    pub y: u32,
}

/// A named shape: a bounding box plus the live-cell offsets inside it.
///
/// Cells inside the box but not listed are dead; stamping clears them so a
/// re-stamp overwrites stale state in that region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pattern {
    pub size: PatternSize,
    pub cells: Vec<PatternCell>,
}

/// Named shape definitions, usually loaded from a JSON catalog file of the
/// form `{ "<name>": { "size": {"w", "h"}, "cells": [{"x", "y"}, ...] } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternCatalog {
    #[serde(flatten)]
    patterns: HashMap<String, Pattern>,
}

impl PatternCatalog {
    /// A catalog with no entries; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog from its JSON representation.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Load a catalog, degrading to an empty one when the file is missing
    /// or malformed. Pattern commands become no-ops in that case; the
    /// simulation itself is unaffected.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => {
                debug!(path = %path.display(), patterns = catalog.len(), "loaded pattern catalog");
                catalog
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    %err,
                    "failed to load pattern catalog; pattern commands will be ignored",
                );
                Self::empty()
            }
        }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate over the catalog's pattern names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }
}

/// Semantic commands produced by input translation and applied by the
/// control loop, in arrival order, once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Flip one cell, typically from a pointer press. Out-of-range
    /// coordinates are ignored by the engine.
    ToggleCell { row: usize, col: usize },
    /// Flip between running and paused.
    TogglePause,
    /// Re-seed every cell independently with the given live probability.
    Randomize { probability: f64 },
    /// Kill every cell.
    Clear,
    /// Shift the tick interval by a signed delta, flooring at zero.
    AdjustInterval { delta_ms: i64 },
    /// Stamp a catalog pattern centered on the grid.
    LoadPattern { name: String },
    /// End the session.
    Quit,
}

/// Capability surface the control loop drives.
///
/// Alternate rule-sets substitute here without the loop, the input
/// translation, or the renderers changing.
pub trait Automaton {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;

    /// Generations advanced since construction or the last [`clear`].
    ///
    /// [`clear`]: Automaton::clear
    fn generation(&self) -> Generation;

    /// Advance one generation. The whole board is evaluated against the
    /// pre-step state; the new generation replaces it atomically.
    fn step(&mut self);

    /// Re-seed every cell with independent probability `probability`.
    fn randomize(&mut self, probability: f64) -> Result<(), EngineError>;

    /// Kill every cell and reset the generation counter. Idempotent.
    fn clear(&mut self);

    /// Flip one cell; out-of-range coordinates are silently ignored, since
    /// they originate from imprecise pointer-to-cell mapping.
    fn toggle_cell(&mut self, row: usize, col: usize);

    /// Overwrite the pattern's bounding box at the anchor: listed cells
    /// become live, the rest of the box dead. Cells falling outside the
    /// grid are skipped per-cell.
    fn stamp(&mut self, pattern: &Pattern, anchor_row: i64, anchor_col: i64);

    /// Read-only view of the current board for renderers.
    fn grid(&self) -> &Grid;
}

/// Apply an engine-directed command to `world`.
///
/// Returns `false` for commands that target loop state (pause, interval,
/// quit), which the caller owns. A rejected randomize probability is logged
/// and dropped; no command here can abort the session.
pub fn apply_world_command(
    world: &mut dyn Automaton,
    catalog: &PatternCatalog,
    command: &ControlCommand,
) -> bool {
    match command {
        ControlCommand::ToggleCell { row, col } => {
            world.toggle_cell(*row, *col);
            true
        }
        ControlCommand::Randomize { probability } => {
            if let Err(err) = world.randomize(*probability) {
                warn!(%err, "randomize command rejected");
            }
            true
        }
        ControlCommand::Clear => {
            world.clear();
            true
        }
        ControlCommand::LoadPattern { name } => {
            match catalog.lookup(name) {
                Some(pattern) => stamp_centered(world, pattern),
                None => debug!(name, "pattern not in catalog; ignoring load"),
            }
            true
        }
        ControlCommand::TogglePause
        | ControlCommand::AdjustInterval { .. }
        | ControlCommand::Quit => false,
    }
}

/// Stamp `pattern` centered on the automaton's board.
///
/// Patterns larger than the board get a negative anchor and are clipped
/// per-cell by the stamp itself.
pub fn stamp_centered(world: &mut dyn Automaton, pattern: &Pattern) {
    let anchor_row = (world.rows() as i64 - i64::from(pattern.size.h)) / 2;
    let anchor_col = (world.cols() as i64 - i64::from(pattern.size.w)) / 2;
    world.stamp(pattern, anchor_row, anchor_col);
}

/// Conway engine owning the live board plus a reusable scratch generation.
pub struct LifeWorld {
    grid: Grid,
    scratch: Vec<bool>,
    generation: Generation,
    rng: SmallRng,
}

impl fmt::Debug for LifeWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifeWorld")
            .field("rows", &self.grid.rows())
            .field("cols", &self.grid.cols())
            .field("generation", &self.generation)
            .field("live", &self.grid.count_live())
            .finish()
    }
}

impl LifeWorld {
    /// Instantiate an all-dead world. Passing a seed makes every
    /// [`randomize`](Automaton::randomize) call reproducible.
    pub fn new(rows: usize, cols: usize, rng_seed: Option<u64>) -> Result<Self, EngineError> {
        let grid = Grid::new(rows, cols)?;
        let scratch = vec![false; rows * cols];
        let rng = match rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            grid,
            scratch,
            generation: Generation::zero(),
            rng,
        })
    }

    /// Instantiate a world sized from a session configuration.
    pub fn from_config(config: &LifeConfig) -> Result<Self, EngineError> {
        let (rows, cols) = config.grid_dimensions()?;
        Self::new(rows, cols, config.rng_seed)
    }

    fn cell_at(&self, row: i64, col: i64) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.grid.rows() && col < self.grid.cols()).then_some((row, col))
    }
}

impl Automaton for LifeWorld {
    fn rows(&self) -> usize {
        self.grid.rows()
    }

    fn cols(&self) -> usize {
        self.grid.cols()
    }

    fn generation(&self) -> Generation {
        self.generation
    }

    fn step(&mut self) {
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.cols() {
                let idx = self.grid.offset(row, col);
                let alive = self.grid.cells[idx];
                let live = self.grid.live_neighbors(row, col);
                self.scratch[idx] = matches!((alive, live), (true, 2 | 3) | (false, 3));
            }
        }
        std::mem::swap(&mut self.grid.cells, &mut self.scratch);
        self.generation = self.generation.next();
    }

    fn randomize(&mut self, probability: f64) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::InvalidProbability(probability));
        }
        for cell in &mut self.grid.cells {
            *cell = self.rng.random_bool(probability);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.grid.fill(false);
        self.generation = Generation::zero();
    }

    fn toggle_cell(&mut self, row: usize, col: usize) {
        if let Some(alive) = self.grid.cell(row, col) {
            self.grid.set(row, col, !alive);
        }
    }

    fn stamp(&mut self, pattern: &Pattern, anchor_row: i64, anchor_col: i64) {
        for dy in 0..i64::from(pattern.size.h) {
            for dx in 0..i64::from(pattern.size.w) {
                if let Some((row, col)) = self.cell_at(anchor_row + dy, anchor_col + dx) {
                    self.grid.set(row, col, false);
                }
            }
        }
        for cell in &pattern.cells {
            if let Some((row, col)) =
                self.cell_at(anchor_row + i64::from(cell.y), anchor_col + i64::from(cell.x))
            {
                self.grid.set(row, col, true);
            }
        }
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }
}
