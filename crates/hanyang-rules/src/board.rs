//! The 5×5 board: terrain, placed buildings, and the workers on them.
//!
//! Row 0 is the "back" of the board and row 4 the "front". The terrain
//! bonus looks behind a cell (row − 1) for mountains and in front of it
//! (row + 1) for water.

use std::fmt;

use hanyang_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::catalog::TileId;
use crate::ledger::WorkerKind;

pub const BOARD_SIZE: usize = 5;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Normal,
    Mountain,
    Water,
}

impl Terrain {
    pub fn is_buildable(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Mountain => "mountain",
            Self::Water => "water",
        };
        f.write_str(name)
    }
}

/// Fixed terrain for every cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainLayout {
    rows: [[Terrain; BOARD_SIZE]; BOARD_SIZE],
}

impl TerrainLayout {
    pub fn new(rows: [[Terrain; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { rows }
    }

    /// Mountains along the back edge, water along the front edge.
    pub fn reference() -> Self {
        let mut rows = [[Terrain::Normal; BOARD_SIZE]; BOARD_SIZE];
        rows[0] = [Terrain::Mountain; BOARD_SIZE];
        rows[BOARD_SIZE - 1] = [Terrain::Water; BOARD_SIZE];
        Self { rows }
    }

    pub fn terrain(&self, position: Position) -> Option<Terrain> {
        self.rows
            .get(position.row as usize)
            .and_then(|row| row.get(position.col as usize))
            .copied()
    }

    pub fn buildable_cells(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|t| t.is_buildable())
            .count()
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell coordinate. Client payloads may carry any `u8`, so every
/// lookup goes through [`Position::index`], which rejects off-board
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// Row-major index, or `None` when off the board.
    pub fn index(&self) -> Option<usize> {
        self.is_on_board()
            .then(|| self.row as usize * BOARD_SIZE + self.col as usize)
    }

    /// Every on-board position, row-major.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE as u8)
            .flat_map(|row| (0..BOARD_SIZE as u8).map(move |col| Position { row, col }))
    }

    fn offset(self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let p = Position { row, col };
        p.is_on_board().then_some(p)
    }

    /// Up, down, left, right; skipping off-board cells.
    pub fn orthogonal(self) -> impl Iterator<Item = Position> {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(move |(dr, dc)| self.offset(dr, dc))
    }

    /// The three cells in the row behind (row − 1).
    fn behind(self) -> impl Iterator<Item = Position> {
        (-1..=1).filter_map(move |dc| self.offset(-1, dc))
    }

    /// The three cells in the row in front (row + 1).
    fn in_front(self) -> impl Iterator<Item = Position> {
        (-1..=1).filter_map(move |dc| self.offset(1, dc))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// TerrainBonus
// ---------------------------------------------------------------------------

/// Terrain siting of a placed building, frozen when it is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainBonus {
    #[default]
    None,
    /// Mountain behind only.
    Mountain,
    /// Water in front only.
    Water,
    /// Mountain behind and water in front.
    Full,
}

impl TerrainBonus {
    pub fn from_sides(mountain_behind: bool, water_in_front: bool) -> Self {
        match (mountain_behind, water_in_front) {
            (true, true) => Self::Full,
            (true, false) => Self::Mountain,
            (false, true) => Self::Water,
            (false, false) => Self::None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Points awarded given the tile's full terrain value. One side
    /// alone earns half, rounded down.
    pub fn points(&self, full: u32) -> u32 {
        match self {
            Self::None => 0,
            Self::Mountain | Self::Water => full / 2,
            Self::Full => full,
        }
    }
}

// ---------------------------------------------------------------------------
// Placed pieces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedWorker {
    pub player: PlayerId,
    pub kind: WorkerKind,
    pub slot: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub tile: TileId,
    pub owner: PlayerId,
    pub workers: Vec<PlacedWorker>,
    pub terrain_bonus: TerrainBonus,
    pub placed_round: u32,
}

impl PlacedTile {
    pub fn worker_in(&self, slot: u8) -> Option<&PlacedWorker> {
        self.workers.iter().find(|w| w.slot == slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Position,
    pub terrain: Terrain,
    pub tile: Option<PlacedTile>,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The board. Never resized; only the applier mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(layout: &TerrainLayout) -> Self {
        let cells = Position::all()
            .map(|position| Cell {
                position,
                terrain: layout.terrain(position).unwrap_or(Terrain::Normal),
                tile: None,
            })
            .collect();
        Self { cells }
    }

    pub fn cell(&self, position: Position) -> Option<&Cell> {
        position.index().and_then(|i| self.cells.get(i))
    }

    pub(crate) fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        position.index().and_then(|i| self.cells.get_mut(i))
    }

    pub fn tile_at(&self, position: Position) -> Option<&PlacedTile> {
        self.cell(position).and_then(|c| c.tile.as_ref())
    }

    pub(crate) fn tile_at_mut(&mut self, position: Position) -> Option<&mut PlacedTile> {
        self.cell_mut(position).and_then(|c| c.tile.as_mut())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Every placed tile with its position, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &PlacedTile)> {
        self.cells
            .iter()
            .filter_map(|c| c.tile.as_ref().map(|t| (c.position, t)))
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut PlacedTile> {
        self.cells.iter_mut().filter_map(|c| c.tile.as_mut())
    }

    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = (Position, &PlacedTile)> {
        self.tiles().filter(move |(_, t)| t.owner == player)
    }

    /// Placed tiles orthogonally adjacent to `position`.
    pub fn orthogonal_tiles(&self, position: Position) -> impl Iterator<Item = &PlacedTile> + '_ {
        position
            .orthogonal()
            .filter_map(move |p| self.tile_at(p))
    }

    /// Eight-neighbor terrain check for a building at `position`.
    pub fn terrain_bonus_at(&self, position: Position) -> TerrainBonus {
        let is = |p: Position, terrain: Terrain| self.cell(p).is_some_and(|c| c.terrain == terrain);
        let mountain = position.behind().any(|p| is(p, Terrain::Mountain));
        let water = position.in_front().any(|p| is(p, Terrain::Water));
        TerrainBonus::from_sides(mountain, water)
    }

    /// Empty cells a building may be placed on.
    pub fn open_sites(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .filter(|c| c.terrain.is_buildable() && c.tile.is_none())
            .map(|c| c.position)
    }

    pub fn placed_workers(&self, player: PlayerId, kind: WorkerKind) -> usize {
        self.tiles()
            .flat_map(|(_, t)| t.workers.iter())
            .filter(|w| w.player == player && w.kind == kind)
            .count()
    }
}
