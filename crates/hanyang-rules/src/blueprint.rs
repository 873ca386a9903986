//! Blueprint condition evaluation.
//!
//! Conditions look at the owner's buildings on the final board. Palaces
//! count regardless of who built them.

use std::collections::{HashSet, VecDeque};

use crate::board::{BOARD_SIZE, Board, Position};
use crate::catalog::{BlueprintCondition, Catalog, TileCategory};
use crate::state::Player;

/// Own buildings as (position, category).
fn owned(catalog: &Catalog, board: &Board, player: &Player) -> Vec<(Position, TileCategory)> {
    board
        .owned_by(player.id)
        .filter_map(|(pos, t)| catalog.category(&t.tile).map(|c| (pos, c)))
        .collect()
}

fn palaces(catalog: &Catalog, board: &Board) -> Vec<Position> {
    board
        .tiles()
        .filter(|(_, t)| catalog.category(&t.tile) == Some(TileCategory::Palace))
        .map(|(pos, _)| pos)
        .collect()
}

fn near_palace(catalog: &Catalog, board: &Board) -> HashSet<Position> {
    palaces(catalog, board)
        .into_iter()
        .flat_map(Position::orthogonal)
        .collect()
}

fn longest_run(mine: &HashSet<Position>, start: (i32, i32), step: (i32, i32)) -> usize {
    let (mut r, mut c) = start;
    let (mut run, mut best) = (0, 0);
    let size = BOARD_SIZE as i32;
    while (0..size).contains(&r) && (0..size).contains(&c) {
        if mine.contains(&Position::new(r as u8, c as u8)) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
        r += step.0;
        c += step.1;
    }
    best
}

fn longest_diagonal(mine: &HashSet<Position>) -> usize {
    let last = BOARD_SIZE as i32 - 1;
    (0..BOARD_SIZE as i32)
        .flat_map(|i| {
            [
                longest_run(mine, (0, i), (1, 1)),
                longest_run(mine, (i, 0), (1, 1)),
                longest_run(mine, (0, i), (1, -1)),
                longest_run(mine, (i, last), (1, -1)),
            ]
        })
        .max()
        .unwrap_or(0)
}

fn is_connected(mine: &HashSet<Position>) -> bool {
    let Some(first) = mine.iter().next().copied() else {
        return true;
    };
    let mut seen = HashSet::from([first]);
    let mut queue = VecDeque::from([first]);
    while let Some(pos) = queue.pop_front() {
        for next in pos.orthogonal() {
            if mine.contains(&next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen.len() == mine.len()
}

/// Whether `player` meets `condition` on `board`.
pub fn is_satisfied(
    condition: &BlueprintCondition,
    catalog: &Catalog,
    board: &Board,
    player: &Player,
) -> bool {
    use BlueprintCondition::*;

    let tiles = owned(catalog, board, player);
    let mine: HashSet<Position> = tiles.iter().map(|(p, _)| *p).collect();
    let count_of = |category: TileCategory| tiles.iter().filter(|(_, c)| *c == category).count();

    match condition {
        PalaceAdjacent { min_count } => {
            let near = near_palace(catalog, board);
            mine.iter().filter(|p| near.contains(p)).count() >= *min_count
        }
        PalaceSurround { directions } => palaces(catalog, board)
            .into_iter()
            .any(|palace| palace.orthogonal().filter(|p| mine.contains(p)).count() >= *directions),
        PalaceAdjacentCategory { category, min_count } => {
            let near = near_palace(catalog, board);
            tiles
                .iter()
                .filter(|(p, c)| c == category && near.contains(p))
                .count()
                >= *min_count
        }
        CategoryCount { category, min_count } => count_of(*category) >= *min_count,
        DiverseCategories { min_types } => {
            tiles.iter().map(|(_, c)| *c).collect::<HashSet<_>>().len() >= *min_types
        }
        RowCount { min_count } => (0..BOARD_SIZE as u8)
            .any(|row| mine.iter().filter(|p| p.row == row).count() >= *min_count),
        ColumnCount { min_count } => (0..BOARD_SIZE as u8)
            .any(|col| mine.iter().filter(|p| p.col == col).count() >= *min_count),
        DiagonalRun { min_count } => longest_diagonal(&mine) >= *min_count,
        Cluster2x2 => mine.iter().any(|p| {
            [(0, 1), (1, 0), (1, 1)]
                .into_iter()
                .all(|(dr, dc)| mine.contains(&Position::new(p.row + dr, p.col + dc)))
        }),
        CornerCount { min_count } => {
            let last = BOARD_SIZE as u8 - 1;
            [(0, 0), (0, last), (last, 0), (last, last)]
                .into_iter()
                .filter(|(r, c)| mine.contains(&Position::new(*r, *c)))
                .count()
                >= *min_count
        }
        CenterCount { min_count } => {
            let lo = (BOARD_SIZE as u8 - 3) / 2;
            let center = lo..lo + 3;
            mine.iter()
                .filter(|p| center.contains(&p.row) && center.contains(&p.col))
                .count()
                >= *min_count
        }
        TerrainBonusCount { min_count } => {
            board
                .owned_by(player.id)
                .filter(|(_, t)| t.terrain_bonus.is_active())
                .count()
                >= *min_count
        }
        AllWorkersPlaced => player.workers.all_placed(),
        ResourcesAtMost { max_total } => player.resources.total() <= *max_total,
        AllConnected => is_connected(&mine),
        TileCount { min_count } => tiles.len() >= *min_count,
        BalancedCategories {
            categories,
            min_each,
        } => categories.iter().all(|c| count_of(*c) >= *min_each),
    }
}

/// Sum of bonus points over the player's selected blueprints that are
/// satisfied. Unknown ids score nothing.
pub fn bonus(catalog: &Catalog, board: &Board, player: &Player) -> u32 {
    player
        .selected_blueprints
        .iter()
        .filter_map(|id| catalog.blueprint(id))
        .filter(|bp| is_satisfied(&bp.condition, catalog, board, player))
        .map(|bp| bp.bonus_points)
        .sum()
}
