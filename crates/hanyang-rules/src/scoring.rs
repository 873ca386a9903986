//! Scoring engine.
//!
//! Pure functions over a game state. Ranking the same final state twice
//! yields identical output.

use hanyang_protocol::{GameId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::blueprint;
use crate::board::{Board, Position};
use crate::catalog::{Catalog, TileDefinition};
use crate::config::RulesConfig;
use crate::state::{Game, Player};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub building_points: u32,
    pub terrain_bonus: u32,
    pub adjacency_bonus: u32,
    pub blueprint_bonus: u32,
    /// Signed: negative when leftover resources are a penalty.
    pub resource_points: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRanking {
    /// 1-based and unique.
    pub rank: u32,
    pub player_id: PlayerId,
    pub name: String,
    pub breakdown: ScoreBreakdown,
    pub turns_taken: u32,
}

/// Summary returned once a game is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: GameId,
    pub winner_id: Option<PlayerId>,
    pub rankings: Vec<PlayerRanking>,
    /// Start to finish, in milliseconds.
    pub duration: u64,
    pub total_rounds: u32,
}

/// Adjacency points for a building of `def` at `position` given the
/// buildings currently around it. Owner-agnostic.
pub(crate) fn adjacency_points(
    catalog: &Catalog,
    board: &Board,
    position: Position,
    def: &TileDefinition,
) -> u32 {
    board
        .orthogonal_tiles(position)
        .filter_map(|neighbor| catalog.category(&neighbor.tile))
        .map(|category| {
            def.adjacency
                .iter()
                .filter(|rule| rule.category == category)
                .map(|rule| rule.points)
                .sum::<u32>()
        })
        .sum()
}

/// Points a building of `def` would earn if placed at `position` now:
/// base, terrain siting and adjacency to what is already there.
pub fn placement_points(
    catalog: &Catalog,
    board: &Board,
    position: Position,
    def: &TileDefinition,
) -> u32 {
    def.base_points
        + board.terrain_bonus_at(position).points(def.terrain_points)
        + adjacency_points(catalog, board, position, def)
}

pub fn breakdown(
    catalog: &Catalog,
    config: &RulesConfig,
    board: &Board,
    player: &Player,
) -> ScoreBreakdown {
    let mut b = ScoreBreakdown::default();
    for (position, placed) in board.owned_by(player.id) {
        let Some(def) = catalog.tile(&placed.tile) else {
            continue;
        };
        b.building_points += def.base_points;
        b.terrain_bonus += placed.terrain_bonus.points(def.terrain_points);
        b.adjacency_bonus += adjacency_points(catalog, board, position, def);
    }
    b.blueprint_bonus = blueprint::bonus(catalog, board, player);
    b.resource_points = config.resource_scoring.points(player.resources.total());
    b.total = i64::from(b.building_points + b.terrain_bonus + b.adjacency_bonus + b.blueprint_bonus)
        + b.resource_points;
    b
}

/// Ranks every player: total descending, then fewer turns taken, then
/// lower player id.
pub fn rank(catalog: &Catalog, config: &RulesConfig, game: &Game) -> Vec<PlayerRanking> {
    let mut rows: Vec<PlayerRanking> = game
        .players
        .iter()
        .map(|p| PlayerRanking {
            rank: 0,
            player_id: p.id,
            name: p.name.clone(),
            breakdown: breakdown(catalog, config, &game.board, p),
            turns_taken: p.turns_taken,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.breakdown
            .total
            .cmp(&a.breakdown.total)
            .then(a.turns_taken.cmp(&b.turns_taken))
            .then(a.player_id.cmp(&b.player_id))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    rows
}
