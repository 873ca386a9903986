//! Structural invariants of a game state.
//!
//! The applier runs these after every mutation. A non-empty result means
//! the rules code has a bug; the mutation is discarded and reported as
//! `RulesError::InvariantViolation`. Property tests call them directly.

use std::collections::HashSet;
use std::fmt;

use crate::catalog::{Catalog, TileId};
use crate::config::RulesConfig;
use crate::ledger::WorkerKind;
use crate::state::Game;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub message: String,
}

impl InvariantViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Checks every structural invariant. Empty when all hold.
#[must_use]
pub fn check_invariants(
    catalog: &Catalog,
    config: &RulesConfig,
    game: &Game,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    check_players(config, game, &mut violations);
    check_slots(catalog, game, &mut violations);
    check_tile_uniqueness(catalog, game, &mut violations);

    if !game.turn_order.contains(&game.current_player) {
        violations.push(InvariantViolation::new(format!(
            "current player {} is not seated",
            game.current_player
        )));
    }
    violations
}

fn check_players(config: &RulesConfig, game: &Game, out: &mut Vec<InvariantViolation>) {
    for player in &game.players {
        for kind in WorkerKind::ALL {
            let pool = player.workers.pool(kind);
            if !pool.is_consistent() {
                out.push(InvariantViolation::new(format!(
                    "{} {kind} pool: available {} + placed {} != total {}",
                    player.id, pool.available, pool.placed, pool.total
                )));
            }
            let on_board = game.board.placed_workers(player.id, kind);
            if on_board != pool.placed as usize {
                out.push(InvariantViolation::new(format!(
                    "{} has {} {kind}s marked placed but {on_board} on the board",
                    player.id, pool.placed
                )));
            }
        }

        if let Some(resource) = player.resources.first_over(&config.resource_caps) {
            out.push(InvariantViolation::new(format!(
                "{} holds {} {resource}, above the cap of {}",
                player.id,
                player.resources.get(resource),
                config.resource_caps.get(resource)
            )));
        }

        let mut listed: Vec<_> = player.placed_tiles.clone();
        listed.sort();
        let on_board: Vec<_> = game.board.owned_by(player.id).map(|(p, _)| p).collect();
        if listed != on_board {
            out.push(InvariantViolation::new(format!(
                "{} lists buildings at {listed:?} but owns {on_board:?}",
                player.id
            )));
        }
    }
}

fn check_slots(catalog: &Catalog, game: &Game, out: &mut Vec<InvariantViolation>) {
    for (position, placed) in game.board.tiles() {
        let Some(def) = catalog.tile(&placed.tile) else {
            continue;
        };
        let mut seen = HashSet::new();
        for worker in &placed.workers {
            if !seen.insert(worker.slot) {
                out.push(InvariantViolation::new(format!(
                    "slot {} at {position} holds two workers",
                    worker.slot
                )));
            }
            if def.slot_kind(worker.slot) != Some(worker.kind) {
                out.push(InvariantViolation::new(format!(
                    "{} in slot {} at {position} does not fit {}",
                    worker.kind, worker.slot, def.id
                )));
            }
        }
    }
}

fn check_tile_uniqueness(catalog: &Catalog, game: &Game, out: &mut Vec<InvariantViolation>) {
    let mut seen: HashSet<&TileId> = HashSet::new();
    let everywhere = game
        .board
        .tiles()
        .map(|(_, t)| &t.tile)
        .chain(game.draw_pool.iter())
        .chain(game.discard_pile.iter());
    for id in everywhere {
        if !seen.insert(id) {
            out.push(InvariantViolation::new(format!("tile {id} appears more than once")));
        }
        if catalog.tile(id).is_none() {
            out.push(InvariantViolation::new(format!("tile {id} is not in the catalog")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rules;
    use crate::board::{PlacedTile, PlacedWorker, Position, TerrainBonus};
    use crate::state::Seat;
    use hanyang_protocol::{GameId, PlayerId};

    fn started() -> (Rules, Game) {
        let rules = Rules::reference();
        let game = rules
            .new_game(GameId(1), vec![Seat::human(1, "a"), Seat::human(2, "b")], 0)
            .unwrap();
        let game = rules.start(&game, 7, 0).unwrap();
        (rules, game)
    }

    #[test]
    fn test_fresh_game_has_no_violations() {
        let (rules, game) = started();
        assert!(check_invariants(rules.catalog(), rules.config(), &game).is_empty());
    }

    #[test]
    fn test_detects_pool_mismatch() {
        let (rules, mut game) = started();
        game.players[0].workers.apprentices.available -= 1;
        let v = check_invariants(rules.catalog(), rules.config(), &game);
        assert!(v.iter().any(|v| v.message.contains("apprentice pool")));
    }

    #[test]
    fn test_detects_duplicate_tile() {
        let (rules, mut game) = started();
        let dup = game.draw_pool[0].clone();
        game.discard_pile.push(dup);
        let v = check_invariants(rules.catalog(), rules.config(), &game);
        assert!(v.iter().any(|v| v.message.contains("more than once")));
    }

    #[test]
    fn test_detects_worker_in_wrong_slot_kind() {
        let (rules, mut game) = started();
        let tile = game.draw_pool.remove(0);
        let owner = game.players[0].id;
        if let Some(cell) = game.board.cell_mut(Position::new(2, 2)) {
            cell.tile = Some(PlacedTile {
                tile,
                owner,
                // Slot 0 is always an apprentice slot.
                workers: vec![PlacedWorker {
                    player: owner,
                    kind: WorkerKind::Official,
                    slot: 0,
                }],
                terrain_bonus: TerrainBonus::None,
                placed_round: 1,
            });
        }
        game.players[0].placed_tiles.push(Position::new(2, 2));
        game.players[0].workers.officials.try_place();
        let v = check_invariants(rules.catalog(), rules.config(), &game);
        assert_eq!(v.len(), 1, "{v:?}");
        assert!(v[0].message.contains("does not fit"));
    }

    #[test]
    fn test_detects_unseated_current_player() {
        let (rules, mut game) = started();
        game.current_player = PlayerId(99);
        let v = check_invariants(rules.catalog(), rules.config(), &game);
        assert_eq!(v.len(), 1);
    }
}
