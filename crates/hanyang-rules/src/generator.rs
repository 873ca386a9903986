//! Valid-action generator.
//!
//! Candidates are enumerated from the board and the player's hand, then
//! filtered through the same per-type checks the validator runs, so the
//! two cannot drift apart.

use hanyang_protocol::PlayerId;

use crate::action::{ActionKind, ActionType, ValidAction};
use crate::ledger::WorkerKind;
use crate::state::{Game, Player};
use crate::{Rules, RulesError};

fn worker_candidates(rules: &Rules, game: &Game, player: &Player) -> Vec<ActionKind> {
    let mut out = Vec::new();
    for (position, placed) in game.board.tiles() {
        let Some(def) = rules.catalog().tile(&placed.tile) else {
            continue;
        };
        for kind in [WorkerKind::Apprentice, WorkerKind::Official] {
            if player.workers.pool(kind).available == 0 {
                continue;
            }
            for slot in def.slots_for(kind) {
                if placed.worker_in(slot).is_some() {
                    continue;
                }
                out.push(ActionKind::PlaceWorker {
                    worker_type: kind,
                    position,
                    slot_index: slot,
                });
            }
        }
    }
    out
}

fn recall_candidates(game: &Game, player: &Player) -> Vec<ActionKind> {
    game.board
        .tiles()
        .flat_map(|(position, placed)| {
            placed
                .workers
                .iter()
                .filter(move |w| w.player == player.id && w.kind.is_recallable())
                .map(move |w| ActionKind::RecallWorker {
                    position,
                    slot_index: w.slot,
                })
        })
        .collect()
}

fn tile_candidates(rules: &Rules, game: &Game) -> Vec<ActionKind> {
    let sites: Vec<_> = game.board.open_sites().collect();
    game.market(rules.config().market_size)
        .iter()
        .flat_map(|tile_id| {
            sites.iter().map(move |position| ActionKind::PlaceTile {
                tile_id: tile_id.clone(),
                position: *position,
            })
        })
        .collect()
}

fn blueprint_candidates(player: &Player) -> Vec<ActionKind> {
    player
        .unselected_blueprints()
        .map(|id| ActionKind::SelectBlueprint {
            blueprint_id: id.clone(),
        })
        .collect()
}

/// Every legal option for `player`, grouped by action type. Empty when
/// it is not their turn or the game is not running. Groups with no
/// options are left out; `end_turn` and `pass` are always present on
/// the player's turn.
pub(crate) fn valid_actions(
    rules: &Rules,
    game: &Game,
    player: PlayerId,
) -> Result<Vec<ValidAction>, RulesError> {
    let me = game.player(player).ok_or(RulesError::PlayerNotFound(player))?;
    if !game.status.is_active() || game.current_player != player {
        return Ok(Vec::new());
    }

    let groups = [
        (ActionType::PlaceWorker, worker_candidates(rules, game, me)),
        (ActionType::RecallWorker, recall_candidates(game, me)),
        (ActionType::PlaceTile, tile_candidates(rules, game)),
        (ActionType::SelectBlueprint, blueprint_candidates(me)),
        (ActionType::EndTurn, vec![ActionKind::EndTurn]),
        (ActionType::Pass, vec![ActionKind::Pass]),
    ];

    let mut out = Vec::new();
    for (action_type, candidates) in groups {
        let options: Vec<_> = candidates
            .into_iter()
            .filter(|kind| rules.check_kind(game, me, kind).is_ok())
            .collect();
        if !options.is_empty() {
            out.push(ValidAction { action_type, options });
        }
    }
    Ok(out)
}
