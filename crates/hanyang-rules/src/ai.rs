//! AI opponents.
//!
//! A policy never invents an action: it picks one of the options the
//! valid-action generator produced for the seat, so whatever it returns
//! passes the validator unchanged.
//!
//! # Difficulties
//!
//! - **Easy** picks a random action type, then a random option of it.
//! - **Medium** selects the richest blueprint, then builds the best
//!   scoring tile it can afford, then staffs a producing building
//!   (officials first), then ends its turn.
//! - **Hard** plays like Medium but values tiles by points per resource
//!   spent and sends workers where the resource it lacks is produced.

use hanyang_protocol::PlayerId;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, ActionType, ValidAction};
use crate::blueprint;
use crate::catalog::{Catalog, TileCategory};
use crate::ledger::{Resource, Resources, WorkerKind};
use crate::scoring;
use crate::state::{Game, Player};
use crate::{Rules, RulesError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Picks the next action for `player`.
///
/// Returns `Ok(None)` when the player has nothing legal to do, which
/// only happens when it is not their turn or the game is not running.
///
/// # Errors
/// `PlayerNotFound` if `player` is not seated.
pub fn choose<R: Rng>(
    difficulty: AiDifficulty,
    rules: &Rules,
    game: &Game,
    player: PlayerId,
    rng: &mut R,
) -> Result<Option<ActionKind>, RulesError> {
    let valid = rules.valid_actions(game, player)?;
    if valid.is_empty() {
        return Ok(None);
    }
    let me = game.player(player).ok_or(RulesError::PlayerNotFound(player))?;
    let pick = match difficulty {
        AiDifficulty::Easy => random_option(&valid, rng),
        AiDifficulty::Medium => planned(rules, game, me, &valid, false),
        AiDifficulty::Hard => planned(rules, game, me, &valid, true),
    };
    Ok(Some(pick.unwrap_or(ActionKind::EndTurn)))
}

fn options(valid: &[ValidAction], action_type: ActionType) -> &[ActionKind] {
    valid
        .iter()
        .find(|v| v.action_type == action_type)
        .map(|v| v.options.as_slice())
        .unwrap_or(&[])
}

fn random_option<R: Rng>(valid: &[ValidAction], rng: &mut R) -> Option<ActionKind> {
    let groups: Vec<&ValidAction> = valid.iter().filter(|v| !v.options.is_empty()).collect();
    if groups.is_empty() {
        return None;
    }
    let group = groups[rng.random_range(0..groups.len())];
    group
        .options
        .get(rng.random_range(0..group.options.len()))
        .cloned()
}

fn planned(
    rules: &Rules,
    game: &Game,
    me: &Player,
    valid: &[ValidAction],
    hard: bool,
) -> Option<ActionKind> {
    let catalog = rules.catalog();
    if me.selected_blueprints.is_empty() {
        let opts = options(valid, ActionType::SelectBlueprint);
        if let Some(kind) = pick_blueprint(catalog, game, me, opts, hard) {
            return Some(kind);
        }
    }
    if let Some(kind) = pick_tile(catalog, game, me, options(valid, ActionType::PlaceTile), hard) {
        return Some(kind);
    }
    let need = resource_need(catalog, game, &me.resources, rules.config().market_size);
    pick_worker(catalog, game, me, &need, options(valid, ActionType::PlaceWorker), hard)
}

fn pick_blueprint(
    catalog: &Catalog,
    game: &Game,
    me: &Player,
    opts: &[ActionKind],
    hard: bool,
) -> Option<ActionKind> {
    opts.iter()
        .filter_map(|kind| match kind {
            ActionKind::SelectBlueprint { blueprint_id } => {
                let bp = catalog.blueprint(blueprint_id)?;
                let mut weight = bp.bonus_points;
                // Hard favours cards it already meets.
                if hard && blueprint::is_satisfied(&bp.condition, catalog, &game.board, me) {
                    weight *= 2;
                }
                Some((weight, kind))
            }
            _ => None,
        })
        .max_by_key(|(weight, _)| *weight)
        .map(|(_, kind)| kind.clone())
}

fn pick_tile(
    catalog: &Catalog,
    game: &Game,
    me: &Player,
    opts: &[ActionKind],
    hard: bool,
) -> Option<ActionKind> {
    opts.iter()
        .filter_map(|kind| match kind {
            ActionKind::PlaceTile { tile_id, position } => {
                let def = catalog.tile(tile_id)?;
                let points = scoring::placement_points(catalog, &game.board, *position, def);
                let weight = if hard {
                    let spent = def.cost.total().max(1);
                    let left = me.resources.total().saturating_sub(def.cost.total());
                    // Scaled by 10 to keep integer ordering.
                    points * 20 + points * 10 / spent + left
                } else {
                    points
                };
                Some((weight, kind))
            }
            _ => None,
        })
        // First best wins on ties so the choice is stable.
        .fold(None, |best: Option<(u32, &ActionKind)>, (w, k)| match best {
            Some((bw, _)) if bw >= w => best,
            _ => Some((w, k)),
        })
        .map(|(_, kind)| kind.clone())
}

/// Need for each resource: low holdings and market costs we cannot
/// cover raise it.
fn resource_need(
    catalog: &Catalog,
    game: &Game,
    held: &Resources,
    market_size: usize,
) -> Resources {
    let mut need = Resources::new(
        5u32.saturating_sub(held.wood),
        5u32.saturating_sub(held.stone),
        4u32.saturating_sub(held.tile),
        3u32.saturating_sub(held.ink),
    );
    for def in game.market(market_size).iter().filter_map(|id| catalog.tile(id)) {
        if def.cost.wood > held.wood {
            need.wood += 2;
        }
        if def.cost.stone > held.stone {
            need.stone += 2;
        }
        if def.cost.tile > held.tile {
            need.tile += 2;
        }
        if def.cost.ink > held.ink {
            need.ink += 2;
        }
    }
    need
}

fn pick_worker(
    catalog: &Catalog,
    game: &Game,
    me: &Player,
    need: &Resources,
    opts: &[ActionKind],
    hard: bool,
) -> Option<ActionKind> {
    let producing = |kind: &&ActionKind| match kind {
        ActionKind::PlaceWorker { position, .. } => game
            .board
            .tile_at(*position)
            .and_then(|t| catalog.category(&t.tile))
            .and_then(|c: TileCategory| c.produces())
            .is_some(),
        _ => false,
    };
    let of_kind = |wanted: WorkerKind| {
        opts.iter().filter(producing).filter(move |k| {
            matches!(k, ActionKind::PlaceWorker { worker_type, .. } if *worker_type == wanted)
        })
    };

    let scarcest = me.resources.scarcest();
    for wanted in [WorkerKind::Official, WorkerKind::Apprentice] {
        if !hard {
            if let Some(kind) = of_kind(wanted).next() {
                return Some(kind.clone());
            }
            continue;
        }
        let best = of_kind(wanted)
            .filter_map(|kind| {
                let ActionKind::PlaceWorker { position, .. } = kind else {
                    return None;
                };
                let placed = game.board.tile_at(*position)?;
                let resource: Resource = catalog.category(&placed.tile)?.produces()?;
                let own = if placed.owner == me.id { 10 } else { 0 };
                let scarce = if resource == scarcest { 6 } else { 0 };
                Some((need.get(resource) + own + scarce, kind))
            })
            .fold(None, |best: Option<(u32, &ActionKind)>, (w, k)| match best {
                Some((bw, _)) if bw >= w => best,
                _ => Some((w, k)),
            });
        if let Some((_, kind)) = best {
            return Some(kind.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use crate::catalog::TileId;
    use crate::state::Seat;
    use hanyang_protocol::GameId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn started() -> (Rules, Game) {
        let rules = Rules::reference();
        let game = rules
            .new_game(
                GameId(1),
                vec![
                    Seat::ai(1, "easy", AiDifficulty::Easy),
                    Seat::ai(2, "hard", AiDifficulty::Hard),
                ],
                0,
            )
            .unwrap();
        let game = rules.start(&game, 11, 0).unwrap();
        (rules, game)
    }

    #[test]
    fn test_difficulty_json() {
        assert_eq!(serde_json::to_value(AiDifficulty::Hard).unwrap(), "hard");
        assert_eq!(AiDifficulty::default(), AiDifficulty::Medium);
    }

    #[test]
    fn test_medium_selects_richest_blueprint_first() {
        let (rules, game) = started();
        let mut rng = StdRng::seed_from_u64(1);
        let me = game.current_player;
        let choice = choose(AiDifficulty::Medium, &rules, &game, me, &mut rng).unwrap().unwrap();
        let ActionKind::SelectBlueprint { blueprint_id } = choice else {
            panic!("expected a blueprint selection, got {choice:?}");
        };
        let best = game
            .player(me)
            .unwrap()
            .dealt_blueprints
            .iter()
            .filter_map(|id| rules.catalog().blueprint(id))
            .map(|bp| bp.bonus_points)
            .max()
            .unwrap();
        assert_eq!(rules.catalog().blueprint(&blueprint_id).unwrap().bonus_points, best);
    }

    #[test]
    fn test_every_choice_is_valid() {
        let (rules, game) = started();
        let mut rng = StdRng::seed_from_u64(5);
        for difficulty in [AiDifficulty::Easy, AiDifficulty::Medium, AiDifficulty::Hard] {
            for _ in 0..20 {
                let kind = choose(difficulty, &rules, &game, game.current_player, &mut rng)
                    .unwrap()
                    .unwrap();
                let action = crate::Action::new(game.current_player, kind, 1);
                assert!(rules.validate(&game, &action).is_ok());
            }
        }
    }

    #[test]
    fn test_off_turn_player_gets_nothing() {
        let (rules, game) = started();
        let mut rng = StdRng::seed_from_u64(1);
        let other = game.turn_order[1];
        assert_eq!(choose(AiDifficulty::Hard, &rules, &game, other, &mut rng).unwrap(), None);
    }

    #[test]
    fn test_medium_builds_when_it_can_afford() {
        let (rules, mut game) = started();
        let me = game.current_player;
        // Blueprint already chosen, enough to buy anything in the market.
        let p = game.player_mut(me).unwrap();
        p.selected_blueprints = vec![p.dealt_blueprints[0].clone()];
        p.resources = Resources::new(3, 3, 2, 1);
        game.draw_pool.retain(|t| t.0 != "palace_1");
        game.draw_pool.insert(0, TileId::from("palace_1"));
        let mut rng = StdRng::seed_from_u64(1);
        let choice = choose(AiDifficulty::Medium, &rules, &game, me, &mut rng).unwrap().unwrap();
        match choice {
            ActionKind::PlaceTile { tile_id, position } => {
                assert_eq!(tile_id, TileId::from("palace_1"));
                // Terrain siting makes row 1 or 3 beat row 2.
                assert!(position.row == 1 || position.row == 3, "{position}");
                assert_ne!(position, Position::new(2, 2));
            }
            other => panic!("expected a tile placement, got {other:?}"),
        }
    }

    #[test]
    fn test_hard_worker_goes_to_scarcest_resource() {
        use crate::board::{PlacedTile, TerrainBonus};
        let (rules, mut game) = started();
        let me = game.current_player;
        let other = game.turn_order[1];
        let house = Position::new(1, 1);
        let office = Position::new(1, 3);
        for (position, id) in [(house, "residential_1"), (office, "government_1")] {
            game.board.cell_mut(position).unwrap().tile = Some(PlacedTile {
                tile: TileId::from(id),
                owner: other,
                workers: Vec::new(),
                terrain_bonus: TerrainBonus::None,
                placed_round: 1,
            });
        }
        game.player_mut(me).unwrap().resources = Resources::new(3, 3, 3, 0);
        let me = game.player(me).unwrap();
        let opts: Vec<_> = [house, office]
            .into_iter()
            .map(|position| ActionKind::PlaceWorker {
                worker_type: WorkerKind::Official,
                position,
                slot_index: 0,
            })
            .collect();
        let flat = Resources::default();

        let hard = pick_worker(rules.catalog(), &game, me, &flat, &opts, true).unwrap();
        assert!(matches!(hard, ActionKind::PlaceWorker { position, .. } if position == office));
        let medium = pick_worker(rules.catalog(), &game, me, &flat, &opts, false).unwrap();
        assert!(matches!(medium, ActionKind::PlaceWorker { position, .. } if position == house));
    }
}
