//! Scenario tests driving the engine through its public API.

use std::sync::Arc;

use hanyang_protocol::{GameId, PlayerId};
use hanyang_rules::{
    Action, ActionKind, ApprenticeRecall, Catalog, Effect, Game, GameStatus, Illegal, Position,
    Resources, Rules, RulesConfig, RulesError, Seat, Terrain, TerrainBonus, TerrainLayout, TileId,
    WorkerKind,
};

// =========================================================================
// Helpers
// =========================================================================

fn seats(n: u64) -> Vec<Seat> {
    (1..=n).map(|i| Seat::human(i, format!("player-{i}"))).collect()
}

fn start(rules: &Rules, players: u64) -> Game {
    let game = rules.new_game(GameId(1), seats(players), 1_000).unwrap();
    rules.start(&game, 2024, 2_000).unwrap()
}

fn rules_with(config: RulesConfig) -> Rules {
    Rules::new(Arc::new(Catalog::reference()), config).unwrap()
}

fn act(player: u64, kind: ActionKind) -> Action {
    Action::new(PlayerId(player), kind, 5_000)
}

fn apply(rules: &Rules, game: &Game, player: u64, kind: ActionKind) -> Game {
    rules.apply(game, act(player, kind)).unwrap().state
}

fn to_market(game: &mut Game, tile: &str) {
    let id = TileId::from(tile);
    game.draw_pool.retain(|t| *t != id);
    game.draw_pool.insert(0, id);
}

fn build(tile: &str, row: u8, col: u8) -> ActionKind {
    ActionKind::PlaceTile {
        tile_id: TileId::from(tile),
        position: Position::new(row, col),
    }
}

// =========================================================================
// Placement
// =========================================================================

#[test]
fn test_exact_cost_placement_empties_ledger_and_pool_entry() {
    let rules = Rules::reference();
    let mut game = start(&rules, 2);
    to_market(&mut game, "palace_1");
    game.players[0].resources = Resources::new(3, 3, 2, 1);

    let applied = rules.apply(&game, act(1, build("palace_1", 2, 2))).unwrap();

    assert_eq!(applied.state.players[0].resources, Resources::new(0, 0, 0, 0));
    assert!(!applied.state.draw_pool.contains(&TileId::from("palace_1")));
    assert_eq!(applied.state.draw_pool.len(), 35);
    assert!(applied.effects.iter().any(|e| matches!(
        e,
        Effect::TilePlaced { paid, .. } if *paid == Resources::new(3, 3, 2, 1)
    )));
}

#[test]
fn test_terrain_bonus_by_row_on_reference_layout() {
    let rules = Rules::reference();
    let mut game = start(&rules, 2);
    for tile in ["commercial_1", "commercial_2", "commercial_5"] {
        to_market(&mut game, tile);
    }
    game.players[0].resources = Resources::new(10, 10, 0, 0);

    let game = apply(&rules, &game, 1, build("commercial_5", 1, 0));
    let game = apply(&rules, &game, 1, build("commercial_2", 3, 4));
    let game = apply(&rules, &game, 1, build("commercial_1", 2, 2));

    let bonus = |row, col| game.board.tile_at(Position::new(row, col)).unwrap().terrain_bonus;
    assert_eq!(bonus(1, 0), TerrainBonus::Mountain);
    assert_eq!(bonus(3, 4), TerrainBonus::Water);
    assert_eq!(bonus(2, 2), TerrainBonus::None);
    assert!(bonus(1, 0).is_active());
    assert!(bonus(3, 4).is_active());
    assert!(!bonus(2, 2).is_active());
}

#[test]
fn test_full_terrain_bonus_needs_both_sides() {
    use Terrain::{Mountain as M, Normal as N, Water as W};
    let layout = TerrainLayout::new([
        [M, M, M, M, M],
        [N, N, N, N, N],
        [W, W, W, W, W],
        [N, N, N, N, N],
        [N, N, N, N, N],
    ]);
    let reference = Catalog::reference();
    let catalog =
        Catalog::new(reference.tiles().to_vec(), reference.blueprints().to_vec(), layout).unwrap();
    let rules = Rules::new(Arc::new(catalog), RulesConfig::default()).unwrap();
    let mut game = start(&rules, 2);
    to_market(&mut game, "palace_1");
    game.players[0].resources = Resources::new(3, 3, 2, 1);

    let game = apply(&rules, &game, 1, build("palace_1", 1, 2));
    let placed = game.board.tile_at(Position::new(1, 2)).unwrap();
    assert_eq!(placed.terrain_bonus, TerrainBonus::Full);
    // Full siting earns all 4 terrain points on top of the base 8.
    assert_eq!(game.players[0].score, 12);
}

// =========================================================================
// Turn order and game end
// =========================================================================

#[test]
fn test_end_turn_out_of_turn_is_illegal() {
    let rules = Rules::reference();
    let game = start(&rules, 3);
    let err = rules.apply(&game, act(2, ActionKind::EndTurn)).unwrap_err();
    assert!(matches!(err, RulesError::IllegalAction(Illegal::NotYourTurn { .. })));
    assert_eq!(err.code(), hanyang_protocol::ErrorCode::IllegalAction);
}

#[test]
fn test_turn_pointer_wraps_and_counts_rounds() {
    let rules = Rules::reference();
    let game = start(&rules, 3);
    let game = apply(&rules, &game, 1, ActionKind::EndTurn);
    assert_eq!(game.current_player, PlayerId(2));
    let game = apply(&rules, &game, 2, ActionKind::Pass);
    let applied = rules.apply(&game, act(3, ActionKind::EndTurn)).unwrap();
    assert_eq!(applied.state.current_player, PlayerId(1));
    assert_eq!(applied.state.current_round, 2);
    assert!(applied.effects.contains(&Effect::RoundChanged { round: 2 }));
    // One market tile rotates out per round.
    assert_eq!(applied.state.discard_pile.len(), 1);
    assert_eq!(applied.state.draw_pool.len(), 35);
}

#[test]
fn test_last_end_turn_of_final_round_finishes_the_game() {
    let rules = rules_with(RulesConfig {
        total_rounds: 2,
        ..RulesConfig::default()
    });
    let mut game = start(&rules, 2);
    for _ in 0..2 {
        game = apply(&rules, &game, 1, ActionKind::EndTurn);
        assert_eq!(game.status, GameStatus::InProgress);
        game = apply(&rules, &game, 2, ActionKind::EndTurn);
    }
    assert_eq!(game.status, GameStatus::Finished);
    assert!(game.finished_at.is_some());

    for player in [1, 2] {
        let err = rules.apply(&game, act(player, ActionKind::Pass)).unwrap_err();
        assert!(matches!(
            err,
            RulesError::IllegalAction(Illegal::GameNotInProgress(GameStatus::Finished))
        ));
    }
    assert!(rules.valid_actions(&game, PlayerId(1)).unwrap().is_empty());

    let result = rules.result(&game).unwrap();
    assert_eq!(result.total_rounds, 2);
    assert_eq!(result.rankings.len(), 2);
    assert_eq!(result.duration, 3_000);
    assert_eq!(Some(result.rankings.clone()), game.rankings);
    // Score is a pure function of the final state.
    assert_eq!(rules.score(&game), rules.score(&game));
    assert_eq!(rules.score(&game), result.rankings);
}

#[test]
fn test_empty_pool_ends_game_at_turn_boundary() {
    let reference = Catalog::reference();
    let tiles = reference.tiles()[..3].to_vec();
    let catalog =
        Catalog::new(tiles, reference.blueprints().to_vec(), TerrainLayout::reference()).unwrap();
    let rules = Rules::new(
        Arc::new(catalog),
        RulesConfig {
            discard_per_round: 3,
            ..RulesConfig::default()
        },
    )
    .unwrap();
    let game = start(&rules, 2);
    let game = apply(&rules, &game, 1, ActionKind::EndTurn);
    let applied = rules.apply(&game, act(2, ActionKind::EndTurn)).unwrap();
    assert!(applied.state.draw_pool.is_empty());
    assert_eq!(applied.state.status, GameStatus::Finished);
    assert!(applied.effects.iter().any(|e| matches!(e, Effect::GameEnded { .. })));
}

#[test]
fn test_tied_totals_rank_lower_id_first() {
    let rules = rules_with(RulesConfig {
        total_rounds: 1,
        ..RulesConfig::default()
    });
    let game = start(&rules, 3);
    let game = apply(&rules, &game, 1, ActionKind::Pass);
    let game = apply(&rules, &game, 2, ActionKind::Pass);
    let game = apply(&rules, &game, 3, ActionKind::Pass);
    let result = rules.result(&game).unwrap();
    let order: Vec<_> = result.rankings.iter().map(|r| (r.rank, r.player_id)).collect();
    assert_eq!(order, vec![(1, PlayerId(1)), (2, PlayerId(2)), (3, PlayerId(3))]);
    assert_eq!(result.winner_id, Some(PlayerId(1)));
    // Starting resources of 4 cost one point under the default penalty.
    assert!(result.rankings.iter().all(|r| r.breakdown.total == -1));
}

// =========================================================================
// Apprentice recall policies
// =========================================================================

/// P1 builds a commercial building and ends; P2 sends an apprentice to
/// it and ends, wrapping the round.
fn apprentice_on_foreign_building(rules: &Rules) -> Game {
    let mut game = start(rules, 2);
    to_market(&mut game, "commercial_1");
    let game = apply(rules, &game, 1, build("commercial_1", 2, 2));
    let game = apply(rules, &game, 1, ActionKind::EndTurn);
    let game = apply(
        rules,
        &game,
        2,
        ActionKind::PlaceWorker {
            worker_type: WorkerKind::Apprentice,
            position: Position::new(2, 2),
            slot_index: 0,
        },
    );
    assert_eq!(game.players[1].workers.apprentices.placed, 1);
    apply(rules, &game, 2, ActionKind::EndTurn)
}

#[test]
fn test_round_end_recall_returns_apprentices_at_wrap() {
    let rules = rules_with(RulesConfig {
        apprentice_recall: ApprenticeRecall::RoundEnd,
        ..RulesConfig::default()
    });
    let game = apprentice_on_foreign_building(&rules);
    assert_eq!(game.current_round, 2);
    let pool = game.players[1].workers.apprentices;
    assert_eq!((pool.available, pool.placed), (3, 0));
    assert!(game.board.tile_at(Position::new(2, 2)).unwrap().workers.is_empty());
    // P2 still collected a stone before the wrap.
    assert_eq!(game.players[1].resources.stone, 3);
}

#[test]
fn test_owner_turn_start_recall_waits_for_owner() {
    let rules = rules_with(RulesConfig {
        apprentice_recall: ApprenticeRecall::OwnerTurnStart,
        ..RulesConfig::default()
    });
    let game = apprentice_on_foreign_building(&rules);
    assert_eq!(game.current_player, PlayerId(1));
    assert_eq!(game.players[1].workers.apprentices.placed, 1);

    let applied = rules.apply(&game, act(1, ActionKind::EndTurn)).unwrap();
    assert!(applied.effects.contains(&Effect::ApprenticesRecalled {
        player: PlayerId(2),
        count: 1
    }));
    let pool = applied.state.players[1].workers.apprentices;
    assert_eq!((pool.available, pool.placed), (3, 0));
}

#[test]
fn test_officials_are_never_recalled() {
    let rules = Rules::reference();
    let mut game = start(&rules, 2);
    to_market(&mut game, "commercial_1");
    let game = apply(&rules, &game, 1, build("commercial_1", 2, 2));
    let mut game = apply(
        &rules,
        &game,
        1,
        ActionKind::PlaceWorker {
            worker_type: WorkerKind::Official,
            position: Position::new(2, 2),
            slot_index: 2,
        },
    );
    for _ in 0..2 {
        game = apply(&rules, &game, 1, ActionKind::EndTurn);
        game = apply(&rules, &game, 2, ActionKind::EndTurn);
    }
    assert_eq!(game.players[0].workers.officials.placed, 1);
    // Two productions of 2 stone each, on top of the 1 left after building.
    assert_eq!(game.players[0].resources.stone, 5);
}

#[test]
fn test_production_is_capped() {
    let rules = Rules::reference();
    let mut game = start(&rules, 2);
    to_market(&mut game, "government_6");
    let game = apply(&rules, &game, 1, build("government_6", 2, 2));
    let mut game = apply(
        &rules,
        &game,
        1,
        ActionKind::PlaceWorker {
            worker_type: WorkerKind::Official,
            position: Position::new(2, 2),
            slot_index: 2,
        },
    );
    game.players[0].resources.ink = 3;
    let game = apply(&rules, &game, 1, ActionKind::EndTurn);
    assert_eq!(game.players[0].resources.ink, 4);
}

// =========================================================================
// Replay
// =========================================================================

#[test]
fn test_replay_rebuilds_live_state() {
    let rules = Rules::reference();
    let initial = start(&rules, 2);
    let mut game = initial.clone();
    let mut log = Vec::new();

    let first_pick = game.players[0].dealt_blueprints[0].clone();
    let script = vec![
        (
            1,
            ActionKind::SelectBlueprint {
                blueprint_id: first_pick,
            },
        ),
        (1, ActionKind::EndTurn),
        (2, ActionKind::Pass),
        (1, ActionKind::EndTurn),
    ];
    for (player, kind) in script {
        let applied = rules.apply(&game, act(player, kind)).unwrap();
        log.push(applied.action);
        game = applied.state;
    }

    let rebuilt = rules.replay(&initial, &log).unwrap();
    assert_eq!(rebuilt, game);
    assert_eq!(log.iter().map(|a| a.id.0).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(log[3].round, 2);
}
