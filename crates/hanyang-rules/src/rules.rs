//! The rules engine entry point.
//!
//! [`Rules`] bundles the read-only catalog with a validated
//! [`RulesConfig`]. Every operation takes a `&Game` and, when it
//! changes anything, returns a new `Game`: the input is never mutated,
//! so a rejected action leaves the caller's state exactly as it was.
//!
//! ```text
//! new_game ──► start ──► apply ──► apply ──► … ──► finished
//!                          │
//!                          ├─ validate (preconditions, no mutation)
//!                          ├─ mutate a clone
//!                          └─ check invariants, then hand it back
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use hanyang_protocol::{ActionId, GameId, PlayerId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::action::{Action, ActionKind, ActionOrigin, Effect, RecordedAction, ValidAction};
use crate::board::{Board, PlacedTile, PlacedWorker, Position};
use crate::catalog::{BlueprintId, Catalog, TileId};
use crate::config::RulesConfig;
use crate::error::{Illegal, RulesError};
use crate::ledger::{WorkerKind, Workers};
use crate::scoring::{self, GameResult, PlayerRanking};
use crate::state::{Game, GameStatus, Player, Seat};
use crate::{generator, invariants, turn};

/// Outcome of a successful [`Rules::apply`].
#[derive(Debug, Clone)]
pub struct Applied {
    /// The next state. Already checked against every invariant.
    pub state: Game,
    /// The log entry for the action, with its assigned id and round.
    pub action: RecordedAction,
    /// What changed, in the order it happened. Turn and round changes
    /// come after the action's own effects.
    pub effects: Vec<Effect>,
}

/// A ruleset: master data plus a validated config. Stateless, so one
/// instance is shared by every game that plays under it.
#[derive(Debug, Clone)]
pub struct Rules {
    /// Tiles, blueprints and terrain. Shared, never mutated.
    catalog: Arc<Catalog>,
    /// Passed [`RulesConfig::validated`] on construction.
    config: RulesConfig,
}

impl Rules {
    /// Builds a ruleset from a catalog and a config.
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation.
    pub fn new(catalog: Arc<Catalog>, config: RulesConfig) -> Result<Self, RulesError> {
        Ok(Self {
            catalog,
            config: config.validated()?,
        })
    }

    /// Reference catalog with the default config.
    pub fn reference() -> Self {
        Self {
            catalog: Arc::new(Catalog::reference()),
            config: RulesConfig::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Creates a waiting game with an empty board and seeded ledgers.
    /// Turn order follows the order of `seats`.
    ///
    /// # Errors
    /// `InvalidConfig` for a seat count outside the configured range or
    /// duplicate player ids.
    pub fn new_game(&self, id: GameId, seats: Vec<Seat>, now: u64) -> Result<Game, RulesError> {
        let (min, max) = (self.config.min_seats, self.config.max_seats);
        if !(min..=max).contains(&seats.len()) {
            return Err(RulesError::InvalidConfig(format!(
                "{} seats given, need {min} to {max}",
                seats.len()
            )));
        }
        let mut ids = HashSet::new();
        if let Some(dup) = seats.iter().find(|s| !ids.insert(s.id)) {
            return Err(RulesError::InvalidConfig(format!("{} is seated twice", dup.id)));
        }

        let turn_order: Vec<PlayerId> = seats.iter().map(|s| s.id).collect();
        let players = seats
            .into_iter()
            .enumerate()
            .map(|(turn_index, seat)| Player {
                id: seat.id,
                name: seat.name,
                controller: seat.controller,
                turn_index,
                resources: self.config.starting_resources,
                workers: Workers::new(
                    self.config.starting_apprentices,
                    self.config.starting_officials,
                ),
                placed_tiles: Vec::new(),
                dealt_blueprints: Vec::new(),
                selected_blueprints: Vec::new(),
                score: 0,
                turns_taken: 0,
            })
            .collect();

        Ok(Game {
            id,
            status: GameStatus::Waiting,
            current_round: 0,
            total_rounds: self.config.total_rounds,
            current_player: turn_order[0],
            turn_order,
            board: Board::new(self.catalog.layout()),
            players,
            draw_pool: Vec::new(),
            discard_pile: Vec::new(),
            last_action: None,
            action_count: 0,
            created_at: now,
            started_at: None,
            updated_at: now,
            finished_at: None,
            rankings: None,
        })
    }

    /// Shuffles the draw pool, deals blueprints and hands the first turn
    /// to the first seat. The same seed always produces the same game.
    ///
    /// # Errors
    /// - `IllegalAction` unless the game is waiting.
    /// - `InvalidConfig` if the catalog cannot deal a full hand to every
    ///   seat.
    pub fn start(&self, game: &Game, seed: u64, now: u64) -> Result<Game, RulesError> {
        if !game.status.can_transition_to(GameStatus::InProgress) {
            return Err(Illegal::AlreadyStarted(game.status).into());
        }
        let hand = self.config.blueprint_hand_size;
        let needed = hand * game.players.len();
        if needed > self.catalog.blueprints().len() {
            return Err(RulesError::InvalidConfig(format!(
                "dealing {needed} blueprints needs a larger catalog than {}",
                self.catalog.blueprints().len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut next = game.clone();

        next.draw_pool = self.catalog.tiles().iter().map(|t| t.id.clone()).collect();
        next.draw_pool.shuffle(&mut rng);
        next.discard_pile.clear();

        let mut deck: Vec<BlueprintId> =
            self.catalog.blueprints().iter().map(|b| b.id.clone()).collect();
        deck.shuffle(&mut rng);
        for (i, player) in next.players.iter_mut().enumerate() {
            player.dealt_blueprints = deck[i * hand..(i + 1) * hand].to_vec();
            player.selected_blueprints.clear();
        }

        next.status = GameStatus::InProgress;
        next.current_round = 1;
        next.current_player = next.turn_order[0];
        next.started_at = Some(now);
        next.updated_at = now;

        self.verify(&next)?;
        tracing::debug!(game_id = %next.id, seed, players = next.players.len(), "game started");
        Ok(next)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Checks every precondition of `action` against `game` without
    /// mutating anything.
    ///
    /// # Errors
    /// `IllegalAction` with the first failed precondition, or
    /// `PlayerNotFound` if the actor is not seated.
    pub fn validate(&self, game: &Game, action: &Action) -> Result<(), RulesError> {
        if !game.status.is_active() {
            return Err(Illegal::GameNotInProgress(game.status).into());
        }
        let actor = game
            .player(action.player)
            .ok_or(RulesError::PlayerNotFound(action.player))?;
        if game.current_player != actor.id {
            return Err(Illegal::NotYourTurn {
                actor: actor.id,
                current: game.current_player,
            }
            .into());
        }
        if action.origin == ActionOrigin::AutoPlay && !actor.controller.is_ai() {
            return Err(Illegal::NotAiControlled(actor.id).into());
        }
        self.check_kind(game, actor, &action.kind)
    }

    /// Per-type preconditions. Shared with the valid-action generator.
    pub(crate) fn check_kind(
        &self,
        game: &Game,
        actor: &Player,
        kind: &ActionKind,
    ) -> Result<(), RulesError> {
        match kind {
            ActionKind::PlaceWorker {
                worker_type,
                position,
                slot_index,
            } => self.check_place_worker(game, actor, *worker_type, *position, *slot_index),
            ActionKind::RecallWorker { position, slot_index } => {
                self.check_recall_worker(game, actor, *position, *slot_index)
            }
            ActionKind::PlaceTile { tile_id, position } => {
                self.check_place_tile(game, actor, tile_id, *position)
            }
            ActionKind::SelectBlueprint { blueprint_id } => {
                self.check_select_blueprint(actor, blueprint_id)
            }
            ActionKind::EndTurn | ActionKind::Pass => Ok(()),
        }
    }

    fn building_at<'g>(
        &self,
        game: &'g Game,
        position: Position,
    ) -> Result<&'g PlacedTile, RulesError> {
        if !position.is_on_board() {
            return Err(Illegal::OffBoard(position).into());
        }
        game.board
            .tile_at(position)
            .ok_or_else(|| Illegal::NoBuildingAt(position).into())
    }

    fn check_place_worker(
        &self,
        game: &Game,
        actor: &Player,
        requested: WorkerKind,
        position: Position,
        slot: u8,
    ) -> Result<(), RulesError> {
        let placed = self.building_at(game, position)?;
        let def = self
            .catalog
            .tile(&placed.tile)
            .ok_or_else(|| {
                RulesError::InvariantViolation(format!("unknown tile {} on the board", placed.tile))
            })?;
        let expected = def
            .slot_kind(slot)
            .ok_or(Illegal::NoSuchSlot { position, slot })?;
        if expected != requested {
            return Err(Illegal::SlotKindMismatch {
                position,
                slot,
                expected,
                requested,
            }
            .into());
        }
        if placed.worker_in(slot).is_some() {
            return Err(Illegal::SlotOccupied { position, slot }.into());
        }
        if actor.workers.pool(requested).available == 0 {
            return Err(Illegal::NoWorkerAvailable(requested).into());
        }
        Ok(())
    }

    fn check_recall_worker(
        &self,
        game: &Game,
        actor: &Player,
        position: Position,
        slot: u8,
    ) -> Result<(), RulesError> {
        let placed = self.building_at(game, position)?;
        let worker = placed.worker_in(slot).ok_or(Illegal::SlotEmpty { position, slot })?;
        if worker.player != actor.id {
            return Err(Illegal::NotYourWorker {
                position,
                slot,
                owner: worker.player,
            }
            .into());
        }
        if !worker.kind.is_recallable() {
            return Err(Illegal::PermanentWorker { position, slot }.into());
        }
        Ok(())
    }

    fn check_place_tile(
        &self,
        game: &Game,
        actor: &Player,
        tile: &TileId,
        position: Position,
    ) -> Result<(), RulesError> {
        let cell = game.board.cell(position).ok_or(Illegal::OffBoard(position))?;
        if !cell.terrain.is_buildable() {
            return Err(Illegal::UnbuildableTerrain {
                position,
                terrain: cell.terrain,
            }
            .into());
        }
        if cell.tile.is_some() {
            return Err(Illegal::CellOccupied(position).into());
        }
        let def = self
            .catalog
            .tile(tile)
            .ok_or_else(|| Illegal::UnknownTile(tile.clone()))?;
        if game.board.tiles().any(|(_, t)| &t.tile == tile) {
            return Err(Illegal::TileAlreadyPlaced(tile.clone()).into());
        }
        if game.discard_pile.contains(tile) {
            return Err(Illegal::TileDiscarded(tile.clone()).into());
        }
        if !game.market(self.config.market_size).contains(tile) {
            return Err(Illegal::TileNotInMarket(tile.clone()).into());
        }
        if !actor.resources.covers(&def.cost) {
            return Err(Illegal::CannotAfford {
                tile: tile.clone(),
                cost: def.cost,
                held: actor.resources,
            }
            .into());
        }
        Ok(())
    }

    fn check_select_blueprint(
        &self,
        actor: &Player,
        blueprint: &BlueprintId,
    ) -> Result<(), RulesError> {
        if !actor.dealt_blueprints.contains(blueprint) {
            return Err(Illegal::BlueprintNotDealt(blueprint.clone()).into());
        }
        if actor.selected_blueprints.contains(blueprint) {
            return Err(Illegal::BlueprintAlreadySelected(blueprint.clone()).into());
        }
        if actor.selected_blueprints.len() >= self.config.blueprint_selection_limit {
            let limit = self.config.blueprint_selection_limit;
            return Err(Illegal::BlueprintLimitReached(limit).into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Application
    // -----------------------------------------------------------------------

    /// Validates and applies `action`, returning the next state, the
    /// recorded action and what changed.
    ///
    /// All-or-nothing: effects are applied to a clone, and the clone is
    /// dropped if validation or the invariant check fails.
    ///
    /// # Errors
    /// `IllegalAction`, `PlayerNotFound`, or `InvariantViolation` if the
    /// result would be structurally broken.
    pub fn apply(&self, game: &Game, action: Action) -> Result<Applied, RulesError> {
        self.validate(game, &action)?;

        let mut next = game.clone();
        let mut effects = Vec::new();
        let actor = action.player;
        let now = action.timestamp;

        match &action.kind {
            ActionKind::PlaceWorker {
                worker_type,
                position,
                slot_index,
            } => self.place_worker(
                &mut next,
                actor,
                *worker_type,
                *position,
                *slot_index,
                &mut effects,
            )?,
            ActionKind::RecallWorker { position, slot_index } => {
                self.recall_worker(&mut next, actor, *position, *slot_index, &mut effects)?
            }
            ActionKind::PlaceTile { tile_id, position } => {
                self.place_tile(&mut next, actor, tile_id, *position, &mut effects)?
            }
            ActionKind::SelectBlueprint { blueprint_id } => {
                let player = Self::actor_mut(&mut next, actor)?;
                player.selected_blueprints.push(blueprint_id.clone());
                effects.push(Effect::BlueprintSelected {
                    player: actor,
                    blueprint: blueprint_id.clone(),
                });
            }
            ActionKind::EndTurn => {
                turn::produce(&self.catalog, &self.config, &mut next, actor, &mut effects)?;
                Self::actor_mut(&mut next, actor)?.turns_taken += 1;
                turn::advance(&self.catalog, &self.config, &mut next, now, &mut effects)?;
            }
            ActionKind::Pass => {
                Self::actor_mut(&mut next, actor)?.turns_taken += 1;
                turn::advance(&self.catalog, &self.config, &mut next, now, &mut effects)?;
            }
        }

        next.action_count += 1;
        let recorded = RecordedAction {
            id: ActionId(next.action_count),
            game_id: game.id,
            player: actor,
            kind: action.kind,
            timestamp: now,
            round: game.current_round,
            origin: action.origin,
        };
        next.last_action = Some(recorded.clone());
        next.updated_at = now;

        self.verify(&next)?;
        tracing::debug!(
            game_id = %game.id,
            player_id = %actor,
            action = %recorded.kind.action_type(),
            action_id = %recorded.id,
            "action applied"
        );
        Ok(Applied {
            state: next,
            action: recorded,
            effects,
        })
    }

    fn actor_mut(game: &mut Game, id: PlayerId) -> Result<&mut Player, RulesError> {
        game.player_mut(id).ok_or(RulesError::PlayerNotFound(id))
    }

    fn place_worker(
        &self,
        game: &mut Game,
        actor: PlayerId,
        kind: WorkerKind,
        position: Position,
        slot: u8,
        effects: &mut Vec<Effect>,
    ) -> Result<(), RulesError> {
        if !Self::actor_mut(game, actor)?.workers.pool_mut(kind).try_place() {
            return Err(RulesError::InvariantViolation(format!("{actor} had no {kind} to place")));
        }
        let placed = game
            .board
            .tile_at_mut(position)
            .ok_or_else(|| {
                RulesError::InvariantViolation(format!("building at {position} disappeared"))
            })?;
        placed.workers.push(PlacedWorker {
            player: actor,
            kind,
            slot,
        });
        effects.push(Effect::WorkerPlaced {
            player: actor,
            position,
            slot,
            kind,
        });
        Ok(())
    }

    fn recall_worker(
        &self,
        game: &mut Game,
        actor: PlayerId,
        position: Position,
        slot: u8,
        effects: &mut Vec<Effect>,
    ) -> Result<(), RulesError> {
        let placed = game
            .board
            .tile_at_mut(position)
            .ok_or_else(|| {
                RulesError::InvariantViolation(format!("building at {position} disappeared"))
            })?;
        placed.workers.retain(|w| w.slot != slot);
        if !Self::actor_mut(game, actor)?.workers.apprentices.try_release(1) {
            return Err(RulesError::InvariantViolation(format!(
                "{actor} recalled an apprentice that was never placed"
            )));
        }
        effects.push(Effect::WorkerRecalled {
            player: actor,
            position,
            slot,
        });
        Ok(())
    }

    fn place_tile(
        &self,
        game: &mut Game,
        actor: PlayerId,
        tile: &TileId,
        position: Position,
        effects: &mut Vec<Effect>,
    ) -> Result<(), RulesError> {
        let def = self
            .catalog
            .tile(tile)
            .ok_or_else(|| {
                RulesError::InvariantViolation(format!("validated tile {tile} is unknown"))
            })?;
        let terrain_bonus = game.board.terrain_bonus_at(position);
        let points = scoring::placement_points(&self.catalog, &game.board, position, def);
        let round = game.current_round;

        let player = Self::actor_mut(game, actor)?;
        player.resources = player
            .resources
            .checked_sub(&def.cost)
            .ok_or_else(|| {
                RulesError::InvariantViolation(format!("{actor} cannot pay for {tile}"))
            })?;
        player.placed_tiles.push(position);
        player.score += i64::from(points);

        game.draw_pool.retain(|t| t != tile);
        let cell = game
            .board
            .cell_mut(position)
            .ok_or_else(|| RulesError::InvariantViolation(format!("{position} is off the board")))?;
        cell.tile = Some(PlacedTile {
            tile: tile.clone(),
            owner: actor,
            workers: Vec::new(),
            terrain_bonus,
            placed_round: round,
        });

        effects.push(Effect::TilePlaced {
            player: actor,
            tile: tile.clone(),
            position,
            terrain_bonus,
            paid: def.cost,
        });
        Ok(())
    }

    fn verify(&self, game: &Game) -> Result<(), RulesError> {
        let violations = invariants::check_invariants(&self.catalog, &self.config, game);
        if violations.is_empty() {
            return Ok(());
        }
        let message = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        tracing::warn!(game_id = %game.id, %message, "invariant check failed; mutation discarded");
        Err(RulesError::InvariantViolation(message))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every legal option for `player` right now, grouped by type.
    ///
    /// # Errors
    /// `PlayerNotFound` if `player` is not seated.
    pub fn valid_actions(
        &self,
        game: &Game,
        player: PlayerId,
    ) -> Result<Vec<ValidAction>, RulesError> {
        generator::valid_actions(self, game, player)
    }

    /// Rankings over the current board. Pure; on a finished game this
    /// matches the stored rankings.
    pub fn score(&self, game: &Game) -> Vec<PlayerRanking> {
        scoring::rank(&self.catalog, &self.config, game)
    }

    /// # Errors
    /// `NotFinished` until the game has finished.
    pub fn result(&self, game: &Game) -> Result<GameResult, RulesError> {
        if !game.is_finished() {
            return Err(RulesError::NotFinished(game.id));
        }
        let rankings = game.rankings.clone().unwrap_or_else(|| self.score(game));
        Ok(GameResult {
            game_id: game.id,
            winner_id: rankings.first().map(|r| r.player_id),
            rankings,
            duration: game.duration_ms().unwrap_or(0),
            total_rounds: game.total_rounds,
        })
    }

    /// Rebuilds a state by re-applying `log` on top of `initial` (the
    /// state right after [`Rules::start`]).
    ///
    /// # Errors
    /// The first error any entry produces, or `InvariantViolation` if an
    /// entry's id does not match its position in the log.
    pub fn replay(&self, initial: &Game, log: &[RecordedAction]) -> Result<Game, RulesError> {
        let mut state = initial.clone();
        for entry in log {
            let applied = self.apply(&state, entry.to_action())?;
            if applied.action.id != entry.id {
                return Err(RulesError::InvariantViolation(format!(
                    "log entry {} replayed as {}",
                    entry.id, applied.action.id
                )));
            }
            state = applied.state;
        }
        Ok(state)
    }
}
