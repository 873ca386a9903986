//! Game actor: an isolated Tokio task that owns one game.
//!
//! The actor is the single writer for its game. Commands arrive through
//! a bounded mpsc channel and are handled one at a time, so two
//! submissions for the same game can never interleave. Different games
//! run in different tasks and share nothing mutable.
//!
//! Every committed state is held behind an `Arc`, which makes snapshots
//! cheap to hand out and keeps readers from ever seeing a half-applied
//! action.

use std::sync::Arc;

use hanyang_protocol::{GameId, PlayerId, Recipient};
use hanyang_rules::ai::{self, AiDifficulty};
use hanyang_rules::{
    Action, ActionKind, Controller, Game, GameResult, Illegal, RecordedAction, Rules, RulesError,
    ValidAction,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{GameEvent, RoomConfig, RoomError, RoomEvent};

/// What a successful submission returns to the caller.
#[derive(Debug, Clone)]
pub struct Submitted {
    /// State after the submitted action and any auto-play that
    /// followed it.
    pub state: Arc<Game>,
    pub action: RecordedAction,
    /// AI actions applied right after the submitted one.
    pub auto_played: Vec<RecordedAction>,
}

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a game actor through its channel.
pub(crate) enum RoomCommand {
    Start {
        seed: u64,
        now: u64,
        reply: Reply<Arc<Game>>,
    },
    Submit {
        action: Action,
        reply: Reply<Submitted>,
    },
    AutoPlay {
        now: u64,
        reply: Reply<Vec<RecordedAction>>,
    },
    ValidActions {
        player: PlayerId,
        reply: Reply<Vec<ValidAction>>,
    },
    Snapshot {
        reply: oneshot::Sender<Arc<Game>>,
    },
    Result {
        reply: Reply<GameResult>,
    },
    ActionLog {
        reply: oneshot::Sender<Vec<RecordedAction>>,
    },
    Shutdown,
}

/// Handle to a running game actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    game_id: GameId,
    sender: mpsc::Sender<RoomCommand>,
    events: broadcast::Sender<RoomEvent>,
}

impl RoomHandle {
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Sends `command` and waits for the actor's reply.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.game_id))?;
        reply_rx.await.map_err(|_| RoomError::Unavailable(self.game_id))
    }

    pub async fn start(&self, seed: u64, now: u64) -> Result<Arc<Game>, RoomError> {
        self.request(|reply| RoomCommand::Start { seed, now, reply }).await?
    }

    pub async fn submit(&self, action: Action) -> Result<Submitted, RoomError> {
        self.request(|reply| RoomCommand::Submit { action, reply }).await?
    }

    pub async fn auto_play(&self, now: u64) -> Result<Vec<RecordedAction>, RoomError> {
        self.request(|reply| RoomCommand::AutoPlay { now, reply }).await?
    }

    pub async fn valid_actions(&self, player: PlayerId) -> Result<Vec<ValidAction>, RoomError> {
        self.request(|reply| RoomCommand::ValidActions { player, reply }).await?
    }

    pub async fn snapshot(&self) -> Result<Arc<Game>, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub async fn result(&self) -> Result<GameResult, RoomError> {
        self.request(|reply| RoomCommand::Result { reply }).await?
    }

    pub async fn action_log(&self) -> Result<Vec<RecordedAction>, RoomError> {
        self.request(|reply| RoomCommand::ActionLog { reply }).await
    }

    /// Receives every event the game publishes from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    /// Tells the actor to stop. Commands already queued ahead of this
    /// one are still handled.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.game_id))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    game_id: GameId,
    rules: Arc<Rules>,
    config: RoomConfig,
    game: Arc<Game>,
    /// Append-only; entry `n` has action id `n + 1`.
    log: Vec<RecordedAction>,
    /// Drives the easy AI. Reseeded from the start seed.
    rng: StdRng,
    events: broadcast::Sender<RoomEvent>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(game_id = %self.game_id, "game actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Start { seed, now, reply } => {
                    let _ = reply.send(self.handle_start(seed, now));
                }
                RoomCommand::Submit { action, reply } => {
                    let _ = reply.send(self.handle_submit(action));
                }
                RoomCommand::AutoPlay { now, reply } => {
                    let _ = reply.send(self.handle_auto_play(now));
                }
                RoomCommand::ValidActions { player, reply } => {
                    let valid = self.rules.valid_actions(&self.game, player);
                    let _ = reply.send(valid.map_err(RoomError::from));
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(Arc::clone(&self.game));
                }
                RoomCommand::Result { reply } => {
                    let _ = reply.send(self.rules.result(&self.game).map_err(RoomError::from));
                }
                RoomCommand::ActionLog { reply } => {
                    let _ = reply.send(self.log.clone());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(game_id = %self.game_id, "game actor shutting down");
                    break;
                }
            }
        }

        tracing::info!(game_id = %self.game_id, actions = self.log.len(), "game actor stopped");
    }

    fn handle_start(&mut self, seed: u64, now: u64) -> Result<Arc<Game>, RoomError> {
        let started = self.rules.start(&self.game, seed, now)?;
        self.game = Arc::new(started);
        self.rng = StdRng::seed_from_u64(seed);
        tracing::info!(
            game_id = %self.game_id,
            players = self.game.players.len(),
            first = %self.game.current_player,
            "game started"
        );
        self.publish(RoomEvent {
            game_id: self.game_id,
            recipient: Recipient::All,
            event: GameEvent::Started {
                state: Arc::clone(&self.game),
            },
        });

        if self.config.auto_play_ai {
            self.auto_play(now);
        }
        Ok(Arc::clone(&self.game))
    }

    fn handle_submit(&mut self, action: Action) -> Result<Submitted, RoomError> {
        let now = action.timestamp;
        let recorded = self.commit(action)?;
        let auto_played = if self.config.auto_play_ai {
            self.auto_play(now)
        } else {
            Vec::new()
        };
        Ok(Submitted {
            state: Arc::clone(&self.game),
            action: recorded,
            auto_played,
        })
    }

    fn handle_auto_play(&mut self, now: u64) -> Result<Vec<RecordedAction>, RoomError> {
        if !self.game.status.is_active() {
            return Err(RulesError::from(Illegal::GameNotInProgress(self.game.status)).into());
        }
        Ok(self.auto_play(now))
    }

    /// Validates and applies one action. On success the new state is
    /// published and logged; on failure nothing changes and only the
    /// actor is told.
    fn commit(&mut self, action: Action) -> Result<RecordedAction, RoomError> {
        let player = action.player;
        let applied = match self.rules.apply(&self.game, action) {
            Ok(applied) => applied,
            Err(err) => {
                match &err {
                    RulesError::InvariantViolation(reason) => {
                        tracing::error!(
                            game_id = %self.game_id,
                            %player,
                            %reason,
                            "invariant violation, action dropped"
                        );
                    }
                    _ => {
                        tracing::debug!(
                            game_id = %self.game_id,
                            %player,
                            error = %err,
                            "action rejected"
                        );
                    }
                }
                self.publish(RoomEvent::rejected(self.game_id, player, err.rejection()));
                return Err(err.into());
            }
        };

        self.game = Arc::new(applied.state);
        self.log.push(applied.action.clone());
        let events =
            RoomEvent::for_accepted(self.game_id, &self.game, &applied.action, &applied.effects);
        for event in events {
            self.publish(event);
        }
        if self.game.is_finished() {
            tracing::info!(
                game_id = %self.game_id,
                rounds = self.game.total_rounds,
                actions = self.log.len(),
                "game finished"
            );
        }
        Ok(applied.action)
    }

    /// Plays AI seats while one holds the turn, up to
    /// `ai_max_turns` finished turns.
    fn auto_play(&mut self, now: u64) -> Vec<RecordedAction> {
        self.auto_play_with(now, |rules, game, player, difficulty, rng| {
            ai::choose(difficulty, rules, game, player, rng)
        })
    }

    /// Auto-play loop with the move policy passed in.
    ///
    /// A turn ends when an `end_turn` or `pass` is recorded. A seat that
    /// reaches `ai_max_actions_per_turn` is made to end its turn, and a
    /// policy that comes up empty, errors, or proposes something the
    /// validator refuses is replaced by a forced `end_turn`.
    fn auto_play_with<F>(&mut self, now: u64, mut policy: F) -> Vec<RecordedAction>
    where
        F: FnMut(
            &Rules,
            &Game,
            PlayerId,
            AiDifficulty,
            &mut StdRng,
        ) -> Result<Option<ActionKind>, RulesError>,
    {
        let action_cap = self.config.ai_max_actions_per_turn.max(1);
        let mut played = Vec::new();
        let mut turns = 0;
        let mut actions_this_turn = 0;

        while turns < self.config.ai_max_turns {
            if !self.game.status.is_active() {
                break;
            }
            let Some(seat) = self.game.current() else {
                break;
            };
            let Controller::Ai(difficulty) = seat.controller else {
                break;
            };
            let player = seat.id;

            let proposal = if actions_this_turn + 1 >= action_cap {
                tracing::warn!(
                    game_id = %self.game_id,
                    %player,
                    actions = actions_this_turn,
                    "ai turn hit its action cap, forcing end_turn"
                );
                ActionKind::EndTurn
            } else {
                match policy(self.rules.as_ref(), &self.game, player, difficulty, &mut self.rng) {
                    Ok(Some(kind)) => kind,
                    Ok(None) => {
                        tracing::warn!(
                            game_id = %self.game_id,
                            %player,
                            "ai found no action, forcing end_turn"
                        );
                        ActionKind::EndTurn
                    }
                    Err(err) => {
                        tracing::warn!(
                            game_id = %self.game_id,
                            %player,
                            error = %err,
                            "ai failed, forcing end_turn"
                        );
                        ActionKind::EndTurn
                    }
                }
            };

            let Some(recorded) = self.commit_ai(player, proposal, now) else {
                break;
            };
            actions_this_turn += 1;
            if recorded.kind.ends_turn() {
                turns += 1;
                actions_this_turn = 0;
            }
            played.push(recorded);
        }
        if !played.is_empty() {
            tracing::debug!(
                game_id = %self.game_id,
                actions = played.len(),
                turns,
                "auto-play done"
            );
        }
        played
    }

    /// Commits an AI proposal, falling back to `end_turn` if it is
    /// refused. `None` only when the fallback is refused too.
    fn commit_ai(
        &mut self,
        player: PlayerId,
        proposal: ActionKind,
        now: u64,
    ) -> Option<RecordedAction> {
        let forced = proposal == ActionKind::EndTurn;
        match self.commit(Action::auto_play(player, proposal, now)) {
            Ok(recorded) => return Some(recorded),
            Err(err) if !forced => {
                tracing::warn!(
                    game_id = %self.game_id,
                    %player,
                    error = %err,
                    "ai action refused, forcing end_turn"
                );
            }
            Err(err) => {
                tracing::error!(
                    game_id = %self.game_id,
                    %player,
                    error = %err,
                    "forced end_turn refused"
                );
                return None;
            }
        }
        match self.commit(Action::auto_play(player, ActionKind::EndTurn, now)) {
            Ok(recorded) => Some(recorded),
            Err(err) => {
                tracing::error!(
                    game_id = %self.game_id,
                    %player,
                    error = %err,
                    "forced end_turn refused"
                );
                None
            }
        }
    }

    /// Nobody listening is normal.
    fn publish(&self, event: RoomEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!(game_id = %self.game_id, "no event subscribers");
        }
    }
}

/// Spawns a game actor for `game` (normally fresh from
/// [`Rules::new_game`]) and returns a handle to it.
pub(crate) fn spawn_room(rules: Arc<Rules>, config: RoomConfig, game: Game) -> RoomHandle {
    let game_id = game.id;
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let (events, _) = broadcast::channel(config.event_capacity.max(1));

    let actor = RoomActor {
        game_id,
        rules,
        config,
        game: Arc::new(game),
        log: Vec::new(),
        rng: StdRng::seed_from_u64(game_id.0),
        events: events.clone(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        game_id,
        sender: tx,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanyang_rules::{ActionOrigin, Position, Seat};

    fn actor(config: RoomConfig) -> RoomActor {
        let rules = Arc::new(Rules::reference());
        let seats = vec![
            Seat::ai(1, "a", AiDifficulty::Easy),
            Seat::ai(2, "b", AiDifficulty::Easy),
        ];
        let game = rules.new_game(GameId(1), seats, 0).unwrap();
        let (_tx, receiver) = mpsc::channel(1);
        let (events, _) = broadcast::channel(16);
        let mut actor = RoomActor {
            game_id: GameId(1),
            rules,
            config: RoomConfig {
                auto_play_ai: false,
                ..config
            },
            game: Arc::new(game),
            log: Vec::new(),
            rng: StdRng::seed_from_u64(1),
            events,
            receiver,
        };
        actor.handle_start(3, 0).unwrap();
        actor
    }

    fn one_turn() -> RoomConfig {
        RoomConfig {
            ai_max_turns: 1,
            ..RoomConfig::default()
        }
    }

    fn assert_forced_end_turn(actor: &RoomActor, played: &[RecordedAction]) {
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].kind, ActionKind::EndTurn);
        assert_eq!(played[0].origin, ActionOrigin::AutoPlay);
        assert_eq!(played[0].player, PlayerId(1));
        assert_eq!(actor.log, played);
        assert_eq!(actor.game.current_player, PlayerId(2));
    }

    #[test]
    fn test_refused_ai_proposal_becomes_end_turn() {
        let mut actor = actor(one_turn());
        let played = actor.auto_play_with(5, |_, _, _, _, _| {
            Ok(Some(ActionKind::PlaceTile {
                tile_id: "no_such_tile".into(),
                position: Position::new(2, 2),
            }))
        });
        assert_forced_end_turn(&actor, &played);
    }

    #[test]
    fn test_empty_ai_policy_becomes_end_turn() {
        let mut actor = actor(one_turn());
        let played = actor.auto_play_with(5, |_, _, _, _, _| Ok(None));
        assert_forced_end_turn(&actor, &played);
    }

    #[test]
    fn test_failing_ai_policy_becomes_end_turn() {
        let mut actor = actor(one_turn());
        let played =
            actor.auto_play_with(5, |_, _, player, _, _| Err(RulesError::PlayerNotFound(player)));
        assert_forced_end_turn(&actor, &played);
    }

    #[test]
    fn test_action_cap_of_one_skips_the_policy() {
        let mut actor = actor(RoomConfig {
            ai_max_turns: 2,
            ai_max_actions_per_turn: 1,
            ..RoomConfig::default()
        });
        let mut calls = 0;
        let played = actor.auto_play_with(5, |_, _, _, _, _| {
            calls += 1;
            Ok(Some(ActionKind::Pass))
        });
        assert_eq!(calls, 0);
        let players: Vec<_> = played.iter().map(|a| (a.player, a.kind.clone())).collect();
        assert_eq!(
            players,
            vec![(PlayerId(1), ActionKind::EndTurn), (PlayerId(2), ActionKind::EndTurn)]
        );
    }

    #[test]
    fn test_turn_bound_counts_turns_not_actions() {
        let mut actor = actor(RoomConfig {
            ai_max_turns: 2,
            ..RoomConfig::default()
        });
        let played = actor.auto_play(5);
        assert_eq!(played.iter().filter(|a| a.kind.ends_turn()).count(), 2);
        assert_eq!(actor.game.current_player, PlayerId(1));
        assert_eq!(actor.game.current_round, 2);
    }
}
