//! Game registry: creates games, spawns their actors, routes requests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hanyang_protocol::{GameId, PlayerId};
use hanyang_rules::{Action, Game, GameResult, RecordedAction, Rules, Seat, ValidAction};
use tokio::sync::{RwLock, broadcast};

use crate::room::spawn_room;
use crate::{RoomConfig, RoomError, RoomEvent, RoomHandle, Submitted};

/// Owns one actor handle per live game.
///
/// The map lock is held only long enough to clone a handle; every call
/// into a game happens after it is released, so a slow game never
/// blocks requests for another.
pub struct RoomManager {
    rules: Arc<Rules>,
    config: RoomConfig,
    rooms: RwLock<HashMap<GameId, RoomHandle>>,
    next_id: AtomicU64,
}

impl RoomManager {
    pub fn new(rules: Arc<Rules>, config: RoomConfig) -> Self {
        Self {
            rules,
            config,
            rooms: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Registers a waiting game for `seats` and spawns its actor.
    ///
    /// # Errors
    /// `Rules` if the seat list is rejected (size or duplicate ids).
    pub async fn create_game(&self, seats: Vec<Seat>, now: u64) -> Result<GameId, RoomError> {
        let game_id = GameId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let game = self.rules.new_game(game_id, seats, now)?;
        let players = game.players.len();
        let handle = spawn_room(Arc::clone(&self.rules), self.config.clone(), game);
        self.rooms.write().await.insert(game_id, handle);
        tracing::info!(%game_id, players, "game created");
        Ok(game_id)
    }

    async fn handle(&self, game_id: GameId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(RoomError::NotFound(game_id))
    }

    /// Shuffles the pool, deals blueprints and hands the turn to the
    /// first seat. With `auto_play_ai` set, AI seats at the front of
    /// the turn order move before this returns.
    ///
    /// # Errors
    /// `NotFound` for an unknown game, `Rules` if it already started.
    pub async fn start(
        &self,
        game_id: GameId,
        seed: u64,
        now: u64,
    ) -> Result<Arc<Game>, RoomError> {
        self.handle(game_id).await?.start(seed, now).await
    }

    /// Submits one action. Concurrent submissions for the same game are
    /// applied strictly one after another.
    ///
    /// # Errors
    /// `NotFound` for an unknown game, `Rules` if the engine refuses the
    /// action. A refused action changes nothing.
    pub async fn submit(&self, game_id: GameId, action: Action) -> Result<Submitted, RoomError> {
        self.handle(game_id).await?.submit(action).await
    }

    /// Plays AI seats until a human holds the turn, the game ends, or
    /// `ai_max_turns` turns have been played. Returns what was applied,
    /// which is empty when a human is on turn.
    ///
    /// # Errors
    /// `NotFound` for an unknown game, `Rules` if it is not in progress.
    pub async fn auto_play(
        &self,
        game_id: GameId,
        now: u64,
    ) -> Result<Vec<RecordedAction>, RoomError> {
        self.handle(game_id).await?.auto_play(now).await
    }

    /// Legal options for `player`, grouped by action type. Empty when
    /// `player` is seated but not on turn.
    ///
    /// # Errors
    /// `NotFound` for an unknown game, `Rules` for an unseated player.
    pub async fn valid_actions(
        &self,
        game_id: GameId,
        player: PlayerId,
    ) -> Result<Vec<ValidAction>, RoomError> {
        self.handle(game_id).await?.valid_actions(player).await
    }

    /// The last committed state. Served from the actor's queue, so it
    /// reflects every action submitted before this call.
    pub async fn snapshot(&self, game_id: GameId) -> Result<Arc<Game>, RoomError> {
        self.handle(game_id).await?.snapshot().await
    }

    /// Final rankings.
    ///
    /// # Errors
    /// `Rules(NotFinished)` while the game is still running.
    pub async fn result(&self, game_id: GameId) -> Result<GameResult, RoomError> {
        self.handle(game_id).await?.result().await
    }

    /// Every accepted action in order, ids starting at 1.
    pub async fn action_log(&self, game_id: GameId) -> Result<Vec<RecordedAction>, RoomError> {
        self.handle(game_id).await?.action_log().await
    }

    pub async fn subscribe(
        &self,
        game_id: GameId,
    ) -> Result<broadcast::Receiver<RoomEvent>, RoomError> {
        Ok(self.handle(game_id).await?.subscribe())
    }

    /// Stops a game's actor and forgets it.
    ///
    /// The game is unregistered even if its actor has already stopped;
    /// a closed command queue only means there is nothing left to stop.
    pub async fn destroy(&self, game_id: GameId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(&game_id)
            .ok_or(RoomError::NotFound(game_id))?;
        if let Err(err) = handle.shutdown().await {
            tracing::debug!(%game_id, error = %err, "actor already stopped");
        }
        tracing::info!(%game_id, "game destroyed");
        Ok(())
    }

    pub async fn game_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<_> = self.rooms.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}
