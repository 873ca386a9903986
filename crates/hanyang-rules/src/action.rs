//! Actions, the action log, and the effects an accepted action has.

use std::fmt;

use hanyang_protocol::{ActionId, GameId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::board::{Position, TerrainBonus};
use crate::catalog::{BlueprintId, TileId};
use crate::ledger::{Resources, WorkerKind};
use crate::scoring::PlayerRanking;

/// What an action does, with its payload.
///
/// On the wire this is `{"action_type": "...", "payload": {...}}`;
/// `end_turn` and `pass` carry no payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action_type", content = "payload", rename_all = "snake_case")]
pub enum ActionKind {
    PlaceWorker {
        worker_type: WorkerKind,
        position: Position,
        slot_index: u8,
    },
    RecallWorker {
        position: Position,
        slot_index: u8,
    },
    PlaceTile {
        tile_id: TileId,
        position: Position,
    },
    SelectBlueprint {
        blueprint_id: BlueprintId,
    },
    EndTurn,
    Pass,
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::PlaceWorker { .. } => ActionType::PlaceWorker,
            Self::RecallWorker { .. } => ActionType::RecallWorker,
            Self::PlaceTile { .. } => ActionType::PlaceTile,
            Self::SelectBlueprint { .. } => ActionType::SelectBlueprint,
            Self::EndTurn => ActionType::EndTurn,
            Self::Pass => ActionType::Pass,
        }
    }

    /// `end_turn` and `pass` hand the turn to the next seat.
    pub fn ends_turn(&self) -> bool {
        matches!(self, Self::EndTurn | Self::Pass)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    PlaceWorker,
    RecallWorker,
    PlaceTile,
    SelectBlueprint,
    EndTurn,
    Pass,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PlaceWorker => "place_worker",
            Self::RecallWorker => "recall_worker",
            Self::PlaceTile => "place_tile",
            Self::SelectBlueprint => "select_blueprint",
            Self::EndTurn => "end_turn",
            Self::Pass => "pass",
        };
        f.write_str(name)
    }
}

/// Whether a human submitted the action or the room synthesized it
/// for an AI seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrigin {
    #[default]
    Player,
    AutoPlay,
}

/// A proposed action, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub player: PlayerId,
    pub kind: ActionKind,
    pub timestamp: u64,
    #[serde(default)]
    pub origin: ActionOrigin,
}

impl Action {
    pub fn new(player: PlayerId, kind: ActionKind, timestamp: u64) -> Self {
        Self {
            player,
            kind,
            timestamp,
            origin: ActionOrigin::Player,
        }
    }

    pub fn auto_play(player: PlayerId, kind: ActionKind, timestamp: u64) -> Self {
        Self {
            player,
            kind,
            timestamp,
            origin: ActionOrigin::AutoPlay,
        }
    }
}

/// An accepted action as stored in the append-only log. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAction {
    pub id: ActionId,
    pub game_id: GameId,
    pub player: PlayerId,
    pub kind: ActionKind,
    pub timestamp: u64,
    /// Round in which the action was taken.
    pub round: u32,
    pub origin: ActionOrigin,
}

impl RecordedAction {
    /// The proposal that produced this record, for replay.
    pub fn to_action(&self) -> Action {
        Action {
            player: self.player,
            kind: self.kind.clone(),
            timestamp: self.timestamp,
            origin: self.origin,
        }
    }
}

/// Concrete legal options of one action type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidAction {
    pub action_type: ActionType,
    pub options: Vec<ActionKind>,
}

/// Something an accepted action changed. The room turns these into
/// outbound events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    WorkerPlaced {
        player: PlayerId,
        position: Position,
        slot: u8,
        kind: WorkerKind,
    },
    WorkerRecalled {
        player: PlayerId,
        position: Position,
        slot: u8,
    },
    TilePlaced {
        player: PlayerId,
        tile: TileId,
        position: Position,
        terrain_bonus: TerrainBonus,
        paid: Resources,
    },
    BlueprintSelected {
        player: PlayerId,
        blueprint: BlueprintId,
    },
    ResourcesProduced {
        player: PlayerId,
        produced: Resources,
    },
    ApprenticesRecalled {
        player: PlayerId,
        count: u32,
    },
    MarketDiscarded {
        tiles: Vec<TileId>,
    },
    RoundChanged {
        round: u32,
    },
    TurnChanged {
        current_player: PlayerId,
        round: u32,
    },
    GameEnded {
        winner: Option<PlayerId>,
        rankings: Vec<PlayerRanking>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_tile_json_shape() {
        let kind = ActionKind::PlaceTile {
            tile_id: TileId::from("palace_1"),
            position: Position::new(1, 2),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["action_type"], "place_tile");
        assert_eq!(json["payload"]["tile_id"], "palace_1");
        assert_eq!(json["payload"]["position"]["row"], 1);
        assert_eq!(json["payload"]["position"]["col"], 2);
    }

    #[test]
    fn test_end_turn_has_no_payload() {
        let json = serde_json::to_value(&ActionKind::EndTurn).unwrap();
        assert_eq!(json, serde_json::json!({"action_type": "end_turn"}));
        let back: ActionKind = serde_json::from_value(json).unwrap();
        assert_eq!(back, ActionKind::EndTurn);
    }

    #[test]
    fn test_place_worker_parses_from_client_json() {
        let json = r#"{
            "action_type": "place_worker",
            "payload": {
                "worker_type": "official",
                "position": {"row": 3, "col": 1},
                "slot_index": 2
            }
        }"#;
        let kind: ActionKind = serde_json::from_str(json).unwrap();
        assert_eq!(
            kind,
            ActionKind::PlaceWorker {
                worker_type: WorkerKind::Official,
                position: Position::new(3, 1),
                slot_index: 2,
            }
        );
        assert_eq!(kind.action_type(), ActionType::PlaceWorker);
    }

    #[test]
    fn test_missing_payload_field_is_rejected() {
        let json = r#"{"action_type": "place_tile", "payload": {"tile_id": "gate_1"}}"#;
        assert!(serde_json::from_str::<ActionKind>(json).is_err());
    }

    #[test]
    fn test_unknown_action_type_is_rejected() {
        let json = r#"{"action_type": "steal_tile", "payload": {}}"#;
        assert!(serde_json::from_str::<ActionKind>(json).is_err());
    }

    #[test]
    fn test_recorded_action_json_shape() {
        let rec = RecordedAction {
            id: ActionId(4),
            game_id: GameId(1),
            player: PlayerId(2),
            kind: ActionKind::SelectBlueprint {
                blueprint_id: BlueprintId::from("pattern_row"),
            },
            timestamp: 99,
            round: 1,
            origin: ActionOrigin::AutoPlay,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["kind"]["action_type"], "select_blueprint");
        assert_eq!(json["kind"]["payload"]["blueprint_id"], "pattern_row");
        assert_eq!(json["origin"], "auto_play");
        assert_eq!(rec.to_action().origin, ActionOrigin::AutoPlay);
    }

    #[test]
    fn test_ends_turn() {
        assert!(ActionKind::EndTurn.ends_turn());
        assert!(ActionKind::Pass.ends_turn());
        assert!(
            !ActionKind::RecallWorker {
                position: Position::new(0, 0),
                slot_index: 0
            }
            .ends_turn()
        );
    }
}
