//! JSON contract tests for the gateway.

use std::sync::Arc;

use hanyang::prelude::*;
use hanyang_protocol::Envelope;
use serde_json::{Value, json};

// =========================================================================
// Helpers
// =========================================================================

async fn two_humans() -> (Arc<RoomManager>, GameId) {
    let config = RoomConfig {
        auto_play_ai: false,
        ..RoomConfig::default()
    };
    let manager = Arc::new(RoomManager::new(Arc::new(Rules::reference()), config));
    let game = manager
        .create_game(vec![Seat::human(1, "a"), Seat::human(2, "b")], 0)
        .await
        .unwrap();
    manager.start(game, 11, 0).await.unwrap();
    (manager, game)
}

fn decode(frame: &[u8]) -> Envelope<Value> {
    serde_json::from_slice(frame).unwrap()
}

async fn send(gateway: &mut Gateway<JsonCodec>, msg: Value, now: u64) -> Vec<Envelope<Value>> {
    let bytes = serde_json::to_vec(&msg).unwrap();
    gateway.handle(&bytes, now).await.unwrap().iter().map(|f| decode(f)).collect()
}

// =========================================================================
// Requests
// =========================================================================

#[tokio::test]
async fn test_ping_answers_pong() {
    let (manager, game) = two_humans().await;
    let mut gateway = Gateway::new(manager, JsonCodec, game, PlayerId(1));
    let frames = send(&mut gateway, json!({"type": "ping", "client_time": 7}), 50).await;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].seq, 1);
    assert_eq!(frames[0].payload, json!({"type": "pong", "client_time": 7, "server_time": 50}));
}

#[tokio::test]
async fn test_accepted_action_returns_result_then_state() {
    let (manager, game) = two_humans().await;
    let mut gateway = Gateway::new(manager, JsonCodec, game, PlayerId(1));
    let end_turn = json!({"type": "submit_action", "action_type": "end_turn"});
    let frames = send(&mut gateway, end_turn, 60).await;

    assert_eq!(frames.len(), 2);
    let result = &frames[0].payload;
    assert_eq!(result["type"], "action_result");
    assert_eq!(result["success"], true);
    assert_eq!(result["action"]["id"], 1);
    assert_eq!(result["action"]["kind"]["action_type"], "end_turn");
    assert_eq!(result["action"]["timestamp"], 60);
    assert!(result.get("error").is_none());

    let state = &frames[1].payload;
    assert_eq!(state["type"], "game_state");
    assert_eq!(state["state"]["current_player"], 2);
    assert_eq!((frames[0].seq, frames[1].seq), (1, 2));
}

#[tokio::test]
async fn test_refused_action_returns_structured_rejection() {
    let (manager, game) = two_humans().await;
    let mut gateway = Gateway::new(manager, JsonCodec, game, PlayerId(2));
    let pass = json!({"type": "submit_action", "action_type": "pass"});
    let frames = send(&mut gateway, pass, 60).await;

    assert_eq!(frames.len(), 1);
    let result = &frames[0].payload;
    assert_eq!(result["success"], false);
    assert_eq!(result["error"]["code"], "illegal_action");
    assert!(result["error"]["message"].as_str().unwrap().contains("turn"));
}

#[tokio::test]
async fn test_malformed_frame_is_bad_request() {
    let (manager, game) = two_humans().await;
    let mut gateway = Gateway::new(manager, JsonCodec, game, PlayerId(1));
    let frames = gateway.handle(b"{not json", 1).await.unwrap();
    let payload = decode(&frames[0]).payload;
    assert_eq!(payload["type"], "error");
    assert_eq!(payload["code"], "bad_request");
    assert_eq!(payload["recoverable"], true);

    let frames = send(
        &mut gateway,
        json!({
            "type": "submit_action",
            "action_type": "place_tile",
            "payload": {"tile_id": "palace_1"}
        }),
        2,
    )
    .await;
    assert_eq!(frames[0].payload["code"], "bad_request");
}

#[tokio::test]
async fn test_valid_actions_groups_by_type() {
    let (manager, game) = two_humans().await;
    let mut gateway = Gateway::new(manager, JsonCodec, game, PlayerId(1));
    let frames = send(&mut gateway, json!({"type": "get_valid_actions"}), 5).await;
    let actions = frames[0].payload["actions"].as_array().unwrap();
    let types: Vec<_> = actions.iter().map(|a| a["action_type"].as_str().unwrap()).collect();
    assert!(types.contains(&"select_blueprint"));
    assert!(types.contains(&"end_turn"));
    assert!(types.contains(&"pass"));
}

#[tokio::test]
async fn test_unknown_game_reports_not_found() {
    let (manager, _) = two_humans().await;
    let mut gateway = Gateway::new(manager, JsonCodec, GameId(404), PlayerId(1));
    let frames = send(&mut gateway, json!({"type": "get_state"}), 5).await;
    assert_eq!(frames[0].payload["type"], "error");
    assert_eq!(frames[0].payload["code"], "not_found");
    assert_eq!(frames[0].payload["recoverable"], false);
}

// =========================================================================
// Events
// =========================================================================

#[tokio::test]
async fn test_turn_change_reaches_other_seat() {
    let (manager, game) = two_humans().await;
    let mut events = manager.subscribe(game).await.unwrap();
    let mut actor = Gateway::new(Arc::clone(&manager), JsonCodec, game, PlayerId(1));
    let mut watcher = Gateway::new(manager, JsonCodec, game, PlayerId(2));

    send(&mut actor, json!({"type": "submit_action", "action_type": "end_turn"}), 60).await;

    let changed = events.recv().await.unwrap();
    let frame = watcher.render(&changed, 61).unwrap().unwrap();
    assert_eq!(decode(&frame).payload["type"], "game_state");
    // The submitter already has the new state.
    assert!(actor.render(&changed, 61).unwrap().is_none());

    let turn = events.recv().await.unwrap();
    let frame = watcher.render(&turn, 62).unwrap().unwrap();
    assert_eq!(
        decode(&frame).payload,
        json!({"type": "turn_changed", "current_player_id": 2, "round": 1})
    );
}

#[tokio::test]
async fn test_game_end_is_announced_with_rankings() {
    let rules = Rules::new(
        Arc::new(Catalog::reference()),
        RulesConfig {
            total_rounds: 1,
            ..RulesConfig::default()
        },
    )
    .unwrap();
    let config = RoomConfig {
        auto_play_ai: false,
        ..RoomConfig::default()
    };
    let manager = Arc::new(RoomManager::new(Arc::new(rules), config));
    let game = manager
        .create_game(vec![Seat::human(1, "a"), Seat::human(2, "b")], 0)
        .await
        .unwrap();
    manager.start(game, 5, 0).await.unwrap();
    let mut events = manager.subscribe(game).await.unwrap();
    let mut p1 = Gateway::new(Arc::clone(&manager), JsonCodec, game, PlayerId(1));
    let mut p2 = Gateway::new(Arc::clone(&manager), JsonCodec, game, PlayerId(2));

    send(&mut p1, json!({"type": "submit_action", "action_type": "pass"}), 10).await;
    send(&mut p2, json!({"type": "submit_action", "action_type": "pass"}), 20).await;

    let mut ended = None;
    while let Ok(event) = events.try_recv() {
        if let Some(frame) = p1.render(&event, 30).unwrap() {
            let payload = decode(&frame).payload;
            if payload["type"] == "game_ended" {
                ended = Some(payload);
            }
        }
    }
    let ended = ended.unwrap();
    assert_eq!(ended["winner_id"], 1);
    assert_eq!(ended["rankings"].as_array().unwrap().len(), 2);
    assert_eq!(ended["rankings"][0]["rank"], 1);
    assert_eq!(manager.result(game).await.unwrap().winner_id, Some(PlayerId(1)));
}
