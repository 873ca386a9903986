//! Plays one full match through the room manager and prints the result
//! as JSON.
//!
//! ```text
//! cargo run -p solo-match -- [seed] [--human]
//! ```
//!
//! With `--human`, seat 1 is a scripted human that builds or picks a
//! blueprint whenever it can and otherwise ends its turn; the other
//! seats are AI.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use hanyang::prelude::*;

/// Upper bound on manager round-trips before giving up.
const MAX_ROUNDTRIPS: usize = 2_000;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn seats(with_human: bool) -> Vec<Seat> {
    let first = if with_human {
        Seat::human(1, "You")
    } else {
        Seat::ai(1, "Yi", AiDifficulty::Easy)
    };
    vec![
        first,
        Seat::ai(2, "Kim", AiDifficulty::Medium),
        Seat::ai(3, "Park", AiDifficulty::Hard),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    hanyang::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let with_human = args.iter().any(|a| a == "--human");
    let seed = args
        .iter()
        .find_map(|a| a.parse::<u64>().ok())
        .unwrap_or_else(now_ms);

    let manager = RoomManager::new(Arc::new(Rules::reference()), RoomConfig::default());
    let game = manager.create_game(seats(with_human), now_ms()).await?;
    manager.start(game, seed, now_ms()).await?;
    tracing::info!(%game, seed, with_human, "match started");

    for _ in 0..MAX_ROUNDTRIPS {
        let state = manager.snapshot(game).await?;
        if state.is_finished() {
            break;
        }
        let on_turn = state.current_player;
        let human_turn = state.current().is_some_and(|p| !p.controller.is_ai());
        if human_turn {
            let valid = manager.valid_actions(game, on_turn).await?;
            let kind = valid
                .into_iter()
                .filter(|group| {
                    matches!(
                        group.action_type,
                        ActionType::SelectBlueprint | ActionType::PlaceTile
                    )
                })
                .flat_map(|group| group.options)
                .next()
                .unwrap_or(ActionKind::EndTurn);
            manager.submit(game, Action::new(on_turn, kind, now_ms())).await?;
        } else {
            manager.auto_play(game, now_ms()).await?;
        }
    }

    let result = manager.result(game).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    manager.destroy(game).await?;
    Ok(())
}
