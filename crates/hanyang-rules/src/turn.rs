//! Turn/round controller.
//!
//! Runs inside the applier on the cloned state, after `end_turn` or
//! `pass` has been accepted. Nothing here validates; every failure is an
//! invariant violation.

use hanyang_protocol::PlayerId;

use crate::RulesError;
use crate::action::Effect;
use crate::catalog::Catalog;
use crate::config::{ApprenticeRecall, RulesConfig};
use crate::ledger::{Resources, WorkerKind};
use crate::scoring;
use crate::state::{Game, GameStatus};

fn broken(msg: impl Into<String>) -> RulesError {
    RulesError::InvariantViolation(msg.into())
}

/// Collects production for `player`: each of their workers on a
/// producing building yields that building's resource, clamped to caps.
pub(crate) fn produce(
    catalog: &Catalog,
    config: &RulesConfig,
    game: &mut Game,
    player: PlayerId,
    effects: &mut Vec<Effect>,
) -> Result<(), RulesError> {
    let yields: Vec<_> = game
        .board
        .tiles()
        .filter_map(|(_, placed)| {
            let resource = catalog.category(&placed.tile)?.produces()?;
            Some(placed.workers.iter().filter(move |w| w.player == player).map(move |w| {
                let amount = match w.kind {
                    WorkerKind::Apprentice => config.apprentice_yield,
                    WorkerKind::Official => config.official_yield,
                };
                (resource, amount)
            }))
        })
        .flatten()
        .collect();

    let holder = game
        .player_mut(player)
        .ok_or_else(|| broken(format!("{player} vanished during production")))?;
    let mut produced = Resources::default();
    for (resource, amount) in yields {
        let added = holder.resources.add_capped(resource, amount, &config.resource_caps);
        produced.add(resource, added);
    }
    if produced.total() > 0 {
        effects.push(Effect::ResourcesProduced { player, produced });
    }
    Ok(())
}

/// Returns every apprentice `player` has on the board to their pool.
pub(crate) fn recall_apprentices(game: &mut Game, player: PlayerId) -> Result<u32, RulesError> {
    let mut count = 0u32;
    for placed in game.board.tiles_mut() {
        let before = placed.workers.len();
        placed
            .workers
            .retain(|w| !(w.player == player && w.kind == WorkerKind::Apprentice));
        count += (before - placed.workers.len()) as u32;
    }
    let holder = game
        .player_mut(player)
        .ok_or_else(|| broken(format!("{player} vanished during recall")))?;
    if !holder.workers.apprentices.try_release(count) {
        return Err(broken(format!(
            "{player} had {count} apprentices on the board but only {} placed",
            holder.workers.apprentices.placed
        )));
    }
    Ok(count)
}

fn recall_into(
    game: &mut Game,
    player: PlayerId,
    effects: &mut Vec<Effect>,
) -> Result<(), RulesError> {
    let count = recall_apprentices(game, player)?;
    if count > 0 {
        effects.push(Effect::ApprenticesRecalled { player, count });
    }
    Ok(())
}

/// Round-boundary upkeep: apprentice recall (under the round-end
/// policy) and rotating the market.
fn end_round(
    config: &RulesConfig,
    game: &mut Game,
    effects: &mut Vec<Effect>,
) -> Result<(), RulesError> {
    if config.apprentice_recall == ApprenticeRecall::RoundEnd {
        for player in game.turn_order.clone() {
            recall_into(game, player, effects)?;
        }
    }
    let n = config.discard_per_round.min(game.draw_pool.len());
    if n > 0 {
        let tiles: Vec<_> = game.draw_pool.drain(..n).collect();
        game.discard_pile.extend(tiles.iter().cloned());
        effects.push(Effect::MarketDiscarded { tiles });
    }
    Ok(())
}

/// Moves the turn pointer past the current player, handling round
/// boundaries and game end.
pub(crate) fn advance(
    catalog: &Catalog,
    config: &RulesConfig,
    game: &mut Game,
    now: u64,
    effects: &mut Vec<Effect>,
) -> Result<(), RulesError> {
    let seats = game.turn_order.len();
    let idx = game
        .turn_order
        .iter()
        .position(|p| *p == game.current_player)
        .ok_or_else(|| broken(format!("current player {} is not seated", game.current_player)))?;
    let next = (idx + 1) % seats;

    if next == 0 {
        game.current_round += 1;
        if game.current_round > game.total_rounds {
            return finish(catalog, config, game, now, effects);
        }
        effects.push(Effect::RoundChanged {
            round: game.current_round,
        });
        end_round(config, game, effects)?;
    }

    if config.end_on_empty_pool && game.draw_pool.is_empty() {
        return finish(catalog, config, game, now, effects);
    }

    let upcoming = game.turn_order[next];
    game.current_player = upcoming;
    if config.apprentice_recall == ApprenticeRecall::OwnerTurnStart {
        recall_into(game, upcoming, effects)?;
    }
    effects.push(Effect::TurnChanged {
        current_player: upcoming,
        round: game.current_round,
    });
    Ok(())
}

/// Terminal transition. Ranks once and freezes the result on the game.
fn finish(
    catalog: &Catalog,
    config: &RulesConfig,
    game: &mut Game,
    now: u64,
    effects: &mut Vec<Effect>,
) -> Result<(), RulesError> {
    if !game.status.can_transition_to(GameStatus::Finished) {
        return Err(broken(format!("cannot finish a game that is {}", game.status)));
    }
    game.status = GameStatus::Finished;
    game.finished_at = Some(now);

    let rankings = scoring::rank(catalog, config, game);
    for row in &rankings {
        if let Some(player) = game.player_mut(row.player_id) {
            player.score = row.breakdown.total;
        }
    }
    game.rankings = Some(rankings.clone());

    let winner = rankings.first().map(|r| r.player_id);
    tracing::debug!(game_id = %game.id, ?winner, round = game.current_round, "game finished");
    effects.push(Effect::GameEnded { winner, rankings });
    Ok(())
}
