//! Room configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every game actor a manager spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Bounded command queue per game. Callers wait when it is full.
    pub channel_size: usize,

    /// Upper bound on AI turns finished per auto-play invocation. Keep
    /// it at or above the number of AI seats so a human move is always
    /// answered all the way back to a human seat.
    pub ai_max_turns: usize,

    /// Upper bound on actions within one AI turn, counting the closing
    /// `end_turn`. The seat is made to end its turn when it reaches it.
    pub ai_max_actions_per_turn: usize,

    /// Run auto-play after every accepted action and after start, so
    /// AI seats take their turns without an explicit request.
    pub auto_play_ai: bool,

    /// Capacity of the event broadcast. Slow subscribers that fall
    /// further behind than this observe a lag and skip ahead.
    pub event_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            ai_max_turns: 8,
            ai_max_actions_per_turn: 16,
            auto_play_ai: true,
            event_capacity: 256,
        }
    }
}
