use chrono::{DateTime, Utc};
use matchfall_engine::{GameStats, Position, Seed};
use serde::{Deserialize, Serialize};

use crate::model::level::{Level, LevelStatus};

/// Recorded play session with everything needed to replay it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    /// Timestamp when recording was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Seed driving the initial fill and every spawn
    pub seed: Seed,
    /// Level the session was played on
    pub level: Level,
    /// Swaps that reached the rules, in order. Requests rejected for bounds
    /// or adjacency are not recorded.
    pub swaps: Vec<SwapRecord>,
    /// Final game statistics at the time of recording
    pub final_stats: GameStats,
    pub final_status: LevelStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub a: Position,
    pub b: Position,
}
