use serde::{Deserialize, Serialize};

/// Entry in the leaderboard. Order is the rank assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    /// Some deployments send `rank` in place of `score`.
    #[serde(alias = "rank", default)]
    pub score: i64,
}
