mod identity;
mod leaderboard;
mod question;

pub use identity::Identity;
pub use leaderboard::LeaderboardEntry;
pub use question::Question;
