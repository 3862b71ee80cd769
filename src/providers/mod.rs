//! Boundary contracts for the collaborators the engine talks to.
//!
//! Lobby and user data live in the surrounding application; the engine only
//! sees them through these traits. In-memory implementations are provided for
//! the binary and for tests.

mod memory;
mod words;

use crate::types::{Lobby, LobbyScore, PlayerId};
use async_trait::async_trait;
use std::time::Duration;

pub use memory::{InMemoryLobbies, InMemoryLobbyScores, InMemoryUsers};
pub use words::WordList;

/// Result type for collaborator lookups
pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Collaborator timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed data: {0}")]
    Parse(String),
}

/// Read access to lobbies plus the one flag the engine owns
#[async_trait]
pub trait LobbyProvider: Send + Sync {
    async fn lobby(&self, lobby_id: &str) -> ProviderResult<Option<Lobby>>;

    async fn set_game_in_progress(&self, lobby_id: &str, in_progress: bool) -> ProviderResult<()>;
}

/// Lifetime scores of users, outliving a single match
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stored score, or None for a user the store has never seen
    async fn score(&self, user_id: &PlayerId) -> ProviderResult<Option<i64>>;

    async fn set_score(&self, user_id: &PlayerId, score: i64) -> ProviderResult<()>;
}

/// Leaderboard of finished games
#[async_trait]
pub trait LobbyScoreStore: Send + Sync {
    async fn record(&self, score: LobbyScore) -> ProviderResult<()>;
}

/// Source of secret word candidates
pub trait WordListProvider: Send + Sync {
    fn candidates(&self, count: usize) -> Vec<String>;
}
