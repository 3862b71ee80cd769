use super::*;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Lobby provider backed by a map, optionally seeded from a JSON file
#[derive(Debug, Default)]
pub struct InMemoryLobbies {
    lobbies: RwLock<HashMap<String, Lobby>>,
}

impl InMemoryLobbies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of lobbies
    pub fn from_json_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ProviderError::Unavailable(format!(
                "Failed to read lobby file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let lobbies: Vec<Lobby> =
            serde_json::from_str(&raw).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(Self {
            lobbies: RwLock::new(lobbies.into_iter().map(|l| (l.id.clone(), l)).collect()),
        })
    }

    pub async fn insert(&self, lobby: Lobby) {
        self.lobbies.write().await.insert(lobby.id.clone(), lobby);
    }

    pub async fn len(&self) -> usize {
        self.lobbies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lobbies.read().await.is_empty()
    }
}

#[async_trait]
impl LobbyProvider for InMemoryLobbies {
    async fn lobby(&self, lobby_id: &str) -> ProviderResult<Option<Lobby>> {
        Ok(self.lobbies.read().await.get(lobby_id).cloned())
    }

    async fn set_game_in_progress(&self, lobby_id: &str, in_progress: bool) -> ProviderResult<()> {
        let mut lobbies = self.lobbies.write().await;
        match lobbies.get_mut(lobby_id) {
            Some(lobby) => {
                lobby.game_in_progress = in_progress;
                Ok(())
            }
            None => Err(ProviderError::Unavailable(format!(
                "Lobby {} not found",
                lobby_id
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUsers {
    scores: RwLock<HashMap<PlayerId, i64>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn score(&self, user_id: &PlayerId) -> ProviderResult<Option<i64>> {
        Ok(self.scores.read().await.get(user_id).copied())
    }

    async fn set_score(&self, user_id: &PlayerId, score: i64) -> ProviderResult<()> {
        self.scores.write().await.insert(user_id.clone(), score);
        Ok(())
    }
}

/// Leaderboard kept in memory, best game first
#[derive(Debug, Default)]
pub struct InMemoryLobbyScores {
    scores: RwLock<Vec<LobbyScore>>,
}

impl InMemoryLobbyScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn leaderboard(&self) -> Vec<LobbyScore> {
        self.scores.read().await.clone()
    }
}

#[async_trait]
impl LobbyScoreStore for InMemoryLobbyScores {
    async fn record(&self, score: LobbyScore) -> ProviderResult<()> {
        let mut scores = self.scores.write().await;
        // Ties keep the earlier game first
        let pos = scores.partition_point(|s| s.score >= score.score);
        scores.insert(pos, score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_lobbies_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"l1","host_token":"h","members":[{{"id":"p1","token":"t1"}}],"bot_count":1,"rounds":3}}]"#
        )
        .unwrap();

        let lobbies = InMemoryLobbies::from_json_file(file.path()).unwrap();
        let lobby = lobbies.lobby("l1").await.unwrap().unwrap();
        assert_eq!(lobby.bot_count, 1);
        assert_eq!(lobby.members.len(), 1);
        assert!(!lobby.double_clue);
        assert!(!lobby.game_in_progress);
    }

    #[tokio::test]
    async fn test_lobbies_from_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = InMemoryLobbies::from_json_file(file.path());
        assert!(matches!(result, Err(ProviderError::Parse(_))));
    }

    #[tokio::test]
    async fn test_set_game_in_progress_unknown_lobby() {
        let lobbies = InMemoryLobbies::new();
        assert!(lobbies.set_game_in_progress("nope", false).await.is_err());
    }

    #[tokio::test]
    async fn test_users_absent_then_stored() {
        let users = InMemoryUsers::new();
        let id = "u1".to_string();
        assert_eq!(users.score(&id).await.unwrap(), None);
        users.set_score(&id, 42).await.unwrap();
        assert_eq!(users.score(&id).await.unwrap(), Some(42));
    }

    fn entry(lobby_id: &str, score: i64) -> LobbyScore {
        LobbyScore {
            lobby_id: lobby_id.to_string(),
            lobby_name: format!("Lobby {}", lobby_id),
            score,
            players: vec!["p1".to_string()],
            rounds: 1,
            finished_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_score() {
        let board = InMemoryLobbyScores::new();
        board.record(entry("a", 10)).await.unwrap();
        board.record(entry("b", 40)).await.unwrap();
        board.record(entry("c", -5)).await.unwrap();
        board.record(entry("d", 10)).await.unwrap();

        let ids: Vec<_> = board
            .leaderboard()
            .await
            .into_iter()
            .map(|s| s.lobby_id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "d", "c"]);
    }
}
