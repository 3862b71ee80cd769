mod bots;
mod game;
mod player;
mod round;
mod score;
mod submission;
mod vote;

use crate::clock::spawn_round_clock;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::protocol::{EngineEvent, SessionStatus};
use crate::providers::{LobbyProvider, LobbyScoreStore, UserStore, WordListProvider};
use crate::suggest::{ClueSuggestionProvider, SuggestConfig};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

pub use score::RoundDelta;
pub use submission::ClueVerdict;

/// A session behind its own lock. All mutations happen under the write lock.
pub type SharedSession = Arc<RwLock<Session>>;

/// External services the engine depends on
pub struct Collaborators {
    pub lobbies: Arc<dyn LobbyProvider>,
    pub users: Arc<dyn UserStore>,
    /// Receives the final score of every finished game
    pub lobby_scores: Arc<dyn LobbyScoreStore>,
    pub words: Arc<dyn WordListProvider>,
    /// Bots stay silent when no provider is configured
    pub suggestions: Option<Arc<dyn ClueSuggestionProvider>>,
    pub suggest_config: SuggestConfig,
}

/// The round engine: owns every running session and its clock
pub struct Engine {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    clocks: Mutex<HashMap<SessionId, JoinHandle<()>>>,
    collaborators: Collaborators,
    config: EngineConfig,
    /// Broadcast channel for phase and score updates
    events: broadcast::Sender<EngineEvent>,
}

impl Engine {
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            sessions: RwLock::new(HashMap::new()),
            clocks: Mutex::new(HashMap::new()),
            collaborators,
            config,
            events: tx,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Ignore send errors (no subscribers is fine)
    pub(crate) fn publish(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn publish_phase(&self, session: &Session) {
        let now = chrono::Utc::now();
        let dwell = self.config.durations.max_dwell(session.phase);
        let deadline = now + chrono::Duration::seconds(dwell as i64);

        self.publish(EngineEvent::Phase {
            session_id: session.id.clone(),
            phase: session.phase,
            round_no: session.round_no(),
            server_now: now.to_rfc3339(),
            deadline: deadline.to_rfc3339(),
        });
    }

    /// Look up a running session. The index lock is released before returning.
    pub async fn session_handle(&self, session_id: &str) -> EngineResult<SharedSession> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found(format!("Session {} not found", session_id)))
    }

    pub async fn status(&self, session_id: &str) -> EngineResult<SessionStatus> {
        let handle = self.session_handle(session_id).await?;
        let session = handle.read().await;
        Ok(SessionStatus::from_session(&session, &self.config.durations))
    }

    /// Snapshots of all running sessions
    pub async fn sessions(&self) -> Vec<SessionStatus> {
        let handles: Vec<SharedSession> = self.sessions.read().await.values().cloned().collect();

        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            let session = handle.read().await;
            out.push(SessionStatus::from_session(&session, &self.config.durations));
        }
        out.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        out
    }

    /// Start a match for a lobby and spawn its clock
    pub async fn start_session(self: &Arc<Self>, lobby_id: &str) -> EngineResult<SessionStatus> {
        let lobby = self
            .collaborators
            .lobbies
            .lobby(lobby_id)
            .await?
            .ok_or_else(|| EngineError::not_found(format!("Lobby {} not found", lobby_id)))?;

        if lobby.members.is_empty() {
            return Err(EngineError::invalid("Lobby has no players"));
        }
        if lobby.rounds == 0 {
            return Err(EngineError::invalid("Lobby must be configured with at least one round"));
        }

        let participants = lobby
            .members
            .iter()
            .map(|m| {
                let mut p = Participant::new(m.id.clone(), m.token.clone());
                p.display_name = m.display_name.clone();
                p
            })
            .collect();

        let mut session = Session::new(lobby.id.clone(), participants, lobby.rounds);
        session.double_clue = lobby.double_clue;
        session.lobby_name = lobby.name.clone();
        session.words = self
            .collaborators
            .words
            .candidates(self.config.word_candidates);

        let clock = session.clock.clone();
        let status = SessionStatus::from_session(&session, &self.config.durations);

        {
            let mut sessions = self.sessions.write().await;
            if sessions.contains_key(&lobby.id) {
                return Err(EngineError::invalid(format!(
                    "A game is already running for lobby {}",
                    lobby.id
                )));
            }
            self.publish_phase(&session);
            sessions.insert(lobby.id.clone(), Arc::new(RwLock::new(session)));
        }

        if let Err(e) = self
            .collaborators
            .lobbies
            .set_game_in_progress(&lobby.id, true)
            .await
        {
            tracing::warn!("Failed to mark lobby {} as in progress: {}", lobby.id, e);
        }

        let task = spawn_round_clock(self.clone(), lobby.id.clone(), clock);
        self.clocks.lock().await.insert(lobby.id.clone(), task);

        tracing::info!(
            "Started session {} with {} players, {} bots, {} rounds{}",
            lobby.id,
            lobby.members.len(),
            lobby.bot_count,
            lobby.rounds,
            if lobby.double_clue { " (double clue)" } else { "" }
        );

        Ok(status)
    }

    /// Stop every clock and wait for the tasks to finish
    pub async fn shutdown(&self) {
        let handles: Vec<SharedSession> = self.sessions.read().await.values().cloned().collect();
        for handle in handles {
            handle.read().await.clock.cancel();
        }

        let tasks: Vec<JoinHandle<()>> = self.clocks.lock().await.drain().map(|(_, t)| t).collect();
        let count = tasks.len();
        futures::future::join_all(tasks).await;
        tracing::info!("Stopped {} session clocks", count);
    }

    /// Register a session without a clock. Lets tests drive transitions by hand.
    #[cfg(test)]
    pub(crate) async fn insert_session(&self, session: Session) -> SharedSession {
        let handle = Arc::new(RwLock::new(session));
        let id = handle.read().await.id.clone();
        self.sessions.write().await.insert(id, handle.clone());
        handle
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::providers::{InMemoryLobbies, InMemoryLobbyScores, InMemoryUsers, WordList};
    use crate::suggest::StaticSuggestions;

    pub struct Fixture {
        pub engine: Arc<Engine>,
        pub lobbies: Arc<InMemoryLobbies>,
        pub users: Arc<InMemoryUsers>,
        pub lobby_scores: Arc<InMemoryLobbyScores>,
    }

    pub fn fixture_with(suggestions: StaticSuggestions, users: Arc<dyn UserStore>) -> Engine {
        Engine::new(
            EngineConfig::default(),
            Collaborators {
                lobbies: Arc::new(InMemoryLobbies::new()),
                users,
                lobby_scores: Arc::new(InMemoryLobbyScores::new()),
                words: Arc::new(WordList::new(vec!["Erdbeermarmeladebrot".to_string()])),
                suggestions: Some(Arc::new(suggestions)),
                suggest_config: SuggestConfig::default(),
            },
        )
    }

    pub fn fixture(suggestions: StaticSuggestions) -> Fixture {
        fixture_with_words(suggestions, vec!["Erdbeermarmeladebrot".to_string()])
    }

    pub fn fixture_with_words(suggestions: StaticSuggestions, words: Vec<String>) -> Fixture {
        let lobbies = Arc::new(InMemoryLobbies::new());
        let users = Arc::new(InMemoryUsers::new());
        let lobby_scores = Arc::new(InMemoryLobbyScores::new());
        let engine = Engine::new(
            EngineConfig::default(),
            Collaborators {
                lobbies: lobbies.clone(),
                users: users.clone(),
                lobby_scores: lobby_scores.clone(),
                words: Arc::new(WordList::new(words)),
                suggestions: Some(Arc::new(suggestions)),
                suggest_config: SuggestConfig::default(),
            },
        );
        Fixture {
            engine: Arc::new(engine),
            lobbies,
            users,
            lobby_scores,
        }
    }

    /// Host (guesser) plus two clue givers, in the given phase
    pub fn session(phase: Phase) -> Session {
        let mut session = Session::new(
            "1",
            vec![
                Participant::new("host", "hostToken"),
                Participant::new("p2", "token2"),
                Participant::new("p3", "token3"),
            ],
            13,
        );
        session.words = vec!["Erdbeermarmeladebrot".to_string()];
        session.phase = phase;
        session
    }

    pub fn lobby(id: &str, bot_count: u32) -> Lobby {
        Lobby {
            id: id.to_string(),
            name: format!("Lobby {}", id),
            host_token: "hostToken".to_string(),
            members: vec![
                LobbyMember {
                    id: "host".to_string(),
                    token: "hostToken".to_string(),
                    display_name: Some("Host".to_string()),
                },
                LobbyMember {
                    id: "p2".to_string(),
                    token: "token2".to_string(),
                    display_name: None,
                },
            ],
            bot_count,
            rounds: 2,
            is_private: false,
            double_clue: false,
            game_in_progress: false,
        }
    }
}
