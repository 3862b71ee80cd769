use super::round::random_word;
use super::Engine;
use crate::error::EngineResult;
use crate::protocol::EngineEvent;
use crate::types::*;

impl Engine {
    /// Move a session out of `from`. Returns `false` without touching the
    /// session when it already left `from` or its clock was cancelled.
    pub async fn advance(&self, session_id: &str, from: Phase) -> EngineResult<bool> {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.write().await;
        self.advance_locked(&mut session, from).await
    }

    /// Transition function. Caller holds the session's write lock.
    pub(crate) async fn advance_locked(&self, session: &mut Session, from: Phase) -> EngineResult<bool> {
        if session.clock.is_cancelled() || session.phase != from {
            tracing::debug!(
                "Ignoring advance of session {} from {:?} (now {:?})",
                session.id,
                from,
                session.phase
            );
            return Ok(false);
        }

        let next = match from {
            Phase::PickWord => {
                if session.current_word.is_some() || self.auto_pick_word(session) {
                    Phase::EnterClues
                } else {
                    tracing::warn!(
                        "No word candidates for session {}, ending the game",
                        session.id
                    );
                    Phase::EndGame
                }
            }
            Phase::EnterClues => {
                self.generate_bot_clues(session).await;
                Phase::VoteOnClues
            }
            Phase::VoteOnClues => {
                let voters = session.eligible_count();
                let eliminated = session.resolve_votes(voters);
                if !eliminated.is_empty() {
                    tracing::info!(
                        "Voted out {} clue(s) in session {}",
                        eliminated.len(),
                        session.id
                    );
                }
                Phase::EnterGuess
            }
            Phase::EnterGuess => {
                if session.guess.is_none() {
                    tracing::info!("No guess in session {}, counting as wrong", session.id);
                    session.guess_correct = false;
                }
                Phase::Transition
            }
            Phase::Transition => {
                session.rounds_played = (session.rounds_played + 1).min(session.rounds);
                if session.rounds_played < session.rounds {
                    let words = self
                        .collaborators
                        .words
                        .candidates(self.config.word_candidates);
                    session.start_next_round(words);
                    Phase::PickWord
                } else {
                    Phase::EndGame
                }
            }
            Phase::EndGame => {
                self.retire(session).await;
                return Ok(true);
            }
        };

        session.enter_phase(next);
        tracing::info!(
            "Session {} round {}: {:?} -> {:?}",
            session.id,
            session.round_no(),
            from,
            next
        );

        if next == Phase::Transition {
            self.score_round(session).await;
        }
        self.publish_phase(session);

        Ok(true)
    }

    /// Choose a word for a guesser who let the timer run out. Returns
    /// `false` when the word source has nothing to offer.
    fn auto_pick_word(&self, session: &mut Session) -> bool {
        if session.words.is_empty() {
            session.words = self
                .collaborators
                .words
                .candidates(self.config.word_candidates);
        }
        let Some(word) = random_word(&session.words) else {
            return false;
        };

        tracing::info!("Guesser did not pick in session {}, word chosen automatically", session.id);
        session.current_word = Some(word);
        true
    }

    /// Tear down a finished session
    async fn retire(&self, session: &mut Session) {
        session.clock.cancel();

        if let Err(e) = self
            .collaborators
            .lobbies
            .set_game_in_progress(&session.id, false)
            .await
        {
            tracing::warn!("Failed to clear in-progress flag of lobby {}: {}", session.id, e);
        }

        let result = LobbyScore {
            lobby_id: session.id.clone(),
            lobby_name: session.lobby_name.clone(),
            score: session.overall_score,
            players: session.participants.iter().map(|p| p.id.clone()).collect(),
            rounds: session.rounds_played,
            finished_at: chrono::Utc::now().to_rfc3339(),
        };
        if let Err(e) = self.collaborators.lobby_scores.record(result).await {
            tracing::warn!("Failed to record final score of lobby {}: {}", session.id, e);
        }

        self.sessions.write().await.remove(&session.id);
        // The clock task exits on its own once it sees the cancellation
        self.clocks.lock().await.remove(&session.id);

        tracing::info!(
            "Session {} ended after {} rounds, total score {}",
            session.id,
            session.rounds_played,
            session.overall_score
        );
        self.publish(EngineEvent::SessionEnded {
            session_id: session.id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::providers::{LobbyProvider, ProviderError, ProviderResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use crate::state::testing::*;
    use crate::suggest::StaticSuggestions;

    #[tokio::test]
    async fn test_stale_advance_is_noop() {
        let f = fixture(StaticSuggestions::new());
        let handle = f.engine.insert_session(session(Phase::EnterClues)).await;

        assert!(!f.engine.advance("1", Phase::PickWord).await.unwrap());
        assert_eq!(handle.read().await.phase, Phase::EnterClues);
    }

    #[tokio::test]
    async fn test_advance_twice_moves_once() {
        let f = fixture(StaticSuggestions::new());
        let handle = f.engine.insert_session(session(Phase::VoteOnClues)).await;

        assert!(f.engine.advance("1", Phase::VoteOnClues).await.unwrap());
        assert!(!f.engine.advance("1", Phase::VoteOnClues).await.unwrap());
        assert_eq!(handle.read().await.phase, Phase::EnterGuess);
    }

    #[tokio::test]
    async fn test_timeout_without_pick_chooses_word() {
        let f = fixture(StaticSuggestions::new());
        let handle = f.engine.insert_session(session(Phase::PickWord)).await;

        f.engine.advance("1", Phase::PickWord).await.unwrap();

        let s = handle.read().await;
        assert_eq!(s.phase, Phase::EnterClues);
        assert_eq!(s.current_word.as_deref(), Some("erdbeermarmeladebrot"));
    }

    #[tokio::test]
    async fn test_no_guess_scores_once_as_wrong() {
        let f = fixture(StaticSuggestions::new());
        let mut s = session(Phase::EnterGuess);
        s.current_word = Some("wars".to_string());
        s.entered_clues = vec![Clue::new("p2", "star", 10), Clue::new("p3", "light", 20)];
        let handle = f.engine.insert_session(s).await;
        let mut events = f.engine.subscribe();

        assert!(f.engine.advance("1", Phase::EnterGuess).await.unwrap());
        assert!(!f.engine.advance("1", Phase::EnterGuess).await.unwrap());

        let s = handle.read().await;
        assert_eq!(s.phase, Phase::Transition);
        assert!(!s.guess_correct);
        assert_eq!(s.participant("p2").unwrap().score, -15);
        assert_eq!(s.overall_score, -30);

        match events.recv().await.unwrap() {
            EngineEvent::Scores { overall_score, guess_correct, .. } => {
                assert_eq!(overall_score, -30);
                assert!(!guess_correct);
            }
            other => panic!("Expected scores first, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transition_starts_next_round() {
        let f = fixture(StaticSuggestions::new());
        let mut s = session(Phase::Transition);
        s.current_word = Some("wars".to_string());
        let handle = f.engine.insert_session(s).await;

        f.engine.advance("1", Phase::Transition).await.unwrap();

        let s = handle.read().await;
        assert_eq!(s.phase, Phase::PickWord);
        assert_eq!(s.rounds_played, 1);
        assert_eq!(s.round_no(), 2);
        assert_eq!(s.guesser, 1);
        assert!(s.current_word.is_none());
        assert_eq!(s.words.len(), 1);
    }

    #[tokio::test]
    async fn test_last_round_goes_to_end_game_then_retires() {
        let f = fixture(StaticSuggestions::new());
        let mut l = lobby("1", 0);
        l.game_in_progress = true;
        f.lobbies.insert(l).await;

        let mut s = session(Phase::Transition);
        s.rounds = 1;
        let handle = f.engine.insert_session(s).await;
        let mut events = f.engine.subscribe();

        f.engine.advance("1", Phase::Transition).await.unwrap();
        assert_eq!(handle.read().await.phase, Phase::EndGame);
        assert_eq!(handle.read().await.rounds_played, 1);

        assert!(f.engine.advance("1", Phase::EndGame).await.unwrap());
        assert!(handle.read().await.clock.is_cancelled());
        assert!(matches!(
            f.engine.status("1").await,
            Err(EngineError::NotFound(_))
        ));

        let lobby = f.lobbies.lobby("1").await.unwrap().unwrap();
        assert!(!lobby.game_in_progress);

        assert!(matches!(events.recv().await.unwrap(), EngineEvent::Phase { .. }));
        assert!(matches!(
            events.recv().await.unwrap(),
            EngineEvent::SessionEnded { .. }
        ));
    }

    #[tokio::test]
    async fn test_finished_game_records_lobby_score() {
        let f = fixture(StaticSuggestions::new());
        f.lobbies.insert(lobby("1", 0)).await;

        let mut s = session(Phase::EndGame);
        s.lobby_name = "Friday night".to_string();
        s.rounds_played = 13;
        s.participants[1].score = 20;
        s.participants[2].score = 40;
        s.recompute_overall_score();
        f.engine.insert_session(s).await;

        f.engine.advance("1", Phase::EndGame).await.unwrap();

        let board = f.lobby_scores.leaderboard().await;
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].lobby_id, "1");
        assert_eq!(board[0].lobby_name, "Friday night");
        assert_eq!(board[0].score, 60);
        assert_eq!(board[0].rounds, 13);
        assert_eq!(board[0].players, vec!["host", "p2", "p3"]);
    }

    /// Leaderboard that is always down
    struct OfflineBoard;

    #[async_trait]
    impl crate::providers::LobbyScoreStore for OfflineBoard {
        async fn record(&self, _score: LobbyScore) -> ProviderResult<()> {
            Err(ProviderError::Unavailable("leaderboard offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_leaderboard_failure_still_retires() {
        let f = fixture(StaticSuggestions::new());
        let mut l = lobby("1", 0);
        l.game_in_progress = true;
        f.lobbies.insert(l).await;

        let mut engine = fixture_with(StaticSuggestions::new(), f.users.clone());
        engine.collaborators.lobbies = f.lobbies.clone();
        engine.collaborators.lobby_scores = Arc::new(OfflineBoard);
        engine.insert_session(session(Phase::EndGame)).await;

        assert!(engine.advance("1", Phase::EndGame).await.unwrap());
        assert!(engine.status("1").await.is_err());
        assert!(!f.lobbies.lobby("1").await.unwrap().unwrap().game_in_progress);
    }

    #[tokio::test]
    async fn test_empty_word_source_ends_game() {
        let f = fixture_with_words(StaticSuggestions::new(), Vec::new());
        let mut l = lobby("1", 0);
        l.game_in_progress = true;
        f.lobbies.insert(l).await;

        let mut s = session(Phase::PickWord);
        s.words.clear();
        let handle = f.engine.insert_session(s).await;

        assert!(f.engine.advance("1", Phase::PickWord).await.unwrap());
        assert_eq!(handle.read().await.phase, Phase::EndGame);
        assert!(handle.read().await.current_word.is_none());

        f.engine.advance("1", Phase::EndGame).await.unwrap();
        assert!(f.engine.status("1").await.is_err());
        assert!(!f.lobbies.lobby("1").await.unwrap().unwrap().game_in_progress);
    }

    #[tokio::test]
    async fn test_cancelled_session_does_not_advance() {
        let f = fixture(StaticSuggestions::new());
        let handle = f.engine.insert_session(session(Phase::EnterGuess)).await;
        handle.read().await.clock.cancel();

        assert!(!f.engine.advance("1", Phase::EnterGuess).await.unwrap());
        assert_eq!(handle.read().await.phase, Phase::EnterGuess);
    }
}
