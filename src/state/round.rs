use super::Engine;
use crate::error::{EngineError, EngineResult};
use crate::protocol::GuessInput;
use crate::types::*;
use rand::seq::IndexedRandom;

/// Random pick among the offered words
pub(crate) fn random_word(words: &[String]) -> Option<String> {
    let mut rng = rand::rng();
    words.choose(&mut rng).map(|w| normalize(w))
}

impl Session {
    /// Rotate the guesser and clear everything that belongs to a single round
    pub(crate) fn start_next_round(&mut self, words: Vec<String>) {
        if !self.participants.is_empty() {
            self.guesser = (self.guesser + 1) % self.participants.len();
        }
        self.words = words;
        self.current_word = None;
        self.entered_clues.clear();
        self.invalid_clues.clear();
        self.votes.clear();
        self.guess = None;
        self.guess_seconds = None;
        self.guess_correct = false;
        self.bots_sent = false;

        for p in &mut self.participants {
            p.clue_is_sent = false;
            p.voted = false;
        }
    }
}

impl Engine {
    /// Guesser chooses the secret word. `None` picks a random candidate.
    pub async fn pick_word(
        &self,
        session_id: &str,
        player_token: &str,
        choice: Option<usize>,
    ) -> EngineResult<String> {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.write().await;

        session.require_phase(Phase::PickWord, "Word choice")?;
        session.authorize_guesser(player_token)?;

        let word = match choice {
            Some(i) => session
                .words
                .get(i)
                .map(|w| normalize(w))
                .ok_or_else(|| EngineError::invalid(format!("No word candidate at index {}", i)))?,
            None => random_word(&session.words)
                .ok_or_else(|| EngineError::invalid("No word candidates available"))?,
        };

        tracing::info!("Word picked for round {} of session {}", session.round_no(), session.id);
        session.current_word = Some(word.clone());
        self.advance_locked(&mut session, Phase::PickWord).await?;

        Ok(word)
    }

    /// Record the guesser's single guess. The clock moves the round on.
    pub async fn submit_guess(&self, session_id: &str, input: GuessInput) -> EngineResult<bool> {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.write().await;

        session.require_phase(Phase::EnterGuess, "Guess")?;
        session.authorize_guesser(&input.player_token)?;
        if session.guess.is_some() {
            return Err(EngineError::unauthorized("Already guessed this round"));
        }
        if input.guess.trim().is_empty() {
            return Err(EngineError::invalid("Guess cannot be empty"));
        }

        let correct = session
            .current_word
            .as_deref()
            .map(|w| normalize(w) == normalize(&input.guess))
            .unwrap_or(false);

        session.guess_seconds = Some(session.phase_elapsed());
        session.guess = Some(input.guess.trim().to_string());
        session.guess_correct = correct;

        tracing::info!(
            "Guess in session {} was {}",
            session.id,
            if correct { "correct" } else { "wrong" }
        );
        Ok(correct)
    }
}
