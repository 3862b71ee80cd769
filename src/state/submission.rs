use super::Engine;
use crate::error::{EngineError, EngineResult};
use crate::protocol::ClueInput;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Outcome of validating one clue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClueVerdict {
    Accepted,
    /// Collided with the secret word or an active clue
    Rejected,
}

impl Session {
    /// Run a clue through validation and file it as active or invalid.
    ///
    /// A clue colliding with the secret word or with any active clue goes
    /// straight to the invalid set and never becomes active. Either way the
    /// clue is recorded in its author's history.
    pub fn record_clue(&mut self, clue: Clue) -> ClueVerdict {
        let names_word = self
            .current_word
            .as_deref()
            .map(|w| clue.matches(w))
            .unwrap_or(false);

        let verdict = if names_word || self.entered_clues.contains(&clue) {
            if !self.invalid_clues.contains(&clue) {
                self.invalid_clues.push(clue.clone());
            }
            ClueVerdict::Rejected
        } else {
            self.entered_clues.push(clue.clone());
            ClueVerdict::Accepted
        };

        if let Some(author) = self.participant_mut(&clue.player_id) {
            author.clues.push(clue);
        }
        verdict
    }
}

impl Engine {
    /// Submit a player's clue (or both clues in double-clue games)
    pub async fn submit_clue(
        &self,
        session_id: &str,
        player_id: &str,
        input: ClueInput,
    ) -> EngineResult<Vec<ClueVerdict>> {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.write().await;

        session.require_phase(Phase::EnterClues, "Clue")?;
        let idx = session.authorize_clue_giver(player_id, &input.player_token)?;
        if session.participants[idx].clue_is_sent {
            return Err(EngineError::unauthorized("Clue already sent this round"));
        }

        let texts = match (session.double_clue, input.clue2) {
            (true, Some(second)) => vec![input.clue, second],
            (true, None) => {
                return Err(EngineError::invalid("Two clues are required in this game"))
            }
            (false, Some(_)) => return Err(EngineError::invalid("Exactly one clue is required")),
            (false, None) => vec![input.clue],
        };
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EngineError::invalid("Clue cannot be empty"));
        }

        let time_needed = session.phase_elapsed();
        let verdicts: Vec<ClueVerdict> = texts
            .iter()
            .map(|text| session.record_clue(Clue::new(player_id, text, time_needed)))
            .collect();
        session.participants[idx].clue_is_sent = true;

        tracing::info!(
            "Player {} sent {} clue(s) in session {}: {:?}",
            player_id,
            verdicts.len(),
            session.id,
            verdicts
        );

        if session.all_clues_sent() {
            self.advance_locked(&mut session, Phase::EnterClues).await?;
        }

        Ok(verdicts)
    }
}
