use super::Engine;
use crate::error::{EngineError, EngineResult};
use crate::protocol::VoteInput;
use crate::types::*;
use std::collections::HashSet;

impl Session {
    /// Add one tally entry per distinct ballot text that names an active clue.
    /// Returns the number of entries added.
    pub fn register_ballot(&mut self, texts: &[String]) -> usize {
        let mut seen = HashSet::new();
        let mut added = 0;

        for text in texts {
            if !seen.insert(normalize(text)) {
                continue;
            }
            if let Some(clue) = self.entered_clues.iter().find(|c| c.matches(text)).cloned() {
                self.votes.push(clue);
                added += 1;
            }
        }
        added
    }

    /// Resolve the tally. Clues reaching a strict majority of `num_voters`
    /// leave the active set and are filed as invalid; all other votes are
    /// discarded. Returns the eliminated clues.
    pub fn resolve_votes(&mut self, num_voters: usize) -> Vec<Clue> {
        let threshold = num_voters / 2 + 1;

        // First-vote order keeps the invalid list stable
        let mut tally: Vec<(Clue, usize)> = Vec::new();
        for vote in self.votes.drain(..) {
            match tally.iter_mut().find(|(clue, _)| *clue == vote) {
                Some((_, count)) => *count += 1,
                None => tally.push((vote, 1)),
            }
        }

        let mut eliminated = Vec::new();
        for (clue, count) in tally {
            if count < threshold {
                continue;
            }
            self.entered_clues.retain(|c| *c != clue);
            if !self.invalid_clues.contains(&clue) {
                self.invalid_clues.push(clue.clone());
            }
            eliminated.push(clue);
        }
        eliminated
    }
}

impl Engine {
    /// Cast a ballot listing clues the player considers invalid
    pub async fn cast_vote(
        &self,
        session_id: &str,
        player_id: &str,
        input: VoteInput,
    ) -> EngineResult<bool> {
        let handle = self.session_handle(session_id).await?;
        let mut session = handle.write().await;

        session.require_phase(Phase::VoteOnClues, "Vote")?;
        let idx = session.authorize_clue_giver(player_id, &input.player_token)?;
        if session.participants[idx].voted {
            return Err(EngineError::unauthorized("Already voted this round"));
        }

        let added = session.register_ballot(&input.invalid_clues);
        session.participants[idx].voted = true;
        tracing::info!(
            "Player {} voted against {} clue(s) in session {}",
            player_id,
            added,
            session.id
        );

        if session.all_voted() {
            self.advance_locked(&mut session, Phase::VoteOnClues).await?;
        }

        Ok(true)
    }
}
