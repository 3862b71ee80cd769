use super::Engine;
use crate::config::EngineConfig;
use crate::protocol::{EngineEvent, PlayerScore};
use crate::providers::ProviderResult;
use crate::types::*;
use serde::Serialize;

/// Score change for one clue author
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundDelta {
    pub player_id: PlayerId,
    pub delta: i64,
}

impl Session {
    /// Participants owning at least one active clue, with the time of their
    /// first active clue
    pub fn clue_authors(&self) -> Vec<(PlayerId, u64)> {
        let mut authors: Vec<(PlayerId, u64)> = Vec::new();
        for clue in &self.entered_clues {
            if self.participant(&clue.player_id).is_none() {
                continue;
            }
            if authors.iter().any(|(id, _)| *id == clue.player_id) {
                continue;
            }
            authors.push((clue.player_id.clone(), clue.time_needed));
        }
        authors
    }

    /// Deltas for the round that just ended
    pub fn round_deltas(&self, config: &EngineConfig) -> Vec<RoundDelta> {
        let authors = self.clue_authors();
        if authors.is_empty() {
            return Vec::new();
        }

        if self.guess_correct {
            let multiplier = if self.double_clue {
                config.reward_factor * config.special_reward_multiplier
            } else {
                config.reward_factor
            };
            authors
                .into_iter()
                .map(|(player_id, time)| RoundDelta {
                    player_id,
                    delta: time as i64 * multiplier,
                })
                .collect()
        } else {
            let total: u64 = authors.iter().map(|(_, t)| t).sum();
            let mut penalty = -((total / authors.len() as u64) as i64);
            if self.double_clue {
                penalty *= config.special_penalty_multiplier;
            }
            authors
                .into_iter()
                .map(|(player_id, _)| RoundDelta {
                    player_id,
                    delta: penalty,
                })
                .collect()
        }
    }
}

impl Engine {
    /// Apply the round's deltas once. Authors whose stored score cannot be
    /// updated keep their previous score.
    pub(crate) async fn score_round(&self, session: &mut Session) {
        let round = session.round_no();
        if session.scored_round == Some(round) {
            tracing::debug!("Round {} of session {} already scored", round, session.id);
            return;
        }
        session.scored_round = Some(round);

        for d in session.round_deltas(&self.config) {
            match self.persist_delta(&d).await {
                Ok(total) => {
                    if let Some(p) = session.participant_mut(&d.player_id) {
                        p.score += d.delta;
                    }
                    tracing::debug!("{} scored {} (lifetime {})", d.player_id, d.delta, total);
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping score for {} in session {}: {}",
                        d.player_id,
                        session.id,
                        e
                    );
                }
            }
        }

        session.recompute_overall_score();
        tracing::info!(
            "Scored round {} of session {} (guess correct: {}, total {})",
            round,
            session.id,
            session.guess_correct,
            session.overall_score
        );

        self.publish(EngineEvent::Scores {
            session_id: session.id.clone(),
            players: session.participants.iter().map(PlayerScore::from).collect(),
            overall_score: session.overall_score,
            guess_correct: session.guess_correct,
            guess_seconds: session.guess_seconds,
        });
    }

    async fn persist_delta(&self, d: &RoundDelta) -> ProviderResult<i64> {
        let users = &self.collaborators.users;
        let stored = users.score(&d.player_id).await?.unwrap_or(0);
        users.set_score(&d.player_id, stored + d.delta).await?;
        Ok(stored + d.delta)
    }
}
