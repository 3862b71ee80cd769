use super::Engine;
use crate::types::*;

impl Session {
    /// First candidate that collides with neither the secret word nor any
    /// active or invalid clue
    pub fn pick_bot_clue<'a>(&self, candidates: &'a [String]) -> Option<&'a String> {
        candidates.iter().find(|candidate| {
            let lookup = Clue::lookup(candidate);
            let names_word = self
                .current_word
                .as_deref()
                .map(|w| lookup.matches(w))
                .unwrap_or(false);

            !lookup.text.is_empty()
                && !names_word
                && !self.entered_clues.contains(&lookup)
                && !self.invalid_clues.contains(&lookup)
        })
    }
}

impl Engine {
    /// Fill the lobby's bot seats with suggested clues, at most once per round.
    /// Lobby or provider failures leave the bots silent for the round.
    pub(crate) async fn generate_bot_clues(&self, session: &mut Session) {
        if session.bots_sent {
            return;
        }
        session.bots_sent = true;

        let Some(word) = session.current_word.clone() else {
            return;
        };
        let Some(provider) = &self.collaborators.suggestions else {
            tracing::debug!("No clue provider configured, bots stay silent");
            return;
        };

        let bot_count = match self.collaborators.lobbies.lobby(&session.id).await {
            Ok(Some(lobby)) => lobby.bot_count,
            Ok(None) => {
                tracing::warn!("Lobby {} vanished, skipping bot clues", session.id);
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to read lobby {}, skipping bot clues: {}", session.id, e);
                return;
            }
        };
        if bot_count == 0 {
            return;
        }

        let request = self.collaborators.suggest_config.request(&word);
        let candidates = match provider.suggest(request).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    "{} suggestions failed for session {}: {}",
                    provider.name(),
                    session.id,
                    e
                );
                return;
            }
        };

        let time_needed = session.phase_elapsed();
        for i in 0..bot_count {
            let Some(text) = session.pick_bot_clue(&candidates).cloned() else {
                tracing::warn!(
                    "Ran out of bot clues for session {} after {} of {}",
                    session.id,
                    i,
                    bot_count
                );
                break;
            };
            let clue = Clue::new(format!("bot-{}", i), &text, time_needed);
            tracing::info!("Bot {} adds clue '{}' in session {}", i, clue.text, session.id);
            session.entered_clues.push(clue);
        }
    }
}
