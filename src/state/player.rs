use crate::error::{EngineError, EngineResult};
use crate::types::*;

impl Session {
    /// Reject actions that arrive outside their phase
    pub(crate) fn require_phase(&self, phase: Phase, action: &str) -> EngineResult<()> {
        if self.phase != phase {
            return Err(EngineError::unauthorized(format!(
                "{} not accepted in current state ({:?})",
                action, self.phase
            )));
        }
        Ok(())
    }

    /// Index of a clue giver (a member other than the guesser) whose token matches
    pub(crate) fn authorize_clue_giver(&self, player_id: &str, token: &str) -> EngineResult<usize> {
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| {
                EngineError::unauthorized(format!("{} is not part of this session", player_id))
            })?;

        if idx == self.guesser {
            return Err(EngineError::unauthorized("The guesser cannot do that"));
        }
        if self.participants[idx].token != token {
            return Err(EngineError::unauthorized("Invalid player token"));
        }
        Ok(idx)
    }

    pub(crate) fn authorize_guesser(&self, token: &str) -> EngineResult<()> {
        match self.guesser() {
            Some(g) if g.token == token => Ok(()),
            _ => Err(EngineError::unauthorized("Only the guesser can do that")),
        }
    }
}
