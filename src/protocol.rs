use crate::types::*;
use serde::{Deserialize, Serialize};

/// Clue submission from a player. `clue2` is required in double-clue games and
/// rejected otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueInput {
    pub player_token: String,
    pub clue: String,
    #[serde(default)]
    pub clue2: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessInput {
    pub player_token: String,
    pub guess: String,
}

/// Ballot listing the clues a player considers invalid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteInput {
    pub player_token: String,
    #[serde(default)]
    pub invalid_clues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClueInfo {
    pub player_id: PlayerId,
    pub text: String,
}

impl From<&Clue> for ClueInfo {
    fn from(clue: &Clue) -> Self {
        Self {
            player_id: clue.player_id.clone(),
            text: clue.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub display_name: Option<String>,
    pub score: i64,
    pub clue_is_sent: bool,
    pub voted: bool,
}

impl From<&Participant> for PlayerScore {
    fn from(p: &Participant) -> Self {
        Self {
            player_id: p.id.clone(),
            display_name: p.display_name.clone(),
            score: p.score,
            clue_is_sent: p.clue_is_sent,
            voted: p.voted,
        }
    }
}

/// Read-only snapshot of a session for status queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: SessionId,
    pub phase: Phase,
    pub round_no: u32,
    pub rounds: u32,
    pub rounds_played: u32,
    pub guesser_id: Option<PlayerId>,
    pub double_clue: bool,
    pub players: Vec<PlayerScore>,
    pub overall_score: i64,
    pub entered_clues: Vec<ClueInfo>,
    pub invalid_clues: Vec<ClueInfo>,
    /// Only set once the guess phase is over
    pub guess_correct: Option<bool>,
    /// Seconds the guesser took, revealed with the result
    pub guess_seconds: Option<u64>,
    /// The secret word, revealed during TRANSITION and END_GAME
    pub word: Option<String>,
    pub seconds_remaining: u64,
    pub server_now: String,
}

impl SessionStatus {
    pub fn from_session(session: &Session, durations: &PhaseDurations) -> Self {
        let revealed = matches!(session.phase, Phase::Transition | Phase::EndGame);
        let dwell = durations.max_dwell(session.phase);

        Self {
            session_id: session.id.clone(),
            phase: session.phase,
            round_no: session.round_no(),
            rounds: session.rounds,
            rounds_played: session.rounds_played,
            guesser_id: session.guesser().map(|g| g.id.clone()),
            double_clue: session.double_clue,
            players: session.participants.iter().map(PlayerScore::from).collect(),
            overall_score: session.overall_score,
            entered_clues: session.entered_clues.iter().map(ClueInfo::from).collect(),
            invalid_clues: session.invalid_clues.iter().map(ClueInfo::from).collect(),
            guess_correct: revealed.then_some(session.guess_correct),
            guess_seconds: session.guess_seconds.filter(|_| revealed),
            word: if revealed {
                session.current_word.clone()
            } else {
                None
            },
            seconds_remaining: dwell.saturating_sub(session.phase_elapsed()),
            server_now: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Events broadcast to anyone subscribed to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum EngineEvent {
    Phase {
        session_id: SessionId,
        phase: Phase,
        round_no: u32,
        server_now: String,
        deadline: String,
    },
    Scores {
        session_id: SessionId,
        players: Vec<PlayerScore>,
        overall_score: i64,
        guess_correct: bool,
        guess_seconds: Option<u64>,
    },
    SessionEnded {
        session_id: SessionId,
    },
}

/// Error body returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}
