use crate::clock::RoundClock;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tokio::time::Instant;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type LobbyId = String;
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    PickWord,
    EnterClues,
    VoteOnClues,
    EnterGuess,
    Transition,
    EndGame,
}

impl Phase {
    /// Whether the phase ends early once everyone has acted
    pub fn has_early_exit(&self) -> bool {
        !matches!(self, Phase::Transition | Phase::EndGame)
    }
}

/// Maximum dwell time per phase, in seconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseDurations {
    pub pick_word: u64,
    pub enter_clues: u64,
    pub vote_on_clues: u64,
    pub enter_guess: u64,
    pub transition: u64,
    pub end_game: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            pick_word: 10,
            enter_clues: 30,
            vote_on_clues: 15,
            enter_guess: 30,
            transition: 5,
            end_game: 10,
        }
    }
}

impl PhaseDurations {
    pub fn max_dwell(&self, phase: Phase) -> u64 {
        match phase {
            Phase::PickWord => self.pick_word,
            Phase::EnterClues => self.enter_clues,
            Phase::VoteOnClues => self.vote_on_clues,
            Phase::EnterGuess => self.enter_guess,
            Phase::Transition => self.transition,
            Phase::EndGame => self.end_game,
        }
    }
}

/// Normalize text for clue comparison (trim whitespace, lowercase)
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// A submitted clue. Two clues are the same clue when their normalized text
/// matches, regardless of author or timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clue {
    pub player_id: PlayerId,
    pub text: String,
    /// Seconds between phase start and submission
    pub time_needed: u64,
}

impl Clue {
    pub fn new(player_id: impl Into<PlayerId>, text: &str, time_needed: u64) -> Self {
        Self {
            player_id: player_id.into(),
            text: text.trim().to_string(),
            time_needed,
        }
    }

    /// Authorless clue used for containment checks and tally lookups
    pub fn lookup(text: &str) -> Self {
        Self::new(String::new(), text, 0)
    }

    pub fn normalized(&self) -> String {
        normalize(&self.text)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.normalized() == normalize(text)
    }
}

impl PartialEq for Clue {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Clue {}

impl Hash for Clue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

/// One seat in a running session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: PlayerId,
    pub token: String,
    pub display_name: Option<String>,
    pub score: i64,
    pub clue_is_sent: bool,
    pub voted: bool,
    /// Every clue this participant authored during the match
    pub clues: Vec<Clue>,
}

impl Participant {
    pub fn new(id: impl Into<PlayerId>, token: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            display_name: None,
            score: 0,
            clue_is_sent: false,
            voted: false,
            clues: Vec::new(),
        }
    }
}

/// Human member of a lobby as reported by the lobby provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyMember {
    pub id: PlayerId,
    pub token: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lobby {
    pub id: LobbyId,
    #[serde(default)]
    pub name: String,
    pub host_token: String,
    pub members: Vec<LobbyMember>,
    #[serde(default)]
    pub bot_count: u32,
    pub rounds: u32,
    #[serde(default)]
    pub is_private: bool,
    /// Each clue giver submits two clues per round
    #[serde(default)]
    pub double_clue: bool,
    #[serde(default)]
    pub game_in_progress: bool,
}

/// Final result of a finished game, as kept on the lobby leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LobbyScore {
    pub lobby_id: LobbyId,
    pub lobby_name: String,
    pub score: i64,
    pub players: Vec<PlayerId>,
    pub rounds: u32,
    pub finished_at: String,
}

/// A running match. Only the engine mutates it, always under the session lock.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    /// Display name of the lobby, kept for the leaderboard
    pub lobby_name: String,
    pub rounds: u32,
    pub rounds_played: u32,
    pub participants: Vec<Participant>,
    /// Index into `participants`
    pub guesser: usize,
    pub current_word: Option<String>,
    /// Choices offered to the guesser during PICK_WORD
    pub words: Vec<String>,
    pub entered_clues: Vec<Clue>,
    /// Resolved invalid clues, one entry per clue
    pub invalid_clues: Vec<Clue>,
    /// Raw elimination votes, one entry per vote
    pub votes: Vec<Clue>,
    pub phase: Phase,
    pub overall_score: i64,
    pub double_clue: bool,
    pub phase_started: Instant,
    pub guess: Option<String>,
    pub guess_seconds: Option<u64>,
    pub guess_correct: bool,
    pub bots_sent: bool,
    /// Round number that has already been scored
    pub scored_round: Option<u32>,
    pub clock: RoundClock,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, participants: Vec<Participant>, rounds: u32) -> Self {
        Self {
            id: id.into(),
            lobby_name: String::new(),
            rounds,
            rounds_played: 0,
            participants,
            guesser: 0,
            current_word: None,
            words: Vec::new(),
            entered_clues: Vec::new(),
            invalid_clues: Vec::new(),
            votes: Vec::new(),
            phase: Phase::PickWord,
            overall_score: 0,
            double_clue: false,
            phase_started: Instant::now(),
            guess: None,
            guess_seconds: None,
            guess_correct: false,
            bots_sent: false,
            scored_round: None,
            clock: RoundClock::new(),
        }
    }

    /// 1-based number of the round in progress
    pub fn round_no(&self) -> u32 {
        (self.rounds_played + 1).min(self.rounds.max(1))
    }

    pub fn guesser(&self) -> Option<&Participant> {
        self.participants.get(self.guesser)
    }

    pub fn is_guesser(&self, player_id: &str) -> bool {
        self.guesser().map(|g| g.id == player_id).unwrap_or(false)
    }

    pub fn participant(&self, player_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == player_id)
    }

    pub fn participant_mut(&mut self, player_id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == player_id)
    }

    /// Everyone except the guesser
    pub fn eligible(&self) -> impl Iterator<Item = &Participant> {
        let guesser = self.guesser;
        self.participants
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != guesser)
            .map(|(_, p)| p)
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible().count()
    }

    pub fn all_clues_sent(&self) -> bool {
        self.eligible().all(|p| p.clue_is_sent)
    }

    pub fn all_voted(&self) -> bool {
        self.eligible().all(|p| p.voted)
    }

    /// Whether the current phase's early-exit condition holds
    pub fn early_exit_ready(&self) -> bool {
        match self.phase {
            Phase::PickWord => self.current_word.is_some(),
            Phase::EnterClues => self.all_clues_sent(),
            Phase::VoteOnClues => self.all_voted(),
            Phase::EnterGuess => self.guess.is_some(),
            Phase::Transition | Phase::EndGame => false,
        }
    }

    /// Seconds spent in the current phase
    pub fn phase_elapsed(&self) -> u64 {
        self.phase_started.elapsed().as_secs()
    }

    pub fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.phase_started = Instant::now();
    }

    pub fn recompute_overall_score(&mut self) {
        self.overall_score = self.participants.iter().map(|p| p.score).sum();
    }
}
