use crate::types::PhaseDurations;
use std::time::Duration;

/// Tunables for the round engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub durations: PhaseDurations,
    /// How often each session's clock wakes up
    pub tick: Duration,
    /// Number of words offered to the guesser each round
    pub word_candidates: usize,
    /// Points per second of clue time when the guess is right
    pub reward_factor: i64,
    /// Extra factor on the reward in double-clue games
    pub special_reward_multiplier: i64,
    /// Extra factor on the penalty in double-clue games
    pub special_penalty_multiplier: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            tick: Duration::from_millis(250),
            word_candidates: 5,
            reward_factor: 2,
            special_reward_multiplier: 3,
            special_penalty_multiplier: 2,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let d = defaults.durations;

        let durations = PhaseDurations {
            pick_word: env_parse("PICK_WORD_SECONDS").unwrap_or(d.pick_word),
            enter_clues: env_parse("ENTER_CLUES_SECONDS").unwrap_or(d.enter_clues),
            vote_on_clues: env_parse("VOTE_SECONDS").unwrap_or(d.vote_on_clues),
            enter_guess: env_parse("ENTER_GUESS_SECONDS").unwrap_or(d.enter_guess),
            transition: env_parse("TRANSITION_SECONDS").unwrap_or(d.transition),
            end_game: env_parse("END_GAME_SECONDS").unwrap_or(d.end_game),
        };

        let tick = env_parse::<u64>("CLOCK_TICK_MS")
            .filter(|ms| (1..1000).contains(ms))
            .map(Duration::from_millis)
            .unwrap_or(defaults.tick);

        Self {
            durations,
            tick,
            word_candidates: env_parse("WORD_CANDIDATES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.word_candidates),
            reward_factor: env_parse("REWARD_FACTOR").unwrap_or(defaults.reward_factor),
            special_reward_multiplier: env_parse("SPECIAL_REWARD_MULTIPLIER")
                .unwrap_or(defaults.special_reward_multiplier),
            special_penalty_multiplier: env_parse("SPECIAL_PENALTY_MULTIPLIER")
                .unwrap_or(defaults.special_penalty_multiplier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "PICK_WORD_SECONDS",
        "ENTER_CLUES_SECONDS",
        "VOTE_SECONDS",
        "ENTER_GUESS_SECONDS",
        "TRANSITION_SECONDS",
        "END_GAME_SECONDS",
        "CLOCK_TICK_MS",
        "WORD_CANDIDATES",
        "REWARD_FACTOR",
        "SPECIAL_REWARD_MULTIPLIER",
        "SPECIAL_PENALTY_MULTIPLIER",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = EngineConfig::from_env();
        assert_eq!(config.durations, PhaseDurations::default());
        assert_eq!(config.tick, Duration::from_millis(250));
        assert_eq!(config.reward_factor, 2);
        assert_eq!(config.special_reward_multiplier, 3);
        assert_eq!(config.special_penalty_multiplier, 2);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("VOTE_SECONDS", "20");
        std::env::set_var("CLOCK_TICK_MS", "100");
        std::env::set_var("SPECIAL_REWARD_MULTIPLIER", " 2 ");
        let config = EngineConfig::from_env();
        clear_env();

        assert_eq!(config.durations.vote_on_clues, 20);
        assert_eq!(config.durations.pick_word, 10);
        assert_eq!(config.tick, Duration::from_millis(100));
        assert_eq!(config.special_reward_multiplier, 2);
    }

    #[test]
    #[serial]
    fn test_tick_must_stay_sub_second() {
        clear_env();
        std::env::set_var("CLOCK_TICK_MS", "5000");
        let config = EngineConfig::from_env();
        clear_env();
        assert_eq!(config.tick, Duration::from_millis(250));
    }
}
