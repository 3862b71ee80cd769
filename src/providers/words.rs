use super::WordListProvider;
use rand::seq::IndexedRandom;
use std::path::Path;

const BUILTIN_WORDS: &[&str] = &[
    "alcatraz", "anchor", "astronaut", "australia", "avalanche", "bagpipes", "banana", "bicycle",
    "blizzard", "bonsai", "cactus", "canyon", "castle", "chess", "chocolate", "compass",
    "dinosaur", "dragon", "eclipse", "elephant", "firework", "galaxy", "glacier", "guitar",
    "hammock", "harbor", "helicopter", "igloo", "jungle", "kangaroo", "lantern", "lighthouse",
    "magnet", "marathon", "mermaid", "meteor", "mountain", "nuclear power", "octopus", "orchestra",
    "origami", "parachute", "penguin", "pirate", "pyramid", "rainbow", "robot", "sandcastle",
    "saturn", "skyscraper", "snowman", "star wars", "submarine", "sushi", "telescope", "tornado",
    "tool", "treasure", "umbrella", "vampire", "volcano", "waterfall", "wizard", "yoda", "zebra",
];

/// Secret word candidates sampled without replacement
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new(words: Vec<String>) -> Self {
        let words = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_WORDS.iter().map(|w| w.to_string()).collect())
    }

    /// One word per line; blank lines and `#` comments are skipped
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::new(
            raw.lines()
                .filter(|line| !line.trim_start().starts_with('#'))
                .map(str::to_string)
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordListProvider for WordList {
    fn candidates(&self, count: usize) -> Vec<String> {
        let mut rng = rand::rng();
        self.words
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect()
    }
}
