use anyhow::{bail, Context};
use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::GameError;

/// A difficulty tier. The bundled data files keep the French tier names,
/// so those are the names used on the wire.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum Difficulty {
    #[serde(rename = "facile")]
    Easy,
    #[serde(rename = "moyen")]
    Medium,
    #[serde(rename = "difficile")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub(crate) fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }
}

impl ToString for Difficulty {
    fn to_string(&self) -> String {
        match self {
            Difficulty::Easy => "facile",
            Difficulty::Medium => "moyen",
            Difficulty::Hard => "difficile",
        }
        .to_string()
    }
}

/// The two kinds of challenge in Truth or Dare.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum ChallengeKind {
    #[serde(rename = "action")]
    Action,
    #[serde(rename = "verite")]
    Truth,
}

impl ChallengeKind {
    pub const ALL: [ChallengeKind; 2] = [ChallengeKind::Action, ChallengeKind::Truth];

    pub(crate) fn index(self) -> usize {
        match self {
            ChallengeKind::Action => 0,
            ChallengeKind::Truth => 1,
        }
    }
}

impl ToString for ChallengeKind {
    fn to_string(&self) -> String {
        match self {
            ChallengeKind::Action => "action",
            ChallengeKind::Truth => "verite",
        }
        .to_string()
    }
}

/// A matched pair of secret words sharing a semantic theme,
/// one for the civilians and a similar one for the undercover agents.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct WordPair {
    pub id: u32,
    pub civilian: String,
    pub undercover: String,
    pub difficulty: Difficulty,
}

/// A single Truth-or-Dare challenge.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Challenge {
    pub id: u32,
    pub text: String,
}

/// The static game data, loaded once at startup and read-only thereafter.
pub struct GameData {
    word_sets: Vec<WordPair>,
    /// Challenge pools indexed by difficulty, then kind.
    challenges: [[Vec<Challenge>; 2]; 3],
}

#[derive(Deserialize)]
struct WordFile {
    sets: Vec<WordPair>,
}

#[derive(Deserialize)]
struct ChallengeFile {
    facile: ChallengeBuckets,
    moyen: ChallengeBuckets,
    difficile: ChallengeBuckets,
}

#[derive(Deserialize)]
struct ChallengeBuckets {
    actions: Vec<Challenge>,
    verites: Vec<Challenge>,
}

impl GameData {
    /// Loads and validates the word-pair and challenge pools.
    /// A missing tier or empty bucket is fatal here, so draws never fail at runtime.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join("undercover.json");
        let words = std::fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let WordFile { sets } = serde_json::from_str(&words)
            .with_context(|| format!("could not parse {}", path.display()))?;

        let path = dir.join("challenges.json");
        let challenges = std::fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let ChallengeFile { facile, moyen, difficile } = serde_json::from_str(&challenges)
            .with_context(|| format!("could not parse {}", path.display()))?;

        let data = Self {
            word_sets: sets,
            challenges: [
                [facile.actions, facile.verites],
                [moyen.actions, moyen.verites],
                [difficile.actions, difficile.verites],
            ],
        };
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for difficulty in Difficulty::ALL {
            if !self.word_sets.iter().any(|p| p.difficulty == difficulty) {
                bail!("no word pairs for difficulty {}", difficulty.to_string());
            }
            for kind in ChallengeKind::ALL {
                if self.challenges(difficulty, kind).is_empty() {
                    bail!(
                        "no {} challenges for difficulty {}",
                        kind.to_string(),
                        difficulty.to_string()
                    );
                }
            }
        }
        Ok(())
    }

    /// Draws one word pair uniformly at random from the given difficulty tier.
    pub fn draw_pair(
        &self,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> Result<&WordPair, GameError> {
        let pairs: Vec<&WordPair> = self
            .word_sets
            .iter()
            .filter(|p| p.difficulty == difficulty)
            .collect();
        pairs.choose(rng).copied().ok_or(GameError::NoWordPair)
    }

    /// Gets the challenge pool for the given difficulty and kind.
    pub fn challenges(&self, difficulty: Difficulty, kind: ChallengeKind) -> &[Challenge] {
        &self.challenges[difficulty.index()][kind.index()]
    }
}

/// A small fixed dataset for unit tests.
#[cfg(test)]
pub fn sample() -> GameData {
    let pair = |id, civilian: &str, undercover: &str, difficulty| WordPair {
        id,
        civilian: civilian.to_string(),
        undercover: undercover.to_string(),
        difficulty,
    };
    let bucket = |base: u32, count: u32| -> Vec<Challenge> {
        (0..count)
            .map(|i| Challenge {
                id: base + i,
                text: format!("challenge {}", base + i),
            })
            .collect()
    };
    GameData {
        word_sets: vec![
            pair(1, "Chat", "Chien", Difficulty::Easy),
            pair(2, "Plage", "Piscine", Difficulty::Easy),
            pair(3, "Violon", "Guitare", Difficulty::Hard),
        ],
        challenges: [
            [bucket(100, 4), bucket(200, 4)],
            [bucket(300, 2), bucket(400, 2)],
            [bucket(500, 3), bucket(600, 3)],
        ],
    }
}
