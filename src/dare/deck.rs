use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{Challenge, ChallengeKind, Difficulty, GameData};

/// Tracks which challenges have already been played, per difficulty and kind,
/// so that nothing repeats until a whole bucket has been used up.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct ChallengeDeck {
    /// Used challenge ids, indexed by difficulty, then kind.
    used: [[Vec<u32>; 2]; 3],
}

impl ChallengeDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a challenge uniformly from the unused part of a bucket.
    ///
    /// Once every challenge in the bucket has been played, the bucket's used
    /// set is cleared and drawing starts over from the full pool. The pools
    /// are validated non-empty at load time, so a draw itself cannot fail.
    pub fn draw<'a>(
        &mut self,
        data: &'a GameData,
        difficulty: Difficulty,
        kind: ChallengeKind,
        rng: &mut impl Rng,
    ) -> &'a Challenge {
        let pool = data.challenges(difficulty, kind);
        let used = &mut self.used[difficulty.index()][kind.index()];

        let unused: Vec<&Challenge> = pool.iter().filter(|c| !used.contains(&c.id)).collect();
        let challenge = match unused.choose(rng) {
            Some(challenge) => *challenge,
            None => {
                used.clear();
                pool.choose(rng).unwrap()
            }
        };
        used.push(challenge.id);
        challenge
    }

    /// Whether the given challenge has been played since its bucket last reset.
    pub fn is_used(&self, difficulty: Difficulty, kind: ChallengeKind, id: u32) -> bool {
        self.used[difficulty.index()][kind.index()].contains(&id)
    }

    /// The number of challenges recorded as used in one bucket.
    pub fn num_used(&self, difficulty: Difficulty, kind: ChallengeKind) -> usize {
        self.used[difficulty.index()][kind.index()].len()
    }
}
