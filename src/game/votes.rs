use serde::{Deserialize, Serialize};

use super::MAX_PLAYERS;

/// Tracks the number of votes cast against each player during one voting phase.
///
/// Votes carry no voter identity; the screen is shared and the room polices
/// who has already tapped. The tally only guards that targets are alive.
#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
pub struct VoteTally {
    num_players: usize,
    votes: [usize; MAX_PLAYERS],
}

impl VoteTally {
    /// Creates a new `VoteTally` with every count at zero.
    pub fn new(num_players: usize) -> Self {
        let votes = [0; MAX_PLAYERS];
        Self { num_players, votes }
    }

    /// Records one vote against the given player.
    pub fn vote(&mut self, player_idx: usize) {
        self.votes[player_idx] += 1;
    }

    /// The number of votes cast against the given player.
    pub fn count(&self, player_idx: usize) -> usize {
        self.votes[player_idx]
    }

    /// Gets the vote counts of each player.
    pub fn votes(&self) -> &[usize] {
        &self.votes[..self.num_players]
    }
}
