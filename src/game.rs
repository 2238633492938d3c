use self::player::assign_roles;
pub use self::player::{Participant, Player, Role, RoleConfig, UNKNOWN_WORD};
use self::votes::VoteTally;
pub use self::winner::WinCondition;
use crate::data::{Difficulty, GameData, WordPair};
use crate::error::GameError;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

mod json;
mod player;
mod test;
mod votes;
mod winner;

pub const MAX_PLAYERS: usize = 16;
pub const MIN_PLAYERS: usize = 3;

/// A game of Undercover.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Game {
    config: RoleConfig,
    difficulty: Difficulty,
    pair: WordPair,
    players: Vec<Player>,
    state: GameState,
    round: usize,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Serialize, Deserialize, Debug)]
enum GameState {
    /// Alive players take turns describing their word.
    /// The cursor indexes the alive subsequence, not the full seating order.
    Describing { cursor: usize },
    /// The room votes on who to eliminate.
    Voting { votes: VoteTally },
    /// The result of the vote is on display.
    Elimination { eliminated: usize },
    /// Terminal: every role and word is revealed.
    Reveal(WinCondition),
}

impl Game {
    /// Creates a new game of Undercover: validates the role composition,
    /// draws one word pair for the requested difficulty and deals the roles.
    pub fn new(
        roster: &[Participant],
        config: RoleConfig,
        difficulty: Difficulty,
        data: &GameData,
        seed: u64,
    ) -> Result<Self, GameError> {
        if roster.len() < MIN_PLAYERS {
            return Err(GameError::TooFewPlayers);
        }
        if roster.len() > MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let roles = assign_roles(&config, roster.len(), &mut rng)?;
        let pair = data.draw_pair(difficulty, &mut rng)?.clone();
        let players = roster
            .iter()
            .zip(roles)
            .map(|(participant, role)| Player::new(participant, role, &pair))
            .collect();

        Ok(Game {
            config,
            difficulty,
            pair,
            players,
            state: GameState::Describing { cursor: 0 },
            round: 1,
        })
    }

    /// Gets the player names.
    pub fn player_names(&self) -> impl Iterator<Item = &'_ str> {
        self.players.iter().map(|p| &p.name[..])
    }

    /// Rebuilds the roster this game was started from.
    pub fn participants(&self) -> Vec<Participant> {
        self.players
            .iter()
            .map(|p| Participant {
                name: p.name.clone(),
                emoji: p.emoji.clone(),
            })
            .collect()
    }

    /// Finds a player with the given name.
    pub fn find_player(&self, name: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Index into the player list of the alive player whose turn it is to describe.
    pub fn current_describer(&self) -> Option<usize> {
        let GameState::Describing { cursor } = self.state else {
            return None;
        };
        self.alive_indices().nth(cursor)
    }

    /// Called when the current describer has given their description.
    /// After the last alive player has described, voting opens with a fresh tally.
    pub fn advance_describer(&mut self) -> Result<(), GameError> {
        let num_alive = self.num_players_alive();
        let GameState::Describing { cursor } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        if *cursor + 1 < num_alive {
            *cursor += 1;
        } else {
            self.state = GameState::Voting {
                votes: VoteTally::new(self.players.len()),
            };
        }
        Ok(())
    }

    /// Called when a vote is cast against a player.
    pub fn cast_vote(&mut self, target: usize) -> Result<(), GameError> {
        self.check_player_index(target)?;
        if !self.players[target].alive {
            return Err(GameError::InvalidPlayerChoice);
        }
        let GameState::Voting { votes } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        votes.vote(target);
        Ok(())
    }

    /// Called when the room agrees the vote is over.
    /// Exactly one player is eliminated: the first alive player in seating
    /// order holding the maximum vote count (first-seen max wins ties).
    pub fn end_voting(&mut self) -> Result<(), GameError> {
        let GameState::Voting { votes } = &self.state else {
            return Err(GameError::InvalidAction);
        };

        let mut eliminated = None;
        let mut max_votes = 0;
        for (idx, player) in self.players.iter().enumerate() {
            if !player.alive {
                continue;
            }
            let count = votes.count(idx);
            if eliminated.is_none() || count > max_votes {
                eliminated = Some(idx);
                max_votes = count;
            }
        }
        let eliminated = eliminated.ok_or(GameError::InvalidAction)?;

        self.players[eliminated].alive = false;
        self.state = GameState::Elimination { eliminated };
        Ok(())
    }

    /// Called once the elimination result has been seen. Ends the game if a
    /// win condition is met, otherwise starts the next round of descriptions.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        let GameState::Elimination { .. } = self.state else {
            return Err(GameError::InvalidAction);
        };
        if let Some(winner) = winner::evaluate(&self.players) {
            self.state = GameState::Reveal(winner);
        } else {
            self.round += 1;
            self.state = GameState::Describing { cursor: 0 };
        }
        Ok(())
    }

    /// Returns true if the game is over.
    pub fn game_over(&self) -> bool {
        matches!(self.state, GameState::Reveal(_))
    }

    /// The winner, once the game is over.
    pub fn winner(&self) -> Option<WinCondition> {
        match self.state {
            GameState::Reveal(winner) => Some(winner),
            _ => None,
        }
    }

    /// Returns whether a particular player has won.
    pub fn player_has_won(&self, player: usize) -> bool {
        let GameState::Reveal(winner) = self.state else {
            return false;
        };
        let player = &self.players[player];
        match winner {
            WinCondition::Civilians => player.role == Role::Civilian,
            WinCondition::Undercover => player.role == Role::Undercover,
            WinCondition::Blank => player.role == Role::Blank,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn round(&self) -> usize {
        self.round
    }

    /// Gets the number of players in the game.
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Gets the number of players in the game that are alive.
    pub fn num_players_alive(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Iterates the indices of alive players in seating order.
    fn alive_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.alive)
            .map(|(idx, _)| idx)
    }

    /// Returns `Ok` if the given player index is valid, and an `Err` otherwise.
    fn check_player_index(&self, player: usize) -> Result<(), GameError> {
        if player < self.num_players() {
            Ok(())
        } else {
            Err(GameError::InvalidPlayerIndex)
        }
    }
}
