use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use self::deck::ChallengeDeck;
use crate::data::{Challenge, ChallengeKind, Difficulty, GameData};
use crate::error::GameError;
use crate::game::{Participant, MAX_PLAYERS};

mod deck;
mod test;

/// A game of Truth or Dare: players take turns around the table, each picking
/// an action or a truth drawn from the challenge deck.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DareGame {
    players: Vec<Participant>,
    difficulty: Difficulty,
    /// Whose turn it is; wraps around the table.
    turn: usize,
    /// The challenge currently on display, if the player has picked one.
    current: Option<(ChallengeKind, Challenge)>,
    deck: ChallengeDeck,
    challenges_played: usize,
    rng: rand_chacha::ChaCha8Rng,
}

impl DareGame {
    /// Creates a new game of Truth or Dare.
    pub fn new(
        roster: &[Participant],
        difficulty: Difficulty,
        seed: u64,
    ) -> Result<Self, GameError> {
        if roster.is_empty() {
            return Err(GameError::TooFewPlayers);
        }
        if roster.len() > MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }
        Ok(Self {
            players: roster.to_vec(),
            difficulty,
            turn: 0,
            current: None,
            deck: ChallengeDeck::new(),
            challenges_played: 0,
            rng: rand_chacha::ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Gets the player names.
    pub fn player_names(&self) -> impl Iterator<Item = &'_ str> {
        self.players.iter().map(|p| &p.name[..])
    }

    /// Rebuilds the roster this game was started from.
    pub fn participants(&self) -> Vec<Participant> {
        self.players.clone()
    }

    /// Finds a player with the given name.
    pub fn find_player(&self, name: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Gets the number of players in the game.
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> &Participant {
        &self.players[self.turn]
    }

    /// Switches the difficulty tier. Only allowed between challenges,
    /// while the current player is still choosing.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        if self.current.is_some() {
            return Err(GameError::InvalidAction);
        }
        self.difficulty = difficulty;
        Ok(())
    }

    /// Called when the current player picks action or truth:
    /// draws their challenge from the deck and puts it on display.
    pub fn draw_challenge(
        &mut self,
        kind: ChallengeKind,
        data: &GameData,
    ) -> Result<(), GameError> {
        if self.current.is_some() {
            return Err(GameError::InvalidAction);
        }
        let challenge = self
            .deck
            .draw(data, self.difficulty, kind, &mut self.rng)
            .clone();
        self.current = Some((kind, challenge));
        self.challenges_played += 1;
        Ok(())
    }

    /// Called once the challenge has been carried out (or chickened out of);
    /// clears it and passes the turn around the table.
    pub fn next_player(&mut self) -> Result<(), GameError> {
        if self.current.is_none() {
            return Err(GameError::InvalidAction);
        }
        self.current = None;
        self.turn = (self.turn + 1) % self.players.len();
        Ok(())
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The number of challenges drawn so far.
    pub fn challenges_played(&self) -> usize {
        self.challenges_played
    }

    /// The view of the game sent to every connected client.
    /// There are no secrets in Truth or Dare; everyone sees the same thing.
    pub fn get_board_json(&self) -> Value {
        json!({
            "players": self
                .players
                .iter()
                .map(|p| json!({ "id": p.name, "name": p.name, "emoji": p.emoji }))
                .collect::<Value>(),
            "difficulty": self.difficulty,
            "challengesPlayed": self.challenges_played,
            "state": match &self.current {
                Some((kind, challenge)) => json!({
                    "type": "challenge",
                    "player": self.turn,
                    "kind": kind,
                    "challenge": { "id": challenge.id, "text": challenge.text },
                }),
                None => json!({
                    "type": "choosing",
                    "player": self.turn,
                }),
            },
        })
    }
}
