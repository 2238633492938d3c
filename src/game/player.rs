use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};
use std::iter::repeat;

use crate::data::WordPair;
use crate::error::GameError;

/// The word shown to a blank in place of a real secret word.
pub const UNKNOWN_WORD: &str = "???";

/// A roster entry: the identity of someone physically in the room.
/// Rosters are managed outside the game engine and are read-only input to it.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Participant {
    pub name: String,
    pub emoji: String,
}

/// A game player and their secret assignment.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Player {
    pub name: String,
    pub emoji: String,
    pub role: Role,
    pub word: String,
    pub alive: bool,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Civilian,
    Undercover,
    Blank,
}

impl ToString for Role {
    fn to_string(&self) -> String {
        match self {
            Role::Civilian => "Civilian",
            Role::Undercover => "Undercover",
            Role::Blank => "Blank",
        }
        .to_string()
    }
}

impl Player {
    pub fn new(participant: &Participant, role: Role, pair: &WordPair) -> Self {
        let word = match role {
            Role::Civilian => pair.civilian.clone(),
            Role::Undercover => pair.undercover.clone(),
            Role::Blank => UNKNOWN_WORD.to_string(),
        };
        Self {
            name: participant.name.clone(),
            emoji: participant.emoji.clone(),
            role,
            word,
            alive: true,
        }
    }
}

/// The role composition used to start a game.
#[derive(Clone, Copy, Serialize, Deserialize, Debug)]
pub struct RoleConfig {
    pub civilians: usize,
    pub undercover: usize,
    pub blanks: usize,
}

impl RoleConfig {
    /// The default composition for a roster of the given size.
    pub fn suggest(num_players: usize) -> Self {
        let undercover = if num_players >= 7 { 2 } else { 1 };
        let blanks = if num_players >= 5 { 1 } else { 0 };
        Self {
            civilians: num_players.saturating_sub(undercover + blanks),
            undercover,
            blanks,
        }
    }

    pub fn total(&self) -> usize {
        self.civilians + self.undercover + self.blanks
    }

    /// Returns `Ok` if this composition can start a game with the given roster size.
    /// A game needs at least one undercover agent and at least one civilian,
    /// and every player must be dealt exactly one role.
    pub fn validate(&self, num_players: usize) -> Result<(), GameError> {
        if self.total() != num_players || self.undercover == 0 || self.civilians == 0 {
            return Err(GameError::InvalidRoleConfig);
        }
        Ok(())
    }
}

/// Deals a role to each seat using a uniformly random permutation.
pub fn assign_roles(
    config: &RoleConfig,
    num_players: usize,
    rng: &mut impl rand::Rng,
) -> Result<Vec<Role>, GameError> {
    config.validate(num_players)?;
    let mut roles = Vec::with_capacity(num_players);
    roles.extend(repeat(Role::Undercover).take(config.undercover));
    roles.extend(repeat(Role::Blank).take(config.blanks));
    roles.extend(repeat(Role::Civilian).take(config.civilians));
    roles.shuffle(rng);
    Ok(roles)
}
