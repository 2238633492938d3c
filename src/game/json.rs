use serde_json::{json, Value};

use super::{Game, GameState};

impl Game {
    /// The shared screen's view of the game.
    /// Secret roles and words stay hidden until they are revealed by play.
    pub fn get_board_json(&self) -> Value {
        json!({
            "players": self.get_players_json(None),
            "round": self.round,
            "difficulty": self.difficulty,
            "roles": self.config,
            "state": self.get_state_json(),
        })
    }

    /// A single player's view of the game: the shared state plus their own secret.
    pub fn get_player_json(&self, player: usize) -> Value {
        let idx = player;
        let player = &self.players[idx];

        json!({
            "id": player.name,
            "name": player.name,
            "emoji": player.emoji,
            "role": player.role,
            "word": player.word,
            "isDead": !player.alive,
            "hasWon": self.player_has_won(idx),
            "players": self.get_players_json(Some(idx)),
            "round": self.round,
            "state": self.get_state_json(),
        })
    }

    fn get_players_json(&self, viewer: Option<usize>) -> Value {
        self.players
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let view_role = viewer == Some(index) || self.role_is_public(index);
                json!({
                    "id": player.name,
                    "name": player.name,
                    "emoji": player.emoji,
                    "isDead": !player.alive,
                    "role": view_role.then_some(player.role),
                    "word": view_role.then_some(&player.word),
                })
            })
            .collect()
    }

    /// Whether a player's role has been revealed to the whole room:
    /// everyone's is at the final reveal, and the vote loser's is while
    /// their elimination is on display.
    fn role_is_public(&self, index: usize) -> bool {
        match self.state {
            GameState::Reveal(_) => true,
            GameState::Elimination { eliminated } => eliminated == index,
            _ => false,
        }
    }

    fn get_state_json(&self) -> Value {
        match &self.state {
            GameState::Describing { cursor } => json!({
                "type": "describing",
                "turn": cursor,
                "describer": self.current_describer(),
            }),
            GameState::Voting { votes } => json!({
                "type": "voting",
                "votes": votes.votes(),
            }),
            GameState::Elimination { eliminated } => {
                let player = &self.players[*eliminated];
                json!({
                    "type": "elimination",
                    "eliminated": eliminated,
                    "role": player.role,
                    "word": player.word,
                })
            }
            GameState::Reveal(winner) => json!({
                "type": "reveal",
                "winner": winner.to_string(),
                "civilianWord": self.pair.civilian,
                "undercoverWord": self.pair.undercover,
            }),
        }
    }

    /// The archive summary of a finished game.
    pub fn get_outcome_json(&self) -> Value {
        let GameState::Reveal(winner) = &self.state else {
            return json!({ "finished": false });
        };
        json!({
            "finished": true,
            "winner": winner.to_string(),
        })
    }
}
