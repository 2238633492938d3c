use crate::data::{ChallengeKind, Difficulty};
use crate::error::GameError;
use crate::game::RoleConfig;
use crate::session::{GameKind, SessionHandle, SessionManager};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

/// A single connected client, either the shared screen or one player's phone.
pub struct Client<'a> {
    manager: &'a SessionManager,
    session: Option<SessionHandle>,
    game_id: Option<String>,
    player: Option<usize>,
    updates: Option<watch::Receiver<Value>>,
}

/// An action performed by a client on its game session.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum GameAction {
    SetDifficulty { difficulty: Difficulty },
    ConfigureRoles { civilians: usize, undercover: usize, blanks: usize },
    StartGame,
    NextDescriber,
    CastVote { name: String },
    EndVoting,
    NextRound,
    DrawChallenge { kind: ChallengeKind },
    NextPlayer,
    ResetGame,
    EndGame,
}

impl<'a> Client<'a> {
    /// Creates a new game client.
    pub fn new(manager: &'a SessionManager) -> Self {
        Self {
            manager,
            session: None,
            game_id: None,
            player: None,
            updates: None,
        }
    }

    /// Creates a new game session, returning its ID.
    pub fn create_game(&mut self, kind: GameKind, difficulty: Difficulty) -> String {
        let session = self.manager.create_game(kind, difficulty);
        let id = session.lock().unwrap().id().to_owned();
        self.game_id = Some(id.clone());
        id
    }

    /// Joins a game as the shared screen.
    pub fn join_as_board(&mut self, game_id: &str) -> Result<(), GameError> {
        let session = self.manager.find_game(game_id)?;
        self.player = None;
        self.game_id = Some(game_id.to_string());
        self.updates = Some(session.lock().unwrap().join_board());
        self.session = Some(session);
        Ok(())
    }

    /// Joins a game as a player.
    pub fn join_as_player(&mut self, game_id: &str, name: &str, emoji: &str) -> Result<(), GameError> {
        let session = self.manager.find_game(game_id)?;
        {
            let mut session = session.lock().unwrap();
            let player = session.add_player(name, emoji)?;
            self.player = Some(player);
            self.game_id = Some(game_id.to_string());
            self.updates = Some(session.join_player(player));
        }
        self.session = Some(session);
        Ok(())
    }

    /// Waits until there is an update to the game state, then returns the latest state.
    pub async fn next_state(&mut self) -> Value {
        let Some(updates) = &mut self.updates else {
            return std::future::pending().await;
        };

        updates.changed().await.ok();
        let state = updates.borrow().clone();

        serde_json::json!({
            "game_id": self.game_id,
            "player": self.player,
            "state": state,
        })
    }

    /// Performs an action on the game session.
    pub fn action(&self, action: GameAction) -> Result<(), GameError> {
        let Some(session) = &self.session else {
            return Err(GameError::InvalidAction);
        };
        let mut session = session.lock().unwrap();

        match action {
            GameAction::SetDifficulty { difficulty } => session.set_difficulty(difficulty),
            GameAction::ConfigureRoles { civilians, undercover, blanks } => {
                session.configure_roles(RoleConfig { civilians, undercover, blanks })
            }
            GameAction::StartGame => session.start_game(),
            GameAction::NextDescriber => session.mutate_undercover(|game| game.advance_describer()),
            GameAction::CastVote { name } => session.mutate_undercover(|game| {
                let target = game.find_player(&name)?;
                game.cast_vote(target)
            }),
            GameAction::EndVoting => session.mutate_undercover(|game| game.end_voting()),
            GameAction::NextRound => session.mutate_undercover(|game| game.next_round()),
            GameAction::DrawChallenge { kind } => {
                session.mutate_dare(|game, data| game.draw_challenge(kind, data))
            }
            GameAction::NextPlayer => session.mutate_dare(|game, _| game.next_player()),
            GameAction::ResetGame => session.reset_game(),
            GameAction::EndGame => session.end_game(),
        }
    }

    /// Keeps the game session alive.
    pub fn heartbeat(&self) {
        let Some(session) = &self.session else {
            return;
        };
        let mut session = session.lock().unwrap();
        session.heartbeat();
    }

    /// Leaves the game.
    pub fn leave(&mut self) {
        self.player = None;
        self.game_id = None;
        self.updates = None;
        self.session = None;
    }
}
