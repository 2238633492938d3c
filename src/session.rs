use crate::dare::DareGame;
use crate::data::{Difficulty, GameData};
use crate::error::GameError;
use crate::game::{Game as UndercoverGame, Participant, RoleConfig, MAX_PLAYERS, MIN_PLAYERS};
use crate::pg::{GameStats, Outcome};
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Manages all the game sessions running on the server.
pub struct SessionManager {
    sessions: DashMap<String, SessionHandle>,
    dbs: Dbs,
    data: &'static GameData,
}

/// The databases that games are persisted to.
#[derive(Clone)]
struct Dbs {
    db: sled::Db,
    game: sled::Tree,
    archive: sled::Tree,
}

/// A single game session.
pub struct Session {
    /// The game ID.
    id: String,
    /// The game itself.
    game: Game,
    /// The static word and challenge pools.
    data: &'static GameData,
    /// Channel for sending game state updates to the shared screen.
    board_state: watch::Sender<Value>,
    /// Channels for sending game state updates to players.
    player_states: Vec<watch::Sender<Value>>,
    /// The databases.
    dbs: Dbs,
    /// Timestamp of the last time this session was interacted with.
    last_ts: Instant,
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Which of the hub's games a session is set up to play.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum GameKind {
    Undercover,
    TruthOrDare,
}

impl GameKind {
    /// The smallest roster this game can be played with.
    pub fn min_players(self) -> usize {
        match self {
            GameKind::Undercover => MIN_PLAYERS,
            GameKind::TruthOrDare => 1,
        }
    }
}

impl ToString for GameKind {
    fn to_string(&self) -> String {
        match self {
            GameKind::Undercover => "undercover",
            GameKind::TruthOrDare => "truth-or-dare",
        }
        .to_string()
    }
}

#[allow(clippy::large_enum_variant)]
#[derive(Serialize, Deserialize)]
enum Game {
    Lobby {
        kind: GameKind,
        difficulty: Difficulty,
        /// The host's role-count override; the suggested composition applies when `None`.
        roles: Option<RoleConfig>,
        players: Vec<Participant>,
    },
    Undercover {
        /// The game itself.
        game: UndercoverGame,
        /// Timestamp that the game was created.
        started_ts: std::time::SystemTime,
        /// Whether this game has been archived.
        archived: bool,
    },
    TruthOrDare {
        game: DareGame,
        started_ts: std::time::SystemTime,
        archived: bool,
    },
    Over,
}

impl SessionManager {
    pub fn new(db: sled::Db, data: &'static GameData) -> Result<Self, Box<dyn Error>> {
        let sessions = DashMap::new();
        let dbs = Dbs {
            db: db.clone(),
            game: db.open_tree("games")?,
            archive: db.open_tree("archive")?,
        };
        for entry in dbs.game.iter() {
            let (id, game) = entry?;
            let id = String::from_utf8(id.to_vec())?;
            let Ok(game) = serde_json::from_slice(&game) else {
                continue;
            };
            let session = Session::hydrate(id.clone(), dbs.clone(), data, game);
            let session = Arc::new(Mutex::new(session));
            sessions.insert(id, session);
        }
        Ok(Self { sessions, dbs, data })
    }

    pub fn create_game(&self, kind: GameKind, difficulty: Difficulty) -> SessionHandle {
        loop {
            let id = Self::random_id();
            let entry = self.sessions.entry(id);
            if let Entry::Occupied(_) = entry {
                continue;
            }
            let session = Session::new(entry.key().clone(), self.dbs.clone(), self.data, kind, difficulty);
            let session = Arc::new(Mutex::new(session));
            entry.or_insert(session.clone());
            break session;
        }
    }

    pub fn find_game(&self, game_id: &str) -> Result<SessionHandle, GameError> {
        self.sessions
            .get(game_id)
            .map(|session| session.clone())
            .ok_or(GameError::GameNotFound)
    }

    pub fn num_games(&self) -> usize {
        self.sessions.len()
    }

    /// Reads the archived stats of finished games, most recent first.
    pub fn past_games(&self) -> Vec<GameStats> {
        let mut games: Vec<GameStats> = self
            .dbs
            .archive
            .iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|(_, stats)| serde_json::from_slice(&stats).ok())
            .collect();
        games.sort_by(|a, b| b.finished.cmp(&a.finished));
        games
    }

    pub fn purge_games(&self) {
        let mut ids_to_delete = vec![];

        // Find expired sessions
        for session in self.sessions.iter() {
            let game_id = session.key();
            let Ok(session) = session.lock() else {
                log::error!("Found poisoned session: {}", game_id);
                ids_to_delete.push(game_id.clone());
                continue;
            };
            let elapsed = Instant::now().duration_since(session.last_ts);
            if elapsed > Duration::from_secs(3600) {
                if self.dbs.game.remove(session.id().as_bytes()).is_ok() {
                    ids_to_delete.push(game_id.clone());
                } else {
                    log::error!("Could not remove game: {}", game_id);
                }
            }
        }

        // Delete the expired sessions
        for game_id in ids_to_delete.into_iter() {
            self.sessions.remove(&game_id);
        }
    }

    fn random_id() -> String {
        let mut rng = rand::thread_rng();
        (0..4)
            .map(|_| match rng.gen_range('A'..='Z') {
                // I and O read as digits on the join screen
                'I' => 'J',
                'O' => 'P',
                other => other,
            })
            .collect()
    }
}

impl Session {
    fn new(id: String, dbs: Dbs, data: &'static GameData, kind: GameKind, difficulty: Difficulty) -> Self {
        let game = Game::Lobby {
            kind,
            difficulty,
            roles: None,
            players: vec![],
        };
        Self::hydrate(id, dbs, data, game)
    }

    fn hydrate(id: String, dbs: Dbs, data: &'static GameData, game: Game) -> Self {
        let mut player_states = vec![];
        for _ in 0..game.num_players() {
            player_states.push(watch::channel(Value::Null).0);
        }
        Self {
            id,
            game,
            data,
            board_state: watch::channel(Value::Null).0,
            player_states,
            dbs,
            last_ts: Instant::now(),
        }
    }

    /// Gets the unique game ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the index of the player with the given name,
    /// adding the player to the roster if no player with that name has joined yet.
    pub fn add_player(&mut self, name: &str, emoji: &str) -> Result<usize, GameError> {
        match &mut self.game {
            Game::Lobby { players, .. } => {
                if let Some(idx) = players.iter().position(|p| p.name == name) {
                    return Ok(idx);
                }
                if players.len() == MAX_PLAYERS {
                    return Err(GameError::TooManyPlayers);
                }
                self.player_states.push(watch::channel(Value::Null).0);
                players.push(Participant {
                    name: name.to_string(),
                    emoji: emoji.to_string(),
                });
                Ok(players.len() - 1)
            }
            Game::Undercover { game, .. } => game.find_player(name),
            Game::TruthOrDare { game, .. } => game.find_player(name),
            Game::Over => Err(GameError::GameNotFound),
        }
    }

    /// Called by a new shared-screen client, and returns a stream of updates for it.
    pub fn join_board(&mut self) -> watch::Receiver<Value> {
        let rx = self.board_state.subscribe();
        self.notify();
        rx
    }

    /// Called by a new player client, and returns a stream of updates for that player.
    pub fn join_player(&mut self, player: usize) -> watch::Receiver<Value> {
        let rx = self.player_states[player].subscribe();
        self.notify();
        rx
    }

    /// Changes the difficulty tier, in the lobby or between challenges.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        match &mut self.game {
            Game::Lobby { difficulty: current, .. } => *current = difficulty,
            Game::TruthOrDare { game, .. } => game.set_difficulty(difficulty)?,
            _ => return Err(GameError::InvalidAction),
        }
        self.notify();
        self.persist_game().ok();
        Ok(())
    }

    /// Adjusts the role composition while in the lobby. Partial totals are
    /// allowed here so counts can be stepped up and down one at a time; the
    /// full composition is validated when the game starts.
    pub fn configure_roles(&mut self, config: RoleConfig) -> Result<(), GameError> {
        let Game::Lobby { kind, roles, players, .. } = &mut self.game else {
            return Err(GameError::InvalidAction);
        };
        if *kind != GameKind::Undercover {
            return Err(GameError::InvalidAction);
        }
        if config.total() > players.len() {
            return Err(GameError::InvalidRoleConfig);
        }
        *roles = Some(config);
        self.notify();
        self.persist_game().ok();
        Ok(())
    }

    /// Starts the game with the roster gathered in the lobby.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        let Game::Lobby { kind, difficulty, roles, players } = &self.game else {
            return Err(GameError::InvalidAction);
        };

        let seed = rand::thread_rng().next_u64();
        let started_ts = std::time::SystemTime::now();
        self.game = match kind {
            GameKind::Undercover => {
                let config = roles.unwrap_or_else(|| RoleConfig::suggest(players.len()));
                Game::Undercover {
                    game: UndercoverGame::new(players, config, *difficulty, self.data, seed)?,
                    started_ts,
                    archived: false,
                }
            }
            GameKind::TruthOrDare => Game::TruthOrDare {
                game: DareGame::new(players, *difficulty, seed)?,
                started_ts,
                archived: false,
            },
        };
        self.notify();
        self.persist_game().ok();
        Ok(())
    }

    /// Performs an action on an Undercover game.
    pub fn mutate_undercover<F>(&mut self, mutation: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut UndercoverGame) -> Result<(), GameError>,
    {
        let Game::Undercover { game, .. } = &mut self.game else {
            return Err(GameError::InvalidAction);
        };

        mutation(game)?;
        self.notify();
        self.persist_game().ok();
        self.archive_undercover().ok();

        Ok(())
    }

    /// Performs an action on a Truth-or-Dare game.
    pub fn mutate_dare<F>(&mut self, mutation: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut DareGame, &GameData) -> Result<(), GameError>,
    {
        let Game::TruthOrDare { game, .. } = &mut self.game else {
            return Err(GameError::InvalidAction);
        };

        mutation(game, self.data)?;
        self.notify();
        self.persist_game().ok();

        Ok(())
    }

    /// Keeps the game session alive.
    pub fn heartbeat(&mut self) {
        self.last_ts = Instant::now();
    }

    /// Discards the current game wholesale and returns the session to the
    /// lobby with the same roster, ready for another round of configuration.
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        let (kind, difficulty, players) = match &self.game {
            Game::Undercover { game, .. } => {
                (GameKind::Undercover, game.difficulty(), game.participants())
            }
            Game::TruthOrDare { game, .. } => {
                (GameKind::TruthOrDare, game.difficulty(), game.participants())
            }
            _ => return Err(GameError::InvalidAction),
        };

        self.archive_undercover().ok();
        self.archive_dare().ok();
        self.game = Game::Lobby {
            kind,
            difficulty,
            roles: None,
            players,
        };
        self.notify();
        self.persist_game().ok();
        Ok(())
    }

    /// Ends the session for good.
    pub fn end_game(&mut self) -> Result<(), GameError> {
        if !self.game.playing() {
            return Err(GameError::InvalidAction);
        }

        self.archive_undercover().ok();
        self.archive_dare().ok();
        self.game = Game::Over;
        self.notify();
        self.persist_game().ok();
        Ok(())
    }

    /// Notifies all connected clients of the new game state.
    fn notify(&mut self) {
        match &self.game {
            Game::Lobby { kind, difficulty, roles, players } => {
                let state = lobby_json(*kind, *difficulty, roles, players);
                self.board_state.send_replace(state.clone());
                for player_state in self.player_states.iter() {
                    player_state.send_replace(state.clone());
                }
            }
            Game::Undercover { game, .. } => {
                self.board_state.send_replace(game.get_board_json());
                for (idx, player_state) in self.player_states.iter().enumerate() {
                    player_state.send_replace(game.get_player_json(idx));
                }
            }
            Game::TruthOrDare { game, .. } => {
                let state = game.get_board_json();
                self.board_state.send_replace(state.clone());
                for player_state in self.player_states.iter() {
                    player_state.send_replace(state.clone());
                }
            }
            Game::Over => {
                self.board_state.send_replace(json!({ "type": "gameover" }));
                for player_state in self.player_states.iter() {
                    player_state.send_replace(json!({ "type": "gameover" }));
                }
            }
        }
        self.last_ts = Instant::now();
    }

    /// Persists the game state to disk, so it can be recovered upon server restart.
    fn persist_game(&mut self) -> Result<(), Box<dyn Error>> {
        self.dbs.game.insert(
            self.id.as_bytes(),
            serde_json::to_string(&self.game)?.as_bytes(),
        )?;
        Ok(())
    }

    /// Archives an Undercover game once it has finished.
    fn archive_undercover(&mut self) -> Result<(), Box<dyn Error>> {
        let Game::Undercover { game, started_ts, archived } = &mut self.game else {
            return Ok(());
        };
        if !game.game_over() || *archived {
            return Ok(());
        }
        let stats = GameStats {
            id: self.id.clone(),
            game: GameKind::Undercover,
            players: game.player_names().map(String::from).collect(),
            difficulty: game.difficulty(),
            started: (*started_ts).into(),
            finished: Utc::now(),
            outcome: Outcome::Undercover(game.winner().unwrap()),
        };
        self.dbs.push_archive(&stats)?;
        *archived = true;
        Ok(())
    }

    /// Archives a Truth-or-Dare game as the session leaves it.
    /// Games where nothing was played leave no record.
    fn archive_dare(&mut self) -> Result<(), Box<dyn Error>> {
        let Game::TruthOrDare { game, started_ts, archived } = &mut self.game else {
            return Ok(());
        };
        if game.challenges_played() == 0 || *archived {
            return Ok(());
        }
        let stats = GameStats {
            id: self.id.clone(),
            game: GameKind::TruthOrDare,
            players: game.player_names().map(String::from).collect(),
            difficulty: game.difficulty(),
            started: (*started_ts).into(),
            finished: Utc::now(),
            outcome: Outcome::TruthOrDare {
                challenges: game.challenges_played(),
            },
        };
        self.dbs.push_archive(&stats)?;
        *archived = true;
        Ok(())
    }
}

impl Dbs {
    fn push_archive(&self, stats: &GameStats) -> Result<(), Box<dyn Error>> {
        let key = self.db.generate_id()?.to_be_bytes();
        let data = serde_json::to_string(stats)?;
        self.archive.insert(key, data.as_bytes())?;
        Ok(())
    }
}

impl Game {
    fn num_players(&self) -> usize {
        match self {
            Game::Lobby { players, .. } => players.len(),
            Game::Undercover { game, .. } => game.num_players(),
            Game::TruthOrDare { game, .. } => game.num_players(),
            Game::Over => 0,
        }
    }

    fn playing(&self) -> bool {
        matches!(self, Game::Undercover { .. } | Game::TruthOrDare { .. })
    }
}

fn lobby_json(
    kind: GameKind,
    difficulty: Difficulty,
    roles: &Option<RoleConfig>,
    players: &[Participant],
) -> Value {
    let roles = roles.unwrap_or_else(|| RoleConfig::suggest(players.len()));
    json!({
        "type": "lobby",
        "game": kind,
        "difficulty": difficulty,
        "roles": roles,
        "canStart": players.len() >= kind.min_players(),
        "players": players
            .iter()
            .map(|p| json!({ "id": p.name, "name": p.name, "emoji": p.emoji }))
            .collect::<Value>(),
    })
}
