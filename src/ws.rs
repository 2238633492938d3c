use crate::{
    client::{Client, GameAction},
    data::Difficulty,
    error::GameError,
    session::{GameKind, SessionManager},
};
use futures_util::{SinkExt, StreamExt, TryStreamExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;

#[derive(Error, Debug)]
enum WsError {
    #[error("violation of the application-layer protocol")]
    ProtocolError,
}

pub async fn accept_connection(stream: TcpStream, manager: &SessionManager) {
    log::info!("Accepted new connection");

    let Ok(stream) = tokio_tungstenite::accept_async(stream).await else {
        log::error!("Error occured during websocket handshake");
        return;
    };
    let (mut write, mut read) = stream.split();

    let mut client = Client::new(manager);

    loop {
        tokio::select! {
            msg = read.try_next() => {
                let Ok(Some(Message::Text(msg))) = msg else {
                    break;
                };
                let Ok(msg) = serde_json::from_str::<Value>(&msg) else {
                    log::error!("Invalid JSON received: {}", &msg);
                    break;
                };
                let Ok(msg) = parse_request(&msg) else {
                    log::error!("Invalid message received: {}", &msg);
                    break;
                };
                match process_request(msg, &mut client) {
                    Ok(Some(reply)) => {
                        write.send(Message::Text(reply.to_string())).await.ok();
                    },
                    Ok(None) => {},
                    Err(err) => {
                        log::error!("Client request failed: {}", err);
                        let reply = json!({
                            "type": "error",
                            "error": err.to_string()
                        });
                        write.send(Message::Text(reply.to_string())).await.ok();
                    }
                }
            },
            state = client.next_state() => {
                let reply = json!({
                    "type": "update",
                    "state": state
                });
                if write.send(Message::Text(reply.to_string())).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            }
        }
    }
}

/// A message sent by a game client to the server.
enum Request {
    CreateGame { kind: GameKind, difficulty: Difficulty },
    JoinAsBoard { game_id: String },
    JoinAsPlayer { game_id: String, name: String, emoji: String },
    Action(GameAction),
    Heartbeat,
}

/// Parses a websockets message from the client.
fn parse_request(req: &Value) -> Result<Request, WsError> {
    match req["type"].as_str().unwrap_or("") {
        "create_game" => {
            let kind = serde_json::from_value(req["game"].clone())
                .map_err(|_| WsError::ProtocolError)?;
            let difficulty =
                serde_json::from_value(req["difficulty"].clone()).unwrap_or(Difficulty::Easy);
            Ok(Request::CreateGame { kind, difficulty })
        }
        "board_join" => {
            let game_id = req["gameId"]
                .as_str()
                .ok_or(WsError::ProtocolError)?
                .to_string();
            Ok(Request::JoinAsBoard { game_id })
        }
        "player_join" => {
            let game_id = req["gameId"]
                .as_str()
                .ok_or(WsError::ProtocolError)?
                .to_string();
            let name = req["name"]
                .as_str()
                .ok_or(WsError::ProtocolError)?
                .to_ascii_uppercase();
            let emoji = req["emoji"].as_str().unwrap_or("🙂").to_string();
            Ok(Request::JoinAsPlayer { game_id, name, emoji })
        }
        "player_action" => {
            let action = serde_json::from_value(req["action"].clone())
                .map_err(|_| WsError::ProtocolError)?;
            Ok(Request::Action(action))
        }
        "heartbeat" => Ok(Request::Heartbeat),
        _ => Err(WsError::ProtocolError),
    }
}

/// Processes a request from the client.
fn process_request(req: Request, client: &mut Client) -> Result<Option<Value>, GameError> {
    match req {
        Request::CreateGame { kind, difficulty } => {
            let game_id = client.create_game(kind, difficulty);
            Ok(Some(json!({
                "type": "game_created",
                "gameId": game_id
            })))
        }
        Request::JoinAsBoard { game_id } => {
            client.join_as_board(&game_id)?;
            Ok(Some(json!({
                "type": "game_joined",
                "gameId": game_id,
                "playerId": Value::Null
            })))
        }
        Request::JoinAsPlayer { game_id, name, emoji } => {
            client.join_as_player(&game_id, &name, &emoji)?;
            Ok(Some(json!({
                "type": "game_joined",
                "gameId": game_id,
                "playerId": name
            })))
        }
        Request::Action(action) => {
            client.action(action)?;
            Ok(None)
        }
        Request::Heartbeat => {
            client.heartbeat();
            Ok(None)
        }
    }
}
