use crate::data::GameData;
use crate::session::SessionManager;
use crate::ws::accept_connection;
use anyhow::Context;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;

mod api;
mod client;
mod dare;
mod data;
mod error;
mod game;
mod pg;
mod session;
mod ws;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    if let Err(err) = run().await {
        log::error!("{:#}", err);
    }
}

async fn run() -> anyhow::Result<()> {
    let port: u16 = std::env::var("PORT")
        .context("PORT is unspecified")?
        .parse()
        .context("PORT is invalid")?;

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let data = GameData::load(Path::new(&data_dir))?;
    let data: &'static GameData = Box::leak(Box::new(data));

    let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "db".to_string());
    let db = sled::open(&db_path).with_context(|| format!("could not open database: {}", db_path))?;

    let manager = SessionManager::new(db.clone(), data)
        .map_err(|err| anyhow::anyhow!("could not restore sessions: {}", err))?;
    let manager: &'static SessionManager = Box::leak(Box::new(manager));

    // Background tasks: archive sync, idle session purge, status API.
    tokio::spawn(pg::sync_game_stats(db));
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(600)).await;
            manager.purge_games();
        }
    });
    if let Ok(Ok(api_port)) = std::env::var("API_PORT").map(|s| s.parse::<u16>()) {
        tokio::spawn(async move {
            let listener = api::listen(api_port).await;
            axum::serve(listener, api::make_router(manager)).await.ok();
        });
    }

    let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind to address: {:?}", addr))?;
    log::info!("Listening on: {:?}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, manager));
    }
    Ok(())
}
