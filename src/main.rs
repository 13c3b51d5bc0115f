//! Our Fridge stdio entry point
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use our_fridge::collaborators::{LocalAuthProvider, StaticPermission};
use our_fridge::commands::{handle_line, spawn_auth_watcher, AppState, Response};
use our_fridge::config::load_config_with_env;
use our_fridge::domain::{Identity, SystemClock};
use our_fridge::repository::{RemoteStateGateway, SqliteKeyValueStore, SupabaseGateway};
use our_fridge::session::FridgeSession;

const DATA_DIR_ENV: &str = "OUR_FRIDGE_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".our-fridge";
const DB_FILE_NAME: &str = "our_fridge.db";

fn data_dir() -> PathBuf {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)?;

    if let Err(e) = rolling_logger::init_logger(data_dir.join("logs"), "OurFridge") {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = load_config_with_env(&data_dir);
    let storage = SqliteKeyValueStore::open(&data_dir.join(DB_FILE_NAME))?;

    let gateway: Option<Arc<dyn RemoteStateGateway>> = match config.active_remote() {
        Some(remote) => match SupabaseGateway::new(remote) {
            Ok(gateway) => Some(Arc::new(gateway)),
            Err(e) => {
                log::error!("Remote sync disabled: {}", e);
                None
            }
        },
        None => {
            log::info!("No remote configured; running local-only");
            None
        }
    };

    let mut session = FridgeSession::new(config, storage, gateway, Arc::new(SystemClock));
    session.switch_identity(Identity::Guest).await;

    let state = Arc::new(AppState::new(
        session,
        Arc::new(LocalAuthProvider::new()),
        Arc::new(StaticPermission::unsupported()),
    ));
    let watcher = spawn_auth_watcher(state.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(&state, line).await;
        let text = match serde_json::to_string(&response) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to encode response: {}", e);
                serde_json::to_string(&Response::error(e.to_string()))?
            }
        };
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    watcher.abort();
    state.session.lock().await.flush().await;
    log::info!("stdin closed, shutting down");
    Ok(())
}
