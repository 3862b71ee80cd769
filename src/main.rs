use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cluedash::{
    api,
    config::EngineConfig,
    providers::{InMemoryLobbies, InMemoryLobbyScores, InMemoryUsers, WordList},
    state::{Collaborators, Engine},
    suggest::SuggestConfig,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cluedash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting cluedash...");

    let config = EngineConfig::from_env();

    let words = match std::env::var("WORDS_FILE") {
        Ok(path) => match WordList::from_file(&path) {
            Ok(list) if !list.is_empty() => {
                tracing::info!("Loaded {} words from {}", list.len(), path);
                list
            }
            Ok(_) => {
                tracing::warn!("Word file {} is empty, using built-in words", path);
                WordList::builtin()
            }
            Err(e) => {
                tracing::warn!("Failed to read word file {}: {}. Using built-in words.", path, e);
                WordList::builtin()
            }
        },
        Err(_) => WordList::builtin(),
    };

    let lobbies = match std::env::var("LOBBIES_FILE") {
        Ok(path) => match InMemoryLobbies::from_json_file(&path) {
            Ok(lobbies) => {
                tracing::info!("Seeded {} lobbies from {}", lobbies.len().await, path);
                lobbies
            }
            Err(e) => {
                tracing::warn!("Failed to seed lobbies from {}: {}", path, e);
                InMemoryLobbies::new()
            }
        },
        Err(_) => InMemoryLobbies::new(),
    };

    let suggest_config = SuggestConfig::from_env();
    let suggestions = match suggest_config.build_provider() {
        Ok(provider) => {
            tracing::info!("Bot clues provided by {}", provider.name());
            Some(provider)
        }
        Err(e) => {
            tracing::warn!("No clue suggestions: {}. Bots will stay silent.", e);
            None
        }
    };

    let engine = Arc::new(Engine::new(
        config,
        Collaborators {
            lobbies: Arc::new(lobbies),
            users: Arc::new(InMemoryUsers::new()),
            lobby_scores: Arc::new(InMemoryLobbyScores::new()),
            words: Arc::new(words),
            suggestions,
            suggest_config,
        },
    ));

    let app = api::router(engine.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(6574);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .unwrap();

    engine.shutdown().await;
}
