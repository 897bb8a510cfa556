use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use game_core::{BuiltinCatalog, WordCatalog};
use game_server::{
    config::Config, create_routes, drawing::DrawingStore, game_manager::GameManager,
    room_directory::RoomDirectory, websocket::ConnectionManager,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Sketch Arena server...");

    let config = Config::new();
    let connection_manager = Arc::new(ConnectionManager::new());
    let rooms = Arc::new(RoomDirectory::new(config.max_players_per_room));
    let drawings = Arc::new(DrawingStore::new());

    let catalog: Arc<dyn WordCatalog> = match BuiltinCatalog::new() {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::error!("Failed to build the prompt catalog: {}", e);
            std::process::exit(1);
        }
    };

    let game_manager = Arc::new(GameManager::new(
        rooms.clone(),
        connection_manager.clone(),
        drawings.clone(),
        catalog,
        config.session_settings(),
    ));

    let routes = create_routes(
        connection_manager.clone(),
        rooms.clone(),
        game_manager.clone(),
        drawings.clone(),
    );

    // Start cleanup task
    let cleanup_connection_manager = connection_manager.clone();
    let cleanup_game_manager = game_manager.clone();
    let cleanup_config = config.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let connection_timeout = Duration::from_secs(cleanup_config.connection_timeout_seconds);
            let room_ttl = Duration::from_secs(cleanup_config.room_ttl_minutes * 60);

            cleanup_connection_manager
                .cleanup_inactive_connections(connection_timeout)
                .await;
            cleanup_game_manager.cleanup_expired_rooms(room_ttl).await;
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
