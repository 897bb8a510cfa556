use std::sync::Arc;
use warp::Filter;

use crate::drawing::DrawingStore;
use crate::game_manager::GameManager;
use crate::room_directory::RoomDirectory;
use crate::websocket::ConnectionManager;

pub mod config;
pub mod drawing;
pub mod game_manager;
pub mod room_directory;
pub mod websocket;

pub fn create_routes(
    connection_manager: Arc<ConnectionManager>,
    rooms: Arc<RoomDirectory>,
    game_manager: Arc<GameManager>,
    drawings: Arc<DrawingStore>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let rooms_filter = warp::any().map({
        let rooms = rooms.clone();
        move || rooms.clone()
    });

    let game_manager_filter = warp::any().map({
        let game_manager = game_manager.clone();
        move || game_manager.clone()
    });

    let drawings_filter = warp::any().map({
        let drawings = drawings.clone();
        move || drawings.clone()
    });

    // WebSocket endpoint
    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter)
        .and(rooms_filter)
        .and(game_manager_filter)
        .and(drawings_filter)
        .map(
            |ws: warp::ws::Ws, conn_mgr, rooms, game_mgr, drawings| {
                ws.on_upgrade(move |socket| {
                    websocket::handle_connection(socket, conn_mgr, rooms, game_mgr, drawings)
                })
            },
        );

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET"]);

    websocket
        .or(health)
        .with(cors)
        .with(warp::log("sketch_arena"))
}
