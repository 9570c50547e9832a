//! Server execution logic.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method, header::InvalidHeaderValue},
    routing::get,
};
use roka_shared::time::SystemClock;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    domain::Presence,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryPresenceRepository,
    },
    usecase::{EventBroadcaster, GetRoomDetailUseCase, GetRoomsUseCase, SessionController},
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Host process settings. None of these reach the presence core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,
    /// Port to bind to; `0` picks an ephemeral port
    pub port: u16,
    /// Origin allowed to open WebSocket connections and call the HTTP API.
    /// `None` accepts any origin.
    pub allowed_origin: Option<String>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Chat relay server
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig {
///     host: "0.0.0.0".to_string(),
///     port: 4000,
///     allowed_origin: Some("http://localhost:3000".to_string()),
/// };
/// Server::in_memory().run(config).await?;
/// ```
pub struct Server {
    /// SessionController（接続ライフサイクルの制御）
    session_controller: Arc<SessionController>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}

impl Server {
    pub fn new(
        session_controller: Arc<SessionController>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    ) -> Self {
        Self {
            session_controller,
            get_rooms_usecase,
            get_room_detail_usecase,
        }
    }

    /// Wires the in-process stack: in-memory presence, WebSocket pusher and the
    /// use cases on top of them.
    pub fn in_memory() -> Self {
        // 1. Repository (in-memory presence)
        let presence = Arc::new(Mutex::new(Presence::new()));
        let repository = Arc::new(InMemoryPresenceRepository::new(presence));

        // 2. MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));

        // 3. UseCases
        let broadcaster = Arc::new(EventBroadcaster::new(
            repository.clone(),
            message_pusher,
        ));
        let session_controller = Arc::new(SessionController::new(
            repository.clone(),
            broadcaster,
            Arc::new(SystemClock),
        ));
        let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
        let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository));

        Self::new(
            session_controller,
            get_rooms_usecase,
            get_room_detail_usecase,
        )
    }

    /// Builds the router with its state and middleware.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured origin is not a valid header value.
    pub fn router(self, config: &ServerConfig) -> Result<Router, InvalidHeaderValue> {
        let allowed_origin = config
            .allowed_origin
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()?;

        let cors = match &allowed_origin {
            Some(origin) => CorsLayer::new()
                .allow_origin(origin.clone())
                .allow_methods([Method::GET])
                .allow_credentials(true),
            None => CorsLayer::permissive(),
        };

        let app_state = Arc::new(AppState {
            session_controller: self.session_controller,
            get_rooms_usecase: self.get_rooms_usecase,
            get_room_detail_usecase: self.get_room_detail_usecase,
            allowed_origin,
        });

        Ok(Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room}", get(get_room_detail))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(app_state))
    }

    /// Run the chat relay until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the server fails to
    /// bind, or serving fails.
    pub async fn run(self, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router(&config)?;

        let bind_addr = config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        match &config.allowed_origin {
            Some(origin) => tracing::info!("Allowed origin: {}", origin),
            None => tracing::warn!("No allowed origin configured, accepting any origin"),
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
