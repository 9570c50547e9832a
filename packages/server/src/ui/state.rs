//! Shared application state for the handlers.

use std::sync::Arc;

use axum::http::HeaderValue;

use crate::usecase::{GetRoomDetailUseCase, GetRoomsUseCase, SessionController};

/// Shared application state
pub struct AppState {
    /// SessionController（接続ライフサイクルの制御）
    pub session_controller: Arc<SessionController>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// WebSocket ハンドシェイクで許可する Origin（None なら全て許可）
    pub allowed_origin: Option<HeaderValue>,
}
