use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::{
        notificationdtos::{MarkAllReadDto, NotificationListDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notifications_handler() -> Router {
    Router::new()
        .route("/", get(get_notifications))
        .route("/read-all", put(mark_all_read))
        .route("/:notification_id/read", put(mark_read))
}

pub async fn get_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let notifications = app_state
        .notification_service
        .list_for_user(auth.user.id)
        .await?;
    let unread_count = app_state
        .notification_service
        .unread_count(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Notifications retrieved successfully",
        NotificationListDto {
            notifications,
            unread_count,
        },
    )))
}

pub async fn mark_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let notification = app_state
        .notification_service
        .mark_as_read(auth.user.id, notification_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Notification marked as read",
        notification,
    )))
}

pub async fn mark_all_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let updated = app_state
        .notification_service
        .mark_all_as_read(auth.user.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "All notifications marked as read",
        MarkAllReadDto { updated },
    )))
}
