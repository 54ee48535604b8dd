use serde::{Deserialize, Serialize};

use crate::models::notificationmodel::Notification;

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationListDto {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkAllReadDto {
    pub updated: u64,
}
