use serde::Deserialize;
use ts_rs::TS;

use super::entities::{NotificationPriority, NotificationType};
use crate::models::common::pagination::PaginationQuery;

/// 创建通知请求（仅由 NotificationDispatcher 构造）
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub recipient_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
}

/// 通知列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct NotificationListParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub unread_only: Option<bool>,
}

impl NotificationListParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page.unwrap_or(1),
            size: self.size.unwrap_or(20),
        }
    }
}
