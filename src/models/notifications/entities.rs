use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::grade_sheets::entities::datetime_from_epoch;

// 通知类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub enum NotificationType {
    GradePublished,
    GradeRejected,
    AssignmentDue,
    CourseAnnouncement,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::GradePublished => "grade_published",
            NotificationType::GradeRejected => "grade_rejected",
            NotificationType::AssignmentDue => "assignment_due",
            NotificationType::CourseAnnouncement => "course_announcement",
        }
    }
}

impl<'de> Deserialize<'de> for NotificationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的通知类型: '{s}'. 支持: grade_published, grade_rejected, assignment_due, course_announcement"
            ))
        })
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grade_published" => Ok(NotificationType::GradePublished),
            "grade_rejected" => Ok(NotificationType::GradeRejected),
            "assignment_due" => Ok(NotificationType::AssignmentDue),
            "course_announcement" => Ok(NotificationType::CourseAnnouncement),
            _ => Err(format!("Invalid notification type: {s}")),
        }
    }
}

// 通知优先级
#[derive(Debug, Clone, Copy, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub enum NotificationPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Urgent => "urgent",
            NotificationPriority::High => "high",
            NotificationPriority::Medium => "medium",
            NotificationPriority::Low => "low",
        }
    }
}

impl<'de> Deserialize<'de> for NotificationPriority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的通知优先级: '{s}'. 支持: urgent, high, medium, low"
            ))
        })
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(NotificationPriority::Urgent),
            "high" => Ok(NotificationPriority::High),
            "medium" => Ok(NotificationPriority::Medium),
            "low" => Ok(NotificationPriority::Low),
            _ => Err(format!("Invalid notification priority: {s}")),
        }
    }
}

// 通知
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl crate::entity::notifications::Model {
    pub fn into_notification(self) -> Notification {
        Notification {
            id: self.id,
            recipient_id: self.recipient_id,
            notification_type: self
                .notification_type
                .parse()
                .unwrap_or(NotificationType::CourseAnnouncement),
            title: self.title,
            message: self.message,
            priority: self
                .priority
                .parse()
                .unwrap_or(NotificationPriority::Medium),
            read: self.is_read,
            created_at: datetime_from_epoch(self.created_at),
        }
    }
}
