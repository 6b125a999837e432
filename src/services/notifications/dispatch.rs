//! 通知分发
//!
//! 通知记录只在这里构造，由审批流在状态转移事务内一并落库：
//! 驳回时给授课教师一条高优先级通知，发布时给每个学生一条
//! 中优先级通知（按学生去重，发布重试被状态前置挡住，不会重复发）。

use std::collections::HashSet;

use crate::models::grade_sheets::entities::GradeSheet;
use crate::models::notifications::entities::{NotificationPriority, NotificationType};
use crate::models::notifications::requests::CreateNotificationRequest;

/// 驳回通知：发给成绩单的授课教师
pub fn rejection_notification(sheet: &GradeSheet, reason: &str) -> CreateNotificationRequest {
    CreateNotificationRequest {
        recipient_id: sheet.instructor_id,
        notification_type: NotificationType::GradeRejected,
        title: format!("成绩单被驳回: {}", sheet.assessment_name),
        message: format!(
            "课程 {} 的考核「{}」未通过审批，驳回原因: {}",
            sheet.course_id, sheet.assessment_name, reason
        ),
        priority: NotificationPriority::High,
    }
}

/// 发布通知：成绩单中每个不同学生一条
pub fn publication_notifications(sheet: &GradeSheet) -> Vec<CreateNotificationRequest> {
    let mut seen = HashSet::new();
    sheet
        .grades
        .iter()
        .filter(|entry| seen.insert(entry.student_id))
        .map(|entry| CreateNotificationRequest {
            recipient_id: entry.student_id,
            notification_type: NotificationType::GradePublished,
            title: format!("成绩已发布: {}", sheet.assessment_name),
            message: format!(
                "课程 {} 的考核「{}」成绩已发布: {}",
                sheet.course_id, sheet.assessment_name, entry.grade
            ),
            priority: NotificationPriority::Medium,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grade_sheets::entities::{
        AssessmentType, GradeEntry, LetterGrade, SheetStatus,
    };

    fn sheet_with_grades(entries: &[(i64, LetterGrade)]) -> GradeSheet {
        GradeSheet {
            id: 1,
            course_id: 101,
            instructor_id: 9,
            assessment_type: AssessmentType::Midterm,
            assessment_name: "期中考试".to_string(),
            total_marks: 100.0,
            weightage: 30.0,
            status: SheetStatus::Approved,
            grades: entries
                .iter()
                .enumerate()
                .map(|(i, &(student_id, grade))| GradeEntry {
                    id: i as i64 + 1,
                    sheet_id: 1,
                    student_id,
                    enrollment_id: student_id,
                    grade,
                    comments: None,
                })
                .collect(),
            submitted_at: None,
            approved_at: None,
            approval_comments: None,
            rejected_at: None,
            rejection_reason: None,
            published_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_one_notification_per_distinct_student() {
        let sheet = sheet_with_grades(&[
            (1001, LetterGrade::A),
            (1002, LetterGrade::BPlus),
            (1003, LetterGrade::C),
        ]);
        let notifications = publication_notifications(&sheet);

        assert_eq!(notifications.len(), 3);
        for n in &notifications {
            assert_eq!(n.notification_type, NotificationType::GradePublished);
            assert_eq!(n.priority, NotificationPriority::Medium);
            assert!(n.message.contains("期中考试"));
        }
        // 每个学生的消息里是自己的成绩
        assert!(notifications[0].message.contains(": A"));
        assert!(notifications[1].message.contains(": B+"));
        assert!(notifications[2].message.contains(": C"));
    }

    #[test]
    fn test_duplicate_students_are_collapsed() {
        let sheet = sheet_with_grades(&[
            (1001, LetterGrade::A),
            (1001, LetterGrade::A),
            (1002, LetterGrade::B),
        ]);
        let notifications = publication_notifications(&sheet);
        assert_eq!(notifications.len(), 2);
    }

    #[test]
    fn test_rejection_targets_instructor_with_high_priority() {
        let sheet = sheet_with_grades(&[(1001, LetterGrade::A)]);
        let n = rejection_notification(&sheet, "成绩分布异常");

        assert_eq!(n.recipient_id, 9);
        assert_eq!(n.notification_type, NotificationType::GradeRejected);
        assert_eq!(n.priority, NotificationPriority::High);
        assert!(n.message.contains("成绩分布异常"));
    }
}
