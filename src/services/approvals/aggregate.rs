//! 课程总评聚合
//!
//! 某个学生在课程下已发布考核中的权重之和达到 100 时触发，
//! 计算该学生的加权绩点并写入总评表。权重按学生分别累计，
//! 缺考某次考核的学生不会被部分权重提前定稿。总评是派生数据，
//! 重复发布时整体覆盖重算。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::models::grade_sheets::entities::{GradeSheet, LetterGrade, SheetStatus};
use crate::storage::Storage;
use crate::utils::gpa::{self, WeightedGrade};

/// 按学生归并已发布成绩单的加权输入
fn collect_weighted(sheets: &[GradeSheet]) -> HashMap<i64, Vec<WeightedGrade>> {
    let mut by_student: HashMap<i64, Vec<WeightedGrade>> = HashMap::new();
    for sheet in sheets {
        for entry in &sheet.grades {
            by_student
                .entry(entry.student_id)
                .or_default()
                .push(WeightedGrade {
                    weightage: sheet.weightage,
                    grade: entry.grade,
                });
        }
    }
    by_student
}

/// 计算已配满权重学生的总评
///
/// 权重按学生各自累计，未达到 100 的学生不出现在结果中。
fn finalized_aggregates(published: &[GradeSheet]) -> Vec<(i64, f64, LetterGrade)> {
    let mut finalized = Vec::new();
    for (student_id, grades) in collect_weighted(published) {
        let student_weightage: f64 = grades.iter().map(|g| g.weightage).sum();
        if !gpa::is_fully_weighted(student_weightage) {
            continue;
        }
        if let Some((points, letter)) = gpa::aggregate_course_grade(&grades) {
            finalized.push((student_id, points, letter));
        }
    }
    finalized
}

/// 重算课程总评，返回更新的学生数
///
/// 权重未配满的学生不做任何事。
pub async fn recompute_course_aggregates(
    storage: &Arc<dyn Storage>,
    course_id: i64,
) -> Result<usize> {
    let sheets = storage.list_grade_sheets_by_course(course_id).await?;
    let published: Vec<GradeSheet> = sheets
        .into_iter()
        .filter(|s| s.status == SheetStatus::Published)
        .collect();

    let mut updated = 0;
    for (student_id, points, letter) in finalized_aggregates(&published) {
        storage
            .upsert_course_grade(student_id, course_id, letter, points)
            .await?;
        updated += 1;
    }

    info!("课程 {} 总评重算完成，更新 {} 名学生", course_id, updated);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grade_sheets::entities::{AssessmentType, GradeEntry, LetterGrade};

    fn published_sheet(id: i64, weightage: f64, grades: Vec<(i64, LetterGrade)>) -> GradeSheet {
        GradeSheet {
            id,
            course_id: 101,
            instructor_id: 9,
            assessment_type: AssessmentType::Midterm,
            assessment_name: format!("考核 {id}"),
            total_marks: 100.0,
            weightage,
            status: SheetStatus::Published,
            grades: grades
                .into_iter()
                .enumerate()
                .map(|(i, (student_id, grade))| GradeEntry {
                    id: i as i64 + 1,
                    sheet_id: id,
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
            published_at: Some(chrono::Utc::now()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_collect_weighted_groups_by_student() {
        let sheets = vec![
            published_sheet(
                1,
                30.0,
                vec![(1001, LetterGrade::B), (1002, LetterGrade::A)],
            ),
            published_sheet(2, 70.0, vec![(1001, LetterGrade::A)]),
        ];

        let by_student = collect_weighted(&sheets);
        assert_eq!(by_student.len(), 2);
        assert_eq!(by_student[&1001].len(), 2);
        assert_eq!(by_student[&1002].len(), 1);

        // 30% B + 70% A = 3.7
        let (points, letter) = gpa::aggregate_course_grade(&by_student[&1001]).unwrap();
        assert_eq!(points, 3.7);
        assert_eq!(letter, LetterGrade::AMinus);
    }

    #[test]
    fn test_student_with_partial_weightage_is_not_finalized() {
        // 1002 只出现在 30% 的考核里，权重没配满，不能被定稿
        let sheets = vec![
            published_sheet(
                1,
                30.0,
                vec![(1001, LetterGrade::B), (1002, LetterGrade::B)],
            ),
            published_sheet(2, 70.0, vec![(1001, LetterGrade::A)]),
        ];

        let finalized = finalized_aggregates(&sheets);
        assert_eq!(finalized.len(), 1);

        let (student_id, points, letter) = finalized[0];
        assert_eq!(student_id, 1001);
        assert_eq!(points, 3.7);
        assert_eq!(letter, LetterGrade::AMinus);
    }

    #[test]
    fn test_no_student_finalized_below_full_weightage() {
        let sheets = vec![published_sheet(
            1,
            60.0,
            vec![(1001, LetterGrade::A), (1002, LetterGrade::B)],
        )];

        assert!(finalized_aggregates(&sheets).is_empty());
    }
}
