//! 课程总评存储操作
//!
//! course_grades 是派生数据，仅由 GPA 聚合器写入；
//! 回写 enrollments 的最终成绩在同一事务内完成。

use super::SeaOrmStorage;
use crate::entity::course_grades::Column as CourseGradeColumn;
use crate::entity::enrollments::Column as EnrollmentColumn;
use crate::entity::grade_entries::Column as EntryColumn;
use crate::entity::grade_sheets::Column as SheetColumn;
use crate::entity::prelude::{
    CourseGradeActiveModel, CourseGrades, Enrollments, GradeEntries, GradeSheets,
};
use crate::errors::{GradeflowError, Result};
use crate::models::enrollments::entities::EnrollmentStatus;
use crate::models::grade_sheets::{
    entities::{CourseGradeAggregate, LetterGrade, SheetStatus},
    responses::AssessmentGradeView,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};
use std::collections::HashMap;

impl SeaOrmStorage {
    /// 学生在已发布成绩单中的考核明细
    pub async fn list_published_assessments_for_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<AssessmentGradeView>> {
        let entries = GradeEntries::find()
            .filter(EntryColumn::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩条目失败: {e}")))?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let sheet_ids: Vec<i64> = entries.iter().map(|e| e.sheet_id).collect();
        let sheets = GradeSheets::find()
            .filter(SheetColumn::Id.is_in(sheet_ids))
            .filter(SheetColumn::Status.eq(SheetStatus::Published.as_str()))
            .order_by_desc(SheetColumn::PublishedAt)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩单失败: {e}")))?;

        let by_sheet: HashMap<i64, &crate::entity::grade_sheets::Model> =
            sheets.iter().map(|s| (s.id, s)).collect();

        let mut views = Vec::new();
        for entry in &entries {
            let Some(sheet) = by_sheet.get(&entry.sheet_id) else {
                continue;
            };
            // 库中非法等级字符串视为损坏数据，跳过该条
            let Ok(grade) = entry.grade.parse::<LetterGrade>() else {
                tracing::warn!("成绩条目 {} 的等级字符串损坏: {}", entry.id, entry.grade);
                continue;
            };
            views.push(AssessmentGradeView {
                course_id: sheet.course_id,
                assessment_type: sheet
                    .assessment_type
                    .parse()
                    .unwrap_or(crate::models::grade_sheets::entities::AssessmentType::Other),
                assessment_name: sheet.assessment_name.clone(),
                weightage: sheet.weightage,
                grade,
                comments: entry.comments.clone(),
                published_at: sheet
                    .published_at
                    .map(crate::models::grade_sheets::entities::datetime_from_epoch),
            });
        }

        Ok(views)
    }

    /// 写入课程总评并回写选课记录
    pub async fn upsert_course_grade_impl(
        &self,
        student_id: i64,
        course_id: i64,
        final_grade: LetterGrade,
        grade_points: f64,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(|e| {
            GradeflowError::database_operation(format!("开启事务失败: {e}"))
        })?;

        let existing = CourseGrades::find()
            .filter(CourseGradeColumn::StudentId.eq(student_id))
            .filter(CourseGradeColumn::CourseId.eq(course_id))
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询课程总评失败: {e}")))?;

        match existing {
            Some(model) => {
                CourseGrades::update_many()
                    .col_expr(CourseGradeColumn::FinalGrade, Expr::value(final_grade.as_str()))
                    .col_expr(CourseGradeColumn::GradePoints, Expr::value(grade_points))
                    .col_expr(CourseGradeColumn::ComputedAt, Expr::value(now))
                    .filter(CourseGradeColumn::Id.eq(model.id))
                    .exec(&txn)
                    .await
                    .map_err(|e| {
                        GradeflowError::database_operation(format!("更新课程总评失败: {e}"))
                    })?;
            }
            None => {
                let model = CourseGradeActiveModel {
                    student_id: Set(student_id),
                    course_id: Set(course_id),
                    final_grade: Set(final_grade.to_string()),
                    grade_points: Set(grade_points),
                    computed_at: Set(now),
                    ..Default::default()
                };
                model.insert(&txn).await.map_err(|e| {
                    GradeflowError::database_operation(format!("写入课程总评失败: {e}"))
                })?;
            }
        }

        Enrollments::update_many()
            .col_expr(EnrollmentColumn::FinalGrade, Expr::value(final_grade.as_str()))
            .col_expr(EnrollmentColumn::GradePoints, Expr::value(grade_points))
            .col_expr(
                EnrollmentColumn::Status,
                Expr::value(EnrollmentStatus::Completed.as_str()),
            )
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .exec(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("回写选课记录失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(())
    }

    /// 学生名下已完成的课程总评
    pub async fn list_course_grades_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<CourseGradeAggregate>> {
        let rows = CourseGrades::find()
            .filter(CourseGradeColumn::StudentId.eq(student_id))
            .order_by_desc(CourseGradeColumn::ComputedAt)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询课程总评失败: {e}")))?;

        Ok(rows.into_iter().filter_map(|m| m.into_aggregate()).collect())
    }
}
