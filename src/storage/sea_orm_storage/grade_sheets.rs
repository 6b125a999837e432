//! 成绩单存储操作

use super::SeaOrmStorage;
use crate::entity::prelude::{
    EnrollmentModel, Enrollments, GradeEntries, GradeEntryActiveModel, GradeSheetActiveModel,
    GradeSheets, NotificationActiveModel,
};
use crate::errors::{GradeflowError, Result};
use crate::models::grade_sheets::{
    entities::{GradeSheet, LetterGrade, SheetAction, SheetStatus},
    requests::{CreateGradeSheetRequest, GradeEntryInput},
};
use crate::models::notifications::requests::CreateNotificationRequest;
use crate::storage::TransitionFields;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use std::collections::HashMap;

use crate::entity::enrollments::Column as EnrollmentColumn;
use crate::entity::grade_entries::Column as EntryColumn;
use crate::entity::grade_sheets::Column as SheetColumn;
use crate::models::enrollments::entities::EnrollmentStatus;

/// 通过选课名单校验后的成绩条目
struct ValidatedEntry {
    student_id: i64,
    enrollment_id: i64,
    grade: LetterGrade,
    comments: Option<String>,
}

impl SeaOrmStorage {
    /// 成绩单字段校验
    ///
    /// 权重允许为 0，表示不计入总评的考核。
    fn validate_sheet_request(sheet: &CreateGradeSheetRequest) -> Result<()> {
        if sheet.assessment_name.trim().is_empty() {
            return Err(GradeflowError::validation("考核名称不能为空"));
        }
        if !(sheet.total_marks > 0.0) {
            return Err(GradeflowError::validation("总分必须为正数"));
        }
        if !(sheet.weightage >= 0.0 && sheet.weightage <= 100.0) {
            return Err(GradeflowError::validation("权重必须在 [0, 100] 范围内"));
        }
        Ok(())
    }

    /// 创建成绩单（初始状态 Draft）
    pub async fn create_grade_sheet_impl(
        &self,
        instructor_id: i64,
        sheet: CreateGradeSheetRequest,
    ) -> Result<GradeSheet> {
        Self::validate_sheet_request(&sheet)?;

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(|e| {
            GradeflowError::database_operation(format!("开启事务失败: {e}"))
        })?;

        let model = GradeSheetActiveModel {
            course_id: Set(sheet.course_id),
            instructor_id: Set(instructor_id),
            assessment_type: Set(sheet.assessment_type.to_string()),
            assessment_name: Set(sheet.assessment_name.trim().to_string()),
            total_marks: Set(sheet.total_marks),
            weightage: Set(sheet.weightage),
            status: Set(SheetStatus::Draft.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("创建成绩单失败: {e}")))?;

        if !sheet.entries.is_empty() {
            let validated =
                Self::validate_entries(&txn, sheet.course_id, &sheet.entries).await?;
            Self::insert_entries(&txn, created.id, validated).await?;
        }

        txn.commit()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_grade_sheet_impl(created.id)
            .await?
            .ok_or_else(|| GradeflowError::database_operation("成绩单创建后查询失败"))
    }

    /// 通过 ID 获取成绩单（含条目）
    pub async fn get_grade_sheet_impl(&self, sheet_id: i64) -> Result<Option<GradeSheet>> {
        let sheet = GradeSheets::find_by_id(sheet_id)
            .one(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩单失败: {e}")))?;

        let Some(sheet) = sheet else {
            return Ok(None);
        };

        let entries = sheet
            .find_related(GradeEntries)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩条目失败: {e}")))?;

        Ok(Some(sheet.into_grade_sheet(entries)))
    }

    /// 列出教师名下的成绩单，按创建时间倒序
    pub async fn list_grade_sheets_by_instructor_impl(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<GradeSheet>> {
        let rows = GradeSheets::find()
            .filter(SheetColumn::InstructorId.eq(instructor_id))
            .order_by_desc(SheetColumn::CreatedAt)
            .find_with_related(GradeEntries)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩单列表失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(sheet, entries)| sheet.into_grade_sheet(entries))
            .collect())
    }

    /// 列出课程下的成绩单
    pub async fn list_grade_sheets_by_course_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<GradeSheet>> {
        let rows = GradeSheets::find()
            .filter(SheetColumn::CourseId.eq(course_id))
            .order_by_desc(SheetColumn::CreatedAt)
            .find_with_related(GradeEntries)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询课程成绩单失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(sheet, entries)| sheet.into_grade_sheet(entries))
            .collect())
    }

    /// 整体替换成绩条目
    ///
    /// 仅 Draft 状态可编辑；任一行校验失败则整批拒绝，失败原因逐行列出。
    pub async fn replace_grade_entries_impl(
        &self,
        sheet_id: i64,
        entries: Vec<GradeEntryInput>,
    ) -> Result<GradeSheet> {
        let txn = self.db.begin().await.map_err(|e| {
            GradeflowError::database_operation(format!("开启事务失败: {e}"))
        })?;

        let sheet = GradeSheets::find_by_id(sheet_id)
            .one(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询成绩单失败: {e}")))?
            .ok_or_else(|| GradeflowError::not_found(format!("成绩单不存在: {sheet_id}")))?;

        if sheet.status != SheetStatus::Draft.as_str() {
            return Err(GradeflowError::conflict(format!(
                "成绩单当前状态为 {}，只有草稿可以编辑条目",
                sheet.status
            )));
        }

        let validated = Self::validate_entries(&txn, sheet.course_id, &entries).await?;

        GradeEntries::delete_many()
            .filter(EntryColumn::SheetId.eq(sheet_id))
            .exec(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("清除旧条目失败: {e}")))?;

        Self::insert_entries(&txn, sheet_id, validated).await?;

        GradeSheets::update_many()
            .col_expr(
                SheetColumn::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(SheetColumn::Id.eq(sheet_id))
            .exec(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("更新成绩单时间失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_grade_sheet_impl(sheet_id)
            .await?
            .ok_or_else(|| GradeflowError::database_operation("成绩单更新后查询失败"))
    }

    /// 待审批队列：仅 Submitted，按提交时间升序
    pub async fn list_pending_grade_sheets_impl(&self) -> Result<Vec<GradeSheet>> {
        let rows = GradeSheets::find()
            .filter(SheetColumn::Status.eq(SheetStatus::Submitted.as_str()))
            .order_by_asc(SheetColumn::SubmittedAt)
            .find_with_related(GradeEntries)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询待审批队列失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(sheet, entries)| sheet.into_grade_sheet(entries))
            .collect())
    }

    /// 乐观并发的状态转移
    ///
    /// 条件 UPDATE 以持久状态为准：WHERE 带上动作要求的来源状态，
    /// 影响行数为 0 说明状态已被并发修改，返回冲突错误。
    /// 通知与状态翻转在同一事务内写入，要么都生效要么都不生效。
    pub async fn transition_grade_sheet_impl(
        &self,
        sheet_id: i64,
        action: SheetAction,
        fields: TransitionFields,
        notifications: Vec<CreateNotificationRequest>,
    ) -> Result<GradeSheet> {
        let expected = SheetStatus::required_for(action);
        let target = expected
            .apply(action)
            .ok_or_else(|| GradeflowError::conflict(format!("非法的状态转移: {}", action.as_str())))?;

        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await.map_err(|e| {
            GradeflowError::database_operation(format!("开启事务失败: {e}"))
        })?;

        let mut update = GradeSheets::update_many()
            .col_expr(SheetColumn::Status, Expr::value(target.as_str()))
            .col_expr(SheetColumn::UpdatedAt, Expr::value(now));

        update = match action {
            SheetAction::Submit => update.col_expr(SheetColumn::SubmittedAt, Expr::value(now)),
            SheetAction::Approve => update
                .col_expr(SheetColumn::ApprovedAt, Expr::value(now))
                .col_expr(
                    SheetColumn::ApprovalComments,
                    Expr::value(fields.approval_comments.clone()),
                ),
            SheetAction::Reject => update
                .col_expr(SheetColumn::RejectedAt, Expr::value(now))
                .col_expr(
                    SheetColumn::RejectionReason,
                    Expr::value(fields.rejection_reason.clone()),
                ),
            SheetAction::Publish => update.col_expr(SheetColumn::PublishedAt, Expr::value(now)),
        };

        let result = update
            .filter(SheetColumn::Id.eq(sheet_id))
            .filter(SheetColumn::Status.eq(expected.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("状态转移失败: {e}")))?;

        if result.rows_affected == 0 {
            // 状态不满足前置条件，区分不存在与并发冲突
            let exists = GradeSheets::find_by_id(sheet_id)
                .one(&txn)
                .await
                .map_err(|e| GradeflowError::database_operation(format!("查询成绩单失败: {e}")))?;

            return match exists {
                None => Err(GradeflowError::not_found(format!(
                    "成绩单不存在: {sheet_id}"
                ))),
                Some(sheet) => Err(GradeflowError::conflict(format!(
                    "无法对状态为 {} 的成绩单执行 {}，要求状态为 {}",
                    sheet.status,
                    action.as_str(),
                    expected.as_str()
                ))),
            };
        }

        if !notifications.is_empty() {
            let models: Vec<NotificationActiveModel> = notifications
                .into_iter()
                .map(|req| NotificationActiveModel {
                    recipient_id: Set(req.recipient_id),
                    notification_type: Set(req.notification_type.to_string()),
                    title: Set(req.title),
                    message: Set(req.message),
                    priority: Set(req.priority.to_string()),
                    is_read: Set(false),
                    created_at: Set(now),
                    ..Default::default()
                })
                .collect();

            crate::entity::prelude::Notifications::insert_many(models)
                .exec(&txn)
                .await
                .map_err(|e| GradeflowError::database_operation(format!("写入通知失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_grade_sheet_impl(sheet_id)
            .await?
            .ok_or_else(|| GradeflowError::database_operation("成绩单转移后查询失败"))
    }

    /// 校验整批条目，返回携带选课记录的合法条目
    async fn validate_entries(
        txn: &DatabaseTransaction,
        course_id: i64,
        entries: &[GradeEntryInput],
    ) -> Result<Vec<ValidatedEntry>> {
        let roster: Vec<EnrollmentModel> = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::Status.ne(EnrollmentStatus::Dropped.as_str()))
            .all(txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询选课名单失败: {e}")))?;

        let by_student: HashMap<i64, i64> =
            roster.iter().map(|e| (e.student_id, e.id)).collect();

        let mut validated = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for input in entries {
            if !seen.insert(input.student_id) {
                issues.push(format!("学生 {} 在本批次中重复出现", input.student_id));
                continue;
            }
            let Some(&enrollment_id) = by_student.get(&input.student_id) else {
                issues.push(format!("学生 {} 不在本课程选课名单中", input.student_id));
                continue;
            };
            let Some(grade) = LetterGrade::parse_normalized(&input.grade) else {
                issues.push(format!(
                    "学生 {} 的成绩等级非法: '{}'",
                    input.student_id, input.grade
                ));
                continue;
            };
            validated.push(ValidatedEntry {
                student_id: input.student_id,
                enrollment_id,
                grade,
                comments: input.comments.clone(),
            });
        }

        if !issues.is_empty() {
            return Err(GradeflowError::validation(format!(
                "成绩条目校验失败: {}",
                issues.join("; ")
            )));
        }

        Ok(validated)
    }

    async fn insert_entries(
        txn: &DatabaseTransaction,
        sheet_id: i64,
        entries: Vec<ValidatedEntry>,
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let models: Vec<GradeEntryActiveModel> = entries
            .into_iter()
            .map(|e| GradeEntryActiveModel {
                sheet_id: Set(sheet_id),
                student_id: Set(e.student_id),
                enrollment_id: Set(e.enrollment_id),
                grade: Set(e.grade.to_string()),
                comments: Set(e.comments),
                ..Default::default()
            })
            .collect();

        GradeEntries::insert_many(models)
            .exec(txn)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("写入成绩条目失败: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grade_sheets::entities::AssessmentType;

    fn request_with_weightage(weightage: f64) -> CreateGradeSheetRequest {
        CreateGradeSheetRequest {
            course_id: 101,
            assessment_type: AssessmentType::Quiz,
            assessment_name: "随堂测验".to_string(),
            total_marks: 100.0,
            weightage,
            entries: Vec::new(),
        }
    }

    #[test]
    fn test_zero_weightage_is_accepted() {
        assert!(SeaOrmStorage::validate_sheet_request(&request_with_weightage(0.0)).is_ok());
        assert!(SeaOrmStorage::validate_sheet_request(&request_with_weightage(100.0)).is_ok());
    }

    #[test]
    fn test_out_of_range_weightage_is_rejected() {
        assert!(SeaOrmStorage::validate_sheet_request(&request_with_weightage(-1.0)).is_err());
        assert!(SeaOrmStorage::validate_sheet_request(&request_with_weightage(100.5)).is_err());
        assert!(SeaOrmStorage::validate_sheet_request(&request_with_weightage(f64::NAN)).is_err());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut request = request_with_weightage(30.0);
        request.assessment_name = "  ".to_string();
        assert!(SeaOrmStorage::validate_sheet_request(&request).is_err());
    }
}
