use std::sync::Arc;

use crate::models::{
    enrollments::entities::Enrollment,
    grade_sheets::{
        entities::{GradeSheet, LetterGrade, SheetAction},
        requests::{CreateGradeSheetRequest, GradeEntryInput},
        responses::AssessmentGradeView,
    },
    grade_sheets::entities::CourseGradeAggregate,
    notifications::{
        requests::{CreateNotificationRequest, NotificationListParams},
        responses::NotificationListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 状态转移时一并落库的字段
#[derive(Debug, Clone, Default)]
pub struct TransitionFields {
    pub approval_comments: Option<String>,
    pub rejection_reason: Option<String>,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 成绩单管理方法
    // 创建成绩单（Draft），可携带初始条目
    async fn create_grade_sheet(
        &self,
        instructor_id: i64,
        sheet: CreateGradeSheetRequest,
    ) -> Result<GradeSheet>;
    // 通过ID获取成绩单（含条目）
    async fn get_grade_sheet(&self, sheet_id: i64) -> Result<Option<GradeSheet>>;
    // 列出教师名下的成绩单，按创建时间倒序
    async fn list_grade_sheets_by_instructor(&self, instructor_id: i64)
    -> Result<Vec<GradeSheet>>;
    // 列出课程下的成绩单
    async fn list_grade_sheets_by_course(&self, course_id: i64) -> Result<Vec<GradeSheet>>;
    // 整体替换成绩条目，任一行非法则全部拒绝
    async fn replace_grade_entries(
        &self,
        sheet_id: i64,
        entries: Vec<GradeEntryInput>,
    ) -> Result<GradeSheet>;
    // 待审批队列：仅 Submitted，按提交时间升序
    async fn list_pending_grade_sheets(&self) -> Result<Vec<GradeSheet>>;
    // 乐观并发的状态转移：持久状态不等于动作要求的来源状态时报冲突；
    // 通知与状态翻转在同一事务内落库
    async fn transition_grade_sheet(
        &self,
        sheet_id: i64,
        action: SheetAction,
        fields: TransitionFields,
        notifications: Vec<CreateNotificationRequest>,
    ) -> Result<GradeSheet>;

    /// 选课管理方法
    // 课程的选课名单（即有效学生集合）
    async fn list_enrollments_by_course(&self, course_id: i64) -> Result<Vec<Enrollment>>;
    // 登记选课记录（开发环境种子与运维工具使用）
    async fn create_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        semester: &str,
        year: i32,
    ) -> Result<Enrollment>;
    /// 总评聚合方法
    // 学生在已发布成绩单中的考核明细
    async fn list_published_assessments_for_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<AssessmentGradeView>>;
    // 写入课程总评并回写选课记录（仅聚合器调用）
    async fn upsert_course_grade(
        &self,
        student_id: i64,
        course_id: i64,
        final_grade: LetterGrade,
        grade_points: f64,
    ) -> Result<()>;
    // 学生名下已完成的课程总评
    async fn list_course_grades_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<CourseGradeAggregate>>;

    /// 通知管理方法
    // 列出通知（分页，可只看未读）
    async fn list_notifications_with_pagination(
        &self,
        recipient_id: i64,
        params: NotificationListParams,
    ) -> Result<NotificationListResponse>;
    // 未读数量
    async fn get_unread_notification_count(&self, recipient_id: i64) -> Result<i64>;
    // 标记单条已读
    async fn mark_notification_as_read(
        &self,
        recipient_id: i64,
        notification_id: i64,
    ) -> Result<bool>;
    // 标记全部已读
    async fn mark_all_notifications_as_read(&self, recipient_id: i64) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
