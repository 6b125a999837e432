//! 选课存储操作

use super::SeaOrmStorage;
use crate::entity::enrollments::Column;
use crate::entity::prelude::{EnrollmentActiveModel, Enrollments};
use crate::errors::{GradeflowError, Result};
use crate::models::enrollments::entities::{Enrollment, EnrollmentStatus};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 课程的选课名单（不含退课）
    pub async fn list_enrollments_by_course_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<Enrollment>> {
        let rows = Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.ne(EnrollmentStatus::Dropped.as_str()))
            .order_by_asc(Column::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询选课名单失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_enrollment()).collect())
    }

    /// 登记选课记录
    pub async fn create_enrollment_impl(
        &self,
        student_id: i64,
        course_id: i64,
        semester: &str,
        year: i32,
    ) -> Result<Enrollment> {
        let model = EnrollmentActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            semester: Set(semester.to_string()),
            year: Set(year),
            status: Set(EnrollmentStatus::Enrolled.to_string()),
            final_grade: Set(None),
            grade_points: Set(None),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("登记选课失败: {e}")))?;

        Ok(result.into_enrollment())
    }
}
