use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header::CONTENT_TYPE};

use super::GradeSheetService;
use crate::models::enrollments::entities::Enrollment;
use crate::models::{ApiResponse, ErrorCode};

/// 生成课程的成绩导入模板
///
/// 表头固定为 `student_id,grade,comments`，每个在册学生一行，
/// 成绩和备注留空，由教师填写后重新上传。
pub(crate) fn render_template(roster: &[Enrollment]) -> String {
    let mut out = String::from("student_id,grade,comments\n");
    for enrollment in roster {
        out.push_str(&format!("{},,\n", enrollment.student_id));
    }
    out
}

pub async fn grade_template(
    service: &GradeSheetService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_enrollments_by_course(course_id).await {
        Ok(roster) => {
            if roster.is_empty() {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::EnrollmentNotFound,
                    "该课程没有选课记录",
                )));
            }
            Ok(HttpResponse::Ok()
                .insert_header((CONTENT_TYPE, "text/csv; charset=utf-8"))
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"course_{course_id}_grades.csv\""),
                ))
                .body(render_template(&roster)))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询选课名单失败: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enrollments::entities::EnrollmentStatus;

    fn enrollment(student_id: i64) -> Enrollment {
        Enrollment {
            id: student_id,
            student_id,
            course_id: 1,
            semester: "秋季".to_string(),
            year: 2025,
            status: EnrollmentStatus::Enrolled,
            final_grade: None,
            grade_points: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_template_one_row_per_student() {
        let roster = vec![enrollment(1001), enrollment(1002)];
        let csv = render_template(&roster);
        assert_eq!(csv, "student_id,grade,comments\n1001,,\n1002,,\n");
    }

    #[test]
    fn test_template_empty_roster_is_header_only() {
        assert_eq!(render_template(&[]), "student_id,grade,comments\n");
    }
}
