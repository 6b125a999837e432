use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeSheetService;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::responses::StudentGradesResponse;
use crate::models::{ApiResponse, ErrorCode};

/// 学生查询自己的成绩
///
/// 只返回已发布成绩单中的考核明细，外加已计算出的课程总评。
pub async fn my_grades(
    service: &GradeSheetService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    let assessments = match storage
        .list_published_assessments_for_student(principal.user_id)
        .await
    {
        Ok(assessments) => assessments,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询成绩明细失败: {e}"),
                )),
            );
        }
    };

    match storage
        .list_course_grades_by_student(principal.user_id)
        .await
    {
        Ok(aggregates) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentGradesResponse {
                assessments,
                aggregates,
            },
            "查询成功",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询课程总评失败: {e}"),
            )),
        ),
    }
}
