use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeSheetService;
use crate::middlewares::RequireSession;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

pub async fn get_sheet(
    service: &GradeSheetService,
    sheet_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    match storage.get_grade_sheet(sheet_id).await {
        Ok(Some(sheet)) => {
            // 教师只能看自己的成绩单，管理员不受限
            if principal.role == UserRole::Instructor && sheet.instructor_id != principal.user_id {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::Forbidden,
                    "只能查看自己创建的成绩单",
                )));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(sheet, "查询成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SheetNotFound,
            "成绩单不存在",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询成绩单失败: {e}"),
            )),
        ),
    }
}
