use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeSheetService;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::responses::GradeSheetListResponse;
use crate::models::{ApiResponse, ErrorCode};

/// 教师名下的成绩单列表，按创建时间倒序
pub async fn list_sheets(
    service: &GradeSheetService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    match storage
        .list_grade_sheets_by_instructor(principal.user_id)
        .await
    {
        Ok(sheets) => {
            let total = sheets.len() as i64;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                GradeSheetListResponse {
                    items: sheets,
                    total,
                },
                "查询成功",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("查询成绩单列表失败: {e}"),
            )),
        ),
    }
}
