use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeSheetService;
use crate::errors::GradeflowError;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::requests::CreateGradeSheetRequest;
use crate::models::{ApiResponse, ErrorCode};

pub async fn create_sheet(
    service: &GradeSheetService,
    sheet_data: CreateGradeSheetRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    match storage
        .create_grade_sheet(principal.user_id, sheet_data)
        .await
    {
        Ok(sheet) => Ok(HttpResponse::Ok().json(ApiResponse::success(sheet, "创建成功"))),
        Err(GradeflowError::Validation(msg)) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::ValidationFailed, msg),
        )),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("创建成绩单失败: {e}"),
            )),
        ),
    }
}
