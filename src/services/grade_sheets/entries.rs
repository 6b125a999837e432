use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeSheetService;
use crate::errors::GradeflowError;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::requests::ReplaceEntriesRequest;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 整体替换成绩条目
///
/// 全部行校验通过才落库，任一行失败时旧条目原样保留。
pub async fn replace_entries(
    service: &GradeSheetService,
    sheet_id: i64,
    entries: ReplaceEntriesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    // 教师只能编辑自己的成绩单
    match storage.get_grade_sheet(sheet_id).await {
        Ok(Some(sheet)) => {
            if principal.role == UserRole::Instructor && sheet.instructor_id != principal.user_id {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::Forbidden,
                    "只能编辑自己创建的成绩单",
                )));
            }
        }
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SheetNotFound,
                "成绩单不存在",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("查询成绩单失败: {e}"),
                )),
            );
        }
    }

    match storage.replace_grade_entries(sheet_id, entries.entries).await {
        Ok(sheet) => Ok(HttpResponse::Ok().json(ApiResponse::success(sheet, "条目已更新"))),
        Err(GradeflowError::Validation(msg)) => Ok(HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::ValidationFailed, msg),
        )),
        Err(GradeflowError::Conflict(msg)) => Ok(
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::Conflict, msg)),
        ),
        Err(GradeflowError::NotFound(msg)) => Ok(
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::SheetNotFound, msg)),
        ),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("更新成绩条目失败: {e}"),
            )),
        ),
    }
}
