use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ApprovalService;
use crate::models::grade_sheets::responses::GradeSheetListResponse;
use crate::models::{ApiResponse, ErrorCode};

/// 待审批队列，按提交时间先到先审
pub async fn list_pending(
    service: &ApprovalService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_pending_grade_sheets().await {
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
                format!("查询待审批队列失败: {e}"),
            )),
        ),
    }
}
