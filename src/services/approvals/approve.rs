use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ApprovalService, is_action_allowed};
use crate::errors::GradeflowError;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::entities::SheetAction;
use crate::models::grade_sheets::requests::ApproveSheetRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::TransitionFields;

/// 审批通过，可附带审批意见
pub async fn approve_sheet(
    service: &ApprovalService,
    sheet_id: i64,
    data: ApproveSheetRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    if !is_action_allowed(principal.role, SheetAction::Approve) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "当前角色无权审批成绩单",
        )));
    }

    let fields = TransitionFields {
        approval_comments: data.comments.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        ..Default::default()
    };

    match storage
        .transition_grade_sheet(sheet_id, SheetAction::Approve, fields, Vec::new())
        .await
    {
        Ok(sheet) => Ok(HttpResponse::Ok().json(ApiResponse::success(sheet, "审批通过"))),
        Err(GradeflowError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::InvalidStatusTransition, msg),
        )),
        Err(GradeflowError::NotFound(msg)) => Ok(
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::SheetNotFound, msg)),
        ),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("审批成绩单失败: {e}"),
            )),
        ),
    }
}
