use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ApprovalService, is_action_allowed};
use crate::errors::GradeflowError;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::entities::SheetAction;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::TransitionFields;

/// 提交成绩单进入审批
///
/// 前置条件：至少一条已评分条目。状态前置（必须是草稿）由
/// 存储层的条件更新保证，并发提交只有一个成功。
pub async fn submit_sheet(
    service: &ApprovalService,
    sheet_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    if !is_action_allowed(principal.role, SheetAction::Submit) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "当前角色无权提交成绩单",
        )));
    }

    let sheet = match storage.get_grade_sheet(sheet_id).await {
        Ok(Some(sheet)) => sheet,
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
    };

    // 教师只能提交自己的成绩单
    if principal.role == UserRole::Instructor && sheet.instructor_id != principal.user_id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "只能提交自己创建的成绩单",
        )));
    }

    if sheet.grades.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "成绩单没有任何条目，无法提交",
        )));
    }

    match storage
        .transition_grade_sheet(
            sheet_id,
            SheetAction::Submit,
            TransitionFields::default(),
            Vec::new(),
        )
        .await
    {
        Ok(sheet) => Ok(HttpResponse::Ok().json(ApiResponse::success(sheet, "提交成功"))),
        Err(GradeflowError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::InvalidStatusTransition, msg),
        )),
        Err(GradeflowError::NotFound(msg)) => Ok(
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::SheetNotFound, msg)),
        ),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("提交成绩单失败: {e}"),
            )),
        ),
    }
}
