use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::{ApprovalService, aggregate, is_action_allowed};
use crate::errors::GradeflowError;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::entities::SheetAction;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::notifications::dispatch;
use crate::storage::TransitionFields;

/// 发布成绩单
///
/// 只有 Approved 状态可发布，重复发布被状态前置挡下。
/// 学生通知与状态翻转在同一事务内落库；课程总评在发布成功后重算，
/// 重算失败不回滚发布，下次发布时会重新覆盖。
pub async fn publish_sheet(
    service: &ApprovalService,
    sheet_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    if !is_action_allowed(principal.role, SheetAction::Publish) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "当前角色无权发布成绩单",
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

    let notifications = dispatch::publication_notifications(&sheet);

    match storage
        .transition_grade_sheet(
            sheet_id,
            SheetAction::Publish,
            TransitionFields::default(),
            notifications,
        )
        .await
    {
        Ok(published) => {
            // 发布成功后重算该课程的总评
            if let Err(e) = aggregate::recompute_course_aggregates(&storage, sheet.course_id).await
            {
                error!("课程 {} 总评重算失败: {}", sheet.course_id, e);
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(published, "发布成功")))
        }
        Err(GradeflowError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::InvalidStatusTransition, msg),
        )),
        Err(GradeflowError::NotFound(msg)) => Ok(
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::SheetNotFound, msg)),
        ),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("发布成绩单失败: {e}"),
            )),
        ),
    }
}
