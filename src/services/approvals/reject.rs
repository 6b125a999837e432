use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ApprovalService, is_action_allowed};
use crate::errors::GradeflowError;
use crate::middlewares::RequireSession;
use crate::models::grade_sheets::entities::SheetAction;
use crate::models::grade_sheets::requests::RejectSheetRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::notifications::dispatch;
use crate::storage::TransitionFields;

/// 驳回成绩单
///
/// 驳回必须给出非空原因；驳回通知与状态翻转在同一事务内落库。
pub async fn reject_sheet(
    service: &ApprovalService,
    sheet_id: i64,
    data: RejectSheetRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(principal) = RequireSession::extract_principal(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    if !is_action_allowed(principal.role, SheetAction::Reject) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "当前角色无权驳回成绩单",
        )));
    }

    let reason = data.reason.trim().to_string();
    if reason.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "驳回原因不能为空",
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

    let notifications = vec![dispatch::rejection_notification(&sheet, &reason)];
    let fields = TransitionFields {
        rejection_reason: Some(reason),
        ..Default::default()
    };

    match storage
        .transition_grade_sheet(sheet_id, SheetAction::Reject, fields, notifications)
        .await
    {
        Ok(sheet) => Ok(HttpResponse::Ok().json(ApiResponse::success(sheet, "已驳回"))),
        Err(GradeflowError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::InvalidStatusTransition, msg),
        )),
        Err(GradeflowError::NotFound(msg)) => Ok(
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::SheetNotFound, msg)),
        ),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("驳回成绩单失败: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::HttpMessage;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use std::sync::Arc;

    use crate::errors::Result;
    use crate::models::enrollments::entities::Enrollment;
    use crate::models::grade_sheets::entities::{CourseGradeAggregate, GradeSheet, LetterGrade};
    use crate::models::grade_sheets::requests::{CreateGradeSheetRequest, GradeEntryInput};
    use crate::models::grade_sheets::responses::AssessmentGradeView;
    use crate::models::notifications::requests::{
        CreateNotificationRequest, NotificationListParams,
    };
    use crate::models::notifications::responses::NotificationListResponse;
    use crate::models::users::entities::{Principal, UserRole};
    use crate::storage::Storage;

    /// 空原因驳回必须在存储之前被拦下，任何存储调用都视为测试失败
    struct UntouchedStorage;

    #[async_trait::async_trait]
    impl Storage for UntouchedStorage {
        async fn create_grade_sheet(
            &self,
            _instructor_id: i64,
            _sheet: CreateGradeSheetRequest,
        ) -> Result<GradeSheet> {
            unreachable!("不应触达存储")
        }

        async fn get_grade_sheet(&self, _sheet_id: i64) -> Result<Option<GradeSheet>> {
            unreachable!("不应触达存储")
        }

        async fn list_grade_sheets_by_instructor(
            &self,
            _instructor_id: i64,
        ) -> Result<Vec<GradeSheet>> {
            unreachable!("不应触达存储")
        }

        async fn list_grade_sheets_by_course(&self, _course_id: i64) -> Result<Vec<GradeSheet>> {
            unreachable!("不应触达存储")
        }

        async fn replace_grade_entries(
            &self,
            _sheet_id: i64,
            _entries: Vec<GradeEntryInput>,
        ) -> Result<GradeSheet> {
            unreachable!("不应触达存储")
        }

        async fn list_pending_grade_sheets(&self) -> Result<Vec<GradeSheet>> {
            unreachable!("不应触达存储")
        }

        async fn transition_grade_sheet(
            &self,
            _sheet_id: i64,
            _action: SheetAction,
            _fields: TransitionFields,
            _notifications: Vec<CreateNotificationRequest>,
        ) -> Result<GradeSheet> {
            unreachable!("不应触达存储")
        }

        async fn list_enrollments_by_course(&self, _course_id: i64) -> Result<Vec<Enrollment>> {
            unreachable!("不应触达存储")
        }

        async fn create_enrollment(
            &self,
            _student_id: i64,
            _course_id: i64,
            _semester: &str,
            _year: i32,
        ) -> Result<Enrollment> {
            unreachable!("不应触达存储")
        }

        async fn list_published_assessments_for_student(
            &self,
            _student_id: i64,
        ) -> Result<Vec<AssessmentGradeView>> {
            unreachable!("不应触达存储")
        }

        async fn upsert_course_grade(
            &self,
            _student_id: i64,
            _course_id: i64,
            _final_grade: LetterGrade,
            _grade_points: f64,
        ) -> Result<()> {
            unreachable!("不应触达存储")
        }

        async fn list_course_grades_by_student(
            &self,
            _student_id: i64,
        ) -> Result<Vec<CourseGradeAggregate>> {
            unreachable!("不应触达存储")
        }

        async fn list_notifications_with_pagination(
            &self,
            _recipient_id: i64,
            _params: NotificationListParams,
        ) -> Result<NotificationListResponse> {
            unreachable!("不应触达存储")
        }

        async fn get_unread_notification_count(&self, _recipient_id: i64) -> Result<i64> {
            unreachable!("不应触达存储")
        }

        async fn mark_notification_as_read(
            &self,
            _recipient_id: i64,
            _notification_id: i64,
        ) -> Result<bool> {
            unreachable!("不应触达存储")
        }

        async fn mark_all_notifications_as_read(&self, _recipient_id: i64) -> Result<i64> {
            unreachable!("不应触达存储")
        }
    }

    fn service_with_untouched_storage() -> ApprovalService {
        ApprovalService {
            storage: Some(Arc::new(UntouchedStorage)),
        }
    }

    fn admin_request() -> actix_web::HttpRequest {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Principal {
            user_id: 1,
            role: UserRole::Admin,
        });
        req
    }

    #[actix_web::test]
    async fn test_reject_with_empty_reason_is_bad_request() {
        let service = service_with_untouched_storage();
        let req = admin_request();

        let resp = reject_sheet(
            &service,
            1,
            RejectSheetRequest {
                reason: String::new(),
            },
            &req,
        )
        .await
        .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_reject_with_whitespace_reason_is_bad_request() {
        let service = service_with_untouched_storage();
        let req = admin_request();

        let resp = reject_sheet(
            &service,
            1,
            RejectSheetRequest {
                reason: "   \t".to_string(),
            },
            &req,
        )
        .await
        .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
