pub mod aggregate;
pub mod approve;
pub mod pending;
pub mod publish;
pub mod reject;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::grade_sheets::entities::SheetAction;
use crate::models::grade_sheets::requests::{ApproveSheetRequest, RejectSheetRequest};
use crate::models::users::entities::UserRole;
use crate::storage::Storage;

/// 角色 × 动作的能力表
///
/// 审批相关的权限在服务入口处查一次，处理程序内部不再各自判断。
pub fn is_action_allowed(role: UserRole, action: SheetAction) -> bool {
    match action {
        SheetAction::Submit => matches!(role, UserRole::Instructor | UserRole::Admin),
        SheetAction::Approve | SheetAction::Reject | SheetAction::Publish => {
            matches!(role, UserRole::Admin)
        }
    }
}

pub struct ApprovalService {
    storage: Option<Arc<dyn Storage>>,
}

impl ApprovalService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 待审批队列
    pub async fn list_pending(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        pending::list_pending(self, request).await
    }

    // 提交成绩单
    pub async fn submit_sheet(
        &self,
        sheet_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_sheet(self, sheet_id, request).await
    }

    // 审批通过
    pub async fn approve_sheet(
        &self,
        sheet_id: i64,
        data: ApproveSheetRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        approve::approve_sheet(self, sheet_id, data, request).await
    }

    // 驳回
    pub async fn reject_sheet(
        &self,
        sheet_id: i64,
        data: RejectSheetRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        reject::reject_sheet(self, sheet_id, data, request).await
    }

    // 发布
    pub async fn publish_sheet(
        &self,
        sheet_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        publish::publish_sheet(self, sheet_id, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructor_can_only_submit() {
        assert!(is_action_allowed(UserRole::Instructor, SheetAction::Submit));
        assert!(!is_action_allowed(
            UserRole::Instructor,
            SheetAction::Approve
        ));
        assert!(!is_action_allowed(UserRole::Instructor, SheetAction::Reject));
        assert!(!is_action_allowed(
            UserRole::Instructor,
            SheetAction::Publish
        ));
    }

    #[test]
    fn test_admin_can_do_everything() {
        for action in [
            SheetAction::Submit,
            SheetAction::Approve,
            SheetAction::Reject,
            SheetAction::Publish,
        ] {
            assert!(is_action_allowed(UserRole::Admin, action));
        }
    }

    #[test]
    fn test_student_can_do_nothing() {
        for action in [
            SheetAction::Submit,
            SheetAction::Approve,
            SheetAction::Reject,
            SheetAction::Publish,
        ] {
            assert!(!is_action_allowed(UserRole::Student, action));
        }
    }
}
