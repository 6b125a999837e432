use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grade_sheets::requests::{ApproveSheetRequest, RejectSheetRequest};
use crate::models::users::entities::UserRole;
use crate::services::ApprovalService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ApprovalService 实例
static APPROVAL_SERVICE: Lazy<ApprovalService> = Lazy::new(ApprovalService::new_lazy);

// HTTP处理程序
pub async fn list_pending(req: HttpRequest) -> ActixResult<HttpResponse> {
    APPROVAL_SERVICE.list_pending(&req).await
}

pub async fn approve_sheet(
    req: HttpRequest,
    sheet_id: SafeIDI64,
    data: Option<web::Json<ApproveSheetRequest>>,
) -> ActixResult<HttpResponse> {
    let data = data.map(web::Json::into_inner).unwrap_or_default();
    APPROVAL_SERVICE.approve_sheet(sheet_id.0, data, &req).await
}

pub async fn reject_sheet(
    req: HttpRequest,
    sheet_id: SafeIDI64,
    data: web::Json<RejectSheetRequest>,
) -> ActixResult<HttpResponse> {
    APPROVAL_SERVICE
        .reject_sheet(sheet_id.0, data.into_inner(), &req)
        .await
}

pub async fn publish_sheet(req: HttpRequest, sheet_id: SafeIDI64) -> ActixResult<HttpResponse> {
    APPROVAL_SERVICE.publish_sheet(sheet_id.0, &req).await
}

// 配置路由
pub fn configure_approval_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/approvals")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/pending", web::get().to(list_pending))
                    .route("/{id}/approve", web::post().to(approve_sheet))
                    .route("/{id}/reject", web::post().to(reject_sheet))
                    .route("/{id}/publish", web::post().to(publish_sheet)),
            ),
    );
}
