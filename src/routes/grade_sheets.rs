use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::grade_sheets::requests::{CreateGradeSheetRequest, ReplaceEntriesRequest};
use crate::models::users::entities::UserRole;
use crate::services::{ApprovalService, GradeSheetService};
use crate::utils::SafeIDI64;

// 懒加载的全局 GradeSheetService 实例
static GRADE_SHEET_SERVICE: Lazy<GradeSheetService> = Lazy::new(GradeSheetService::new_lazy);
static APPROVAL_SERVICE: Lazy<ApprovalService> = Lazy::new(ApprovalService::new_lazy);

// HTTP处理程序
pub async fn create_sheet(
    req: HttpRequest,
    sheet_data: web::Json<CreateGradeSheetRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SHEET_SERVICE
        .create_sheet(sheet_data.into_inner(), &req)
        .await
}

pub async fn list_sheets(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADE_SHEET_SERVICE.list_sheets(&req).await
}

pub async fn get_sheet(req: HttpRequest, sheet_id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADE_SHEET_SERVICE.get_sheet(sheet_id.0, &req).await
}

pub async fn replace_entries(
    req: HttpRequest,
    sheet_id: SafeIDI64,
    entries: web::Json<ReplaceEntriesRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SHEET_SERVICE
        .replace_entries(sheet_id.0, entries.into_inner(), &req)
        .await
}

pub async fn import_grades(
    req: HttpRequest,
    sheet_id: SafeIDI64,
    body: String,
) -> ActixResult<HttpResponse> {
    GRADE_SHEET_SERVICE
        .import_grades(sheet_id.0, body, &req)
        .await
}

pub async fn submit_sheet(req: HttpRequest, sheet_id: SafeIDI64) -> ActixResult<HttpResponse> {
    APPROVAL_SERVICE.submit_sheet(sheet_id.0, &req).await
}

pub async fn grade_template(req: HttpRequest, course_id: SafeIDI64) -> ActixResult<HttpResponse> {
    GRADE_SHEET_SERVICE.grade_template(course_id.0, &req).await
}

pub async fn my_grades(req: HttpRequest) -> ActixResult<HttpResponse> {
    GRADE_SHEET_SERVICE.my_grades(&req).await
}

// 配置路由
pub fn configure_grade_sheet_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grade-sheets")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(
                        UserRole::instructor_roles(),
                    ))
                    .route("", web::post().to(create_sheet))
                    .route("", web::get().to(list_sheets))
                    .route("/{id}", web::get().to(get_sheet))
                    .route("/{id}/entries", web::put().to(replace_entries))
                    .route("/{id}/import", web::post().to(import_grades))
                    .route("/{id}/submit", web::post().to(submit_sheet)),
            ),
    );
    cfg.service(
        web::scope("/api/v1/courses")
            .wrap(middlewares::RequireSession)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(
                        UserRole::instructor_roles(),
                    ))
                    .route("/{id}/grade-template", web::get().to(grade_template)),
            ),
    );
    cfg.service(
        web::scope("/api/v1/grades")
            .wrap(middlewares::RequireSession)
            .route("/my", web::get().to(my_grades)),
    );
}
