pub mod create;
pub mod entries;
pub mod get;
pub mod import;
pub mod list;
pub mod student;
pub mod template;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::grade_sheets::requests::{CreateGradeSheetRequest, ReplaceEntriesRequest};
use crate::storage::Storage;

pub struct GradeSheetService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeSheetService {
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

    // 创建成绩单
    pub async fn create_sheet(
        &self,
        sheet_data: CreateGradeSheetRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_sheet(self, sheet_data, request).await
    }

    // 根据ID获取成绩单
    pub async fn get_sheet(&self, sheet_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_sheet(self, sheet_id, request).await
    }

    // 成绩单列表
    pub async fn list_sheets(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_sheets(self, request).await
    }

    // 整体替换成绩条目
    pub async fn replace_entries(
        &self,
        sheet_id: i64,
        entries: ReplaceEntriesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        entries::replace_entries(self, sheet_id, entries, request).await
    }

    // CSV 批量导入成绩
    pub async fn import_grades(
        &self,
        sheet_id: i64,
        body: String,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        import::import_grades(self, sheet_id, body, request).await
    }

    // 下载课程 CSV 模板
    pub async fn grade_template(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        template::grade_template(self, course_id, request).await
    }

    // 学生查询自己的成绩
    pub async fn my_grades(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        student::my_grades(self, request).await
    }
}
