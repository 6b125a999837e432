pub mod common;
pub mod enrollments;
pub mod grade_sheets;
pub mod notifications;
pub mod users;

pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};

/// 业务错误码
///
/// 响应体中的 code 字段，HTTP 状态码之外的细分错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Success = 0,

    // 400xx 请求错误
    BadRequest = 40000,
    ValidationFailed = 40001,
    ImportMissingColumn = 40002,

    // 401/403
    Unauthorized = 40100,
    Forbidden = 40300,

    // 404xx 资源不存在
    NotFound = 40400,
    SheetNotFound = 40401,
    EnrollmentNotFound = 40402,
    NotificationNotFound = 40403,

    // 409xx 状态冲突
    Conflict = 40900,
    InvalidStatusTransition = 40901,

    // 500xx
    InternalServerError = 50000,
}

/// 程序启动时间，用于统计预处理耗时
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
