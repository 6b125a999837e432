pub mod approvals;
pub mod grade_sheets;
pub mod notifications;

pub use approvals::ApprovalService;
pub use grade_sheets::GradeSheetService;
pub use notifications::NotificationService;
