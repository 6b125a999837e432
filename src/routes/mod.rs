pub mod approvals;
pub mod grade_sheets;
pub mod notifications;

pub use approvals::configure_approval_routes;
pub use grade_sheets::configure_grade_sheet_routes;
pub use notifications::configure_notification_routes;
