//! 通知存储操作
//!
//! 通知的创建只发生在状态转移事务内（见 grade_sheets 模块），
//! 这里只提供收件箱侧的查询与已读标记。

use super::SeaOrmStorage;
use crate::entity::notifications::{Column, Entity as Notifications};
use crate::errors::{GradeflowError, Result};
use crate::models::{
    PaginationInfo,
    notifications::{requests::NotificationListParams, responses::NotificationListResponse},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 列出收件人通知（分页）
    pub async fn list_notifications_with_pagination_impl(
        &self,
        recipient_id: i64,
        params: NotificationListParams,
    ) -> Result<NotificationListResponse> {
        let pagination = params.pagination();
        let page = pagination.page.max(1) as u64;
        let size = pagination.size.clamp(1, 100) as u64;

        let mut select = Notifications::find().filter(Column::RecipientId.eq(recipient_id));

        // 未读筛选
        if let Some(true) = params.unread_only {
            select = select.filter(Column::IsRead.eq(false));
        }

        // 排序
        select = select.order_by_desc(Column::CreatedAt);

        // 分页查询
        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询通知总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询通知页数失败: {e}")))?;

        let notifications = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询通知列表失败: {e}")))?;

        let total_unread = self.get_unread_notification_count_impl(recipient_id).await?;

        Ok(NotificationListResponse {
            items: notifications
                .into_iter()
                .map(|m| m.into_notification())
                .collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
            total_unread,
        })
    }

    /// 获取收件人未读通知数量
    pub async fn get_unread_notification_count_impl(&self, recipient_id: i64) -> Result<i64> {
        let count = Notifications::find()
            .filter(Column::RecipientId.eq(recipient_id))
            .filter(Column::IsRead.eq(false))
            .count(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("查询未读通知数量失败: {e}")))?;

        Ok(count as i64)
    }

    /// 标记通知为已读
    ///
    /// 收件人过滤放进 WHERE，别人的通知标不了。
    pub async fn mark_notification_as_read_impl(
        &self,
        recipient_id: i64,
        notification_id: i64,
    ) -> Result<bool> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::Id.eq(notification_id))
            .filter(Column::RecipientId.eq(recipient_id))
            .exec(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("标记通知已读失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 标记收件人所有通知为已读
    pub async fn mark_all_notifications_as_read_impl(&self, recipient_id: i64) -> Result<i64> {
        let result = Notifications::update_many()
            .col_expr(Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(Column::RecipientId.eq(recipient_id))
            .filter(Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| GradeflowError::database_operation(format!("标记全部通知已读失败: {e}")))?;

        Ok(result.rows_affected as i64)
    }
}
