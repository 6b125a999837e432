//! 收件箱轮询
//!
//! 把客户端各自的定时轮询收拢成服务端的一个后台任务：
//! InboxWatcher 按配置的间隔查询未读数量，数值变化时通过
//! watch 通道广播；SSE 路由把通道包装成事件流推给客户端。
//! 客户端断开后流被丢弃，后台任务随之停止。

use std::sync::Arc;
use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header::CONTENT_TYPE, web};
use async_trait::async_trait;
use futures_util::Stream;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::NotificationService;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::middlewares::RequireSession;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 收件箱后端，按收件人查未读数量、标记已读
///
/// 从 Storage 上切出的最小接口，轮询逻辑不依赖完整存储层。
#[async_trait]
pub trait InboxBackend: Send + Sync {
    async fn unread_count(&self, recipient_id: i64) -> Result<i64>;
    async fn mark_read(&self, recipient_id: i64, notification_id: i64) -> Result<bool>;
}

/// Storage 适配
pub struct StorageInbox(pub Arc<dyn Storage>);

#[async_trait]
impl InboxBackend for StorageInbox {
    async fn unread_count(&self, recipient_id: i64) -> Result<i64> {
        self.0.get_unread_notification_count(recipient_id).await
    }

    async fn mark_read(&self, recipient_id: i64, notification_id: i64) -> Result<bool> {
        self.0
            .mark_notification_as_read(recipient_id, notification_id)
            .await
    }
}

/// 未读数量的后台轮询任务
///
/// Drop 时任务被中止，不会留下孤儿轮询。
pub struct InboxWatcher {
    tx: Arc<watch::Sender<i64>>,
    rx: watch::Receiver<i64>,
    backend: Arc<dyn InboxBackend>,
    recipient_id: i64,
    handle: tokio::task::JoinHandle<()>,
}

impl InboxWatcher {
    pub fn spawn(backend: Arc<dyn InboxBackend>, recipient_id: i64, interval: Duration) -> Self {
        // 初始值 -1 保证第一次真实计数一定触发变化
        let (tx, rx) = watch::channel(-1i64);
        let tx = Arc::new(tx);

        let poll_tx = tx.clone();
        let poll_backend = backend.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                if poll_tx.is_closed() {
                    debug!("收件箱轮询结束: recipient={recipient_id}");
                    break;
                }

                match poll_backend.unread_count(recipient_id).await {
                    Ok(count) => {
                        poll_tx.send_if_modified(|current| {
                            if *current != count {
                                *current = count;
                                true
                            } else {
                                false
                            }
                        });
                    }
                    Err(e) => {
                        // 瞬时失败不终止轮询，下个周期重试
                        warn!("收件箱轮询失败: recipient={recipient_id}, {e}");
                    }
                }
            }
        });

        Self {
            tx,
            rx,
            backend,
            recipient_id,
            handle,
        }
    }

    /// 标记已读，本地计数先行扣减，落库失败或没标上时回滚
    ///
    /// 下个轮询周期会用库里的真实计数覆盖本地值。
    pub async fn mark_read(&self, notification_id: i64) -> Result<bool> {
        let before = *self.rx.borrow();
        if before > 0 {
            self.tx.send_replace(before - 1);
        }

        let result = self
            .backend
            .mark_read(self.recipient_id, notification_id)
            .await;
        if before > 0 && !matches!(result, Ok(true)) {
            self.tx.send_replace(before);
        }
        result
    }

    /// 等待下一次未读数量变化；通道关闭时返回 None
    pub async fn next_unread(&mut self) -> Option<i64> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// 包装成 SSE 字节流
    pub fn into_sse_stream(
        self,
    ) -> impl Stream<Item = std::result::Result<web::Bytes, actix_web::Error>> {
        futures_util::stream::unfold(self, |mut watcher| async move {
            let count = watcher.next_unread().await?;
            let event = format!("event: unread\ndata: {{\"unread_count\":{count}}}\n\n");
            Some((Ok(web::Bytes::from(event)), watcher))
        })
    }
}

impl Drop for InboxWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// 未读数量的 SSE 推送
pub async fn stream_unread(
    service: &NotificationService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user_id) = RequireSession::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized()
            .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
    };

    let backend = Arc::new(StorageInbox(service.get_storage(request)));
    let interval = Duration::from_secs(AppConfig::get().notify.poll_interval_secs.max(1));
    let watcher = InboxWatcher::spawn(backend, user_id, interval);

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(watcher.into_sse_stream()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use std::sync::atomic::AtomicBool;

    struct MockInbox {
        count: AtomicI64,
        polls: AtomicUsize,
        fail_mark: AtomicBool,
    }

    impl MockInbox {
        fn new(initial: i64) -> Self {
            Self {
                count: AtomicI64::new(initial),
                polls: AtomicUsize::new(0),
                fail_mark: AtomicBool::new(false),
            }
        }

        fn set(&self, value: i64) {
            self.count.store(value, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl InboxBackend for MockInbox {
        async fn unread_count(&self, _recipient_id: i64) -> Result<i64> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(self.count.load(Ordering::SeqCst))
        }

        async fn mark_read(&self, _recipient_id: i64, _notification_id: i64) -> Result<bool> {
            if self.fail_mark.load(Ordering::SeqCst) {
                return Err(crate::errors::GradeflowError::database_operation(
                    "mock failure",
                ));
            }
            self.count.fetch_sub(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_watcher_emits_initial_and_changed_counts() {
        let backend = Arc::new(MockInbox::new(2));
        let mut watcher =
            InboxWatcher::spawn(backend.clone(), 7, Duration::from_millis(10));

        assert_eq!(watcher.next_unread().await, Some(2));

        backend.set(5);
        assert_eq!(watcher.next_unread().await, Some(5));
    }

    #[tokio::test]
    async fn test_watcher_skips_unchanged_counts() {
        let backend = Arc::new(MockInbox::new(1));
        let mut watcher =
            InboxWatcher::spawn(backend.clone(), 7, Duration::from_millis(10));

        assert_eq!(watcher.next_unread().await, Some(1));

        // 数值不变时不应触发新事件
        tokio::time::sleep(Duration::from_millis(50)).await;
        backend.set(4);
        assert_eq!(watcher.next_unread().await, Some(4));
    }

    #[tokio::test]
    async fn test_mark_read_decrements_count_immediately() {
        let backend = Arc::new(MockInbox::new(3));
        // 长间隔，首个 tick 之后不再有轮询干扰
        let mut watcher = InboxWatcher::spawn(backend.clone(), 7, Duration::from_secs(60));

        assert_eq!(watcher.next_unread().await, Some(3));

        assert_eq!(watcher.mark_read(42).await.ok(), Some(true));
        assert_eq!(watcher.next_unread().await, Some(2));
    }

    #[tokio::test]
    async fn test_mark_read_failure_rolls_back_count() {
        let backend = Arc::new(MockInbox::new(3));
        let mut watcher = InboxWatcher::spawn(backend.clone(), 7, Duration::from_secs(60));

        assert_eq!(watcher.next_unread().await, Some(3));

        backend.fail_mark.store(true, Ordering::SeqCst);
        assert!(watcher.mark_read(42).await.is_err());
        // 扣减被回滚，广播回到原值
        assert_eq!(watcher.next_unread().await, Some(3));
    }

    #[tokio::test]
    async fn test_dropping_watcher_stops_polling() {
        let backend = Arc::new(MockInbox::new(0));
        let watcher = InboxWatcher::spawn(backend.clone(), 7, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(watcher);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let polls_after_drop = backend.polls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.polls.load(Ordering::SeqCst), polls_after_drop);
    }
}
