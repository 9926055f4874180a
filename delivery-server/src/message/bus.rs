//! 推送总线
//!
//! ```text
//! RelayWorker / LedgerService / RiderService
//!        │ publish()
//!        ▼
//! broadcast::Sender<RelayMessage>
//!        │ subscribe()
//!        ▼
//! WebSocket 连接 (按频道过滤)
//! ```
//!
//! 至多一次投递：没有订阅者或订阅者落后时消息直接丢弃，不做重放。

use shared::RelayMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// 推送总线 - 将中继消息广播给所有在线连接
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<RelayMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布一条消息，返回收到它的订阅者数量
    pub fn publish(&self, msg: RelayMessage) -> usize {
        match self.tx.send(msg) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(msg)) => {
                tracing::trace!(channel = %msg.channel, event = %msg.event, "No subscribers, message dropped");
                0
            }
        }
    }

    pub fn publish_all(&self, messages: impl IntoIterator<Item = RelayMessage>) {
        for msg in messages {
            self.publish(msg);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayMessage> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 通知所有后台任务和连接退出
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = MessageBus::new(16);
        let mut rx = bus.subscribe();

        let sent = bus.publish(RelayMessage::new("order-1", "orderStatusUpdate", json!({})));
        assert_eq!(sent, 1);

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.channel, "order-1");
        assert_eq!(msg.event, "orderStatusUpdate");
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = MessageBus::new(16);
        assert_eq!(bus.publish(RelayMessage::new("riders", "x", json!(null))), 0);
        assert_eq!(bus.receiver_count(), 0);
    }

    #[test]
    fn test_shutdown_cancels_token() {
        let bus = MessageBus::new(4);
        let token = bus.shutdown_token().clone();
        assert!(!token.is_cancelled());
        bus.shutdown();
        assert!(token.is_cancelled());
    }
}
