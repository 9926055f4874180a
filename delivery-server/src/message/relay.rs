//! Event relay - 订单事件到推送频道的扇出
//!
//! ```text
//! OrdersManager (broadcast<OrderEvent>)
//!        │
//!        └── RelayWorker ── fan_out() ──► MessageBus ──► WebSocket
//! ```
//!
//! 推送只是失效提示，客户端收到后通过 `GET /orders/:id` 获取权威状态。

use std::sync::Arc;

use serde_json::{Value, json};
use shared::RelayMessage;
use shared::message::{
    RIDERS_CHANNEL, events, order_channel, restaurant_channel, rider_channel, user_channel,
};
use shared::models::{EntityType, LedgerEntry, LedgerKind};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};
use tokio::sync::broadcast;

use super::bus::MessageBus;
use crate::orders::OrdersManager;

/// 账户所属实体的推送频道
pub fn wallet_channel(entity_type: EntityType, entity_id: &str) -> String {
    match entity_type {
        EntityType::Rider => rider_channel(entity_id),
        EntityType::Restaurant => restaurant_channel(entity_id),
        EntityType::Customer => user_channel(entity_id),
    }
}

fn wallet_payload(
    entity_type: EntityType,
    entity_id: &str,
    order_id: Option<&str>,
    kind: LedgerKind,
    amount: f64,
) -> Value {
    json!({
        "entityType": entity_type,
        "entityId": entity_id,
        "orderId": order_id,
        "kind": kind,
        "amount": amount,
    })
}

/// 账本记账后的 `wallet_updated` 消息
pub fn wallet_message(entry: &LedgerEntry) -> RelayMessage {
    let mut payload = wallet_payload(
        entry.entity_type,
        &entry.entity_id,
        entry.order_id.as_deref(),
        entry.kind,
        entry.amount,
    );
    payload["direction"] = json!(entry.direction);
    payload["balanceAfter"] = json!(entry.balance_after);
    RelayMessage::new(
        wallet_channel(entry.entity_type, &entry.entity_id),
        events::WALLET_UPDATED,
        payload,
    )
}

fn status_payload(event: &OrderEvent, order: &OrderSnapshot) -> Value {
    let (from, to) = match event.status_change() {
        Some((from, to)) => (Some(from), to),
        None => (None, order.status),
    };
    json!({
        "orderId": order.order_id,
        "status": to,
        "previousStatus": from,
        "riderId": order.rider_id,
        "paymentStatus": order.payment_status,
        "sequence": event.sequence,
    })
}

/// 订单参与方频道：订单、餐厅、顾客
fn party_channels(order: &OrderSnapshot) -> Vec<String> {
    vec![
        order_channel(&order.order_id),
        restaurant_channel(&order.restaurant_id),
        user_channel(&order.customer_id),
    ]
}

/// 骑手侧频道：已分配骑手，或所有骑手 (未分配订单)
fn rider_side_channel(order: &OrderSnapshot) -> String {
    match &order.rider_id {
        Some(rider_id) => rider_channel(rider_id),
        None => RIDERS_CHANNEL.to_string(),
    }
}

fn to_channels(channels: Vec<String>, event: &str, payload: &Value) -> Vec<RelayMessage> {
    channels
        .into_iter()
        .map(|channel| RelayMessage::new(channel, event, payload.clone()))
        .collect()
}

/// 计算一条订单事件需要推送的全部消息
///
/// `order` 是事件提交后的快照。
pub fn fan_out(event: &OrderEvent, order: &OrderSnapshot) -> Vec<RelayMessage> {
    let status = status_payload(event, order);

    match &event.payload {
        EventPayload::OrderPlaced { .. } => {
            let mut messages = to_channels(party_channels(order), events::ORDER_STATUS_UPDATE, &status);
            let offer = serde_json::to_value(order).unwrap_or(Value::Null);
            messages.push(RelayMessage::new(
                RIDERS_CHANNEL,
                events::NEW_ORDER_AVAILABLE,
                offer,
            ));
            messages
        }

        EventPayload::RiderAssigned {
            rider_id,
            rider_name,
            ..
        } => {
            let mut payload = status;
            payload["riderId"] = json!(rider_id);
            payload["riderName"] = json!(rider_name);

            let mut channels = party_channels(order);
            channels.push(rider_channel(rider_id));
            // 其他骑手从抢单列表移除该订单
            channels.push(RIDERS_CHANNEL.to_string());
            to_channels(channels, events::RIDER_ASSIGNED, &payload)
        }

        EventPayload::OrderStatusChanged { .. } => {
            let mut channels = party_channels(order);
            channels.push(rider_side_channel(order));
            to_channels(channels, events::ORDER_STATUS_UPDATE, &status)
        }

        EventPayload::OrderCancelled { rider_id, .. } => {
            let mut channels = party_channels(order);
            channels.push(match rider_id {
                Some(id) => rider_channel(id),
                None => RIDERS_CHANNEL.to_string(),
            });
            to_channels(channels, events::ORDER_STATUS_UPDATE, &status)
        }

        EventPayload::OrderDelivered { settlement, .. } => {
            let mut channels = party_channels(order);
            channels.push(rider_channel(&settlement.rider_id));
            let mut messages = to_channels(channels, events::ORDER_STATUS_UPDATE, &status);

            messages.push(RelayMessage::new(
                rider_channel(&settlement.rider_id),
                events::WALLET_UPDATED,
                json!({
                    "entityType": EntityType::Rider,
                    "entityId": settlement.rider_id,
                    "orderId": order.order_id,
                    "netEarning": settlement.net_earning,
                    "codCollected": settlement.cod_collected,
                }),
            ));
            if settlement.restaurant_credit > 0.0 {
                messages.push(RelayMessage::new(
                    restaurant_channel(&order.restaurant_id),
                    events::WALLET_UPDATED,
                    wallet_payload(
                        EntityType::Restaurant,
                        &order.restaurant_id,
                        Some(&order.order_id),
                        LedgerKind::CodSale,
                        settlement.restaurant_credit,
                    ),
                ));
            }
            messages
        }

        EventPayload::OrderRefunded {
            customer_id,
            amount,
        } => {
            let mut messages = to_channels(party_channels(order), events::ORDER_STATUS_UPDATE, &status);
            messages.push(RelayMessage::new(
                user_channel(customer_id),
                events::WALLET_UPDATED,
                wallet_payload(
                    EntityType::Customer,
                    customer_id,
                    Some(&order.order_id),
                    LedgerKind::Refund,
                    *amount,
                ),
            ));
            messages
        }
    }
}

/// 中继工作者：消费订单事件广播，扇出到推送总线
pub struct RelayWorker {
    orders: Arc<OrdersManager>,
    bus: MessageBus,
}

impl RelayWorker {
    pub fn new(orders: Arc<OrdersManager>, bus: MessageBus) -> Self {
        Self { orders, bus }
    }

    /// 运行直到源通道关闭或收到关闭信号
    pub async fn run(self, mut source: broadcast::Receiver<OrderEvent>) {
        tracing::info!("Relay worker started");
        let shutdown = self.bus.shutdown_token().clone();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Relay worker received shutdown signal");
                    break;
                }
                received = source.recv() => match received {
                    Ok(event) => self.relay(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // 推送可丢失，客户端以 GET 为准
                        tracing::warn!(skipped = n, "Relay worker lagged, notifications skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event channel closed, relay worker stopping");
                        break;
                    }
                }
            }
        }
    }

    fn relay(&self, event: &OrderEvent) {
        let order = match self.orders.get_snapshot(&event.order_id) {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!(order_id = %event.order_id, "Snapshot missing for relayed event");
                return;
            }
            Err(e) => {
                tracing::error!(order_id = %event.order_id, error = %e, "Failed to load snapshot for relay");
                return;
            }
        };

        let messages = fan_out(event, &order);
        tracing::debug!(
            order_id = %event.order_id,
            event_type = ?event.event_type,
            count = messages.len(),
            "Relaying order event"
        );
        self.bus.publish_all(messages);
    }
}
