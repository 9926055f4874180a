//! 推送消息类型定义
//!
//! 这些类型在 delivery-server 和客户端之间共享。推送只是失效提示：
//! 客户端收到后应通过 `GET /orders/:id` 重新获取权威状态。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 事件名称
pub mod events {
    pub const ORDER_STATUS_UPDATE: &str = "orderStatusUpdate";
    pub const RIDER_ASSIGNED: &str = "riderAssigned";
    pub const NEW_ORDER_AVAILABLE: &str = "newOrderAvailable";
    pub const WALLET_UPDATED: &str = "wallet_updated";
    pub const RIDER_LOCATION_UPDATE: &str = "riderLocationUpdate";
}

/// 所有在线骑手共享的频道（未分配订单）
pub const RIDERS_CHANNEL: &str = "riders";

pub fn order_channel(order_id: &str) -> String {
    format!("order-{}", order_id)
}

pub fn restaurant_channel(restaurant_id: &str) -> String {
    format!("restaurant-{}", restaurant_id)
}

pub fn rider_channel(rider_id: &str) -> String {
    format!("rider-{}", rider_id)
}

pub fn user_channel(user_id: &str) -> String {
    format!("user-{}", user_id)
}

/// 频道解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel<'a> {
    Order(&'a str),
    Restaurant(&'a str),
    Rider(&'a str),
    User(&'a str),
    Riders,
}

impl<'a> Channel<'a> {
    /// 解析频道名，无法识别返回 None
    pub fn parse(name: &'a str) -> Option<Self> {
        if name == RIDERS_CHANNEL {
            return Some(Channel::Riders);
        }
        let (prefix, id) = name.split_once('-')?;
        if id.is_empty() {
            return None;
        }
        match prefix {
            "order" => Some(Channel::Order(id)),
            "restaurant" => Some(Channel::Restaurant(id)),
            "rider" => Some(Channel::Rider(id)),
            "user" => Some(Channel::User(id)),
            _ => None,
        }
    }
}

/// 中继消息：一条事件发往一个频道
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub channel: String,
    pub event: String,
    pub payload: Value,
    /// 服务器时间戳（毫秒）
    pub timestamp: i64,
}

impl RelayMessage {
    pub fn new(channel: impl Into<String>, event: &str, payload: Value) -> Self {
        Self {
            channel: channel.into(),
            event: event.to_string(),
            payload,
            timestamp: crate::util::now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(order_channel("o1"), "order-o1");
        assert_eq!(restaurant_channel("r1"), "restaurant-r1");
        assert_eq!(rider_channel("d1"), "rider-d1");
        assert_eq!(user_channel("u1"), "user-u1");
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!(Channel::parse("riders"), Some(Channel::Riders));
        // UUID ids contain dashes, only the first one separates the prefix
        assert_eq!(
            Channel::parse("order-1b4e28ba-2fa1-11d2"),
            Some(Channel::Order("1b4e28ba-2fa1-11d2"))
        );
        assert_eq!(Channel::parse("user-"), None);
        assert_eq!(Channel::parse("admin-1"), None);
        assert_eq!(Channel::parse("orders"), None);
    }
}
