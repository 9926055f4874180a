//! 推送模块
//!
//! - [`MessageBus`] - 中继消息广播总线
//! - [`RelayWorker`] - 订单事件扇出到频道
//!
//! 频道: `order-{id}` / `restaurant-{id}` / `rider-{id}` / `riders` / `user-{id}`

pub mod bus;
pub mod relay;

pub use bus::MessageBus;
pub use relay::{RelayWorker, fan_out, wallet_message};
pub use shared::RelayMessage;
