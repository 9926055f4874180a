//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单命令与查询
//! - [`riders`] - 骑手档案、抢单
//! - [`ledger`] - 余额流水、结算
//! - [`ws`] - 频道推送

pub mod health;
pub mod ledger;
pub mod orders;
pub mod riders;
pub mod ws;

pub use crate::utils::AppResult;
