//! Delivery Server - 外卖订单、骑手派单与结算服务
//!
//! # 架构概述
//!
//! - **订单** (`orders`): 命令 → 事件 → 快照 的事件溯源状态机，redb 单写事务
//! - **骑手** (`riders`): 档案、审核、上下线、位置、可抢订单
//! - **账本** (`ledger`): 幂等记账，送达/退款/结算/现金回缴
//! - **推送** (`message`): 订单事件扇出到频道，WebSocket 下发
//! - **认证** (`auth`): JWT + 角色权限
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! delivery-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── auth/          # JWT 认证、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单事件溯源
//! ├── riders/        # 骑手档案
//! ├── ledger/        # 账本
//! ├── message/       # 推送总线与中继
//! └── utils/         # 日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod ledger;
pub mod message;
pub mod orders;
pub mod riders;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{MessageBus, RelayMessage};
pub use orders::{OrderStorage, OrdersManager};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____       ___
   / __ \___  / (_)   _____  _______  __
  / / / / _ \/ / / | / / _ \/ ___/ / / /
 / /_/ /  __/ / /| |/ /  __/ /  / /_/ /
/_____/\___/_/_/ |___/\___/_/   \__, /
                               /____/
    "#
    );
}
