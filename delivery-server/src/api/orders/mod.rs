//! Order API 模块
//!
//! 所有变更都通过 OrdersManager 命令执行。
//!
//! | 路径 | 方法 | 说明 | 权限 |
//! |------|------|------|------|
//! | /orders | POST | 下单 | customer / admin |
//! | /orders/{id} | GET | 订单详情 | 参与方 / admin |
//! | /orders/{id}/events | GET | 事件历史 | 参与方 / admin |
//! | /orders/{id}/status | PUT | 状态变更 | 按状态表 |
//! | /orders/{id}/cancel | PATCH | 取消 | 按角色窗口 |
//! | /orders/{id}/complete | POST | 送达 | rider / admin |
//! | /orders/{id}/refund | POST | 退款 | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/orders", routes())
}

fn routes() -> Router<ServerState> {
    let participant_routes = Router::new()
        .route("/", post(handler::place))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/events", get(handler::events))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/cancel", patch(handler::cancel))
        .route("/{id}/complete", post(handler::complete));

    let admin_routes = Router::new()
        .route("/{id}/refund", post(handler::refund))
        .layer(middleware::from_fn(require_admin));

    participant_routes.merge(admin_routes)
}
