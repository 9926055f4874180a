//! Rider API 模块
//!
//! | 路径 | 方法 | 说明 | 权限 |
//! |------|------|------|------|
//! | /riders | POST | 注册骑手档案 | rider |
//! | /riders/{id} | GET | 档案 | 本人 / admin |
//! | /riders/{id}/online | PUT | 上下线 | 本人 / admin |
//! | /riders/{id}/location | PUT | 上报位置 | 本人 / admin |
//! | /riders/{id}/available-orders | GET | 可抢订单 | 本人 / admin |
//! | /riders/{id}/accept-order | POST | 抢单 | 本人 |
//! | /riders/{id}/verification | PUT | 审核 | admin |
//! | /riders/{id}/cod-remittance | POST | 现金回缴 | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/riders", routes())
}

fn routes() -> Router<ServerState> {
    let rider_routes = Router::new()
        .route("/", post(handler::register))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/online", put(handler::set_online))
        .route("/{id}/location", put(handler::update_location))
        .route("/{id}/available-orders", get(handler::available_orders))
        .route("/{id}/accept-order", post(handler::accept_order));

    let admin_routes = Router::new()
        .route("/{id}/verification", put(handler::set_verification))
        .route("/{id}/cod-remittance", post(handler::remit_cod))
        .layer(middleware::from_fn(require_admin));

    rider_routes.merge(admin_routes)
}
