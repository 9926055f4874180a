//! Ledger API 模块
//!
//! | 路径 | 方法 | 说明 | 权限 |
//! |------|------|------|------|
//! | /ledger/{entity_type}/{entity_id} | GET | 余额与流水 | 本人 / admin |
//! | /ledger/settlements | POST | 手工结算 | admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/ledger", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/{entity_type}/{entity_id}", get(handler::statement));

    let admin_routes = Router::new()
        .route("/settlements", post(handler::settle))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(admin_routes)
}
