//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 健康检查 | 无 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::core::state::run_blocking;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// healthy | degraded
    status: &'static str,
    version: &'static str,
    /// 本次数据库实例的 epoch
    epoch: String,
    /// 最新事件序号，数据库不可读时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<u64>,
    /// 当前推送订阅者数量
    subscribers: usize,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let orders = state.orders.clone();
    let sequence = run_blocking(move || Ok(orders.get_current_sequence()?))
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Health check database read failed"))
        .ok();

    Json(HealthResponse {
        status: if sequence.is_some() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.orders.epoch().to_string(),
        sequence,
        subscribers: state.message_bus.receiver_count(),
    })
}
