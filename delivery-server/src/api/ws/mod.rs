//! WebSocket 推送端点
//!
//! GET /ws?channels=order-1,rider-2&token=<JWT>
//!
//! 连接时一次性声明频道，逐个校验订阅权限，任一不通过返回 403。
//! 之后只下发属于已订阅频道的 [`RelayMessage`]，客户端消息仅处理 Close。

use std::collections::HashSet;

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::auth::ActingUser;
use crate::auth::permissions::can_subscribe;
use crate::core::ServerState;
use crate::core::state::run_blocking;
use crate::message::RelayMessage;
use crate::utils::{AppError, AppResult};

/// 单连接最多订阅的频道数
const MAX_CHANNELS: usize = 32;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    channels: String,
}

fn parse_channels(raw: &str) -> AppResult<HashSet<String>> {
    let channels: HashSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if channels.is_empty() {
        return Err(AppError::validation("At least one channel is required"));
    }
    if channels.len() > MAX_CHANNELS {
        return Err(AppError::validation(format!(
            "Too many channels ({}/{MAX_CHANNELS})",
            channels.len()
        )));
    }
    Ok(channels)
}

pub async fn handle_ws(
    State(state): State<ServerState>,
    acting: ActingUser,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    let channels = parse_channels(&query.channels)?;

    let orders = state.orders.clone();
    let actor = acting.actor.clone();
    let requested = channels.clone();
    let denied = run_blocking(move || {
        Ok(requested.into_iter().find(|channel| {
            !can_subscribe(&actor, channel, |order_id| {
                orders.get_snapshot(order_id).ok().flatten()
            })
        }))
    })
    .await?;

    if let Some(channel) = denied {
        crate::security_log!(
            "WARN",
            "subscribe_denied",
            user_id = acting.user.id.clone(),
            channel = channel.clone()
        );
        return Err(AppError::permission_denied(format!(
            "Not allowed to subscribe to {channel}"
        )));
    }

    let user_id = acting.user.id;
    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, user_id, channels)))
}

async fn ws_session(
    socket: WebSocket,
    state: ServerState,
    user_id: String,
    channels: HashSet<String>,
) {
    let (mut sink, mut stream) = socket.split();
    let mut rx = state.message_bus.subscribe();
    let shutdown = state.message_bus.shutdown_token().clone();

    tracing::info!(user_id = %user_id, channels = channels.len(), "WS connected");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            msg = rx.recv() => {
                match msg {
                    Ok(msg) => {
                        if channels.contains(&msg.channel)
                            && send_message(&mut sink, &msg).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(user_id = %user_id, lagged = n, "WS subscriber lagged, messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    tracing::info!(user_id = %user_id, "WS disconnected");
}

async fn send_message<S>(sink: &mut S, msg: &RelayMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize relay message");
    })?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
