//! JWT Extractor
//!
//! Custom extractors for automatically validating JWT tokens

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use shared::order::{Actor, ActorRole};

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// `?token=` 查询参数 (浏览器 WebSocket 无法设置请求头)
#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// 从 Authorization 头或 `token` 查询参数提取令牌
pub(crate) fn extract_token(headers: &http::HeaderMap, uri: &http::Uri) -> Result<String, AppError> {
    if let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        return JwtService::extract_from_header(header)
            .map(str::to_string)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"));
    }

    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", uri));
            AppError::unauthorized()
        })
}

/// 校验令牌并解析为 CurrentUser
pub(crate) fn authenticate(
    jwt_service: &JwtService,
    token: &str,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    match jwt_service.validate_token(token) {
        Ok(claims) => CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e))),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", uri)
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// JWT Auth Extractor
///
/// Use this extractor in protected handlers to automatically validate JWT
/// and extract CurrentUser
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = extract_token(&parts.headers, &parts.uri)?;
        let user = authenticate(state.get_jwt_service(), &token, &parts.uri)?;

        // Store in extensions for potential reuse
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// 已认证用户及其命令身份
///
/// 骑手账号的 `rider_id` 从骑手档案解析；尚未注册档案的骑手得到 `None`，
/// 由各操作自行拒绝。
#[derive(Debug, Clone)]
pub struct ActingUser {
    pub user: CurrentUser,
    pub actor: Actor,
}

impl FromRequestParts<ServerState> for ActingUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let rider_id = match user.role {
            ActorRole::Rider => state.riders.resolve_rider_id(&user.id)?,
            _ => None,
        };
        let actor = user.to_actor(rider_id);
        Ok(Self { user, actor })
    }
}
