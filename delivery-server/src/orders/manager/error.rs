use super::super::storage::StorageError;
use super::super::traits::OrderError;
use shared::AppError;
use shared::order::{CommandError, CommandErrorCode, OrderStatus};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Rider not found: {0}")]
    RiderNotFound(String),

    #[error("Invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
        reason: String,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("{1}")]
    Conflict(CommandErrorCode, String),

    #[error("{1}")]
    InvalidOperation(CommandErrorCode, String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// 将存储错误转换为错误码（前端负责本地化）
fn classify_storage_error(e: &StorageError) -> CommandErrorCode {
    // 先按枚举变体精确匹配
    match e {
        StorageError::Serialization(_) => return CommandErrorCode::InternalError,
        StorageError::OrderNotFound(_) => return CommandErrorCode::OrderNotFound,
        StorageError::RiderNotFound(_) => return CommandErrorCode::RiderNotFound,
        _ => {}
    }

    // redb 错误通过字符串匹配分类
    let err_str = e.to_string().to_lowercase();

    // 磁盘空间不足
    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return CommandErrorCode::StorageFull;
    }

    // 内存不足
    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return CommandErrorCode::OutOfMemory;
    }

    // 数据损坏
    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return CommandErrorCode::StorageCorrupted;
    }

    // 默认：系统繁忙（redb 的 Database/Transaction/Table/Storage/Commit 错误）
    CommandErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string(); // 保留技术细节用于日志/调试
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            ManagerError::OrderNotFound(id) => (
                CommandErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ),
            ManagerError::RiderNotFound(id) => (
                CommandErrorCode::RiderNotFound,
                format!("Rider not found: {}", id),
            ),
            e @ ManagerError::InvalidTransition { .. } => {
                (CommandErrorCode::InvalidTransition, e.to_string())
            }
            ManagerError::PermissionDenied(msg) => (CommandErrorCode::PermissionDenied, msg),
            ManagerError::Conflict(code, msg) => (code, msg),
            ManagerError::InvalidOperation(code, msg) => (code, msg),
            ManagerError::Internal(msg) => (CommandErrorCode::InternalError, msg),
        };
        CommandError::new(code, message)
    }
}

impl From<OrderError> for ManagerError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => ManagerError::OrderNotFound(id),
            OrderError::RiderNotFound(id) => ManagerError::RiderNotFound(id),
            OrderError::InvalidTransition { from, to, reason } => {
                ManagerError::InvalidTransition { from, to, reason }
            }
            OrderError::PermissionDenied(msg) => ManagerError::PermissionDenied(msg),
            OrderError::Conflict(code, msg) => ManagerError::Conflict(code, msg),
            OrderError::InvalidOperation(code, msg) => ManagerError::InvalidOperation(code, msg),
            OrderError::Storage(msg) => ManagerError::Internal(msg),
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        CommandError::from(err).into()
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
