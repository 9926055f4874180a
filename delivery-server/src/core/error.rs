use thiserror::Error;

use crate::core::config::ConfigError;
use crate::orders::ManagerError;

/// 启动与运行期错误 (二进制边界)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("订单存储初始化失败: {0}")]
    Storage(#[from] ManagerError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
