use std::path::PathBuf;

use thiserror::Error;

use crate::auth::{JwtConfig, JwtError};

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be in [0, 1), got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("{name} must be a non-negative number, got {value}")]
    InvalidAmount { name: &'static str, value: f64 },

    #[error("JWT configuration: {0}")]
    Jwt(#[from] JwtError),
}

/// 佣金与骑手运费配置
///
/// 送达时用于计算骑手收入和 COD 分账。
#[derive(Debug, Clone, PartialEq)]
pub struct FinanceConfig {
    /// 平台从 COD 现金中抽取的佣金比例
    pub platform_commission_rate: f64,
    /// 从骑手毛收入中扣除的佣金比例
    pub rider_commission_rate: f64,
    /// 按距离计费时的起步价
    pub rider_base_fare: f64,
    /// 每公里费用
    pub rider_per_km_rate: f64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            platform_commission_rate: 0.15,
            rider_commission_rate: 0.10,
            rider_base_fare: 50.0,
            rider_per_km_rate: 15.0,
        }
    }
}

impl FinanceConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            platform_commission_rate: env_parse(
                "PLATFORM_COMMISSION_RATE",
                defaults.platform_commission_rate,
            ),
            rider_commission_rate: env_parse(
                "RIDER_COMMISSION_RATE",
                defaults.rider_commission_rate,
            ),
            rider_base_fare: env_parse("RIDER_BASE_FARE", defaults.rider_base_fare),
            rider_per_km_rate: env_parse("RIDER_PER_KM_RATE", defaults.rider_per_km_rate),
        }
    }

    /// 比例必须在 [0, 1) 内，金额不能为负
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("PLATFORM_COMMISSION_RATE", self.platform_commission_rate),
            ("RIDER_COMMISSION_RATE", self.rider_commission_rate),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        for (name, value) in [
            ("RIDER_BASE_FARE", self.rider_base_fare),
            ("RIDER_PER_KM_RATE", self.rider_per_km_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidAmount { name, value });
            }
        }
        Ok(())
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (delivery.redb, logs/) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 默认日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | PLATFORM_COMMISSION_RATE | 0.15 | 平台 COD 佣金 |
/// | RIDER_COMMISSION_RATE | 0.10 | 骑手佣金 |
/// | RIDER_BASE_FARE | 50 | 骑手起步价 |
/// | RIDER_PER_KM_RATE | 15 | 骑手每公里费用 |
/// | DISPATCH_RADIUS_KM | 10 | 可接订单默认半径 |
/// | RELAY_CHANNEL_CAPACITY | 1024 | 推送总线容量 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE / JWT_EXPIRATION_MINUTES | - | 令牌校验 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/delivery HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub finance: FinanceConfig,
    /// 骑手可接订单的默认半径 (公里)
    pub dispatch_radius_km: f64,
    pub relay_channel_capacity: usize,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置并校验
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON", false),
            jwt: JwtConfig::from_env()?,
            finance: FinanceConfig::from_env(),
            dispatch_radius_km: env_parse("DISPATCH_RADIUS_KM", 10.0),
            relay_channel_capacity: env_parse("RELAY_CHANNEL_CAPACITY", 1024),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
        };
        config.validate()?;
        Ok(config)
    }

    /// 测试用配置：固定密钥，默认费率
    pub fn for_tests(work_dir: impl Into<String>, jwt: JwtConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "test".into(),
            log_level: "debug".into(),
            log_json: false,
            jwt,
            finance: FinanceConfig::default(),
            dispatch_radius_km: 10.0,
            relay_channel_capacity: 256,
            request_timeout_ms: 5000,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.finance.validate()?;
        if !self.dispatch_radius_km.is_finite() || self.dispatch_radius_km < 0.0 {
            return Err(ConfigError::InvalidAmount {
                name: "DISPATCH_RADIUS_KM",
                value: self.dispatch_radius_km,
            });
        }
        Ok(())
    }

    /// 订单数据库路径
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("delivery.redb")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
