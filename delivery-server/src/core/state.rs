use std::sync::Arc;

use shared::order::{CommandResponse, OrderCommand, OrderSnapshot};

use crate::auth::JwtService;
use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result};
use crate::ledger::LedgerService;
use crate::message::{MessageBus, RelayWorker};
use crate::orders::OrdersManager;
use crate::riders::RiderService;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 在阻塞线程池执行 redb 读写
///
/// redb 写事务是同步且互斥的，不应占用 async 工作线程。
pub async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {e}")))?
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | orders | Arc<OrdersManager> | 订单命令处理 |
/// | riders | RiderService | 骑手档案 |
/// | ledger | LedgerService | 账本 |
/// | message_bus | MessageBus | 推送总线 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    pub orders: Arc<OrdersManager>,
    pub riders: RiderService,
    pub ledger: LedgerService,
    /// 推送总线
    pub message_bus: MessageBus,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 基于已创建的订单管理器组装状态
    pub fn new(config: Config, orders: Arc<OrdersManager>) -> Self {
        let message_bus = MessageBus::new(config.relay_channel_capacity);
        let riders = RiderService::new(orders.clone(), message_bus.clone(), config.dispatch_radius_km);
        let ledger = LedgerService::new(orders.clone(), message_bus.clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            orders,
            riders,
            ledger,
            message_bus,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 工作目录 (work_dir, work_dir/logs)
    /// 2. 订单数据库 (work_dir/delivery.redb)
    /// 3. 各服务
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(config.log_dir())?;

        let db_path = config.db_path();
        tracing::info!(path = %db_path.display(), "Opening order database");
        let orders = OrdersManager::new(&db_path, config.finance.clone())?;

        Ok(Self::new(config.clone(), Arc::new(orders)))
    }

    /// 启动后台任务
    ///
    /// - 推送中继 (RelayWorker): 订单事件 → 频道
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::with_token(self.message_bus.shutdown_token().clone());

        let worker = RelayWorker::new(self.orders.clone(), self.message_bus.clone());
        let source = self.orders.subscribe();
        tasks.spawn("relay_worker", worker.run(source));

        tasks
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// 执行订单命令
    ///
    /// 失败的命令转换为对应 HTTP 状态的 [`AppError`]。
    pub async fn execute(&self, cmd: OrderCommand) -> AppResult<CommandResponse> {
        let orders = self.orders.clone();
        let response = run_blocking(move || Ok(orders.execute_command(cmd))).await?;
        match response.error {
            Some(err) => Err(err.into()),
            None => Ok(response),
        }
    }

    /// 读取订单快照，不存在返回 404
    pub async fn load_order(&self, order_id: &str) -> AppResult<OrderSnapshot> {
        let orders = self.orders.clone();
        let id = order_id.to_string();
        run_blocking(move || {
            orders.get_snapshot(&id)?.ok_or_else(|| {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {id}"))
            })
        })
        .await
    }
}
