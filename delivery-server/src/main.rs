use delivery_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env()?;

    // 3. 日志 (logs 目录由 initialize 创建，先建好以便写文件)
    std::fs::create_dir_all(config.log_dir())?;
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        Some(&config.log_dir()),
    );

    print_banner();
    tracing::info!(environment = %config.environment, "🛵 Delivery Server starting...");

    // 4. 初始化服务器状态
    let state = ServerState::initialize(&config)?;

    // 5. 启动 HTTP 服务器 (Server::run 会自动启动后台任务)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
