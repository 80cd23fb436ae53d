//! piperd - Piper TTS HTTP API
//!
//! 三个端点: 健康检查、列出音色、文本合成。
//! 音色模型按需加载并缓存于进程内。

use std::sync::Arc;

use piperd::application::VoiceLibrary;
use piperd::config::{load_config, print_config};
use piperd::infrastructure::adapters::tts::{PiperProcessConfig, PiperProcessEngine};
use piperd::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},piperd={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("piperd - Piper TTS HTTP 服务");
    print_config(&config);

    // 合成引擎 + 音色库（进程级缓存）
    let engine = Arc::new(PiperProcessEngine::new(PiperProcessConfig {
        binary: config.engine.binary.clone(),
    }));
    let voices = Arc::new(VoiceLibrary::new(config.voices.dir.clone(), engine));

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(voices);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
