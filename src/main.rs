//! # 剪贴板 JSON 美化工具 — 应用入口
//!
//! 本文件仅负责日志初始化、设置加载与各组件装配。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::sync::Arc;

use clipboard_pretty::clipboard::{ClipboardWatcher, ClipboardWriter, EchoFilter};
use clipboard_pretty::error::AppError;
use clipboard_pretty::service::FormatterService;
use clipboard_pretty::settings::Settings;
use clipboard_pretty::sink::{DisplaySink, LogDisplay};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("❌ 运行失败: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let settings = Settings::load_from_env()?;
    let echo = EchoFilter::new();
    let cancel = CancellationToken::new();

    let mut service = FormatterService::new(settings.build_pipeline(), settings.channel_capacity);
    if settings.mirror_to_display {
        service = service.with_sink(Arc::new(DisplaySink::new(LogDisplay)));
    }
    if settings.write_back {
        service = service.with_sink(Arc::new(ClipboardWriter::new(
            echo.clone(),
            settings.retry_policy(),
        )));
    }

    let (input, service_handle) = service.start(cancel.clone());
    let watcher = ClipboardWatcher::new(settings.poll_interval(), echo)
        .spawn(input, cancel.clone())
        .map_err(|e| AppError::Monitor(format!("启动监听线程失败: {}", e)))?;

    tokio::signal::ctrl_c().await?;
    log::info!("🛑 收到中断信号，正在停止");
    cancel.cancel();

    service_handle.join().await?;
    tokio::task::spawn_blocking(move || watcher.join())
        .await
        .map_err(|e| AppError::Task(format!("watcher: {}", e)))?
        .map_err(|_| AppError::Task("watcher 线程 panic".to_string()))?;

    log::info!("👋 已退出");
    Ok(())
}
