//! 日志工具模块
//!
//! 初始化 tracing 订阅器，并提供流程日志的格式化输出
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ExecutionMode, LoggingConfig};
use crate::utils::log_report::LogReport;
use crate::utils::rotating_file::RotatingFile;

/// 初始化日志系统
///
/// 文件中每行只写消息本身，调用事件因此是一行一个 JSON 对象。
///
/// # 返回
/// 返回主日志文件路径
pub fn init(config: &LoggingConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("无法创建日志目录: {}", config.log_dir))?;
    let log_path = PathBuf::from(&config.log_dir).join(format!("{}.jsonl", config.log_name));

    let file = RotatingFile::open(
        &log_path,
        config.max_mb.saturating_mul(1024 * 1024),
        config.backup_count,
    )
    .with_context(|| format!("无法打开日志文件: {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false);

    let console_layer = config.console.then(|| fmt::layer().with_target(false));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("日志系统初始化失败")?;

    info!(
        "{}",
        json!({
            "event": "log_init",
            "log_path": log_path.display().to_string(),
            "timestamp": chrono::Local::now().to_rfc3339(),
        })
    );

    Ok(log_path)
}

/// 记录程序启动信息
pub fn log_startup(mode: ExecutionMode, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 数学题标注流水线");
    match mode {
        ExecutionMode::Sync => info!("📊 执行模式: 同步（逐条请求）"),
        ExecutionMode::Async => info!("📊 执行模式: 异步，最大并发请求数: {}", max_concurrent),
    }
    info!("{}", "=".repeat(60));
}

/// 记录预处理结果
pub fn log_records_loaded(total: usize, sources: usize) {
    info!("✓ 从 {} 个数据文件中得到 {} 条待标注题目", sources, total);
}

/// 打印最终统计信息
pub fn print_final_stats(report: &LogReport, exported: usize, output_path: &str) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    for line in report.render().lines() {
        info!("{}", line);
    }
    info!("📦 导出记录数: {}", exported);
    info!("{}", "=".repeat(60));
    info!("结果已保存至: {}", output_path);
}
