//! 数学题标注流水线命令行
//!
//! 用法：
//!   math_annotation_pipeline run [--config pipeline.toml] [--mode sync|async]
//!   math_annotation_pipeline analyze-log <日志文件>

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use math_annotation_pipeline::config::{Config, ExecutionMode};
use math_annotation_pipeline::utils::{logging, LogReport};
use math_annotation_pipeline::App;

#[derive(Parser)]
#[command(name = "math_annotation_pipeline", version, about = "数学文字题批量标注流水线")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 预处理、标注、校对并导出数据集
    Run {
        /// 配置文件路径
        #[arg(long, default_value = "pipeline.toml")]
        config: PathBuf,
        /// 执行模式，覆盖配置文件与环境变量
        #[arg(long)]
        mode: Option<ExecutionMode>,
    },
    /// 统计日志文件中的调用事件
    AnalyzeLog {
        /// 日志文件路径
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Run { config, mode } => {
            let config = Config::load(&config, mode)?;
            logging::init(&config.logging)?;
            App::new(config).run().await?;
        }
        Commands::AnalyzeLog { path } => {
            let report = LogReport::from_log_file(&path)?;
            println!("{}", report.render());
        }
    }
    Ok(())
}
