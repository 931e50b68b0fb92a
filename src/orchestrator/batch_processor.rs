//! 批处理入口 - 编排层
//!
//! ## 处理流程
//!
//! 1. **预处理**：读取所有源文件，统一字段，去重筛选
//! 2. **标注**：按执行模式调度五种标注请求
//! 3. **校对**：对方程求值，修正答案，丢弃无法求值的记录
//! 4. **导出**：分词、重新编号，写出标准格式的数据集
//! 5. **统计**：汇总本次运行的调用事件

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::clients::{AnnotationClient, HttpTransport};
use crate::config::Config;
use crate::orchestrator::governor::CallStrategy;
use crate::orchestrator::record_annotator::RecordAnnotator;
use crate::services::{equation, Exporter, Preprocessor, PromptBuilder};
use crate::utils::logging::{log_records_loaded, log_startup, print_final_stats};
use crate::utils::LogReport;

/// 应用主结构
pub struct App {
    config: Config,
}

/// 一次运行的结果
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 预处理后待标注的记录数
    pub loaded: usize,
    /// 写入数据集的记录数
    pub exported: usize,
    pub report: LogReport,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 运行完整流水线
    ///
    /// 只有文件写出失败这类致命错误才会返回 `Err`，单条记录的失败在各阶段内部消化。
    pub async fn run(&self) -> Result<RunSummary> {
        let strategy = CallStrategy::from_config(&self.config.processing_mode);
        log_startup(strategy.mode(), strategy.concurrency());

        let data_path = &self.config.data_path;
        let records = Preprocessor::new(&self.config.standard_fields)
            .load_sources(Path::new(&data_path.source_folder), &data_path.sources)
            .await;
        log_records_loaded(records.len(), data_path.sources.len());

        if records.is_empty() {
            warn!("⚠️ 没有可标注的题目，程序结束");
            return Ok(RunSummary::default());
        }
        let loaded = records.len();

        let transport = HttpTransport::new(&self.config.api).context("无法创建 HTTP 客户端")?;
        let client = AnnotationClient::new(transport, &self.config.api, strategy.mode());
        let annotator = RecordAnnotator::new(
            client,
            PromptBuilder::new(&self.config.prompt_labels),
            strategy,
        );

        let annotated = annotator.annotate(records).await;
        let reconciled = equation::reconcile(annotated);

        let exported = Exporter::new()
            .export(
                reconciled,
                &data_path.sources,
                Path::new(&data_path.data_output),
            )
            .await?;

        let report = annotator.client().report();
        print_final_stats(&report, exported, &data_path.data_output);

        Ok(RunSummary {
            loaded,
            exported,
            report,
        })
    }
}
