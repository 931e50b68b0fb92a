//! 记录标注器
//!
//! 对一批记录逐条发起五种标注，按种类收集原始文本，再整理后按列写回记录。
//! 同步与异步两种模式只在调度方式上不同，提示词与整理逻辑完全共用，
//! 因此相同的远端响应总会得到相同的结果。

use futures::future::join_all;
use tracing::info;

use crate::clients::{AnnotationClient, ChatTransport};
use crate::models::{AnnotationKind, FieldValue, Record};
use crate::orchestrator::governor::{CallStrategy, Governor};
use crate::services::normalizer::normalize;
use crate::services::PromptBuilder;

/// 某种标注在整批记录上的原始结果，与输入记录一一对应
type Column = (AnnotationKind, Vec<Option<String>>);

pub struct RecordAnnotator<T> {
    client: AnnotationClient<T>,
    prompts: PromptBuilder,
    strategy: CallStrategy,
}

impl<T: ChatTransport> RecordAnnotator<T> {
    pub fn new(client: AnnotationClient<T>, prompts: PromptBuilder, strategy: CallStrategy) -> Self {
        Self {
            client,
            prompts,
            strategy,
        }
    }

    pub fn client(&self) -> &AnnotationClient<T> {
        &self.client
    }

    /// 标注一批记录
    ///
    /// 返回的记录与输入顺序一致，五个标注字段都会被写入（解析值、兜底值或 null）。
    /// 单次调用失败不会中断整批处理。
    pub async fn annotate(&self, mut records: Vec<Record>) -> Vec<Record> {
        if records.is_empty() {
            return records;
        }

        let columns = match &self.strategy {
            CallStrategy::Sequential => self.collect_sequential(&records).await,
            CallStrategy::Governed(governor) => self.collect_governed(&records, governor).await,
        };

        for (kind, column) in columns {
            for (record, raw) in records.iter_mut().zip(column) {
                merge_field(record, kind, raw);
            }
        }

        info!("[annotate] 标注完成，共 {} 条记录", records.len());
        records
    }

    async fn call_kind(&self, kind: AnnotationKind, record: &Record) -> Option<String> {
        let instruction = self.prompts.render(kind, &record.zh_text);
        self.client.call(&instruction, kind.fallback()).await
    }

    /// 一种一种地处理，每种内部逐条等待
    async fn collect_sequential(&self, records: &[Record]) -> Vec<Column> {
        let mut columns = Vec::with_capacity(AnnotationKind::ALL.len());
        for kind in AnnotationKind::ALL {
            info!("[annotate] 开始{}", kind.label());
            let mut column = Vec::with_capacity(records.len());
            for record in records {
                column.push(self.call_kind(kind, record).await);
            }
            columns.push((kind, column));
        }
        columns
    }

    /// 所有种类、所有记录同时排队，由 governor 限制在途数量
    async fn collect_governed(&self, records: &[Record], governor: &Governor) -> Vec<Column> {
        info!(
            "[annotate] 并发标注 {} 条记录 × {} 种标注，并发上限 {}",
            records.len(),
            AnnotationKind::ALL.len(),
            governor.limit()
        );
        let columns = AnnotationKind::ALL.map(|kind| async move {
            let calls = records
                .iter()
                .map(|record| governor.run(self.call_kind(kind, record)));
            // join_all 按传入顺序返回，与完成先后无关
            (kind, join_all(calls).await)
        });
        join_all(columns).await
    }
}

/// 把一种标注的原始文本写进记录对应字段，需要结构化的先按 `shape()` 整理
fn merge_field(record: &mut Record, kind: AnnotationKind, raw: Option<String>) {
    let Some(shape) = kind.shape() else {
        match kind {
            AnnotationKind::ReasoningType => record.reasoning_type = raw,
            _ => record.en_text = raw,
        }
        return;
    };

    let value = normalize(FieldValue::from(raw), shape);
    match kind {
        AnnotationKind::RelationExtraction => record.quantity_relation = value,
        AnnotationKind::CategoryTagging => record.problem_category = value,
        _ => record.knowledge_tag = value,
    }
}
