//! 导出标准格式的数据集
//!
//! 输出为 `{head, body}` 结构：`head` 描述数据集，`body` 为带分词结果、重新编号的记录。

use std::path::Path;

use jieba_rs::Jieba;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SourceFile;
use crate::error::{AppError, AppResult};
use crate::models::Record;

/// 数据集描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetHead {
    pub name: String,
    pub version: String,
    pub size: usize,
    pub source: String,
    pub description: String,
    pub original_language: String,
}

impl DatasetHead {
    pub fn new(size: usize, sources: &[SourceFile]) -> Self {
        let source = sources
            .iter()
            .map(|s| s.source.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            name: "benchmark_data".to_string(),
            version: "1.0".to_string(),
            size,
            source,
            description: "This is a benchmark dataset for math question.".to_string(),
            original_language: "Chinese".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Dataset {
    pub head: DatasetHead,
    pub body: Vec<Record>,
}

pub struct Exporter {
    jieba: Jieba,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// 加载默认词典，耗时较长，整个流程只需创建一次
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }

    /// 精确模式分词，词之间以空格分隔
    pub fn segment(&self, text: &str) -> String {
        self.jieba.cut(text, false).join(" ")
    }

    /// 分词并从 1 开始重新编号
    pub fn build_dataset(&self, mut records: Vec<Record>, sources: &[SourceFile]) -> Dataset {
        for (index, record) in records.iter_mut().enumerate() {
            record.segmented_text = Some(self.segment(&record.zh_text));
            record.id = (index as u64 + 1).into();
        }
        Dataset {
            head: DatasetHead::new(records.len(), sources),
            body: records,
        }
    }

    /// 写出数据集（4 空格缩进，保留中文）
    ///
    /// 记录为空时只打印警告，不写文件，返回 `Ok(0)`。
    pub async fn export(
        &self,
        records: Vec<Record>,
        sources: &[SourceFile],
        output: &Path,
    ) -> AppResult<usize> {
        info!("[export] 开始分词与编号处理");
        if records.is_empty() {
            warn!("[export] 输入数据为空，跳过处理");
            return Ok(0);
        }

        let dataset = self.build_dataset(records, sources);
        let output_str = output.display().to_string();
        let content = to_pretty_json(&dataset)
            .map_err(|e| AppError::file_write_failed(&output_str, std::io::Error::other(e)))?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
        }
        tokio::fs::write(output, content)
            .await
            .map_err(|e| AppError::file_write_failed(&output_str, e))?;

        info!("[export] 成功写入文件: {}", output_str);
        Ok(dataset.head.size)
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sources() -> Vec<SourceFile> {
        vec![
            SourceFile { file: "a.json".into(), source: "ape210k".into() },
            SourceFile { file: "b.json".into(), source: "math23k".into() },
        ]
    }

    #[test]
    fn test_head_fields() {
        let head = DatasetHead::new(2, &sources());
        assert_eq!(head.source, "ape210k, math23k");
        assert_eq!(head.size, 2);
        assert_eq!(head.original_language, "Chinese");
    }

    #[test]
    fn test_segment_joins_words_with_spaces() {
        let exporter = Exporter::new();
        let segmented = exporter.segment("妈妈买了3条裙子");
        assert!(segmented.contains(' '));
        assert_eq!(segmented.replace(' ', ""), "妈妈买了3条裙子");
    }

    #[tokio::test]
    async fn test_export_renumbers_and_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("benchmark.json");
        let records = vec![
            Record::new(17, "小明有5个苹果，吃了2个", "ape210k"),
            Record::new("x-9", "小红有3支铅笔", "math23k"),
        ];

        let written = Exporter::new()
            .export(records, &sources(), &output)
            .await
            .unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("\n    \"head\""));
        assert!(content.contains("小明有5个苹果"));

        let doc: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["head"]["name"], "benchmark_data");
        assert_eq!(doc["head"]["size"], 2);
        assert_eq!(doc["body"][0]["id"], json!(1));
        assert_eq!(doc["body"][1]["id"], json!(2));
        assert!(doc["body"][0]["segmented_text"].is_string());
        assert!(doc["body"][0].get("knowledge_tag").is_some());
    }

    #[tokio::test]
    async fn test_write_failure_reports_output_path() {
        let dir = tempfile::tempdir().unwrap();
        // 输出路径是已存在的目录，写入必然失败
        let output = dir.path().join("taken");
        std::fs::create_dir(&output).unwrap();

        let err = Exporter::new()
            .export(vec![Record::new(1, "小明有5个苹果，吃了2个", "ape210k")], &sources(), &output)
            .await
            .unwrap_err();
        match err {
            AppError::File(crate::error::FileError::WriteFailed { path, .. }) => {
                assert_eq!(path, output.display().to_string());
            }
            other => panic!("意外的错误类型: {}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty.json");
        let written = Exporter::new().export(Vec::new(), &sources(), &output).await.unwrap();
        assert_eq!(written, 0);
        assert!(!output.exists());
    }
}
