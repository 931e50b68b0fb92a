//! 数据预处理
//!
//! 读取各个源数据文件，统一字段名，去重并筛选出适合标注的题目。

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::{SourceFile, StandardFields};
use crate::models::loaders::{load_rows, Row};
use crate::models::Record;

/// 题干长度范围（按字符计）
pub const MIN_TEXT_CHARS: usize = 30;
pub const MAX_TEXT_CHARS: usize = 80;

/// 只由数字、空白、运算符和括号开头且不含汉字的文本
static PURE_MATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\d\s\-+*/().]+[\d\s\-+*/().]*[^\x{4e00}-\x{9fa5}]*$").unwrap()
});

/// 题干是否适合送去标注
pub fn is_candidate_text(text: &str) -> bool {
    let len = text.chars().count();
    (MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&len) && !PURE_MATH.is_match(text)
}

pub struct Preprocessor {
    target_fields: Vec<String>,
    field_aliases: BTreeMap<String, String>,
}

impl Preprocessor {
    pub fn new(fields: &StandardFields) -> Self {
        Self {
            target_fields: fields.target_fields.clone(),
            field_aliases: fields.field_aliases.clone(),
        }
    }

    /// 统一字段名、写入来源，并按标准字段补齐
    ///
    /// 别名字段只在标准字段不存在时生效；标准字段之外的列被丢弃。
    pub fn standardize_row(&self, row: Row, source: &str) -> Row {
        let mut renamed = Row::new();
        let mut aliased = Vec::new();
        for (key, value) in row {
            match self.field_aliases.get(&key) {
                Some(standard) => aliased.push((standard.clone(), value)),
                None => {
                    renamed.insert(key, value);
                }
            }
        }
        for (key, value) in aliased {
            renamed.entry(key).or_insert(value);
        }
        renamed.insert("source".to_string(), Value::String(source.to_string()));

        self.target_fields
            .iter()
            .map(|field| {
                let value = renamed.remove(field).unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect()
    }

    /// 读取所有源文件并得到筛选后的记录
    ///
    /// 单个文件读取或解析失败只记录错误并跳过。
    pub async fn load_sources(&self, folder: &Path, sources: &[SourceFile]) -> Vec<Record> {
        info!("[preprocess] 开始加载数据文件...");
        let mut rows = Vec::new();

        for source in sources {
            let path = folder.join(&source.file);
            match load_rows(&path).await {
                Ok(file_rows) => {
                    info!(
                        "[preprocess] 成功读取文件: {}，记录数: {}",
                        source.file,
                        file_rows.len()
                    );
                    rows.extend(
                        file_rows
                            .into_iter()
                            .map(|row| self.standardize_row(row, &source.source)),
                    );
                }
                Err(e) => error!("[preprocess] 文件读取失败：{} → {}", source.file, e),
            }
        }

        self.finalize(rows)
    }

    /// 按题干去重（保留首次出现），筛选后转换成记录
    pub fn finalize(&self, rows: Vec<Row>) -> Vec<Record> {
        let mut seen = HashSet::new();
        let deduped: Vec<Row> = rows
            .into_iter()
            .filter(|row| {
                let key = row.get("zh_text").map(Value::to_string).unwrap_or_default();
                seen.insert(key)
            })
            .collect();
        info!("[preprocess] 数据合并完成，总样本数: {}", deduped.len());

        let records: Vec<Record> = deduped
            .into_iter()
            .filter(|row| {
                row.get("zh_text")
                    .and_then(Value::as_str)
                    .map(is_candidate_text)
                    .unwrap_or(false)
            })
            .filter_map(|row| match Record::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("[preprocess] 无法转换为记录，已跳过: {}", e);
                    None
                }
            })
            .collect();

        info!("[preprocess] 筛选完成，保留样本数: {}", records.len());
        records
    }
}
