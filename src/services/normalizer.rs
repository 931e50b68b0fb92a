//! 字段整理 - 把模型返回的近似 JSON 文本修成列表或映射
//!
//! 整理是启发式的，所以这里从不返回错误：
//! - 映射解析失败时返回清理后的字符串（[`FieldValue::Raw`]）
//! - 列表解析失败时把整段文本包成单元素列表

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::warn;

use crate::models::{FieldShape, FieldValue};
use crate::utils::truncate_text;

/// 开头的 `**输出**：` / `Output:` 之类的标签
static OUTPUT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\**\s*(?:输出|output)\s*\**\s*[:：]?").unwrap());

/// 紧挨着 `{` 的说明性前缀，例如 `数量关系: {`
static LEADING_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^[^{}"]*?[:：]\s*\{"#).unwrap());

static COMMA_BEFORE_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\}").unwrap());

static PERIOD_BEFORE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s*\}$").unwrap());

/// 整理一个标注字段
///
/// 只有原始文本会被处理，`Null` 与已解析的值原样返回。
pub fn normalize(value: FieldValue, shape: FieldShape) -> FieldValue {
    match value {
        FieldValue::Raw(text) => normalize_text(&text, shape),
        other => other,
    }
}

/// 整理一段文本
pub fn normalize_text(text: &str, shape: FieldShape) -> FieldValue {
    let cleaned = clean(text);
    match shape {
        FieldShape::Mapping => parse_mapping(&cleaned),
        FieldShape::List => parse_list(&cleaned),
    }
}

/// 两种结构共用的预处理
fn clean(text: &str) -> String {
    let text = text
        .replace('\\', "")
        .replace(['\n', '\r'], " ")
        .trim()
        .replace(['“', '”'], "\"");
    OUTPUT_LABEL.replace(&text, "").trim().to_string()
}

fn parse_mapping(cleaned: &str) -> FieldValue {
    let mut candidate = match LEADING_LABEL.find(cleaned) {
        // 保留匹配末尾的 `{`
        Some(m) => cleaned[m.end() - 1..].to_string(),
        None => cleaned.to_string(),
    };

    if !candidate.starts_with('{') {
        candidate = format!("{{{}}}", candidate);
    }
    candidate = COMMA_BEFORE_BRACE.replace_all(&candidate, "}").into_owned();
    candidate = PERIOD_BEFORE_END.replace(&candidate, "}").into_owned();

    match serde_json::from_str::<Value>(&candidate) {
        Ok(value) => FieldValue::Parsed(value),
        Err(e) => {
            warn!(
                "[normalizer] 解析映射失败: {}\n原始内容: {}",
                e,
                truncate_text(&candidate, 200)
            );
            FieldValue::Raw(candidate)
        }
    }
}

fn parse_list(cleaned: &str) -> FieldValue {
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => FieldValue::Parsed(value),
        Err(_) => FieldValue::Parsed(json!([cleaned.trim()])),
    }
}
