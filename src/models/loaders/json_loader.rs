use std::path::Path;

use serde_json::{Map, Value};
use tokio::fs;

use crate::error::{AppError, AppResult, FileError};

/// 一行原始数据（字段名尚未标准化）
pub type Row = Map<String, Value>;

/// 读取一个源数据文件，返回其中的所有行
///
/// 支持两种结构：
/// - `{ "head": {...}, "body": [...] }`
/// - 直接是数组 `[...]`
pub async fn load_rows(path: &Path) -> AppResult<Vec<Row>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| AppError::file_read_failed(path.display().to_string(), source))?;

    parse_rows(&content, &path.display().to_string())
}

/// 解析 JSON 文本；`origin` 只用于错误信息
pub fn parse_rows(content: &str, origin: &str) -> AppResult<Vec<Row>> {
    let data: Value = serde_json::from_str(content).map_err(|source| FileError::JsonParseFailed {
        path: origin.to_string(),
        source,
    })?;

    let items = match data {
        Value::Object(mut obj) if obj.contains_key("body") => match obj.remove("body") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FileError::UnrecognizedLayout {
                    path: origin.to_string(),
                }
                .into())
            }
        },
        Value::Array(items) => items,
        _ => {
            return Err(FileError::UnrecognizedLayout {
                path: origin.to_string(),
            }
            .into())
        }
    };

    // 非对象的元素没有字段可取，直接跳过
    let rows = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(row) => Some(row),
            _ => None,
        })
        .collect();

    Ok(rows)
}
