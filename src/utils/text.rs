use std::io;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::Formatter;

/// 失败预览保留的字符数
pub const PREVIEW_CHARS: usize = 30;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());

/// 把连续的换行折叠成一个空格并去掉首尾空白
pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text, " ").trim().to_string()
}

/// 取文本末尾最多 `max_chars` 个字符，用于日志中的失败预览
///
/// 按字符而不是字节截取，中文不会被截断成半个字。
pub fn tail_preview(text: &str, max_chars: usize) -> String {
    let cleaned = collapse_line_breaks(text);
    let count = cleaned.chars().count();
    if count > max_chars {
        cleaned.chars().skip(count - max_chars).collect()
    } else {
        cleaned
    }
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 单行 JSON，元素之间用 `", "`、键值之间用 `": "` 分隔
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// 按日志习惯的分隔符序列化为单行 JSON，非 ASCII 字符原样保留
pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json 只写出合法 UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
