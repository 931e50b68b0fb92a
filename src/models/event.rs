//! 单次远端调用的结构化事件

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// 调用结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Success,
    /// 响应能解析但没有 choices
    BadResponse,
    /// 请求或解析过程中出错
    Exception,
}

impl CallStatus {
    /// 事件写入日志时的级别
    pub fn level(self) -> Level {
        match self {
            CallStatus::Success => Level::INFO,
            CallStatus::BadResponse => Level::WARN,
            CallStatus::Exception => Level::ERROR,
        }
    }
}

/// 一次调用完成后生成的事件，写入日志后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEvent {
    pub event: String,
    pub request_id: u64,
    pub status: CallStatus,
    /// 耗时（秒，保留三位小数）
    pub elapsed_time: f64,
    pub fallback_used: bool,
    pub timestamp: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnnotationEvent {
    pub const NAME: &'static str = "api_call";

    pub fn new(request_id: u64, status: CallStatus, elapsed_time: f64) -> Self {
        Self {
            event: Self::NAME.to_string(),
            request_id,
            status,
            elapsed_time,
            fallback_used: status != CallStatus::Success,
            timestamp: Local::now(),
            prompt_preview: None,
            error: None,
        }
    }

    /// 只有使用兜底值时才记录预览
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        let preview = preview.into();
        if self.fallback_used && !preview.is_empty() {
            self.prompt_preview = Some(preview);
        }
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// 以对应级别写一行 JSON 到日志
    pub fn emit(&self) {
        let line = match serde_json::to_string(self) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("事件序列化失败 (request_id={}): {}", self.request_id, e);
                return;
            }
        };
        // tracing 宏要求级别是常量，这里按 level() 分派
        match self.status.level() {
            Level::ERROR => tracing::error!(target: "api_call", "{}", line),
            Level::WARN => tracing::warn!(target: "api_call", "{}", line),
            _ => tracing::info!(target: "api_call", "{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_event_omits_optional_fields() {
        let event = AnnotationEvent::new(7, CallStatus::Success, 1.234).with_preview("不该出现");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "api_call");
        assert_eq!(json["request_id"], 7);
        assert_eq!(json["status"], "success");
        assert_eq!(json["fallback_used"], false);
        assert!(json.get("prompt_preview").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_exception_event_carries_preview_and_error() {
        let event = AnnotationEvent::new(3, CallStatus::Exception, 0.5)
            .with_preview("一共花了多少钱？")
            .with_error("connection refused");
        assert!(event.fallback_used);
        assert_eq!(event.status.level(), Level::ERROR);

        let line = serde_json::to_string(&event).unwrap();
        let back: AnnotationEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(back.prompt_preview.as_deref(), Some("一共花了多少钱？"));
        assert_eq!(back.error.as_deref(), Some("connection refused"));
        assert_eq!(back.status, CallStatus::Exception);
    }
}
