//! 调用日志统计
//!
//! 客户端边调用边累加计数，`analyze-log` 则读取日志文件里的 JSON 行。

use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{AnnotationEvent, CallStatus};

/// 超过这个耗时（秒）算慢请求
pub const SLOW_THRESHOLD_SECS: f64 = 5.0;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogReport {
    pub total: usize,
    pub success: usize,
    pub bad_response: usize,
    pub exception: usize,
    pub fallback: usize,
    pub slow: usize,
    /// 成功请求的平均耗时（秒）
    pub avg_success_secs: f64,
    success_secs: f64,
}

impl LogReport {
    /// 计入一条事件
    pub fn record(&mut self, event: &AnnotationEvent) {
        self.total += 1;
        match event.status {
            CallStatus::Success => {
                self.success += 1;
                self.success_secs += event.elapsed_time;
                self.avg_success_secs = self.success_secs / self.success as f64;
            }
            CallStatus::BadResponse => self.bad_response += 1,
            CallStatus::Exception => self.exception += 1,
        }
        if event.fallback_used {
            self.fallback += 1;
        }
        if event.elapsed_time > SLOW_THRESHOLD_SECS {
            self.slow += 1;
        }
    }

    /// 解析日志文本，只看以 `{` 开头的 api_call 事件行
    pub fn from_log_text(text: &str) -> Self {
        text.lines()
            .filter(|line| line.starts_with('{'))
            .filter_map(|line| serde_json::from_str::<AnnotationEvent>(line).ok())
            .filter(|event| event.event == AnnotationEvent::NAME)
            .fold(LogReport::default(), |mut report, event| {
                report.record(&event);
                report
            })
    }

    pub fn from_log_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取日志文件: {}", path.display()))?;
        Ok(Self::from_log_text(&text))
    }

    fn ratio(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// 多行的可读汇总
    pub fn render(&self) -> String {
        format!(
            "📊 总请求数: {}\n✅ 成功数: {} ({:.2}%)\n⚠️ 使用 fallback 数: {} ({:.2}%)\n🐢 慢请求（>{}s）数: {} ({:.2}%)\n⏱ 平均响应时间: {:.2} 秒",
            self.total,
            self.success,
            self.ratio(self.success),
            self.fallback,
            self.ratio(self.fallback),
            SLOW_THRESHOLD_SECS,
            self.slow,
            self.ratio(self.slow),
            self.avg_success_secs
        )
    }
}
