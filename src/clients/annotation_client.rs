//! 标注请求客户端
//!
//! 每次调用只发一个请求，失败时返回调用方给的兜底值，并写一条调用事件
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use serde_json::Value;
use tracing::debug;

use crate::clients::transport::ChatTransport;
use crate::config::{ApiConfig, ExecutionMode};
use crate::error::ApiError;
use crate::models::{AnnotationEvent, CallStatus};
use crate::utils::{tail_preview, to_spaced_json, LogReport, PREVIEW_CHARS};

/// 远端返回的两种可区分结果
enum Reply {
    /// 拿到补全文本（已 trim）
    Completion(String),
    /// 响应能解析但没有 choices
    Malformed(Value),
}

/// 标注客户端
pub struct AnnotationClient<T> {
    transport: T,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    /// 本实例发出的请求数，也是下一个请求编号的来源
    call_count: AtomicU64,
    /// 已完成调用的累计统计
    tally: Mutex<LogReport>,
}

impl<T: ChatTransport> AnnotationClient<T> {
    /// 创建新的标注客户端，请求地址由执行模式决定
    pub fn new(transport: T, api: &ApiConfig, mode: ExecutionMode) -> Self {
        Self {
            transport,
            endpoint: api.endpoint_for(mode),
            model: api.model.clone(),
            temperature: api.temperature,
            max_tokens: api.max_tokens,
            call_count: AtomicU64::new(0),
            tally: Mutex::new(LogReport::default()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// 到目前为止的调用统计
    pub fn report(&self) -> LogReport {
        self.tally
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 构建 `{model, messages, temperature, max_tokens}` 请求体
    pub fn build_request(&self, instruction: &str) -> Result<Value, ApiError> {
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(instruction)
            .build()
            .map_err(|e| ApiError::RequestBuildFailed(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| ApiError::RequestBuildFailed(e.to_string()))?;

        serde_json::to_value(&request).map_err(|e| ApiError::RequestBuildFailed(e.to_string()))
    }

    /// 发送一次标注请求
    ///
    /// 不会返回错误：成功时返回补全文本，其余情况返回 `fallback`。
    /// 无论结果如何都会写且只写一条事件。
    pub async fn call(&self, instruction: &str, fallback: Option<String>) -> Option<String> {
        let (event, result) = self.attempt(instruction, fallback).await;

        event.emit();
        self.tally
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record(&event);

        result
    }

    /// 编号、计时、发送并把结果归类成事件
    async fn attempt(
        &self,
        instruction: &str,
        fallback: Option<String>,
    ) -> (AnnotationEvent, Option<String>) {
        let request_id = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        let start = Instant::now();

        let outcome = match self.build_request(instruction) {
            Ok(body) => self
                .transport
                .post_json(&self.endpoint, &body)
                .await
                .and_then(extract_reply),
            Err(e) => Err(e),
        };
        let elapsed = round_secs(start.elapsed().as_secs_f64());

        match outcome {
            Ok(Reply::Completion(text)) => {
                debug!("请求 #{} 成功，耗时 {}s", request_id, elapsed);
                (
                    AnnotationEvent::new(request_id, CallStatus::Success, elapsed),
                    Some(text),
                )
            }
            Ok(Reply::Malformed(response)) => {
                let serialized = to_spaced_json(&response).unwrap_or_default();
                (
                    AnnotationEvent::new(request_id, CallStatus::BadResponse, elapsed)
                        .with_preview(tail_preview(&serialized, PREVIEW_CHARS)),
                    fallback,
                )
            }
            Err(e) => (
                AnnotationEvent::new(request_id, CallStatus::Exception, elapsed)
                    .with_preview(tail_preview(instruction, PREVIEW_CHARS))
                    .with_error(e.to_string()),
                fallback,
            ),
        }
    }
}

/// 有 choices 才算结构正确；有 choices 却取不到文本按异常处理
fn extract_reply(response: Value) -> Result<Reply, ApiError> {
    let Some(choices) = response.get("choices") else {
        return Ok(Reply::Malformed(response));
    };

    choices
        .get(0)
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(|content| Reply::Completion(content.trim().to_string()))
        .ok_or_else(|| ApiError::MissingContent(tail_preview(&choices.to_string(), PREVIEW_CHARS)))
}

/// 秒数保留三位小数
fn round_secs(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}
