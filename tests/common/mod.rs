//! 集成测试共用的脚本化传输层

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use math_annotation_pipeline::config::{ApiConfig, PromptLabels};
use math_annotation_pipeline::error::ApiError;
use math_annotation_pipeline::services::PromptBuilder;
use math_annotation_pipeline::{
    AnnotationClient, AnnotationEvent, CallStrategy, ChatTransport, ExecutionMode, Governor,
    Record, RecordAnnotator,
};
use serde_json::{json, Value};

pub type Responder = fn(&str) -> Result<Value, ApiError>;

/// 按提示词内容返回固定响应，并记录在途请求数的峰值
pub struct ScriptedTransport {
    responder: Responder,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(responder: Responder) -> Self {
        Self {
            responder,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChatTransport for ScriptedTransport {
    async fn post_json(&self, _url: &str, body: &Value) -> Result<Value, ApiError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
        // 不同提示词等待不同时长，让并发模式下的完成顺序与提交顺序不同
        let delay = 1 + (prompt.chars().count() % 5) as u64;
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let reply = (self.responder)(prompt);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}

pub fn completion(text: &str) -> Value {
    json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]})
}

pub const SKIRTS: &str = "妈妈买了3条裙子，每条裙子48元，一共花了多少钱？";
pub const PENCILS: &str = "铅笔盒里有35枝铅笔，分给7个同学，每人分到几枝？";
pub const TRIP: &str = "甲乙两地相距300千米，一辆汽车每小时行60千米，几小时到达？";
pub const PROJECT: &str = "一项工程甲队单独做10天完成，乙队单独做15天完成，合作几天完成？";
/// 含这个词的题目会让传输层报错
pub const BROKEN: &str = "这道题触发网络故障，一共有多少人？";
/// 含这个词的题目会得到没有 choices 的响应
pub const THROTTLED: &str = "这道题被限流了，一共有多少本书？";

pub const TEXTS: [&str; 4] = [SKIRTS, PENCILS, TRIP, PROJECT];

/// 按题干与标注种类给出响应
pub fn scripted_reply(prompt: &str) -> Result<Value, ApiError> {
    if prompt.contains(BROKEN) {
        return Err(ApiError::request_failed("http://mock", "connection reset by peer"));
    }
    if prompt.contains(THROTTLED) {
        return Ok(json!({"error": {"message": "rate limited", "code": 429}}));
    }

    let index = TEXTS.iter().position(|t| prompt.contains(t)).unwrap_or(0);

    let text = if prompt.contains("[type_1, type_2, type_3]") {
        format!("type_{}", index % 3 + 1)
    } else if prompt.contains("翻译成英文") {
        format!("Translation of problem #{}", index + 1)
    } else if prompt.contains("数量关系抽取器") {
        match index {
            1 => r#"数量关系: {"铅笔有35枝":"总数=35"}"#.to_string(),
            3 => "甲队效率=1/10\n乙队效率=1/15".to_string(),
            _ => "\"总价\":\"3 * 48\",".to_string(),
        }
    } else if prompt.contains("问题分类") {
        match index {
            2 => "**输出**：[“行程类”]".to_string(),
            3 => "工程类、其他".to_string(),
            _ => r#"["价格类"]"#.to_string(),
        }
    } else if prompt.contains("知识点标签") {
        r#"["乘法", "人民币计算"]"#.to_string()
    } else {
        String::new()
    };
    Ok(completion(&text))
}

pub fn labels() -> PromptLabels {
    PromptLabels {
        problem_categories: vec!["行程类".into(), "工程类".into(), "价格类".into()],
        knowledge_tags: vec!["乘法".into(), "除法".into(), "人民币计算".into()],
    }
}

pub fn api_config() -> ApiConfig {
    ApiConfig {
        authorization_key: "sk-test".into(),
        url_async: "http://mock/v1/chat/completions".into(),
        url_sync: "http://mock/v1".into(),
        model: "mock-model".into(),
        ..ApiConfig::default()
    }
}

pub fn annotator(
    mode: ExecutionMode,
    limit: usize,
    responder: Responder,
) -> RecordAnnotator<ScriptedTransport> {
    let client = AnnotationClient::new(ScriptedTransport::new(responder), &api_config(), mode);
    let strategy = match mode {
        ExecutionMode::Sync => CallStrategy::Sequential,
        ExecutionMode::Async => CallStrategy::Governed(Governor::new(limit)),
    };
    RecordAnnotator::new(client, PromptBuilder::new(&labels()), strategy)
}

pub fn records(texts: &[&str]) -> Vec<Record> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Record::new(i + 1, *text, "mock").with_equation("x=1+1", "2"))
        .collect()
}

/// 收集当前线程上 tracing 输出的文本
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// 在返回的 guard 存活期间，当前线程的日志都写到这里
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// 所有 api_call 事件行，附带该行的日志级别
    pub fn api_calls(&self) -> Vec<(String, AnnotationEvent)> {
        self.text()
            .lines()
            .filter_map(|line| {
                let (level, rest) = line.trim_start().split_once(' ')?;
                let json = rest.trim_start().strip_prefix("api_call: ")?;
                let event = serde_json::from_str(json).ok()?;
                Some((level.to_string(), event))
            })
            .collect()
    }
}
