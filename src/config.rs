//! 流水线配置
//!
//! 配置来自 TOML 文件，部分字段可以再被环境变量覆盖。

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

/// 程序配置文件
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub prompt_labels: PromptLabels,
    pub processing_mode: ProcessingConfig,
    pub logging: LoggingConfig,
    pub data_path: DataPathConfig,
    pub standard_fields: StandardFields,
}

/// 远端补全接口配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bearer 凭证
    pub authorization_key: String,
    /// 异步模式直接 POST 的完整 URL
    pub url_async: String,
    /// 同步模式使用的 OpenAI 风格 base URL
    pub url_sync: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// 单次请求超时（秒），不设置则一直等待
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            authorization_key: String::new(),
            url_async: "https://api.openai.com/v1/chat/completions".to_string(),
            url_sync: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 300,
            temperature: 0.0,
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// 按执行模式选择请求地址
    ///
    /// 同步模式的地址是 base URL，需要补上 `/chat/completions`
    pub fn endpoint_for(&self, mode: ExecutionMode) -> String {
        match mode {
            ExecutionMode::Async => self.url_async.clone(),
            ExecutionMode::Sync => {
                format!("{}/chat/completions", self.url_sync.trim_end_matches('/'))
            }
        }
    }
}

/// 分类与知识点的候选标签
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PromptLabels {
    pub problem_categories: Vec<String>,
    pub knowledge_tags: Vec<String>,
}

/// 执行模式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// 顺序执行，一次只有一个请求
    #[default]
    Sync,
    /// 并发执行，受信号量限制
    Async,
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" | "1" => Ok(ExecutionMode::Sync),
            "async" | "2" => Ok(ExecutionMode::Async),
            other => Err(format!("未知的执行模式: {}", other)),
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sync => write!(f, "sync"),
            ExecutionMode::Async => write!(f, "async"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub mode: ExecutionMode,
    /// 异步模式下同时等待响应的请求上限
    pub max_concurrent_requests: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sync,
            max_concurrent_requests: 8,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: String,
    /// 日志文件名（不带扩展名）
    pub log_name: String,
    /// 单个日志文件上限（MB）
    pub max_mb: u64,
    pub backup_count: usize,
    /// 是否同时输出到控制台
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            log_name: "pipeline".to_string(),
            max_mb: 50,
            backup_count: 5,
            console: true,
        }
    }
}

/// 一个源数据文件及其来源标记
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SourceFile {
    pub file: String,
    pub source: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DataPathConfig {
    pub source_folder: String,
    pub sources: Vec<SourceFile>,
    pub data_output: String,
}

impl Default for DataPathConfig {
    fn default() -> Self {
        Self {
            source_folder: "data".to_string(),
            sources: Vec::new(),
            data_output: "output/benchmark.json".to_string(),
        }
    }
}

/// 标准字段与别名
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StandardFields {
    /// 输出记录保留的字段及顺序
    pub target_fields: Vec<String>,
    /// 源字段名 → 标准字段名
    pub field_aliases: BTreeMap<String, String>,
}

impl Default for StandardFields {
    fn default() -> Self {
        Self {
            target_fields: ["id", "zh_text", "equation", "ans", "source"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            field_aliases: BTreeMap::new(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载配置
    ///
    /// 依次应用文件、环境变量与命令行指定的执行模式，全部覆盖完成后统一校验一次。
    pub fn load(path: impl AsRef<Path>, mode: Option<ExecutionMode>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(ConfigError::ParseFailed { source, .. }) => {
                AppError::Config(ConfigError::ParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })?;

        let mut config = config.with_env_overrides()?;
        if let Some(mode) = mode {
            config = config.with_mode(mode);
        }
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文本解析配置（不读环境变量，不校验）
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config = toml::from_str(content).map_err(|source| ConfigError::ParseFailed {
            path: String::new(),
            source,
        })?;
        Ok(config)
    }

    /// 环境变量覆盖
    pub fn with_env_overrides(mut self) -> AppResult<Self> {
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            self.api.authorization_key = key;
        }
        if let Ok(model) = std::env::var("LLM_MODEL_NAME") {
            self.api.model = model;
        }
        if let Ok(mode) = std::env::var("PROCESSING_MODE") {
            self.processing_mode.mode =
                mode.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: "PROCESSING_MODE".to_string(),
                    value: mode.clone(),
                    expected_type: "sync | async".to_string(),
                })?;
        }
        if let Ok(limit) = std::env::var("MAX_CONCURRENT_REQUESTS") {
            self.processing_mode.max_concurrent_requests =
                limit.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: "MAX_CONCURRENT_REQUESTS".to_string(),
                    value: limit.clone(),
                    expected_type: "usize".to_string(),
                })?;
        }
        Ok(self)
    }

    /// 命令行指定的执行模式优先于配置文件和环境变量
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.processing_mode.mode = mode;
        self
    }

    /// 检查最终生效的配置
    pub fn validate(&self) -> AppResult<()> {
        if self.processing_mode.max_concurrent_requests == 0 {
            return Err(AppError::invalid_config(
                "processing_mode.max_concurrent_requests",
                "必须大于 0",
            ));
        }
        if !self.standard_fields.target_fields.iter().any(|f| f == "zh_text") {
            return Err(AppError::invalid_config(
                "standard_fields.target_fields",
                "必须包含 zh_text",
            ));
        }
        let endpoint = match self.processing_mode.mode {
            ExecutionMode::Async => &self.api.url_async,
            ExecutionMode::Sync => &self.api.url_sync,
        };
        if endpoint.trim().is_empty() {
            return Err(AppError::invalid_config(
                "api",
                format!("{} 模式的请求地址为空", self.processing_mode.mode),
            ));
        }
        Ok(())
    }
}
