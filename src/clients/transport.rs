//! HTTP 传输层
//!
//! 只负责把 JSON 请求体 POST 出去并把响应体解析成 JSON，
//! 不判断响应内容是否可用。

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// 发送补全请求的能力
///
/// 生产环境使用 [`HttpTransport`]，测试里替换成脚本化的实现。
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError>;
}

/// 基于 reqwest 的传输层，携带 Bearer 凭证
pub struct HttpTransport {
    http: reqwest::Client,
    authorization_key: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::RequestBuildFailed(e.to_string()))?;

        Ok(Self {
            http,
            authorization_key: config.authorization_key.clone(),
        })
    }
}

impl ChatTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        debug!("POST {}", url);

        // 非 2xx 的响应体同样按 JSON 解析，由上层判断是否缺少 choices
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.authorization_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(url, e))?;

        debug!("响应状态: {}", response.status());

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::DecodeFailed {
                endpoint: url.to_string(),
                message: e.to_string(),
            })
    }
}
