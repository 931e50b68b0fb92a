use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 远端 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 数据处理错误
    #[error("数据错误: {0}")]
    Data(#[from] DataError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置项取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 既不是 {head, body} 也不是数组的数据文件
    #[error("未识别的数据结构: {path}")]
    UnrecognizedLayout { path: String },
}

/// 远端 API 调用错误
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 请求体构建失败
    #[error("请求体构建失败: {0}")]
    RequestBuildFailed(String),
    /// 网络请求失败（连接、超时等）
    #[error("API请求失败 ({endpoint}): {message}")]
    RequestFailed { endpoint: String, message: String },
    /// 响应体不是合法 JSON
    #[error("响应解析失败 ({endpoint}): {message}")]
    DecodeFailed { endpoint: String, message: String },
    /// 有 choices 字段但取不到补全文本
    #[error("响应中缺少补全内容: {0}")]
    MissingContent(String),
}

/// 数据处理错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 方程求值失败
    #[error("表达式求值失败 ({expression}): {reason}")]
    EquationFailed { expression: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建配置项不合法错误
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

impl ApiError {
    /// 把 reqwest 的发送错误归类为请求失败
    pub fn request_failed(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
