//! # Math Annotation Pipeline
//!
//! 批量标注数学文字题的流水线
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 记录、标注种类、调用事件，以及源数据文件的读取
//!
//! ### ② 客户端层（Clients）
//! - `ChatTransport` - 把 JSON 请求体 POST 到补全接口
//! - `AnnotationClient` - 单次标注调用：失败返回兜底值，每次调用写一条事件
//!
//! ### ③ 能力层（Services）
//! - `Preprocessor` - 统一字段、去重、按长度筛选题目
//! - `PromptBuilder` - 五种标注的提示词
//! - `normalizer` - 把模型输出修成列表或映射
//! - `equation` - 方程求值与答案校对
//! - `Exporter` - 分词、编号并导出数据集
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/record_annotator` - 按执行模式调度标注请求
//! - `orchestrator/governor` - 并发上限
//! - `orchestrator/batch_processor` - 整条流水线
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{AnnotationClient, ChatTransport, HttpTransport};
pub use config::{Config, ExecutionMode};
pub use error::{AppError, AppResult};
pub use models::{AnnotationEvent, AnnotationKind, CallStatus, FieldValue, Record};
pub use orchestrator::{App, CallStrategy, Governor, RecordAnnotator};
