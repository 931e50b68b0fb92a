//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批处理入口
//! - 串起预处理、标注、校对、导出四个阶段
//! - 汇总调用统计
//!
//! ### `record_annotator` - 记录标注器
//! - 为每条记录渲染五种提示词并发起调用
//! - 按种类收集结果，整理后按列写回记录
//!
//! ### `governor` - 并发控制
//! - 同步模式逐条调用
//! - 异步模式用信号量限制在途请求数
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (整条流水线)
//!     ↓
//! record_annotator (一批记录 × 五种标注)
//!     ↓
//! governor → clients::AnnotationClient (单次调用)
//! ```

pub mod batch_processor;
pub mod governor;
pub mod record_annotator;

pub use batch_processor::{App, RunSummary};
pub use governor::{CallStrategy, Governor};
pub use record_annotator::RecordAnnotator;
