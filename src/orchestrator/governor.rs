//! 并发控制
//!
//! 同步模式逐条等待，天然只有一个请求在途；
//! 异步模式用信号量限制同时等待响应的请求数。

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::{ExecutionMode, ProcessingConfig};

/// 在途请求数上限
#[derive(Clone, Debug)]
pub struct Governor {
    permits: Arc<Semaphore>,
    limit: usize,
}

impl Governor {
    /// 上限至少为 1
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 持有一个许可运行 `fut`，完成后归还
    ///
    /// 只限制并发数，不改变调用方看到的结果顺序。
    pub async fn run<F: Future>(&self, fut: F) -> F::Output {
        // 信号量从不关闭，acquire 不会失败
        let _permit = self.permits.acquire().await.ok();
        fut.await
    }
}

/// 标注调用的调度方式
#[derive(Clone, Debug)]
pub enum CallStrategy {
    /// 逐条调用
    Sequential,
    /// 并发调用，由 [`Governor`] 限流
    Governed(Governor),
}

impl CallStrategy {
    pub fn from_config(config: &ProcessingConfig) -> Self {
        match config.mode {
            ExecutionMode::Sync => CallStrategy::Sequential,
            ExecutionMode::Async => {
                CallStrategy::Governed(Governor::new(config.max_concurrent_requests))
            }
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            CallStrategy::Sequential => ExecutionMode::Sync,
            CallStrategy::Governed(_) => ExecutionMode::Async,
        }
    }

    /// 同时在途请求数的上限
    pub fn concurrency(&self) -> usize {
        match self {
            CallStrategy::Sequential => 1,
            CallStrategy::Governed(governor) => governor.limit(),
        }
    }
}
