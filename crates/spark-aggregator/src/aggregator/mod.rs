//! 收集器能力契约与四种实现变体。
//!
//! # 教案级导览
//! - **Why**：上下文中的每个句柄背后都是一个 [`Aggregator<T>`] 对象。调用方只关心“追加”与“取快照”
//!   两种能力，至于是否加锁、是否带等待屏障、是否伴随回调，由注册时选择的变体决定。
//! - **How**：
//!   - [`SequentialAggregator`]：按调用顺序追加，不带未完成工作协调器；
//!   - [`ConcurrentAggregator`]：互斥锁保护存储，附带 [`WaitGroup`]，`retrieve` 先等待后加锁；
//!   - [`StreamingAggregator`] / [`ConcurrentStreamingAggregator`]：分别装饰上面两者，在每次
//!     `collect` 时同步触发回调，回调 panic 在调用点被吞掉后照常写入。
//! - **What**：所有变体都只追加不覆盖；`retrieve` 返回与后续写入无关的独立快照。

mod concurrent;
mod sequential;
mod streaming;

pub use concurrent::ConcurrentAggregator;
pub use sequential::SequentialAggregator;
pub use streaming::{CollectCallback, ConcurrentStreamingAggregator, StreamingAggregator};

use core::fmt;
use std::sync::Arc;

use crate::wait::WaitGroup;

/// 注册时选定的收集器变体。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregatorKind {
    Sequential,
    Concurrent,
    Streaming,
    ConcurrentStreaming,
}

impl AggregatorKind {
    /// 是否携带未完成工作协调器。
    pub fn is_concurrent(self) -> bool {
        matches!(
            self,
            AggregatorKind::Concurrent | AggregatorKind::ConcurrentStreaming
        )
    }

    /// 是否在写入时触发回调。
    pub fn is_streaming(self) -> bool {
        matches!(
            self,
            AggregatorKind::Streaming | AggregatorKind::ConcurrentStreaming
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregatorKind::Sequential => "sequential",
            AggregatorKind::Concurrent => "concurrent",
            AggregatorKind::Streaming => "streaming",
            AggregatorKind::ConcurrentStreaming => "concurrent_streaming",
        }
    }
}

impl fmt::Display for AggregatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 收集器能力契约：`Collect` 与 `Retrieve`。
///
/// # 契约说明（What）
/// - [`collect`](Self::collect) 永远追加，不覆盖、不丢弃；
/// - [`retrieve`](Self::retrieve) 返回调用时刻的独立快照，后续写入不会反映到已返回的 `Vec` 中；
///   带协调器的变体在取快照前先阻塞到未完成工作归零；
/// - [`wait_group`](Self::wait_group) 仅并发变体返回 `Some`，供 `begin_wait` 在类型擦除后定位协调器。
///
/// # 风险提示（Trade-offs）
/// - 顺序变体同样以锁保护存储（上下文需跨线程共享），但不对并发写入的先后关系作任何承诺；
///   需要并发写入时应注册并发变体。
pub trait Aggregator<T>: Send + Sync {
    /// 追加一个元素。
    fn collect(&self, item: T);

    /// 获取当前全部元素的快照。
    fn retrieve(&self) -> Vec<T>
    where
        T: Clone;

    /// 已存储元素数量；不等待未完成工作。
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> AggregatorKind;

    fn wait_group(&self) -> Option<&Arc<WaitGroup>> {
        None
    }
}
