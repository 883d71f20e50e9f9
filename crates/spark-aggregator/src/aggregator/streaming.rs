use core::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::key::CollectorKey;
use crate::wait::WaitGroup;

use super::{Aggregator, AggregatorKind, ConcurrentAggregator, SequentialAggregator};

/// 每次写入时同步触发的回调。
pub type CollectCallback<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// 调用回调并吞掉其 panic。
///
/// # 契约说明（What）
/// - 回调在写入方自身的线程上同步执行；
/// - 回调 panic 被 `catch_unwind` 截获后仅记录一条 `warn` 日志，绝不传播给 `collect` 的调用方，
///   随后的存储照常进行；
/// - 以 `panic = "abort"` 编译时无法截获，进程将直接终止。
fn invoke_callback<T>(key: &CollectorKey, callback: &CollectCallback<T>, item: &T) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(item))) {
        tracing::warn!(
            key = %key,
            panic = panic_message(payload.as_ref()),
            "aggregator callback panicked; item is still stored"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// 流式顺序收集器：在 [`SequentialAggregator`] 之上为每次写入触发回调。
///
/// 执行顺序固定为“回调（吞掉 panic）→ 存储”。回调在存储锁之外执行，因此回调内部再次写入
/// 同一收集器是允许的。
pub struct StreamingAggregator<T> {
    key: CollectorKey,
    inner: SequentialAggregator<T>,
    callback: CollectCallback<T>,
}

impl<T> StreamingAggregator<T> {
    pub fn new(key: CollectorKey, callback: CollectCallback<T>) -> Self {
        Self::wrap(key, SequentialAggregator::new(), callback)
    }

    pub fn with_capacity(key: CollectorKey, capacity: usize, callback: CollectCallback<T>) -> Self {
        Self::wrap(key, SequentialAggregator::with_capacity(capacity), callback)
    }

    fn wrap(key: CollectorKey, inner: SequentialAggregator<T>, callback: CollectCallback<T>) -> Self {
        Self {
            key,
            inner,
            callback,
        }
    }
}

impl<T> Aggregator<T> for StreamingAggregator<T>
where
    T: Send,
{
    fn collect(&self, item: T) {
        invoke_callback(&self.key, &self.callback, &item);
        self.inner.collect(item);
    }

    fn retrieve(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.retrieve()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn kind(&self) -> AggregatorKind {
        AggregatorKind::Streaming
    }
}

/// 流式并发收集器：在 [`ConcurrentAggregator`] 之上为每次写入触发回调。
///
/// # 教案式说明
/// - **逻辑 (How)**：一次 `collect` 依次执行“加锁 → 回调（吞掉 panic）→ 追加 → 解锁”，
///   回调因此观察到一致且串行化的写入序列。
/// - **契约 (What)**：
///   - 回调持锁执行，**不得**在回调内对同一收集器再次 `collect`，否则自锁；
///   - `retrieve` 与 [`ConcurrentAggregator`] 相同，先等待未完成工作归零再取快照；
///   - 回调失败与存储成功是两项相互独立的保证。
pub struct ConcurrentStreamingAggregator<T> {
    key: CollectorKey,
    inner: ConcurrentAggregator<T>,
    callback: CollectCallback<T>,
}

impl<T> ConcurrentStreamingAggregator<T> {
    pub fn new(key: CollectorKey, callback: CollectCallback<T>) -> Self {
        Self::wrap(key, ConcurrentAggregator::new(), callback)
    }

    pub fn with_capacity(key: CollectorKey, capacity: usize, callback: CollectCallback<T>) -> Self {
        Self::wrap(key, ConcurrentAggregator::with_capacity(capacity), callback)
    }

    fn wrap(key: CollectorKey, inner: ConcurrentAggregator<T>, callback: CollectCallback<T>) -> Self {
        Self {
            key,
            inner,
            callback,
        }
    }
}

impl<T> Aggregator<T> for ConcurrentStreamingAggregator<T>
where
    T: Send,
{
    fn collect(&self, item: T) {
        self.inner
            .collect_with(item, |item| invoke_callback(&self.key, &self.callback, item));
    }

    fn retrieve(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.retrieve()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn kind(&self) -> AggregatorKind {
        AggregatorKind::ConcurrentStreaming
    }

    fn wait_group(&self) -> Option<&Arc<WaitGroup>> {
        self.inner.wait_group()
    }
}
