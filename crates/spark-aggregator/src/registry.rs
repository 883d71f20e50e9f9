//! # registry 模块说明
//!
//! ## 角色定位（Why）
//! - 把“在上下文的某个句柄处挂一个类型为 `T` 的收集器”与“按句柄与类型取回它”收敛到同一处，
//!   所有上下文级操作都经由 [`resolve`] 完成类型恢复；
//! - 注册配置以 [`Registration`] 构建器表达，八个具名注册函数只是它的薄封装。
//!
//! ## 核心逻辑（How）
//! - 注册：依据模式、容量提示、回调三项选择收集器变体，包装为 [`Collector<T>`] 后派生新上下文；
//! - 解析：按句柄查找可见绑定，再以 `T` 做一次受检向下转型；失败分别报告 `NotFound` 与
//!   `TypeMismatch`，并附带双方的类型名。
//!
//! ## 契约说明（What）
//! - 注册从不修改传入的上下文，返回值才携带新绑定；
//! - 同一句柄再次注册会遮蔽旧绑定，旧上下文值仍看到旧收集器；
//! - 容量提示只影响预分配，超过提示后照常增长。

use std::sync::Arc;

use crate::aggregator::{
    Aggregator, AggregatorKind, CollectCallback, ConcurrentAggregator,
    ConcurrentStreamingAggregator, SequentialAggregator, StreamingAggregator,
};
use crate::collector::Collector;
use crate::context::CallContext;
use crate::error::{AggregatorError, Result};
use crate::key::CollectorKey;

/// 存储的同步模式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AggregationMode {
    /// 按调用顺序追加，不带未完成工作协调器。
    #[default]
    Sequential,
    /// 互斥锁保护存储，并附带协调器供 `begin_wait` 使用。
    Concurrent,
}

/// 收集器注册配置。
///
/// # 教案式说明
/// - **意图 (Why)**：四种变体 × 是否带容量提示共八种组合，用构建器表达比逐一列举参数更不易出错；
/// - **契约 (What)**：未设置容量提示时按默认方式分配；设置回调即得到流式变体；
///   [`register`](Self::register) 消费构建器并返回派生上下文。
///
/// ```
/// use spark_aggregator::{CallContext, Registration, retrieve, collect};
///
/// let ctx = Registration::<String>::concurrent()
///     .with_capacity(16)
///     .register(&CallContext::new(), &["audit"]);
/// collect(&ctx, "login".to_owned(), &["audit"])?;
/// assert_eq!(retrieve::<String>(&ctx, &["audit"])?, vec!["login"]);
/// # Ok::<(), spark_aggregator::AggregatorError>(())
/// ```
pub struct Registration<T> {
    mode: AggregationMode,
    capacity: Option<usize>,
    callback: Option<CollectCallback<T>>,
}

impl<T> Registration<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            capacity: None,
            callback: None,
        }
    }

    pub fn sequential() -> Self {
        Self::new(AggregationMode::Sequential)
    }

    pub fn concurrent() -> Self {
        Self::new(AggregationMode::Concurrent)
    }

    /// 预留 `capacity` 个元素的存储空间。
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// 为每次写入挂接同步回调，得到流式变体。
    pub fn with_callback<F>(self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.with_shared_callback(Arc::new(callback))
    }

    /// 与 [`with_callback`](Self::with_callback) 相同，但复用已共享的回调。
    pub fn with_shared_callback(mut self, callback: CollectCallback<T>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// 按当前配置将得到的变体。
    pub fn kind(&self) -> AggregatorKind {
        match (self.mode, self.callback.is_some()) {
            (AggregationMode::Sequential, false) => AggregatorKind::Sequential,
            (AggregationMode::Sequential, true) => AggregatorKind::Streaming,
            (AggregationMode::Concurrent, false) => AggregatorKind::Concurrent,
            (AggregationMode::Concurrent, true) => AggregatorKind::ConcurrentStreaming,
        }
    }

    /// 在 `disambiguators` 对应的句柄处注册收集器，返回派生上下文。
    pub fn register(self, ctx: &CallContext, disambiguators: &[&str]) -> CallContext {
        let key = CollectorKey::new(disambiguators);
        tracing::debug!(
            key = %key,
            variant = %self.kind(),
            element = core::any::type_name::<T>(),
            capacity = self.capacity,
            "aggregator registered"
        );
        let aggregator = self.build(&key);
        ctx.bind(Collector::new(key, aggregator))
    }

    fn build(self, key: &CollectorKey) -> Arc<dyn Aggregator<T>> {
        let Self {
            mode,
            capacity,
            callback,
        } = self;
        let key = key.clone();
        match (mode, callback) {
            (AggregationMode::Sequential, None) => Arc::new(match capacity {
                Some(capacity) => SequentialAggregator::with_capacity(capacity),
                None => SequentialAggregator::new(),
            }),
            (AggregationMode::Concurrent, None) => Arc::new(match capacity {
                Some(capacity) => ConcurrentAggregator::with_capacity(capacity),
                None => ConcurrentAggregator::new(),
            }),
            (AggregationMode::Sequential, Some(callback)) => Arc::new(match capacity {
                Some(capacity) => StreamingAggregator::with_capacity(key, capacity, callback),
                None => StreamingAggregator::new(key, callback),
            }),
            (AggregationMode::Concurrent, Some(callback)) => Arc::new(match capacity {
                Some(capacity) => {
                    ConcurrentStreamingAggregator::with_capacity(key, capacity, callback)
                }
                None => ConcurrentStreamingAggregator::new(key, callback),
            }),
        }
    }
}

impl<T> Default for Registration<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::sequential()
    }
}

/// 注册顺序收集器。
pub fn register<T>(ctx: &CallContext, disambiguators: &[&str]) -> CallContext
where
    T: Send + Sync + 'static,
{
    Registration::<T>::sequential().register(ctx, disambiguators)
}

/// 注册带容量提示的顺序收集器。
pub fn register_with_capacity<T>(
    ctx: &CallContext,
    capacity: usize,
    disambiguators: &[&str],
) -> CallContext
where
    T: Send + Sync + 'static,
{
    Registration::<T>::sequential()
        .with_capacity(capacity)
        .register(ctx, disambiguators)
}

/// 注册流式顺序收集器。
pub fn register_streaming<T, F>(ctx: &CallContext, callback: F, disambiguators: &[&str]) -> CallContext
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    Registration::<T>::sequential()
        .with_callback(callback)
        .register(ctx, disambiguators)
}

/// 注册带容量提示的流式顺序收集器。
pub fn register_streaming_with_capacity<T, F>(
    ctx: &CallContext,
    capacity: usize,
    callback: F,
    disambiguators: &[&str],
) -> CallContext
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    Registration::<T>::sequential()
        .with_capacity(capacity)
        .with_callback(callback)
        .register(ctx, disambiguators)
}

/// 注册并发收集器。
pub fn register_concurrent<T>(ctx: &CallContext, disambiguators: &[&str]) -> CallContext
where
    T: Send + Sync + 'static,
{
    Registration::<T>::concurrent().register(ctx, disambiguators)
}

/// 注册带容量提示的并发收集器。
pub fn register_concurrent_with_capacity<T>(
    ctx: &CallContext,
    capacity: usize,
    disambiguators: &[&str],
) -> CallContext
where
    T: Send + Sync + 'static,
{
    Registration::<T>::concurrent()
        .with_capacity(capacity)
        .register(ctx, disambiguators)
}

/// 注册流式并发收集器。回调持锁执行，不得在回调内写入同一收集器。
pub fn register_concurrent_streaming<T, F>(
    ctx: &CallContext,
    callback: F,
    disambiguators: &[&str],
) -> CallContext
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    Registration::<T>::concurrent()
        .with_callback(callback)
        .register(ctx, disambiguators)
}

/// 注册带容量提示的流式并发收集器。
pub fn register_concurrent_streaming_with_capacity<T, F>(
    ctx: &CallContext,
    capacity: usize,
    callback: F,
    disambiguators: &[&str],
) -> CallContext
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    Registration::<T>::concurrent()
        .with_capacity(capacity)
        .with_callback(callback)
        .register(ctx, disambiguators)
}

/// 按句柄与元素类型解析收集器。
///
/// # 契约说明（What）
/// - 链中没有该句柄的可见绑定：[`AggregatorError::NotFound`]；
/// - 可见绑定的元素类型不是 `T`：[`AggregatorError::TypeMismatch`]，即使更早的被遮蔽绑定恰好是 `T`
///   也不会回退查找；
/// - 成功时返回与上下文共享存储的句柄。
pub fn resolve<T>(ctx: &CallContext, disambiguators: &[&str]) -> Result<Collector<T>>
where
    T: Send + Sync + 'static,
{
    let key = CollectorKey::new(disambiguators);
    let outcome = match ctx.lookup(&key) {
        None => Err(AggregatorError::NotFound { key: key.render() }),
        Some(binding) => match binding.downcast::<T>() {
            Some(collector) => Ok(collector.clone()),
            None => Err(AggregatorError::TypeMismatch {
                key: key.render(),
                expected: core::any::type_name::<T>(),
                registered: binding.element(),
            }),
        },
    };
    if let Err(error) = &outcome {
        tracing::debug!(key = %key, code = error.code(), "aggregator resolution failed");
    }
    outcome
}
