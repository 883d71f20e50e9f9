use core::fmt;
use std::sync::Arc;

use crate::aggregator::{Aggregator, AggregatorKind};
use crate::key::CollectorKey;
use crate::view;
use crate::wait::{WaitGroup, WaitGuard};

/// 从上下文解析出的强类型收集器句柄。
///
/// # 设计背景（Why）
/// - 上下文级操作每次都要按句柄查找并做类型检查；热路径上的生产者可以先 [`resolve`](crate::resolve)
///   一次，随后直接在句柄上 `collect`，省去重复解析；
/// - 句柄与上下文中登记的是同一个收集器对象，克隆只复制引用计数。
///
/// # 契约说明（What）
/// - 元素类型在编译期固定为 `T`，类型不符的情况已在解析时以 [`AggregatorError::TypeMismatch`]
///   报告，句柄上的操作不会再失败；
/// - 各方法的语义与上下文级同名函数一致。
///
/// [`AggregatorError::TypeMismatch`]: crate::AggregatorError::TypeMismatch
pub struct Collector<T> {
    key: CollectorKey,
    aggregator: Arc<dyn Aggregator<T>>,
}

impl<T> Collector<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn new(key: CollectorKey, aggregator: Arc<dyn Aggregator<T>>) -> Self {
        Self { key, aggregator }
    }

    pub fn key(&self) -> &CollectorKey {
        &self.key
    }

    pub fn kind(&self) -> AggregatorKind {
        self.aggregator.kind()
    }

    /// 追加一个元素；流式变体会先触发回调。
    pub fn collect(&self, item: T) {
        self.aggregator.collect(item);
    }

    /// 当前全部元素的独立快照；并发变体先等待未完成工作归零。
    pub fn retrieve(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.aggregator.retrieve()
    }

    /// 快照中满足 `predicate` 的元素，保持相对顺序。
    pub fn retrieve_filtered<P>(&self, predicate: P) -> Vec<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        view::filter(self.retrieve(), predicate)
    }

    /// 对快照逐个映射，长度与顺序不变。
    pub fn retrieve_transformed<R, F>(&self, map: F) -> Vec<R>
    where
        T: Clone,
        F: FnMut(T) -> R,
    {
        view::transform(self.retrieve(), map)
    }

    /// 先过滤再映射，单次遍历。
    pub fn retrieve_filtered_transformed<R, P, F>(&self, predicate: P, map: F) -> Vec<R>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
        F: FnMut(T) -> R,
    {
        view::filter_transform(self.retrieve(), predicate, map)
    }

    /// 登记一次未完成工作，返回对应的完成凭证。
    ///
    /// 不带协调器的变体返回惰性凭证。凭证必须在派发生产者**之前**获取。
    pub fn begin_wait(&self) -> WaitGuard {
        match self.wait_group() {
            Some(group) => WaitGuard::announce(Arc::clone(group)),
            None => WaitGuard::inert(),
        }
    }

    /// 已存储元素数量；不等待未完成工作。
    pub fn len(&self) -> usize {
        self.aggregator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregator.is_empty()
    }

    /// 尚未完成的登记数量；不带协调器的变体恒为零。
    pub fn outstanding(&self) -> usize {
        self.wait_group().map_or(0, |group| group.outstanding())
    }

    pub(crate) fn wait_group(&self) -> Option<&Arc<WaitGroup>> {
        self.aggregator.wait_group()
    }
}

impl<T> Clone for Collector<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            aggregator: Arc::clone(&self.aggregator),
        }
    }
}

impl<T> fmt::Debug for Collector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("key", &self.key)
            .field("kind", &self.aggregator.kind())
            .field("element", &core::any::type_name::<T>())
            .finish()
    }
}
