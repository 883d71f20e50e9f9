use std::sync::Arc;

use crate::sync::{self, Mutex};
use crate::wait::WaitGroup;

use super::{Aggregator, AggregatorKind};

/// 并发收集器：互斥锁保护存储，附带独立的未完成工作协调器。
///
/// # 教案式说明
/// - **意图 (Why)**：允许任意多个线程同时 `collect`，并让汇总方在编排方登记过的生产者全部完成后
///   才拿到快照。
/// - **逻辑 (How)**：
///   - `collect`：加锁、追加、解锁，临界区有界，从不等待协调器；
///   - `retrieve`：**先**在 [`WaitGroup`] 上阻塞到计数归零，**再**获取 `items` 锁复制快照。
///     若顺序颠倒，汇总方持锁等待，而生产者的 `collect` 需要同一把锁才能返回、才能随后完成登记，
///     两者互相等待形成死锁。“先等待、后加锁”是本类型必须保持的核心不变量。
/// - **契约 (What)**：
///   - 未登记任何等待时 `retrieve` 立即进行；
///   - 并发写入之间的先后顺序即加锁顺序，不作保证。
pub struct ConcurrentAggregator<T> {
    items: Mutex<Vec<T>>,
    pending: Arc<WaitGroup>,
}

impl<T> ConcurrentAggregator<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// 预留 `capacity` 个元素的空间；超出后照常增长。
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_vec(Vec::with_capacity(capacity))
    }

    fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items),
            pending: Arc::new(WaitGroup::new()),
        }
    }

    /// 在持有存储锁的情况下先调用 `before_store`，然后追加元素。
    ///
    /// 供流式变体在同一临界区内触发回调，使回调观察到串行化的写入序列。
    pub(crate) fn collect_with<F>(&self, item: T, before_store: F)
    where
        F: FnOnce(&T),
    {
        let mut items = sync::lock(&self.items);
        before_store(&item);
        items.push(item);
    }
}

impl<T> Default for ConcurrentAggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Aggregator<T> for ConcurrentAggregator<T>
where
    T: Send,
{
    fn collect(&self, item: T) {
        sync::lock(&self.items).push(item);
    }

    fn retrieve(&self) -> Vec<T>
    where
        T: Clone,
    {
        // 先等待，后加锁；顺序不可交换。
        self.pending.wait();
        sync::lock(&self.items).clone()
    }

    fn len(&self) -> usize {
        sync::lock(&self.items).len()
    }

    fn kind(&self) -> AggregatorKind {
        AggregatorKind::Concurrent
    }

    fn wait_group(&self) -> Option<&Arc<WaitGroup>> {
        Some(&self.pending)
    }
}
