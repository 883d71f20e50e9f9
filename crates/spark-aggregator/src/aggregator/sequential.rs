use crate::sync::{self, Mutex};

use super::{Aggregator, AggregatorKind};

/// 顺序收集器：按调用顺序追加，快照保持插入顺序。
///
/// 存储由一把通常无竞争的锁保护，仅为满足 `Send + Sync`；它不附带未完成工作协调器，
/// 对 `begin_wait` 而言等同于不存在。
pub struct SequentialAggregator<T> {
    items: Mutex<Vec<T>>,
}

impl<T> SequentialAggregator<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// 预留 `capacity` 个元素的空间；超出后照常增长。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
        }
    }
}

impl<T> Default for SequentialAggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Aggregator<T> for SequentialAggregator<T>
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
        sync::lock(&self.items).clone()
    }

    fn len(&self) -> usize {
        sync::lock(&self.items).len()
    }

    fn kind(&self) -> AggregatorKind {
        AggregatorKind::Sequential
    }
}
