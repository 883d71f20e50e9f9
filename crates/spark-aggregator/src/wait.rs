use core::fmt;
use std::sync::Arc;

use crate::sync::{self, Condvar, Mutex};

/// 未完成工作计数器，为并发收集器提供“先等待、再加锁”的汇总屏障。
///
/// # 设计背景（Why）
/// - 编排方在派发生产者之前登记一次“稍后会写入”，`retrieve` 据此阻塞到所有登记者完成；
/// - 计数器使用独立的锁与条件变量，与收集器保护 `items` 的互斥锁完全解耦：等待方从不持有
///   `items` 锁，生产者的 `collect` 因而总能完成并随后递减计数。
///
/// # 契约说明（What）
/// - [`add`](Self::add) 必须由编排方在生产者启动**之前**调用，否则 `wait` 可能先观察到零而提前返回；
/// - [`done`](Self::done) 由生产者在最后一次写入之后调用；计数降到零时唤醒全部等待者；
/// - 计数为零时 [`wait`](Self::wait) 立即返回，未使用该协调器的调用方不承担任何同步成本；
/// - 计数低于零属于契约违约，`done` 直接 panic。
///
/// # 风险提示（Trade-offs）
/// - `wait` 没有超时也不可取消；需要截止时间的宿主应在自己的取消信号与 `wait` 之间自行竞速。
pub struct WaitGroup {
    outstanding: Mutex<usize>,
    drained: Condvar,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self {
            outstanding: Mutex::new(0),
            drained: Condvar::new(),
        }
    }

    /// 登记一个尚未完成的生产者。
    pub fn add(&self) {
        let mut outstanding = sync::lock(&self.outstanding);
        *outstanding += 1;
        tracing::trace!(outstanding = *outstanding, "aggregator wait announced");
    }

    /// 标记一个生产者完成。
    ///
    /// # Panics
    /// 计数已为零时调用即为契约违约。
    pub fn done(&self) {
        let mut outstanding = sync::lock(&self.outstanding);
        assert!(
            *outstanding > 0,
            "WaitGroup::done called without a matching add"
        );
        *outstanding -= 1;
        tracing::trace!(outstanding = *outstanding, "aggregator wait completed");
        if *outstanding == 0 {
            self.drained.notify_all();
        }
    }

    /// 阻塞到计数归零。
    pub fn wait(&self) {
        let outstanding = sync::lock(&self.outstanding);
        let _drained = sync::wait_while(&self.drained, outstanding, |count| *count > 0);
    }

    /// 当前未完成的生产者数量。
    pub fn outstanding(&self) -> usize {
        *sync::lock(&self.outstanding)
    }
}

impl fmt::Debug for WaitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitGroup").finish_non_exhaustive()
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// `begin_wait` 返回的完成凭证。
///
/// # 教案式说明
/// - **意图 (Why)**：把“完成函数必须恰好调用一次”交给所有权系统保证：凭证只能被消费一次，
///   并且在任何退出路径（正常返回、`?` 提前返回、panic 展开）上都会经由 `Drop` 完成。
/// - **契约 (What)**：
///   - 持有协调器的凭证在创建时已完成一次 `add`，在 [`complete`](Self::complete) 或析构时执行 `done`；
///   - 惰性凭证（句柄不存在或变体不带协调器）完成时什么也不做；
///   - 凭证可跨线程移动，通常随生产者任务一起 `move` 进去。
#[must_use = "dropping the guard immediately completes the announced work"]
#[derive(Debug)]
pub struct WaitGuard {
    group: Option<Arc<WaitGroup>>,
}

impl WaitGuard {
    /// 在 `group` 上登记一次未完成工作，并返回对应的完成凭证。
    pub(crate) fn announce(group: Arc<WaitGroup>) -> Self {
        group.add();
        Self { group: Some(group) }
    }

    /// 不关联任何协调器的凭证。
    pub fn inert() -> Self {
        Self { group: None }
    }

    /// 凭证是否真正登记了未完成工作。
    pub fn is_armed(&self) -> bool {
        self.group.is_some()
    }

    /// 显式完成，等价于立即析构。
    pub fn complete(self) {
        drop(self);
    }
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        if let Some(group) = self.group.take() {
            group.done();
        }
    }
}
