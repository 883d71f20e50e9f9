//! 锁与条件变量的编译期切换层。
//!
//! - 常规构建使用 `parking_lot`：无中毒语义，未竞争时加锁仅一次原子操作；
//! - 启用 `loom-model` 并以 `--cfg loom` 编译时切换到 Loom 实现，使模型检查能够穷举
//!   `WaitGroup` 与收集器互斥锁之间的全部调度交错。
//!
//! 对外只暴露 [`Mutex`]、[`Condvar`] 以及 [`lock`]、[`wait_while`] 两个函数，
//! 两套实现的 API 差异（`LockResult`、按值/按引用传递 guard）全部在此吸收。

#[cfg(not(all(feature = "loom-model", any(loom, spark_loom))))]
mod imp {
    pub(crate) use parking_lot::{Condvar, Mutex, MutexGuard};

    pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock()
    }

    pub(crate) fn wait_while<'a, T, F>(
        condvar: &Condvar,
        mut guard: MutexGuard<'a, T>,
        condition: F,
    ) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        condvar.wait_while(&mut guard, condition);
        guard
    }
}

#[cfg(all(feature = "loom-model", any(loom, spark_loom)))]
mod imp {
    use std::sync::PoisonError;

    pub(crate) use loom::sync::{Condvar, Mutex, MutexGuard};

    pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait_while<'a, T, F>(
        condvar: &Condvar,
        mut guard: MutexGuard<'a, T>,
        mut condition: F,
    ) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut guard) {
            guard = condvar.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
        guard
    }
}

pub(crate) use imp::{Condvar, Mutex, lock, wait_while};
