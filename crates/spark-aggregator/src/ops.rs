//! 上下文级操作：每次调用都先按句柄与元素类型解析收集器，再委托给 [`Collector`]。
//!
//! 解析失败是这些函数唯一的错误来源；流式回调的 panic 在收集器内部被吞掉，不会出现在这里。

use crate::collector::Collector;
use crate::context::CallContext;
use crate::error::Result;
use crate::key::CollectorKey;
use crate::registry::resolve;
use crate::wait::WaitGuard;

/// 向句柄处的收集器追加一个元素。
pub fn collect<T>(ctx: &CallContext, item: T, disambiguators: &[&str]) -> Result<()>
where
    T: Send + Sync + 'static,
{
    resolve::<T>(ctx, disambiguators)?.collect(item);
    Ok(())
}

/// 获取句柄处收集器的快照。并发变体会先阻塞到所有已登记的生产者完成。
pub fn retrieve<T>(ctx: &CallContext, disambiguators: &[&str]) -> Result<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    Ok(resolve::<T>(ctx, disambiguators)?.retrieve())
}

/// 快照中满足 `predicate` 的元素；无命中时返回空 `Vec`。
pub fn retrieve_filtered<T, P>(
    ctx: &CallContext,
    predicate: P,
    disambiguators: &[&str],
) -> Result<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
    P: FnMut(&T) -> bool,
{
    Ok(resolve::<T>(ctx, disambiguators)?.retrieve_filtered(predicate))
}

/// 对快照逐个映射。
pub fn retrieve_transformed<T, R, F>(
    ctx: &CallContext,
    map: F,
    disambiguators: &[&str],
) -> Result<Vec<R>>
where
    T: Clone + Send + Sync + 'static,
    F: FnMut(T) -> R,
{
    Ok(resolve::<T>(ctx, disambiguators)?.retrieve_transformed(map))
}

/// 过滤后映射，单次遍历。
pub fn retrieve_filtered_transformed<T, R, P, F>(
    ctx: &CallContext,
    predicate: P,
    map: F,
    disambiguators: &[&str],
) -> Result<Vec<R>>
where
    T: Clone + Send + Sync + 'static,
    P: FnMut(&T) -> bool,
    F: FnMut(T) -> R,
{
    Ok(resolve::<T>(ctx, disambiguators)?.retrieve_filtered_transformed(predicate, map))
}

/// 在句柄处的收集器上登记一次未完成工作。
///
/// # 教案式说明
/// - **意图 (Why)**：编排方在派发生产者**之前**登记，汇总方的 `retrieve` 才不会在生产者尚未
///   开始时观察到零而提前返回；
/// - **逻辑 (How)**：登记只依赖类型擦除后的协调器，因此无需知道元素类型；
/// - **契约 (What)**：
///   - 返回的上下文与传入的上下文等价，便于把二者一起交给生产者；
///   - 返回的 [`WaitGuard`] 即完成函数：由生产者在最后一次写入之后 `complete()`，或随作用域析构，
///     每条退出路径上恰好完成一次；
///   - 句柄不存在或变体不带协调器时返回惰性凭证，并记录一条 `debug` 日志。
pub fn begin_wait(ctx: &CallContext, disambiguators: &[&str]) -> (CallContext, WaitGuard) {
    let key = CollectorKey::new(disambiguators);
    let guard = match ctx.lookup(&key).and_then(|binding| binding.wait_group().cloned()) {
        Some(group) => WaitGuard::announce(group),
        None => {
            tracing::debug!(key = %key, "no wait coordinator at key; begin_wait is a no-op");
            WaitGuard::inert()
        }
    };
    (ctx.clone(), guard)
}

/// 解析句柄，返回可重复使用的强类型收集器。
pub fn collector<T>(ctx: &CallContext, disambiguators: &[&str]) -> Result<Collector<T>>
where
    T: Send + Sync + 'static,
{
    resolve(ctx, disambiguators)
}
