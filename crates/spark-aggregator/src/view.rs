//! 派生视图：作用于一次快照的纯函数投影。
//!
//! 三个算子都只消费调用方传入的快照，从不触碰收集器的实时存储；结果保持快照中的相对顺序，
//! 没有元素命中时返回空 `Vec` 而不是“缺失”。

/// 保留满足 `predicate` 的元素。
pub fn filter<T, P>(mut snapshot: Vec<T>, mut predicate: P) -> Vec<T>
where
    P: FnMut(&T) -> bool,
{
    snapshot.retain(|item| predicate(item));
    snapshot
}

/// 逐个映射，输出与输入等长。
pub fn transform<T, R, F>(snapshot: Vec<T>, map: F) -> Vec<R>
where
    F: FnMut(T) -> R,
{
    snapshot.into_iter().map(map).collect()
}

/// 先过滤再映射，单次遍历完成。
///
/// 结果与 `transform(filter(snapshot, predicate), map)` 相同，但不产生中间 `Vec`；
/// `map` 只会在命中的元素上调用。
pub fn filter_transform<T, R, P, F>(snapshot: Vec<T>, mut predicate: P, map: F) -> Vec<R>
where
    P: FnMut(&T) -> bool,
    F: FnMut(T) -> R,
{
    snapshot
        .into_iter()
        .filter(|item| predicate(item))
        .map(map)
        .collect()
}
