use core::any::Any;
use core::fmt;
use std::sync::Arc;

use crate::aggregator::AggregatorKind;
use crate::collector::Collector;
use crate::key::CollectorKey;
use crate::wait::WaitGroup;

/// 上下文链中的一个节点：一次注册产生一个绑定，并指向注册前的上下文。
struct Binding {
    key: CollectorKey,
    element: &'static str,
    kind: AggregatorKind,
    /// 实际类型为 `Collector<T>`，按请求的元素类型向下转型恢复。
    slot: Arc<dyn Any + Send + Sync>,
    wait_group: Option<Arc<WaitGroup>>,
    parent: Option<Arc<Binding>>,
}

/// 解析一个句柄得到的只读视图。
pub(crate) struct BindingRef<'a> {
    binding: &'a Binding,
}

impl<'a> BindingRef<'a> {
    /// 注册时的元素类型名称，仅用于诊断。
    pub(crate) fn element(&self) -> &'static str {
        self.binding.element
    }

    /// 以 `T` 恢复注册时的句柄；类型不一致时返回 `None`。
    pub(crate) fn downcast<T: 'static>(&self) -> Option<&'a Collector<T>> {
        self.binding.slot.downcast_ref::<Collector<T>>()
    }

    pub(crate) fn wait_group(&self) -> Option<&'a Arc<WaitGroup>> {
        self.binding.wait_group.as_ref()
    }
}

/// 请求级的环境上下文：不可变、可廉价克隆、写时复制的绑定链。
///
/// # 设计背景（Why）
/// - 收集器需要沿调用链隐式传递，而不必修改路径上每个函数的签名；`CallContext` 就是这条链的载体，
///   调用方按约定把它作为显式参数逐层传下去，而不是依赖全局或线程局部状态；
/// - 链式结构让“注册”成为纯函数：派生出新上下文，原上下文保持不变，持有旧值的并发读者不受影响。
///
/// # 逻辑解析（How）
/// - 每个绑定以 [`Arc`] 指向父节点；派生只分配一个新节点，父链完整共享；
/// - 查找从最新绑定向根部遍历，首个句柄相等的绑定获胜，因此同一句柄的重复注册只会**遮蔽**旧绑定。
///
/// # 契约说明（What）
/// - 克隆成本为一次引用计数递增；
/// - 绑定一经发布即不可变，收集器在发布前已完整构造，任何之后拿到该上下文的线程都能看到完整状态；
/// - 收集器的生命周期等于引用它的所有上下文值中最长的那个，没有显式销毁接口。
///
/// # 风险提示（Trade-offs）
/// - 查找是线性遍历，适合每个请求只挂少量收集器的场景。
#[derive(Clone, Default)]
pub struct CallContext {
    head: Option<Arc<Binding>>,
}

impl CallContext {
    /// 不带任何绑定的根上下文。
    pub fn new() -> Self {
        Self::default()
    }

    /// 派生一个在 `key` 处绑定 `collector` 的新上下文；`self` 保持不变。
    pub(crate) fn bind<T>(&self, collector: Collector<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        let binding = Binding {
            key: collector.key().clone(),
            element: core::any::type_name::<T>(),
            kind: collector.kind(),
            wait_group: collector.wait_group().cloned(),
            slot: Arc::new(collector),
            parent: self.head.clone(),
        };
        Self {
            head: Some(Arc::new(binding)),
        }
    }

    /// 查找 `key` 处可见的绑定。
    pub(crate) fn lookup(&self, key: &CollectorKey) -> Option<BindingRef<'_>> {
        self.bindings()
            .find(|binding| &binding.key == key)
            .map(|binding| BindingRef { binding })
    }

    /// 给定区分符处是否存在可见的收集器（不检查元素类型）。
    pub fn contains(&self, disambiguators: &[&str]) -> bool {
        self.lookup(&CollectorKey::new(disambiguators)).is_some()
    }

    /// 链上的绑定总数，包括被遮蔽的旧绑定。
    pub fn depth(&self) -> usize {
        self.bindings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn bindings(&self) -> impl Iterator<Item = &Binding> {
        let mut cursor = self.head.as_deref();
        core::iter::from_fn(move || {
            let current = cursor?;
            cursor = current.parent.as_deref();
            Some(current)
        })
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for binding in self.bindings() {
            list.entry(&format_args!(
                "{} => {}<{}>",
                binding.key, binding.kind, binding.element
            ));
        }
        list.finish()
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallContext{{bindings={}}}", self.depth())
    }
}
