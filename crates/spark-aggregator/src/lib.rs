#![deny(unsafe_code)]
#![doc = "spark-aggregator: 请求级、类型安全的隐式数据收集。"]
#![doc = ""]
#![doc = "调用方在环境上下文 [`CallContext`] 中注册一个强类型收集器，沿调用链传递的任何代码都能向其追加元素，"]
#![doc = "而无需显式拿到收集器本身；一个逻辑工作单元结束时，调用方取回全部已收集的数据。"]
#![doc = ""]
#![doc = "== 核心不变量 =="]
#![doc = "1. 注册是纯函数：派生新上下文，原上下文不变；同一句柄的重复注册只遮蔽、不修改旧绑定。"]
#![doc = "2. 解析以值报告 `NotFound` / `TypeMismatch`，绝不静默转换元素类型。"]
#![doc = "3. 并发变体的 `retrieve` 先等待未完成工作归零，再获取存储锁；顺序不可交换。"]
#![doc = "4. 流式回调的 panic 在调用点被吞掉，元素照常写入。"]
#![doc = ""]
#![doc = "```"]
#![doc = "use spark_aggregator::{CallContext, collect, register, retrieve};"]
#![doc = ""]
#![doc = "let ctx = register::<String>(&CallContext::new(), &[]);"]
#![doc = "collect(&ctx, \"hello\".to_owned(), &[])?;"]
#![doc = "collect(&ctx, \"world\".to_owned(), &[])?;"]
#![doc = "assert_eq!(retrieve::<String>(&ctx, &[])?, vec![\"hello\", \"world\"]);"]
#![doc = "# Ok::<(), spark_aggregator::AggregatorError>(())"]
#![doc = "```"]

pub mod aggregator;
mod collector;
mod context;
pub mod error;
mod key;
mod ops;
mod registry;
mod sync;
pub mod view;
mod wait;

pub use aggregator::{Aggregator, AggregatorKind, CollectCallback};
pub use collector::Collector;
pub use context::CallContext;
pub use error::{AggregatorError, Result};
pub use key::{CollectorKey, NAMESPACE, SEPARATOR};
pub use ops::{
    begin_wait, collect, collector, retrieve, retrieve_filtered, retrieve_filtered_transformed,
    retrieve_transformed,
};
pub use registry::{
    AggregationMode, Registration, register, register_concurrent,
    register_concurrent_streaming, register_concurrent_streaming_with_capacity,
    register_concurrent_with_capacity, register_streaming, register_streaming_with_capacity,
    register_with_capacity, resolve,
};
pub use wait::{WaitGroup, WaitGuard};
