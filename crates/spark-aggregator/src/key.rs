use core::fmt;
use std::sync::Arc;

/// 所有收集器句柄共享的命名空间前缀。
pub const NAMESPACE: &str = "aggregator";

/// 渲染句柄时连接命名空间与各区分符的分隔符。
pub const SEPARATOR: char = '_';

/// `CollectorKey` 在一条上下文链中唯一定位一个收集器。
///
/// # 设计背景（Why）
/// - 同一请求上下文内常需并存多个收集器（例如 `errors` 与 `warnings`），句柄以固定命名空间加
///   有序区分符的方式构成，使不同子系统可以各自约定名称而互不覆盖。
///
/// # 契约说明（What）
/// - 无区分符时句柄渲染为裸命名空间 `aggregator`；
/// - 有区分符时按调用顺序以 [`SEPARATOR`] 连接，例如 `aggregator_key1_key2`；
/// - **相等性**只比较区分符序列本身：`["a", "b"]` 与 `["b", "a"]` 不等，`["a_b"]` 与 `["a", "b"]`
///   虽渲染结果相同也不相等；
/// - 构造后不可变，克隆只复制引用计数。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CollectorKey {
    segments: Arc<[String]>,
}

impl CollectorKey {
    /// 根据调用方提供的区分符构造句柄。
    pub fn new(disambiguators: &[&str]) -> Self {
        Self {
            segments: disambiguators.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// 不带区分符的默认句柄。
    pub fn root() -> Self {
        Self::new(&[])
    }

    /// 按调用顺序返回区分符。
    pub fn disambiguators(&self) -> &[String] {
        &self.segments
    }

    /// 是否为不带区分符的默认句柄。
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// 以确定性格式渲染句柄，供日志与错误消息使用。
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CollectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NAMESPACE)?;
        for segment in self.segments.iter() {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CollectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CollectorKey")
            .field(&self.segments)
            .finish()
    }
}

impl From<&[&str]> for CollectorKey {
    fn from(disambiguators: &[&str]) -> Self {
        Self::new(disambiguators)
    }
}
