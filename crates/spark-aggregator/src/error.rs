//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 收集器解析只有两类失败：句柄上没有绑定、句柄上绑定了其他元素类型；两者都以值返回，
//!   绝不以 panic 形式出现，因为它们可能源自不相关子系统在同一上下文中的句柄碰撞。
//! - 回调 panic 与等待计数下溢都不属于本错误域：前者在调用点被吞掉，后者是契约违约并直接终止。
//!
//! ## 设计要求（What）
//! - 派生 `thiserror::Error`，与 `std::error::Error` 生态兼容；
//! - 通过 [`AggregatorError::code`] 暴露稳定错误码，遵循 `<域>.<语义>` 命名。

use thiserror::Error;

/// 稳定错误码表。
pub mod codes {
    /// 上下文链中没有绑定请求的句柄。
    pub const NOT_FOUND: &str = "aggregator.not_found";
    /// 句柄已绑定，但注册时的元素类型与请求类型不同。
    pub const TYPE_MISMATCH: &str = "aggregator.type_mismatch";
}

/// 收集器解析错误。
///
/// # 教案式说明
/// - **意图 (Why)**：让 `collect`/`retrieve` 等入口以 `?` 直接传播解析失败，调用方据此区分
///   “这里从未开启收集”（`NotFound`，可恢复）与“句柄被错误复用”（`TypeMismatch`，调用方缺陷）。
/// - **契约 (What)**：`key` 为渲染后的句柄文本；`expected` 为本次请求的元素类型名，
///   `registered` 为注册时的元素类型名，二者均来自 [`core::any::type_name`]，仅用于诊断。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AggregatorError {
    /// 上下文链中找不到该句柄。
    #[error("no aggregator registered under `{key}`")]
    NotFound { key: String },

    /// 句柄存在，但元素类型不匹配。
    #[error("aggregator `{key}` collects `{registered}`, not `{expected}`")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        registered: &'static str,
    },
}

impl AggregatorError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            AggregatorError::NotFound { .. } => codes::NOT_FOUND,
            AggregatorError::TypeMismatch { .. } => codes::TYPE_MISMATCH,
        }
    }

    /// 渲染后的句柄文本。
    pub fn key(&self) -> &str {
        match self {
            AggregatorError::NotFound { key } | AggregatorError::TypeMismatch { key, .. } => key,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AggregatorError::NotFound { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, AggregatorError::TypeMismatch { .. })
    }
}

/// 本 crate 的统一结果类型。
pub type Result<T, E = AggregatorError> = core::result::Result<T, E>;
