#![cfg(not(any(loom, spark_loom)))]
//! 收集器契约的性质验证。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：单个示例只能说明“某一组输入可行”，这里用 Proptest 随机生成写入序列、
//!   句柄与谓词，验证对任意输入都成立的三条性质。
//! - **结构说明 (How)**：
//!   - `prop_sequential_retrieve_matches_call_order`：顺序变体的快照等于写入序列本身；
//!   - `prop_filter_transform_equals_filter_then_map`：组合视图等价于先过滤后逐个映射；
//!   - `prop_handle_identity_is_the_disambiguator_sequence`：句柄相等当且仅当区分符序列相等。
//! - **合同与边界 (What)**：生成的区分符只含小写字母与下划线，刻意覆盖“渲染相同但序列不同”的碰撞。

use proptest::prelude::*;
use spark_aggregator::{
    CallContext, CollectorKey, collect, register, register_with_capacity, retrieve,
    retrieve_filtered, retrieve_filtered_transformed, retrieve_transformed,
};

fn disambiguators() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z_]{1,4}", 0..4)
}

fn as_refs(segments: &[String]) -> Vec<&str> {
    segments.iter().map(String::as_str).collect()
}

proptest! {
    #[test]
    fn prop_sequential_retrieve_matches_call_order(
        items in prop::collection::vec(any::<i64>(), 0..64),
        capacity in prop::option::of(0_usize..16),
    ) {
        let ctx = match capacity {
            Some(capacity) => register_with_capacity::<i64>(&CallContext::new(), capacity, &[]),
            None => register::<i64>(&CallContext::new(), &[]),
        };
        for item in &items {
            prop_assert!(collect(&ctx, *item, &[]).is_ok());
        }
        prop_assert_eq!(retrieve::<i64>(&ctx, &[]).expect("收集器已注册"), items);
    }

    #[test]
    fn prop_filter_transform_equals_filter_then_map(
        items in prop::collection::vec(-1_000_i32..1_000, 0..64),
        modulus in 1_i32..7,
        offset in -50_i32..50,
    ) {
        let ctx = register::<i32>(&CallContext::new(), &[]);
        for item in &items {
            prop_assert!(collect(&ctx, *item, &[]).is_ok());
        }

        let keep = |n: &i32| n.rem_euclid(modulus) == 0;
        let shift = |n: i32| i64::from(n) + i64::from(offset);

        let combined = retrieve_filtered_transformed::<i32, i64, _, _>(&ctx, keep, shift, &[])
            .expect("收集器已注册");
        let filtered = retrieve_filtered::<i32, _>(&ctx, keep, &[]).expect("收集器已注册");
        let stepwise: Vec<i64> = filtered.into_iter().map(shift).collect();
        prop_assert_eq!(combined, stepwise);

        let mapped = retrieve_transformed::<i32, i64, _>(&ctx, shift, &[]).expect("收集器已注册");
        prop_assert_eq!(mapped.len(), items.len());
    }

    #[test]
    fn prop_handle_identity_is_the_disambiguator_sequence(
        left in disambiguators(),
        right in disambiguators(),
    ) {
        let left_refs = as_refs(&left);
        let right_refs = as_refs(&right);

        let same_key = CollectorKey::new(&left_refs) == CollectorKey::new(&right_refs);
        prop_assert_eq!(same_key, left == right);

        let ctx = register::<u8>(&CallContext::new(), &left_refs);
        prop_assert_eq!(collect(&ctx, 1_u8, &right_refs).is_ok(), left == right);
    }
}
