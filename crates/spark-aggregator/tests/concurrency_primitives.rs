#![cfg(not(any(loom, spark_loom)))]
//! 并发收集器与未完成工作协调器的多线程测试套件。
//!
//! # 教案级导览
//!
//! - **Why**：并发变体的正确性集中在两点：多线程写入不丢不重，以及 `retrieve` 与 `begin_wait`
//!   之间“先等待、后加锁”的屏障语义。流式并发变体在等待协调器下的行为同样需要显式覆盖。
//! - **How**：每个测试用真实线程复现一条竞争路径，生产者通过睡眠刻意落后于汇总方，
//!   从而证明 `retrieve` 确实等待过，而不是碰巧在生产者之后执行。
//! - **What**：断言收集结果的多重集合、回调计数以及协调器计数归零。

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::thread;
use std::time::Duration;

use spark_aggregator::{
    CallContext, begin_wait, collect, collector, register_concurrent,
    register_concurrent_streaming, register_concurrent_streaming_with_capacity,
    register_concurrent_with_capacity, retrieve, retrieve_filtered,
};

/// ## 测试一：并发写入构成输入的一个排列
///
/// - **意图 (Why)**：验证互斥锁保护下没有任何写入丢失或重复。
/// - **逻辑 (How)**：N 个线程各写入自己的编号，全部 `join` 后取回并排序。
/// - **契约 (What)**：排序后的结果恰好等于 `0..N`。
#[test]
fn concurrent_collect_is_a_permutation_of_inputs() {
    const WRITERS: usize = 32;
    let ctx = register_concurrent_with_capacity::<usize>(&CallContext::new(), WRITERS, &[]);

    let handles: Vec<_> = (0..WRITERS)
        .map(|id| {
            let ctx = ctx.clone();
            thread::spawn(move || collect(&ctx, id, &[]).expect("收集器已注册"))
        })
        .collect();
    for handle in handles {
        handle.join().expect("写入线程不应 panic");
    }

    let mut items = retrieve::<usize>(&ctx, &[]).expect("收集器已注册");
    items.sort_unstable();
    assert_eq!(items, (0..WRITERS).collect::<Vec<usize>>());
}

/// ## 测试二：`retrieve` 等待已登记的生产者
///
/// - **意图 (Why)**：这是协调器存在的意义：编排方登记后派发的生产者，其写入必须出现在快照里。
/// - **逻辑 (How)**：先 `begin_wait`，再启动睡眠后写入的生产者；主线程立即 `retrieve`。
/// - **契约 (What)**：快照包含生产者的元素；若 `retrieve` 未等待，将得到空快照。
#[test]
fn retrieve_blocks_until_announced_work_completes() {
    let ctx = register_concurrent::<String>(&CallContext::new(), &[]);

    let (ctx, guard) = begin_wait(&ctx, &[]);
    let producer = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            collect(&ctx, "from producer".to_owned(), &[]).expect("收集器已注册");
            guard.complete();
        })
    };

    let items = retrieve::<String>(&ctx, &[]).expect("收集器已注册");
    assert_eq!(items, vec!["from producer"]);
    producer.join().expect("生产者线程不应 panic");
}

/// ## 测试三：多个生产者与作用域析构
///
/// - **意图 (Why)**：完成凭证应当随作用域自动完成，生产者无需在每条退出路径上显式调用。
/// - **逻辑 (How)**：为每个生产者各登记一次，凭证 `move` 进线程后只作为局部变量存在。
/// - **契约 (What)**：`retrieve` 返回全部元素，协调器计数归零。
#[test]
fn scoped_guards_release_every_producer() {
    const PRODUCERS: u64 = 6;
    let ctx = register_concurrent::<u64>(&CallContext::new(), &["jobs"]);

    let mut workers = Vec::new();
    for id in 0..PRODUCERS {
        let (ctx, guard) = begin_wait(&ctx, &["jobs"]);
        workers.push(thread::spawn(move || {
            let _guard = guard;
            thread::sleep(Duration::from_millis(5 * id));
            collect(&ctx, id, &["jobs"]).expect("收集器已注册");
        }));
    }

    let mut items = retrieve::<u64>(&ctx, &["jobs"]).expect("收集器已注册");
    items.sort_unstable();
    assert_eq!(items, (0..PRODUCERS).collect::<Vec<u64>>());

    for worker in workers {
        worker.join().expect("生产者线程不应 panic");
    }
    let handle = collector::<u64>(&ctx, &["jobs"]).expect("收集器已注册");
    assert_eq!(handle.outstanding(), 0);
}

fn abandon_job() {
    panic!("producer gave up before collecting");
}

/// ## 测试四：生产者 panic 也必须完成登记
///
/// - **意图 (Why)**：若生产者在写入前失败而登记未完成，汇总方将永久阻塞。
/// - **逻辑 (How)**：一个生产者正常写入，另一个持有凭证后直接 panic。
/// - **契约 (What)**：`retrieve` 返回，且只包含正常生产者的元素。
#[test]
fn panicking_producer_still_completes_its_announcement() {
    let ctx = register_concurrent::<&'static str>(&CallContext::new(), &[]);

    let (ok_ctx, ok_guard) = begin_wait(&ctx, &[]);
    let (_, failing_guard) = begin_wait(&ctx, &[]);

    let healthy = thread::spawn(move || {
        collect(&ok_ctx, "done", &[]).expect("收集器已注册");
        ok_guard.complete();
    });
    let failing = thread::spawn(move || {
        let _guard = failing_guard;
        thread::sleep(Duration::from_millis(20));
        abandon_job();
    });

    assert_eq!(retrieve::<&str>(&ctx, &[]).expect("收集器已注册"), vec!["done"]);
    healthy.join().expect("正常生产者不应 panic");
    assert!(failing.join().is_err());
}

/// ## 测试五：流式并发变体与等待协调器的组合
///
/// - **意图 (Why)**：回调在锁内执行、`retrieve` 在锁外等待，两者叠加时既不能死锁，也不能漏掉
///   回调或元素。
/// - **逻辑 (How)**：为每个生产者登记一次，生产者延迟写入；回调统计调用次数并记录看到的元素。
/// - **契约 (What)**：`retrieve` 返回时回调计数等于元素数，且回调看到的序列与存储顺序一致
///   （二者在同一临界区内发生）。
#[test]
fn concurrent_streaming_with_begin_wait_sees_every_item() {
    const PRODUCERS: u32 = 8;
    let calls = Arc::new(AtomicUsize::new(0));
    let observed = Arc::new(Mutex::new(Vec::new()));

    let ctx = {
        let calls = Arc::clone(&calls);
        let observed = Arc::clone(&observed);
        register_concurrent_streaming_with_capacity(
            &CallContext::new(),
            PRODUCERS as usize,
            move |item: &u32| {
                calls.fetch_add(1, Ordering::SeqCst);
                observed.lock().expect("观察锁不应中毒").push(*item);
            },
            &["stream"],
        )
    };

    let mut workers = Vec::new();
    for id in 0..PRODUCERS {
        let (ctx, guard) = begin_wait(&ctx, &["stream"]);
        workers.push(thread::spawn(move || {
            thread::sleep(Duration::from_millis(u64::from(id) * 3));
            collect(&ctx, id, &["stream"]).expect("收集器已注册");
            guard.complete();
        }));
    }

    let items = retrieve::<u32>(&ctx, &["stream"]).expect("收集器已注册");
    assert_eq!(items.len(), PRODUCERS as usize);
    assert_eq!(calls.load(Ordering::SeqCst), PRODUCERS as usize);
    assert_eq!(*observed.lock().expect("观察锁不应中毒"), items);

    for worker in workers {
        worker.join().expect("生产者线程不应 panic");
    }
}

/// ## 测试六：流式并发回调 panic 被逐次吞掉
///
/// - **意图 (Why)**：回调持锁执行，若 panic 逃出临界区，`parking_lot` 锁虽不中毒，但 `collect`
///   的调用方会收到本不属于它的失败。
/// - **契约 (What)**：所有写入成功，回调对每个元素恰好触发一次。
#[test]
fn concurrent_streaming_contains_callback_panics() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let ctx = {
        let attempts = Arc::clone(&attempts);
        register_concurrent_streaming(
            &CallContext::new(),
            move |item: &i32| {
                attempts.fetch_add(1, Ordering::SeqCst);
                if item % 3 == 0 {
                    panic!("multiple of three: {item}");
                }
            },
            &[],
        )
    };

    let handles: Vec<_> = (0..12)
        .map(|item: i32| {
            let ctx = ctx.clone();
            thread::spawn(move || collect(&ctx, item, &[]))
        })
        .collect();
    for handle in handles {
        handle
            .join()
            .expect("回调 panic 不得传播到写入线程")
            .expect("收集器已注册");
    }

    let mut items = retrieve::<i32>(&ctx, &[]).expect("收集器已注册");
    items.sort_unstable();
    assert_eq!(items, (0..12).collect::<Vec<i32>>());
    assert_eq!(attempts.load(Ordering::SeqCst), 12);
}

/// ## 测试七：派生视图可与写入并发执行
///
/// - **意图 (Why)**：每次视图调用都独立取快照，不会与仍在进行的写入互相阻塞。
/// - **契约 (What)**：中途快照只含命中元素且不超过最终数量，写入结束后的快照完整。
#[test]
fn views_run_alongside_writers() {
    let ctx = register_concurrent::<u32>(&CallContext::new(), &[]);

    let writer = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            for item in 0..200_u32 {
                collect(&ctx, item, &[]).expect("收集器已注册");
            }
        })
    };

    for _ in 0..20 {
        let evens = retrieve_filtered::<u32, _>(&ctx, |n| n % 2 == 0, &[]).expect("收集器已注册");
        assert!(evens.len() <= 100);
        assert!(evens.iter().all(|n| n % 2 == 0));
    }
    writer.join().expect("写入线程不应 panic");

    let evens = retrieve_filtered::<u32, _>(&ctx, |n| n % 2 == 0, &[]).expect("收集器已注册");
    assert_eq!(evens.len(), 100);
}
