//! Tests for live resizing of a busy pool

use super::eventually;
use crate::pool::api::{PoolConfig, PoolError, WorkerPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn resizable_pool(max_workers: usize) -> Arc<WorkerPool> {
    WorkerPool::new(
        "maxtest",
        PoolConfig::default()
            .with_max_workers(max_workers)
            .with_min_workers(0)
            // long enough that only the resize can shrink the pool
            .with_idle_timeout(Duration::from_secs(60)),
    )
    .unwrap()
}

#[tokio::test]
async fn test_max_reduction_takes_effect_before_idle_timeout() {
    let pool = resizable_pool(5);
    let completed = Arc::new(AtomicUsize::new(0));

    for count in 1..30u64 {
        let completed = Arc::clone(&completed);
        pool.execute(async move {
            tokio::time::sleep(Duration::from_millis(200 / count)).await;
            completed.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();
    }
    assert_eq!(pool.pool_size(), 5);

    pool.set_maximum_pool_size(4).unwrap();
    assert_eq!(pool.maximum_pool_size(), 4);

    assert!(eventually(Duration::from_secs(2), || pool.pool_size() <= 4).await);
    assert!(eventually(Duration::from_secs(5), || completed.load(Ordering::SeqCst) == 29).await);
    assert_eq!(pool.pool_size(), 4);
}

#[tokio::test]
async fn test_shrink_does_not_interrupt_running_tasks() {
    let pool = resizable_pool(4);
    let finished = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let finished = Arc::clone(&finished);
        pool.execute(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            finished.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(pool.active_count(), 4);

    pool.set_maximum_pool_size(1).unwrap();
    // all four are mid-task, none may be torn down yet
    assert_eq!(pool.pool_size(), 4);

    assert!(eventually(Duration::from_secs(2), || finished.load(Ordering::SeqCst) == 4).await);
    assert!(eventually(Duration::from_secs(1), || pool.pool_size() == 1).await);
}

#[tokio::test]
async fn test_idle_surplus_retires_immediately_on_shrink() {
    let pool = resizable_pool(3);

    for _ in 0..3 {
        pool.execute(async {}).await.unwrap();
    }
    assert!(eventually(Duration::from_secs(1), || pool.idle_count() == 3).await);

    pool.set_maximum_pool_size(1).unwrap();
    assert!(eventually(Duration::from_millis(500), || pool.pool_size() == 1).await);
}

#[tokio::test]
async fn test_shrink_then_submit_keeps_every_task() {
    let pool = resizable_pool(6);
    let completed = Arc::new(AtomicUsize::new(0));

    let submit = |n: usize| {
        let pool = Arc::clone(&pool);
        let completed = Arc::clone(&completed);
        async move {
            for _ in 0..n {
                let completed = Arc::clone(&completed);
                pool.execute(async move {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
            }
        }
    };

    submit(40).await;
    pool.set_maximum_pool_size(2).unwrap();
    submit(40).await;

    assert!(eventually(Duration::from_secs(5), || completed.load(Ordering::SeqCst) == 80).await);
    assert!(eventually(Duration::from_secs(1), || pool.pool_size() <= 2).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resize_and_execute_converge() {
    let pool = resizable_pool(8);
    let completed = Arc::new(AtomicUsize::new(0));

    let mut submitters = Vec::new();
    for _ in 0..4 {
        let pool = Arc::clone(&pool);
        let completed = Arc::clone(&completed);
        submitters.push(tokio::spawn(async move {
            for _ in 0..50 {
                let completed = Arc::clone(&completed);
                pool.execute(async move {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
            }
        }));
    }

    let resizer = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            for size in [6, 2, 7, 3, 1, 5, 3] {
                pool.set_maximum_pool_size(size).unwrap();
                tokio::time::sleep(Duration::from_millis(3)).await;
            }
        })
    };

    for submitter in submitters {
        submitter.await.unwrap();
    }
    resizer.await.unwrap();

    assert!(eventually(Duration::from_secs(5), || completed.load(Ordering::SeqCst) == 200).await);
    assert!(eventually(Duration::from_secs(2), || pool.pool_size() <= 3).await);
    assert_eq!(pool.maximum_pool_size(), 3);
}

#[tokio::test]
async fn test_growing_serves_backlog() {
    let pool = resizable_pool(1);
    let running = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let running = Arc::clone(&running);
        pool.execute(async move {
            running.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
        })
        .await
        .unwrap();
    }
    assert_eq!(pool.pool_size(), 1);

    pool.set_maximum_pool_size(4).unwrap();
    assert_eq!(pool.pool_size(), 4);
    assert!(eventually(Duration::from_millis(80), || running.load(Ordering::SeqCst) == 4).await);
}

#[tokio::test]
async fn test_zero_maximum_rejected() {
    let pool = resizable_pool(2);
    assert!(matches!(
        pool.set_maximum_pool_size(0),
        Err(PoolError::InvalidConfig { .. })
    ));
    assert_eq!(pool.maximum_pool_size(), 2);
}
