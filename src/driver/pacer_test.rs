// ABOUTME: Tests for the minimum-interval pacer.
// ABOUTME: Covers remaining-time compensation, resets, spacing, and cancellation.

use std::time::{Duration, Instant};

use super::pacer::{Cancelled, Pacer};

#[tokio::test]
async fn test_wait_sleeps_the_full_interval_when_idle() {
    let pacer = Pacer::new();

    let start = Instant::now();
    pacer
        .wait(Duration::from_millis(50), std::future::pending::<()>())
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(
        elapsed >= Duration::from_millis(40),
        "Should sleep close to the interval, slept {:?}",
        elapsed
    );
    assert!(
        elapsed < Duration::from_millis(300),
        "Should not oversleep, slept {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_wait_subtracts_time_spent_working() {
    let pacer = Pacer::new();

    // 30ms of "work" since the baseline.
    tokio::time::sleep(Duration::from_millis(30)).await;

    let start = Instant::now();
    pacer
        .wait(Duration::from_millis(50), std::future::pending::<()>())
        .await
        .unwrap();
    let slept = start.elapsed();

    // Only the remainder is slept, not the full interval.
    assert!(
        slept < Duration::from_millis(45),
        "Expected a partial sleep, slept {:?}",
        slept
    );
}

#[tokio::test]
async fn test_wait_returns_immediately_after_slow_work() {
    let pacer = Pacer::new();

    tokio::time::sleep(Duration::from_millis(80)).await;

    let start = Instant::now();
    pacer
        .wait(Duration::from_millis(50), std::future::pending::<()>())
        .await
        .unwrap();
    let slept = start.elapsed();

    assert!(
        slept < Duration::from_millis(10),
        "Interval already elapsed, but slept {:?}",
        slept
    );

    // The baseline was still reset, so the next wait paces normally.
    let start = Instant::now();
    pacer
        .wait(Duration::from_millis(50), std::future::pending::<()>())
        .await
        .unwrap();
    assert!(
        start.elapsed() >= Duration::from_millis(40),
        "Baseline should have reset, slept only {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_successive_returns_are_spaced_by_the_interval() {
    let pacer = Pacer::new();
    let interval = Duration::from_millis(30);

    let mut returns = Vec::new();
    for _ in 0..3 {
        pacer
            .wait(interval, std::future::pending::<()>())
            .await
            .unwrap();
        returns.push(Instant::now());
    }

    for pair in returns.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        assert!(
            gap >= Duration::from_millis(25),
            "Returns should be at least ~one interval apart, gap was {:?}",
            gap
        );
    }
}

#[tokio::test]
async fn test_reset_moves_the_baseline() {
    let pacer = Pacer::new();

    tokio::time::sleep(Duration::from_millis(40)).await;
    pacer.reset().await;

    let start = Instant::now();
    pacer
        .wait(Duration::from_millis(50), std::future::pending::<()>())
        .await
        .unwrap();
    assert!(
        start.elapsed() >= Duration::from_millis(40),
        "Reset should discard prior elapsed time, slept only {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_wait_cancelled() {
    let pacer = Pacer::new();

    let start = Instant::now();
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
    };
    let result = pacer.wait(Duration::from_secs(10), cancel).await;

    assert_eq!(result, Err(Cancelled));
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "Cancellation should resolve promptly"
    );
}

#[tokio::test]
async fn test_cancelled_error_display() {
    assert_eq!(Cancelled.to_string(), "operation cancelled");
}
