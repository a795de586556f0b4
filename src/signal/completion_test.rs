// ABOUTME: Tests for the manually-resumable completion source.
// ABOUTME: Covers reuse across generations, misuse faults, cancellation, and teardown.

use std::sync::Arc;
use std::time::Duration;

use tokio_test::task;
use tokio_test::{assert_pending, assert_ready};

use super::completion::CompletionSource;
use crate::error::SignalError;

#[tokio::test]
async fn test_complete_without_wait_is_noop() {
    let source = CompletionSource::new();
    assert!(!source.complete());

    // The next wait must not see a pre-latched completion.
    let mut wait = task::spawn(source.wait());
    assert_pending!(wait.poll());
}

#[tokio::test]
async fn test_wait_resolves_on_complete() {
    let source = Arc::new(CompletionSource::new());
    let waiter = tokio::spawn({
        let source = Arc::clone(&source);
        async move { source.wait().await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(source.complete());
    assert_eq!(waiter.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn test_reuse_across_generations() {
    let source = CompletionSource::new();
    for _ in 0..3 {
        let mut wait = task::spawn(source.wait());
        assert_pending!(wait.poll());
        assert!(source.complete());
        assert_eq!(assert_ready!(wait.poll()), Ok(()));
    }
}

#[tokio::test]
async fn test_second_wait_faults_multiple_continuation() {
    let source = CompletionSource::new();
    let mut first = task::spawn(source.wait());
    assert_pending!(first.poll());

    let mut second = task::spawn(source.wait());
    assert_eq!(
        assert_ready!(second.poll()),
        Err(SignalError::MultipleContinuation)
    );

    // The first waiter is unaffected.
    assert!(source.complete());
    assert_eq!(assert_ready!(first.poll()), Ok(()));
}

#[tokio::test]
async fn test_repolling_a_consumed_wait_faults_stale_token() {
    let source = CompletionSource::new();
    let mut wait = task::spawn(source.wait());
    assert_pending!(wait.poll());
    source.complete();
    assert_eq!(assert_ready!(wait.poll()), Ok(()));

    // The generation advanced when the result was consumed.
    assert_eq!(assert_ready!(wait.poll()), Err(SignalError::StaleToken));
}

#[tokio::test]
async fn test_dropped_wait_disarms_the_source() {
    let source = CompletionSource::new();
    {
        let mut wait = task::spawn(source.wait());
        assert_pending!(wait.poll());
    }

    // The abandoned generation cannot be resumed.
    assert!(!source.complete());

    // And the source is reusable.
    let mut wait = task::spawn(source.wait());
    assert_pending!(wait.poll());
    assert!(source.complete());
    assert_eq!(assert_ready!(wait.poll()), Ok(()));
}

#[tokio::test]
async fn test_wait_with_cancel() {
    let source = CompletionSource::new();
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
    };
    assert_eq!(
        source.wait_with_cancel(cancel).await,
        Err(SignalError::Cancelled)
    );

    // A cancelled wait leaves the source reusable.
    let mut wait = task::spawn(source.wait());
    assert_pending!(wait.poll());
    assert!(source.complete());
    assert_eq!(assert_ready!(wait.poll()), Ok(()));
}

#[tokio::test]
async fn test_try_result_not_ready_while_pending() {
    let source = CompletionSource::new();
    assert_eq!(source.try_result(), Err(SignalError::NotReady));

    let mut wait = task::spawn(source.wait());
    assert_pending!(wait.poll());
    assert_eq!(source.try_result(), Err(SignalError::NotReady));

    source.complete();
    assert_eq!(source.try_result(), Ok(()));
}

#[tokio::test]
async fn test_close_cancels_pending_wait() {
    let source = Arc::new(CompletionSource::new());
    let waiter = tokio::spawn({
        let source = Arc::clone(&source);
        async move { source.wait().await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    source.close();
    assert_eq!(waiter.await.unwrap(), Err(SignalError::Cancelled));

    // Waits after teardown fail immediately.
    assert_eq!(source.wait().await, Err(SignalError::Cancelled));
}
