//! Coalescing of change notifications.
use flowgen::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_pending, assert_ready_eq};

const DELAY: Duration = Duration::from_millis(500);

#[tokio::test(start_paused = true)]
async fn test_burst_runs_only_the_last_submission() {
    let debouncer = Debouncer::new(DELAY);
    let runs = Arc::new(AtomicUsize::new(0));

    let mut submissions = Vec::new();
    for payload in 1..=3 {
        let runs = Arc::clone(&runs);
        submissions.push(debouncer.submit("main.bal", move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            payload
        }));
    }
    assert_eq!(debouncer.pending_len(), 1);

    let start = Instant::now();
    let last = submissions.pop().unwrap();
    assert_eq!(last.wait().await, Ok(3));
    assert!(start.elapsed() >= DELAY);

    for superseded in submissions {
        assert_eq!(superseded.wait().await, Err(Cancelled));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(debouncer.pending_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_keys_are_debounced_independently() {
    let debouncer = Debouncer::new(DELAY);
    let first = debouncer.submit("a.bal", || async { "a" });
    let second = debouncer.submit("b.bal", || async { "b" });
    assert_eq!(debouncer.pending_len(), 2);

    assert_eq!(first.wait().await, Ok("a"));
    assert_eq!(second.wait().await, Ok("b"));
}

#[tokio::test(start_paused = true)]
async fn test_nothing_runs_before_the_quiet_window() {
    let debouncer = Debouncer::new(DELAY);
    let mut result = tokio_test::task::spawn(debouncer.submit(1u32, || async { 42 }).wait());
    assert_pending!(result.poll());

    tokio::time::sleep(DELAY / 2).await;
    assert_pending!(result.poll());

    tokio::time::sleep(DELAY).await;
    assert_ready_eq!(result.poll(), Ok(42));
}

#[tokio::test(start_paused = true)]
async fn test_cancel() {
    let debouncer = Debouncer::new(DELAY);
    let pending = debouncer.submit("main.bal", || async {});

    assert!(debouncer.cancel(&"main.bal"));
    assert!(!debouncer.cancel(&"main.bal"));
    assert_eq!(debouncer.pending_len(), 0);
    assert_eq!(pending.wait().await, Err(Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_delay_from_config() {
    let config = GeneratorConfig::from_toml("debounce-delay-ms = 120").unwrap();
    let debouncer: Debouncer<String> = Debouncer::from_config(&config);
    assert_eq!(debouncer.delay(), Duration::from_millis(120));
}
