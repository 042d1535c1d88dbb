// tests/debounce_scheduler.rs

use std::error::Error;

use tokio::sync::mpsc;
use tokio::time::{advance, timeout, Duration, Instant};

use devloop::engine::{spawn_debouncer, BuildTrigger, TriggerReason};

type TestResult = Result<(), Box<dyn Error>>;

const QUIET: Duration = Duration::from_secs(1);

#[tokio::test(start_paused = true)]
async fn burst_fires_once_after_last_event_plus_quiet_period() -> TestResult {
    let (trigger_tx, mut trigger_rx) = mpsc::channel::<BuildTrigger>(1);
    let (debouncer, _task) = spawn_debouncer(QUIET, trigger_tx);
    let start = Instant::now();

    // Events at t = 0, 0.3, 0.9.
    debouncer.notify();
    advance(Duration::from_millis(300)).await;
    debouncer.notify();
    advance(Duration::from_millis(600)).await;
    debouncer.notify();

    let trigger = timeout(Duration::from_secs(5), trigger_rx.recv())
        .await?
        .ok_or("debouncer closed the channel")?;
    assert_eq!(trigger.reason, TriggerReason::FileChange);
    assert!(
        start.elapsed() >= Duration::from_millis(1900),
        "fired too early: {:?}",
        start.elapsed()
    );

    // Exactly one trigger for the burst.
    assert!(timeout(Duration::from_secs(10), trigger_rx.recv()).await.is_err());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn no_trigger_before_quiet_period_elapses() -> TestResult {
    let (trigger_tx, mut trigger_rx) = mpsc::channel::<BuildTrigger>(1);
    let (debouncer, _task) = spawn_debouncer(QUIET, trigger_tx);

    debouncer.notify();
    advance(Duration::from_millis(999)).await;
    assert!(trigger_rx.try_recv().is_err());

    advance(Duration::from_millis(2)).await;
    let trigger = timeout(Duration::from_secs(1), trigger_rx.recv()).await?;
    assert!(trigger.is_some());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_fire_separately() -> TestResult {
    let (trigger_tx, mut trigger_rx) = mpsc::channel::<BuildTrigger>(1);
    let (debouncer, _task) = spawn_debouncer(QUIET, trigger_tx);

    debouncer.notify();
    timeout(Duration::from_secs(5), trigger_rx.recv())
        .await?
        .ok_or("first trigger missing")?;

    advance(Duration::from_secs(3)).await;
    debouncer.notify();
    timeout(Duration::from_secs(5), trigger_rx.recv())
        .await?
        .ok_or("second trigger missing")?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn trigger_while_one_is_pending_is_coalesced() -> TestResult {
    let (trigger_tx, mut trigger_rx) = mpsc::channel::<BuildTrigger>(1);
    let (debouncer, _task) = spawn_debouncer(QUIET, trigger_tx);

    // Nobody consumes the first trigger before the second burst fires.
    debouncer.notify();
    advance(Duration::from_millis(1500)).await;
    debouncer.notify();
    advance(Duration::from_millis(1500)).await;

    assert!(trigger_rx.recv().await.is_some());
    assert!(timeout(Duration::from_secs(10), trigger_rx.recv()).await.is_err());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stale_instant_cannot_pull_the_deadline_in() -> TestResult {
    let (trigger_tx, mut trigger_rx) = mpsc::channel::<BuildTrigger>(1);
    let (debouncer, _task) = spawn_debouncer(QUIET, trigger_tx);
    let start = Instant::now();

    advance(Duration::from_millis(500)).await;
    debouncer.notify();
    // Delivered late, observed earlier.
    debouncer.notify_at(start);

    timeout(Duration::from_secs(5), trigger_rx.recv())
        .await?
        .ok_or("trigger missing")?;
    assert!(start.elapsed() >= Duration::from_millis(1500));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn pending_window_is_honoured_when_handles_are_dropped() -> TestResult {
    let (trigger_tx, mut trigger_rx) = mpsc::channel::<BuildTrigger>(1);
    let (debouncer, task) = spawn_debouncer(QUIET, trigger_tx);

    debouncer.notify();
    drop(debouncer);

    assert!(timeout(Duration::from_secs(5), trigger_rx.recv()).await?.is_some());
    timeout(Duration::from_secs(5), task).await??;
    Ok(())
}
