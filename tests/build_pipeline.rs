// tests/build_pipeline.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::time::Duration;

use devloop::engine::{BuildOutcome, BuildPipeline, BuildPlan, SupervisorContext, TriggerReason};
use devloop::exec::ProcessSupervisor;
use devloop::report::Tag;
use devloop::toolchain::BuildRequest;
use devloop_test_utils::builders::plan;
use devloop_test_utils::fake_toolchain::{FakeToolchain, ToolCall};
use devloop_test_utils::reporter::RecordingReporter;
use devloop_test_utils::{init_tracing, wait_until, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn pipeline(
    fake: &FakeToolchain,
    plan: BuildPlan,
    workdir: &Path,
    run_args: &[&str],
    reporter: &RecordingReporter,
) -> Arc<BuildPipeline<FakeToolchain>> {
    let supervisor = ProcessSupervisor::new(
        workdir,
        run_args.iter().map(|a| a.to_string()).collect(),
        Arc::new(reporter.clone()),
    );
    Arc::new(BuildPipeline::new(
        fake.clone(),
        plan,
        supervisor,
        Arc::new(reporter.clone()),
    ))
}

#[tokio::test]
async fn failed_build_is_reported_and_nothing_starts() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let fake = FakeToolchain::new().with_build_succeeds(false);
    let reporter = RecordingReporter::new();
    let p = pipeline(&fake, plan("app"), dir.path(), &[], &reporter);

    let outcome = with_timeout(p.autobuild()).await;

    assert_eq!(outcome, BuildOutcome::BuildFailed);
    assert!(!outcome.is_success());
    assert!(reporter.contains(Tag::Error, "syntax error"));
    assert_eq!(reporter.count(Tag::Success), 0);
    assert!(p.current_pid().await.is_none());
    Ok(())
}

#[tokio::test]
async fn build_request_follows_the_plan() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeToolchain::new().with_build_succeeds(false);
    let reporter = RecordingReporter::new();
    let mut build_plan = plan("server");
    build_plan.tags = Some("dev sqlite".to_string());
    build_plan.entry_point = Some(PathBuf::from("cmd/server/main.go"));
    let p = pipeline(&fake, build_plan, dir.path(), &[], &reporter);

    p.autobuild().await;

    assert_eq!(
        fake.calls(),
        vec![ToolCall::Build(BuildRequest {
            artifact: "server".to_string(),
            tags: Some("dev sqlite".to_string()),
            entry_point: Some(PathBuf::from("cmd/server/main.go")),
        })]
    );
    Ok(())
}

#[tokio::test]
async fn vendor_failure_stops_before_building() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeToolchain::new().with_vendor_dir(false);
    let reporter = RecordingReporter::new();
    let mut build_plan = plan("app");
    build_plan.vendor = true;
    let p = pipeline(&fake, build_plan, dir.path(), &[], &reporter);

    let outcome = p.autobuild().await;

    assert_eq!(outcome, BuildOutcome::VendorFailed);
    assert_eq!(fake.calls(), vec![ToolCall::UpdateVendor]);
    assert!(reporter.contains(Tag::Error, "Vendor update failed"));
    Ok(())
}

#[tokio::test]
async fn vendor_step_needs_both_flag_and_directory() -> TestResult {
    let dir = TempDir::new()?;
    let reporter = RecordingReporter::new();

    // Directory present, vendoring off.
    let fake = FakeToolchain::new().with_vendor_dir(true).with_build_succeeds(false);
    pipeline(&fake, plan("app"), dir.path(), &[], &reporter).autobuild().await;
    assert!(!fake.calls().contains(&ToolCall::UpdateVendor));

    // Vendoring on, no directory.
    let fake = FakeToolchain::new().with_build_succeeds(false);
    let mut build_plan = plan("app");
    build_plan.vendor = true;
    pipeline(&fake, build_plan, dir.path(), &[], &reporter).autobuild().await;
    assert!(!fake.calls().contains(&ToolCall::UpdateVendor));
    assert_eq!(fake.build_count(), 1);
    Ok(())
}

#[tokio::test]
async fn warm_install_stops_at_first_failure_but_still_builds() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeToolchain::new()
        .with_packages(&["example.com/app/a", "example.com/app/b", "example.com/app/c"])
        .with_failing_install("example.com/app/b")
        .with_build_succeeds(false);
    let reporter = RecordingReporter::new();
    let mut build_plan = plan("app");
    build_plan.warm_install = true;
    let p = pipeline(&fake, build_plan, dir.path(), &[], &reporter);

    p.autobuild().await;

    let calls = fake.calls();
    assert_eq!(calls[0], ToolCall::ListPackages);
    assert_eq!(calls[1], ToolCall::Install("example.com/app/a".to_string()));
    assert_eq!(calls[2], ToolCall::Install("example.com/app/b".to_string()));
    assert!(matches!(calls[3], ToolCall::Build(_)));
    assert_eq!(calls.len(), 4);
    assert!(reporter.contains(Tag::Warn, "example.com/app/b"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_autobuilds_never_overlap() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let fake = FakeToolchain::new()
        .with_build_succeeds(false)
        .with_build_delay(Duration::from_millis(50));
    let reporter = RecordingReporter::new();
    let p = pipeline(&fake, plan("app"), dir.path(), &[], &reporter);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let p = Arc::clone(&p);
            tokio::spawn(async move { p.autobuild().await })
        })
        .collect();
    for h in handles {
        with_timeout(h).await?;
    }

    assert_eq!(fake.build_count(), 4);
    assert_eq!(fake.max_concurrent_builds(), 1);
    Ok(())
}

#[tokio::test]
async fn triggers_during_a_build_collapse_into_one_follow_up() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let fake = FakeToolchain::new()
        .with_build_succeeds(false)
        .with_build_delay(Duration::from_millis(200));
    let reporter = RecordingReporter::new();
    let p = pipeline(&fake, plan("app"), dir.path(), &[], &reporter);
    let ctx = SupervisorContext::start(p, Duration::from_millis(50));

    assert!(ctx.request_build(TriggerReason::Startup));
    assert!(wait_until(|| fake.build_count() == 1).await);

    // The first build is in flight; these fold into one pending build.
    for _ in 0..3 {
        assert!(ctx.request_build(TriggerReason::FileChange));
    }

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(fake.build_count(), 2);

    with_timeout(ctx.shutdown()).await;
    Ok(())
}

#[tokio::test]
async fn debounced_changes_reach_the_pipeline() -> TestResult {
    let dir = TempDir::new()?;
    let fake = FakeToolchain::new().with_build_succeeds(false);
    let reporter = RecordingReporter::new();
    let p = pipeline(&fake, plan("app"), dir.path(), &[], &reporter);
    let ctx = SupervisorContext::start(p, Duration::from_millis(50));

    let debouncer = ctx.debouncer();
    for _ in 0..5 {
        debouncer.notify();
    }

    assert!(wait_until(|| fake.build_count() == 1).await);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(fake.build_count(), 1);

    with_timeout(ctx.shutdown()).await;
    Ok(())
}

#[cfg(unix)]
mod unix {
    use super::*;

    use devloop_test_utils::fake_toolchain::system_binary;

    fn sleep_binary() -> PathBuf {
        system_binary(&["/bin/sleep", "/usr/bin/sleep"]).expect("sleep binary available")
    }

    #[tokio::test]
    async fn successful_build_starts_the_artifact() -> TestResult {
        init_tracing();
        let dir = TempDir::new()?;
        let fake = FakeToolchain::new().with_artifact(dir.path(), &sleep_binary());
        let reporter = RecordingReporter::new();
        let p = pipeline(&fake, plan("app"), dir.path(), &["30"], &reporter);

        let outcome = with_timeout(p.autobuild()).await;

        let BuildOutcome::Restarted { pid } = outcome else {
            panic!("expected Restarted, got {outcome:?}");
        };
        assert!(pid.is_some());
        assert_eq!(p.current_pid().await, pid);
        assert!(p.is_running().await);
        assert!(reporter.contains(Tag::Success, "Build was successful"));

        with_timeout(p.shutdown()).await;
        assert!(!p.is_running().await);
        Ok(())
    }

    #[tokio::test]
    async fn each_successful_build_replaces_the_instance() -> TestResult {
        init_tracing();
        let dir = TempDir::new()?;
        let fake = FakeToolchain::new().with_artifact(dir.path(), &sleep_binary());
        let reporter = RecordingReporter::new();
        let p = pipeline(&fake, plan("app"), dir.path(), &["30"], &reporter);

        let first = with_timeout(p.autobuild()).await;
        let second = with_timeout(p.autobuild()).await;

        match (first, second) {
            (BuildOutcome::Restarted { pid: Some(a) }, BuildOutcome::Restarted { pid: Some(b) }) => {
                assert_ne!(a, b);
                #[cfg(target_os = "linux")]
                assert!(!Path::new(&format!("/proc/{a}")).exists());
            }
            other => panic!("unexpected outcomes {other:?}"),
        }

        with_timeout(p.shutdown()).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_build_leaves_running_instance_alone() -> TestResult {
        init_tracing();
        let dir = TempDir::new()?;
        let fake = FakeToolchain::new().with_artifact(dir.path(), &sleep_binary());
        let reporter = RecordingReporter::new();
        let p = pipeline(&fake, plan("app"), dir.path(), &["30"], &reporter);

        with_timeout(p.autobuild()).await;
        let running = p.current_pid().await;
        assert!(running.is_some());

        fake.set_build_succeeds(false);
        let outcome = with_timeout(p.autobuild()).await;

        assert_eq!(outcome, BuildOutcome::BuildFailed);
        assert_eq!(p.current_pid().await, running);
        assert!(p.is_running().await);

        with_timeout(p.shutdown()).await;
        Ok(())
    }

    #[tokio::test]
    async fn context_shutdown_stops_the_application() -> TestResult {
        init_tracing();
        let dir = TempDir::new()?;
        let fake = FakeToolchain::new().with_artifact(dir.path(), &sleep_binary());
        let reporter = RecordingReporter::new();
        let p = pipeline(&fake, plan("app"), dir.path(), &["30"], &reporter);
        let ctx = SupervisorContext::start(Arc::clone(&p), Duration::from_millis(50));

        ctx.request_build(TriggerReason::Startup);
        assert!(wait_until(|| reporter.contains(Tag::Info, "is running")).await);
        let pid = p.current_pid().await.ok_or("no pid")?;

        with_timeout(ctx.shutdown()).await;

        assert!(!p.is_running().await);
        #[cfg(target_os = "linux")]
        assert!(!Path::new(&format!("/proc/{pid}")).exists());
        let _ = pid;
        Ok(())
    }
}
