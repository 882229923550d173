// tests/dev_runtime.rs
#![cfg(target_os = "linux")]

use std::time::Duration;

use devloop::engine::DevRuntime;
use devloop::errors::DevloopError;
use devloop_test_utils::builders::{ActionSetBuilder, ConfigFileBuilder, WatchConfigBuilder};
use devloop_test_utils::process::{pid_alive, read_lines, wait_for_file};
use devloop_test_utils::{init_tracing, with_timeout};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn startup_runs_then_restarts_and_shutdown_reaps() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let built = dir.path().join("built");

    let cfg = ConfigFileBuilder::new()
        .with_task("build", &format!("touch {}", built.display()))
        .with_task("server", "sleep 30")
        .with_startup(
            ActionSetBuilder::new()
                .run("build")
                .restart("server")
                .build(),
        )
        .build();

    let runtime = DevRuntime::new(&cfg).unwrap();
    with_timeout(runtime.run_startup()).await;

    assert!(built.exists(), "blocking run finishes before startup returns");

    let snap = runtime.supervisor().snapshot().await.unwrap();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].name, "server");
    let pid = snap[0].pid.unwrap();
    assert!(pid_alive(pid));

    with_timeout(runtime.shutdown()).await.unwrap();
    assert!(!pid_alive(pid));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watched_chmod_reruns_actions_and_restarts_server() {
    use std::os::unix::fs::PermissionsExt;

    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("main.rs");
    std::fs::write(&src, "fn main() {}\n").unwrap();
    let log = dir.path().join("builds.log");

    let cfg = ConfigFileBuilder::new()
        .with_task("build", &format!("sh -c \"echo build >> {}\"", log.display()))
        .with_task("server", "sleep 30")
        .with_startup(ActionSetBuilder::new().restart("server").build())
        .with_watch(
            WatchConfigBuilder::new(&format!("{}/*.rs", dir.path().display()))
                .actions(
                    ActionSetBuilder::new()
                        .run("build")
                        .restart("server")
                        .build(),
                )
                .build(),
        )
        .build();

    let mut runtime = DevRuntime::new(&cfg).unwrap();
    runtime.run_startup().await;
    let first = runtime.supervisor().snapshot().await.unwrap()[0].pid.unwrap();

    assert_eq!(runtime.register_watches().unwrap(), 1);

    let mut perms = std::fs::metadata(&src).unwrap().permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(&src, perms).unwrap();

    assert!(wait_for_file(&log, Duration::from_secs(3)).await);
    assert_eq!(read_lines(&log), vec!["build"]);

    // The restart follows the build inside the same callback.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    let mut second = first;
    while second == first && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
        second = runtime.supervisor().snapshot().await.unwrap()[0].pid.unwrap();
    }
    assert_ne!(first, second);
    assert!(!pid_alive(first));

    with_timeout(runtime.shutdown()).await.unwrap();
    assert!(!pid_alive(second));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_watch_registration_still_reaps_startup_instances() {
    init_tracing();

    let mut cfg = ConfigFileBuilder::new()
        .with_task("server", "sleep 30")
        .with_startup(ActionSetBuilder::new().restart("server").build())
        .with_watch(
            WatchConfigBuilder::new("src/*.rs")
                .actions(ActionSetBuilder::new().restart("server").build())
                .build(),
        )
        .build();
    // Validation already passed; break the pattern so registration fails.
    cfg.watch[0].pattern = "src/[".to_string();

    let runtime = DevRuntime::new(&cfg).unwrap();
    runtime.run_startup().await;
    let pid = runtime.supervisor().snapshot().await.unwrap()[0].pid.unwrap();
    assert!(pid_alive(pid));

    let res = with_timeout(runtime.run_until(true, std::future::pending())).await;
    assert!(matches!(res, Err(DevloopError::Pattern { .. })));
    assert!(!pid_alive(pid), "startup instance must be reaped on the error path");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_until_shuts_down_when_the_signal_resolves() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_task("server", "sleep 30")
        .with_startup(ActionSetBuilder::new().restart("server").build())
        .build();

    let runtime = DevRuntime::new(&cfg).unwrap();
    runtime.run_startup().await;
    let pid = runtime.supervisor().snapshot().await.unwrap()[0].pid.unwrap();

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let session = tokio::spawn(runtime.run_until(false, async {
        let _ = stop_rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(pid_alive(pid), "instance keeps running until the signal");

    stop_tx.send(()).unwrap();
    with_timeout(session).await.unwrap().unwrap();
    assert!(!pid_alive(pid));
}
