// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;
pub mod types;
pub mod watch;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::DevRuntime;
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the single-instance supervisor
/// - `[startup]` actions
/// - (optional) file watches
/// - Ctrl-C / SIGTERM handling and orderly shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let runtime = DevRuntime::new(&cfg)?;

    runtime.run_startup().await;

    info!("press Ctrl+C to stop");
    runtime.run_until(!args.no_watch, shutdown_signal()).await
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = term.recv() => info!("received SIGTERM"),
                }
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {e}");
    }
}

/// Simple dry-run output: print tasks, startup actions and watches.
fn print_dry_run(cfg: &ConfigFile) {
    println!("devloop dry-run");
    println!("  config.trigger_on = {:?}", cfg.config.trigger_on);
    println!(
        "  config.event_queue_capacity = {}",
        cfg.config.event_queue_capacity
    );
    println!(
        "  config.error_queue_capacity = {}",
        cfg.config.error_queue_capacity
    );
    println!();

    println!("tasks ({}):", cfg.tasks().len());
    for name in cfg.tasks().keys() {
        println!("  - {name}");
        if let Ok(task) = cfg.descriptor(name) {
            println!("      cmd: {task}");
        }
    }

    if !cfg.startup.is_empty() {
        println!();
        println!("startup:");
        print_actions(&cfg.startup);
    }

    println!();
    println!("watches ({}):", cfg.watch.len());
    for entry in &cfg.watch {
        println!("  - {}", entry.pattern);
        if !entry.exclude.is_empty() {
            println!("      exclude: {:?}", entry.exclude);
        }
        print_actions(&entry.actions);
    }

    debug!("dry-run complete (no execution)");
}

fn print_actions(actions: &config::ActionSet) {
    if !actions.run.is_empty() {
        println!("      run: {:?}", actions.run);
    }
    if !actions.start.is_empty() {
        println!("      start: {:?}", actions.start);
    }
    if !actions.restart.is_empty() {
        println!("      restart: {:?}", actions.restart);
    }
}
