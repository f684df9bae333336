use anyhow::{Context, Result, bail};
use fieldsync_lib::{AppConfig, AppState, MutationRecord, SyncOutcome, init_logging};
use serde::Serialize;
use std::env;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Status,
    Sync,
}

#[derive(Debug, Clone)]
struct CliOptions {
    command: Command,
    json: bool,
    database_url: Option<String>,
    remote_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    pending_count: u32,
    mutations: Vec<MutationRecord>,
}

fn usage() -> &'static str {
    "Usage: fieldsync-queue [--database-url <url>] [--remote-url <url>] [--json] <status|sync>"
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(args)?;
    let config = resolve_config(&options);
    init_logging(config.sync.log_json);

    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(async {
        let state = AppState::new(config).await?;
        let result = match options.command {
            Command::Status => print_status(&state, options.json).await,
            Command::Sync => run_sync(&state, options.json).await,
        };
        state.close().await;
        result
    })
}

fn resolve_config(options: &CliOptions) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(url) = &options.database_url {
        config.database.url = url.clone();
    }
    if let Some(url) = &options.remote_url {
        config.remote.url = url.clone();
    }
    // A one-shot invocation is not a reconnect listener.
    config.sync.auto_sync_on_reconnect = false;
    config
}

async fn print_status(state: &AppState, json: bool) -> Result<()> {
    let report = StatusReport {
        pending_count: state.coordinator.pending_count().await?,
        mutations: state.coordinator.pending_mutations().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} pending mutation(s)", report.pending_count);
    for record in &report.mutations {
        println!(
            "  #{:<6} {:<16} retries={} queued={}",
            record.id,
            record.kind().as_str(),
            record.retry_count,
            record.created_at.to_rfc3339()
        );
    }
    Ok(())
}

async fn run_sync(state: &AppState, json: bool) -> Result<()> {
    state.connectivity.set_online(true);
    let outcome = state.coordinator.sync_now().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        SyncOutcome::Drained(report) => println!(
            "synced={} retried={} abandoned={} pending={}",
            report.synced_count, report.retried_count, report.abandoned_count, report.pending_count
        ),
        SyncOutcome::Skipped(reason) => println!("sync skipped: {reason:?}"),
    }
    Ok(())
}

fn parse_args<I>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut command: Option<Command> = None;
    let mut json = false;
    let mut database_url: Option<String> = None;
    let mut remote_url: Option<String> = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => {
                json = true;
            }
            "--database-url" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--database-url requires a value\n{}", usage())
                })?;
                database_url = Some(value);
            }
            "--remote-url" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--remote-url requires a value\n{}", usage()))?;
                remote_url = Some(value);
            }
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            "status" | "sync" if command.is_some() => {
                bail!("Only one command may be given\n{}", usage());
            }
            "status" => command = Some(Command::Status),
            "sync" => command = Some(Command::Sync),
            other => {
                bail!("Unknown argument: {other}\n{}", usage());
            }
        }
    }

    let Some(command) = command else {
        bail!("Missing command\n{}", usage());
    };

    Ok(CliOptions {
        command,
        json,
        database_url,
        remote_url,
    })
}
