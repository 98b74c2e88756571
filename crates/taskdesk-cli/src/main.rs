mod command;
mod session;

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use taskdesk_core::app::SweepLoop;
use taskdesk_core::{FormPolicy, SystemClock};

use crate::command::Command;
use crate::session::{Session, Step};

#[derive(Parser, Debug)]
#[command(name = "taskdesk", version, about = "Single-user task list editor")]
struct Cli {
    /// JSON policy file (notice lifetime, deadline lead, default priority).
    #[arg(long = "policy", value_name = "PATH")]
    policy_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    log_level: String,
    /// How often expired notices are swept, in milliseconds.
    #[arg(long = "sweep-ms", value_name = "MS", default_value_t = 250)]
    sweep_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let policy = load_policy(args.policy_path.as_ref())?;
    info!(?policy, "policy loaded");

    let session = Arc::new(Mutex::new(Session::new(SystemClock, policy)));

    // (A) 期限切れ通知の回収ループ
    let (cleared_tx, mut cleared_rx) = mpsc::unbounded_channel();
    let sweeper = SweepLoop::new(Arc::clone(&session), Duration::from_millis(args.sweep_ms.max(1)))
        .with_listener(cleared_tx)
        .spawn();
    let printer = tokio::spawn(async move {
        while let Some(cleared) = cleared_rx.recv().await {
            for kind in cleared {
                println!("cleared: {kind}");
            }
        }
    });

    // (B) stdin から 1 行ずつコマンドを読む
    println!("{}", session.lock().await.render());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.context("read stdin")? else {
            break;
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("error: {err}");
                continue;
            }
        };
        match session.lock().await.execute(command) {
            Step::Continue(out) => print!("{out}"),
            Step::Quit => break,
        }
    }

    // (C) 終了処理
    sweeper.shutdown_and_join().await;
    if let Err(err) = printer.await {
        warn!(error = %err, "notice printer ended abnormally");
    }
    info!("bye");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_policy(path: Option<&PathBuf>) -> Result<FormPolicy> {
    match path {
        Some(path) => FormPolicy::from_json_file(path)
            .with_context(|| format!("load policy from {}", path.display())),
        None => Ok(FormPolicy::default()),
    }
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ").context("write prompt")?;
    stdout.flush().context("flush stdout")
}
