use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};
use crate::ledger::{ChainExport, Difficulty};
use crate::node::config::AuthorityConfig;
use crate::node::service::AuthorityService;
use crate::node::Node;
use crate::rpc::RpcHandler;
use crate::utils::logging::init_logging;

/// CLI for the vote ledger sealing authority.
#[derive(Parser)]
#[clap(name = "votechain", version)]
pub struct Cli {
    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Write a default config file
    Init {
        #[clap(long, default_value = "votechain.toml")]
        config: PathBuf,
    },
    /// Run the authority, serving JSON-RPC lines on stdin/stdout
    Run {
        #[clap(long)]
        config: Option<PathBuf>,

        /// leading zero hex digits per block hash (overrides config)
        #[clap(long)]
        difficulty: Option<u32>,

        /// seal pending votes on this period (overrides config)
        #[clap(long)]
        seal_interval_ms: Option<u64>,

        /// write the chain here on shutdown (overrides config)
        #[clap(long)]
        export: Option<PathBuf>,
    },
    /// Audit an exported chain file against the difficulty it records
    Verify {
        #[clap(long)]
        file: PathBuf,

        /// also require at least this many leading zero hex digits
        #[clap(long)]
        min_difficulty: Option<u32>,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Init { config } => {
            init_logging("info");
            if config.exists() {
                anyhow::bail!("{} already exists", config.display());
            }
            std::fs::write(&config, AuthorityConfig::default().to_toml()?)
                .with_context(|| format!("writing {}", config.display()))?;
            println!("wrote default config to {}", config.display());
            Ok(())
        }
        Cmd::Run { config, difficulty, seal_interval_ms, export } => {
            let mut cfg = match config {
                Some(path) => AuthorityConfig::load(path)?,
                None => AuthorityConfig::default(),
            };
            if let Some(d) = difficulty {
                cfg.difficulty = d;
            }
            if seal_interval_ms.is_some() {
                cfg.seal_interval_ms = seal_interval_ms;
            }
            if export.is_some() {
                cfg.export_path = export;
            }
            init_logging(&cfg.log_filter);

            let node = Node::new(cfg)?;
            let svc = node.start();
            let handler = node.rpc_handler();

            let (interrupt_tx, interrupt_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received");
                }
                let _ = interrupt_tx.send(true);
            });

            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            serve_lines(&handler, stdin, &mut stdout, interrupt_rx).await?;

            info!("shutting down authority");
            node.stop(svc).await
        }
        Cmd::Verify { file, min_difficulty } => {
            init_logging("warn");
            let export = audit_export(&file, min_difficulty)?;
            println!(
                "{}: {} blocks sealed at difficulty {}, chain valid",
                file.display(),
                export.length,
                export.difficulty
            );
            Ok(())
        }
    }
}

/// Read an export and audit it at its recorded difficulty, or `min_difficulty` if higher.
pub fn audit_export(file: &Path, min_difficulty: Option<u32>) -> Result<ChainExport> {
    let export = ChainExport::read_from(file)?;
    match min_difficulty {
        Some(floor) => export.verify_at_least(Difficulty::new(floor)?)?,
        None => export.verify()?,
    }
    Ok(export)
}

/// Answer newline-delimited JSON-RPC requests until the reader hits EOF or
/// `shutdown` flips. A request already being handled, such as a seal, runs to
/// completion first so its block is in any export written afterwards.
pub async fn serve_lines<R, W>(
    handler: &RpcHandler<AuthorityService>,
    reader: R,
    writer: &mut W,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        if *shutdown.borrow() {
            break;
        }
        // next_line is cancel-safe; only the wait for input is raced against shutdown
        let next = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            next = lines.next_line() => next?,
        };
        let Some(line) = next else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let resp = handler.handle_str(line).await;
        if let Some(err) = &resp.error {
            warn!(code = err.code, "rpc error: {}", err.message);
        }
        let mut out = serde_json::to_vec(&resp)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    Ok(())
}
