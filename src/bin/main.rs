use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;

use celldap::config::BridgeConfig;
use celldap::dap::{message, transport};
use celldap::error::{BridgeError, BridgeResult};
use celldap::notebook::CellRegistry;
use celldap::session::DebugBridge;

/// DAP proxy translating notebook-cell coordinates for a wrapped debug adapter
#[derive(Parser)]
#[command(name = "celldap")]
#[command(version)]
#[command(about = "DAP proxy translating notebook-cell coordinates for a wrapped debug adapter")]
struct Cli {
    /// Path to a bridge configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for compiled cell dumps (overrides the config file)
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Debug adapter command to wrap, with its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    adapter: Vec<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> BridgeResult<()> {
    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };

    let (command, args) = resolve_adapter(&cli, &config)?;
    let registry = match cli.dump_dir.or(config.dump_dir) {
        Some(dir) => CellRegistry::with_dump_dir(dir)?,
        None => CellRegistry::new()?,
    };
    let bridge = Arc::new(DebugBridge::with_registry(registry));

    log::info!("wrapping debug adapter: {command} {}", args.join(" "));
    let mut child = tokio::process::Command::new(&command)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|source| BridgeError::Spawn {
            command: command.clone(),
            source,
        })?;

    let adapter_stdin = child
        .stdin
        .take()
        .ok_or_else(|| BridgeError::internal("adapter stdin not captured"))?;
    let adapter_stdout = child
        .stdout
        .take()
        .ok_or_else(|| BridgeError::internal("adapter stdout not captured"))?;

    // One sequential loop per direction keeps per-direction ordering intact.
    let outbound = tokio::spawn(forward(
        BufReader::new(tokio::io::stdin()),
        adapter_stdin,
        Arc::clone(&bridge),
        ChannelDirection::Outbound,
    ));
    let inbound = tokio::spawn(forward(
        BufReader::new(adapter_stdout),
        tokio::io::stdout(),
        Arc::clone(&bridge),
        ChannelDirection::Inbound,
    ));

    let _ = tokio::join!(outbound, inbound);
    bridge.shutdown();
    match child.wait().await {
        Ok(status) => log::info!("debug adapter exited: {status}"),
        Err(err) => log::warn!("could not collect debug adapter exit status: {err}"),
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum ChannelDirection {
    Outbound,
    Inbound,
}

impl ChannelDirection {
    fn label(self) -> &'static str {
        match self {
            ChannelDirection::Outbound => "editor->adapter",
            ChannelDirection::Inbound => "adapter->editor",
        }
    }
}

async fn forward<R, W>(
    mut reader: R,
    mut writer: W,
    bridge: Arc<DebugBridge>,
    direction: ChannelDirection,
) where
    R: tokio::io::AsyncBufRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    loop {
        match transport::read_message(&mut reader).await {
            Ok(Some(mut msg)) => {
                log::trace!("{}: {}", direction.label(), message::describe(&msg));
                match direction {
                    ChannelDirection::Outbound => bridge.rewrite_outbound(&mut msg),
                    ChannelDirection::Inbound => bridge.rewrite_inbound(&mut msg),
                };
                if let Err(err) = transport::write_message(&mut writer, &msg).await {
                    log::error!("{} write failed: {err}", direction.label());
                    break;
                }
            }
            Ok(None) => {
                log::debug!("{} closed", direction.label());
                break;
            }
            Err(err) => {
                log::error!("{} read failed: {err}", direction.label());
                break;
            }
        }
    }
}

fn resolve_adapter(cli: &Cli, config: &BridgeConfig) -> BridgeResult<(String, Vec<String>)> {
    if let Some((command, args)) = cli.adapter.split_first() {
        return Ok((command.clone(), args.to_vec()));
    }
    if let Some(command) = &config.adapter.command {
        return Ok((command.clone(), config.adapter.args.clone()));
    }
    Err(BridgeError::config(
        "no debug adapter command given (pass it after `--` or set [adapter] in the config file)",
    ))
}
