mod config;
mod connection;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::CubbyConfig;

#[derive(Parser)]
#[command(name = "cubby-server", about = "session-scoped key-value server")]
struct Args {
    /// path to TOML configuration file
    #[arg(short = 'c', long, env = "CUBBY_CONFIG")]
    config: Option<PathBuf>,

    /// print default configuration as TOML and exit
    #[arg(long)]
    config_template: bool,

    /// address to bind to
    #[arg(long, env = "CUBBY_HOST")]
    host: Option<String>,

    /// port to listen on
    #[arg(short, long, env = "CUBBY_PORT")]
    port: Option<u16>,

    /// maximum number of live sessions in the registry
    #[arg(long, env = "CUBBY_MAX_SESSIONS")]
    max_sessions: Option<usize>,

    /// maximum key-value entries per session
    #[arg(long, env = "CUBBY_MAX_ENTRIES")]
    max_entries: Option<usize>,

    /// maximum number of concurrent client connections
    #[arg(long, env = "CUBBY_MAXCLIENTS")]
    maxclients: Option<usize>,

    /// maximum protocol line length in bytes
    #[arg(long, env = "CUBBY_MAX_LINE_LEN")]
    max_line_len: Option<usize>,
}

/// Applies CLI overrides to a `CubbyConfig`. Only `Some` values from the
/// CLI args take effect — this preserves the resolution order:
/// defaults → TOML file → env vars → CLI flags.
fn apply_args(cfg: &mut CubbyConfig, args: &Args) {
    if let Some(ref host) = args.host {
        cfg.bind = host.clone();
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(n) = args.max_sessions {
        cfg.max_sessions = n;
    }
    if let Some(n) = args.max_entries {
        cfg.max_entries = n;
    }
    if let Some(n) = args.maxclients {
        cfg.maxclients = n;
    }
    if let Some(n) = args.max_line_len {
        cfg.max_line_len = n;
    }
}

/// Prints `msg` to stderr and exits with code 1.
///
/// Normalizes the error-and-exit pattern for startup validation
/// failures.
fn exit_err(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

/// Parses a `host:port` pair into a `SocketAddr`. Exits with a message
/// on failure.
fn parse_bind_addr(host: &str, port: u16) -> SocketAddr {
    match format!("{host}:{port}").parse() {
        Ok(a) => a,
        Err(e) => exit_err(format!("invalid bind address '{host}:{port}': {e}")),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cubby_server=info".into()),
        )
        .init();

    let args = Args::parse();

    // --config-template: dump defaults and exit
    if args.config_template {
        let cfg = CubbyConfig::default();
        match cfg.to_toml() {
            Ok(toml) => {
                println!("{toml}");
                std::process::exit(0);
            }
            Err(e) => exit_err(format!("failed to generate config template: {e}")),
        }
    }

    // build CubbyConfig: defaults → TOML file → CLI/env overrides
    let mut cfg = match &args.config {
        Some(path) => CubbyConfig::from_file(path).unwrap_or_else(|e| exit_err(e)),
        None => CubbyConfig::default(),
    };
    apply_args(&mut cfg, &args);

    if let Err(e) = cfg.validate() {
        exit_err(format!("invalid configuration: {e}"));
    }

    let addr = parse_bind_addr(&cfg.bind, cfg.port);

    info!(
        max_sessions = cfg.max_sessions,
        max_entries = cfg.max_entries,
        "cubby server starting..."
    );

    if let Err(e) = server::run(addr, &cfg).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}
