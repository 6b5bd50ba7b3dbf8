// # dynv6-client - dynv6 Record Updater
//
// This binary is a THIN integration layer only:
// 1. Parse arguments (flags with environment fallbacks)
// 2. Prompt for the API token if none was given
// 3. Initialize logging and a single-threaded runtime
// 4. Wire the API client and address sources into `Dynv6Engine`
// 5. Print one status line per address family
//
// All resolution and reconciliation logic lives in `dynv6-core`.
//
// ## Configuration
//
// | Flag             | Environment        | Default                   |
// |------------------|--------------------|---------------------------|
// | `HOSTNAME`       |                    | required                  |
// | `--token`        | `DYNV6_TOKEN`      | prompted (hidden input)   |
// | `--interface`    | `DYNV6_INTERFACE`  | `eth0`                    |
// | `--api-url`      | `DYNV6_API_URL`    | `https://dynv6.com/api/v2`|
// | `--ipv4-url`     | `DYNV6_IPV4_URL`   | `https://api.ipify.org`   |
// | `--timeout`      | `DYNV6_TIMEOUT`    | `30`                      |
// | `--log-level`    | `DYNV6_LOG_LEVEL`  | `warn`                    |
// | `--manual-ipv4`  |                    | off                       |
// | `--all-records`  |                    | off                       |
// | `--dry-run`      |                    | off                       |
//
// ## Example
//
// ```bash
// export DYNV6_TOKEN=your_token
// dynv6-client home.example.dynv6.net --interface enp3s0
// ```

use anyhow::{Context, Result};
use clap::Parser;
use dynv6_api::Dynv6Client;
use dynv6_core::config::{DEFAULT_API_BASE_URL, DEFAULT_INTERFACE, DEFAULT_IPV4_LOOKUP_URL};
use dynv6_core::{Dynv6Config, Dynv6Engine, Ipv4Mode, RunReport};
use dynv6_ip_http::HttpIpv4Source;
use dynv6_ip_netlink::NetlinkInterfaceSource;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (individual families may still have failed)
/// - 1: Configuration or startup error
/// - 2: Run aborted before any update (auth failure, zone list unavailable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dynv6ExitCode {
    /// Run completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Run aborted
    RunAborted = 2,
}

impl From<Dynv6ExitCode> for ExitCode {
    fn from(code: Dynv6ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep the A and AAAA records of a dynv6 hostname up to date
#[derive(Parser)]
#[command(name = "dynv6-client")]
#[command(version)]
#[command(about = "Update the A and AAAA records of a dynv6 hostname", long_about = None)]
struct Args {
    /// Hostname to update (e.g. home.example.dynv6.net)
    #[arg(value_name = "HOSTNAME")]
    hostname: String,

    /// dynv6 HTTP token; prompted for if omitted
    #[arg(long, env = "DYNV6_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Interface providing the global IPv6 address
    #[arg(long, env = "DYNV6_INTERFACE", default_value = DEFAULT_INTERFACE)]
    interface: String,

    /// Update auto-derived A records directly instead of through the zone
    #[arg(long)]
    manual_ipv4: bool,

    /// Update every A and AAAA record of HOSTNAME, not only the first of each type
    #[arg(long)]
    all_records: bool,

    /// Perform all lookups but do not send any update
    #[arg(long)]
    dry_run: bool,

    /// dynv6 REST API base URL
    #[arg(long, env = "DYNV6_API_URL", default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Service returning the public IPv4 address as plain text
    #[arg(long, env = "DYNV6_IPV4_URL", default_value = DEFAULT_IPV4_LOOKUP_URL)]
    ipv4_url: String,

    /// Timeout for each dynv6 API call, in seconds
    #[arg(long, env = "DYNV6_TIMEOUT", default_value = "30")]
    timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DYNV6_LOG_LEVEL", default_value = "warn")]
    log_level: Level,
}

impl Args {
    /// Build the updater configuration; `token` has already been resolved
    fn into_config(self, token: String) -> Dynv6Config {
        let mut config = Dynv6Config::new(self.hostname, token);
        config.interface = self.interface;
        config.api.base_url = self.api_url;
        config.api.timeout_secs = self.timeout;
        config.ipv4_lookup.url = self.ipv4_url;
        config.engine.dry_run = self.dry_run;
        config.engine.all_records = self.all_records;
        if self.manual_ipv4 {
            config.engine.ipv4_mode = Ipv4Mode::Manual;
        }
        config
    }
}

/// Use the given token or ask for it on the terminal
fn resolve_token(token: Option<String>) -> Result<String> {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        return Ok(token);
    }

    if !std::io::stdin().is_terminal() {
        anyhow::bail!("No API token given. Pass --token or set DYNV6_TOKEN");
    }

    let token = dialoguer::Password::new()
        .with_prompt("dynv6 HTTP token")
        .interact()
        .context("Failed to read API token")?;
    Ok(token)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Dynv6ExitCode::ConfigError.into();
    }

    let token = match resolve_token(args.token.clone()) {
        Ok(token) => token,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return Dynv6ExitCode::ConfigError.into();
        }
    };

    let config = args.into_config(token);

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return Dynv6ExitCode::ConfigError.into();
    }

    let engine = match build_engine(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Startup error: {:#}", e);
            return Dynv6ExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Dynv6ExitCode::ConfigError.into();
        }
    };

    match rt.block_on(engine.run()) {
        Ok(report) => {
            print_report(&report);
            Dynv6ExitCode::Completed.into()
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            eprintln!("Error: {}", e);
            Dynv6ExitCode::RunAborted.into()
        }
    }
}

/// Wire the production collaborators into an engine
fn build_engine(config: Dynv6Config) -> Result<Dynv6Engine> {
    let client = Dynv6Client::from_config(&config.api).context("Failed to create API client")?;
    let ipv4_source = HttpIpv4Source::from_config(&config.ipv4_lookup)
        .context("Failed to create IPv4 lookup")?;

    info!(
        "Updating {} (interface {}, IPv4 via {})",
        config.hostname,
        config.interface,
        ipv4_source.url()
    );

    let engine = Dynv6Engine::new(
        Box::new(client),
        Box::new(NetlinkInterfaceSource::new()),
        Box::new(ipv4_source),
        config,
    )?;
    Ok(engine)
}

fn print_report(report: &RunReport) {
    for family in &report.families {
        println!("{}", family);
    }
}
