use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lab_nmap_rs::config::{ScanConfig, DEFAULT_PROGRAM, DEFAULT_TARGET};
use lab_nmap_rs::options::OptionRegistry;
use lab_nmap_rs::scanner::Scanner;
use lab_nmap_rs::server;
use lab_nmap_rs::types::{ScanRequest, ScanResult};

use anyhow::Result;
use clap::Parser;

/// lab-nmap-rs — run whitelisted nmap scans against one approved lab host from a small web UI.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lab-nmap-rs",
    version,
    about = "Run whitelisted nmap scans against one approved lab host from a small web UI.",
    long_about = None
)]
struct Cli {
    /// The only host this tool will scan. Never taken from requests.
    #[arg(long, env = "LAB_TARGET", default_value = DEFAULT_TARGET)]
    target: String,

    /// Scanner executable name or path.
    #[arg(long = "nmap-bin", env = "NMAP_BIN", default_value = DEFAULT_PROGRAM)]
    nmap_bin: String,

    /// Hard limit on one scan's wall-clock time, in seconds.
    #[arg(long = "timeout-secs", default_value_t = 300)]
    timeout_secs: u64,

    /// Address for the HTTP UI.
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: String,

    /// Directory with the static UI files.
    #[arg(long = "ui-dir", default_value = "ui")]
    ui_dir: PathBuf,

    /// Print the available scan options and exit.
    #[arg(long = "list-options", default_value_t = false)]
    list_options: bool,

    /// Run a single scan from the command line instead of serving the UI.
    #[arg(long = "scan-once", default_value_t = false)]
    scan_once: bool,

    /// Option key for --scan-once (repeatable). Defaults to the registry defaults.
    #[arg(long = "option")]
    options: Vec<String>,

    /// Write --scan-once results as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = ScanConfig::new(
        cli.target.as_str(),
        cli.nmap_bin.as_str(),
        Duration::from_secs(cli.timeout_secs),
    )?;
    let scanner = Scanner::new(config);

    if cli.list_options {
        print_options(scanner.registry());
        return Ok(());
    }

    print_banner(&scanner);

    if cli.scan_once {
        let req = if cli.options.is_empty() {
            ScanRequest::new(scanner.registry().default_keys())
        } else {
            ScanRequest::new(cli.options.iter().cloned())
        };
        let results = scanner.scan(&req).await?;
        print_results_table(&results);
        if let Some(path) = cli.output.as_deref() {
            if let Err(e) = write_results_json(path, &results) {
                tracing::error!("Failed to write JSON to {}: {}", path.display(), e);
            } else {
                println!("Wrote JSON results to {}", path.display());
            }
        }
        return Ok(());
    }

    tokio::select! {
        res = server::spawn_server(&cli.bind, scanner, &cli.ui_dir) => res?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

fn print_banner(scanner: &Scanner) {
    let line = "=".repeat(50);
    println!("\n{line}");
    println!("  LAB NMAP SCANNER");
    println!("{line}");
    println!("  Target          : {}", scanner.target());
    println!("  Scanner         : {}", scanner.config().program());
    println!("  Scanner found   : {}", scanner.is_available());
    println!("  Timeout (secs)  : {}", scanner.config().timeout().as_secs());
    println!("{line}\n");
}

fn print_options(registry: &OptionRegistry) {
    let key_w = registry.iter().map(|o| o.key.len()).max().unwrap_or(3).max("key".len());
    let flag_w = registry.iter().map(|o| o.flag.len()).max().unwrap_or(4).max("flag".len());
    println!(
        "{:<key_w$}  {:<flag_w$}  {:<7}  {}",
        "key", "flag", "default", "description"
    );
    for o in registry.iter() {
        println!(
            "{:<key_w$}  {:<flag_w$}  {:<7}  {}",
            o.key,
            o.flag,
            if o.default { "yes" } else { "no" },
            o.description
        );
    }
}

fn print_results_table(results: &ScanResult) {
    let port_w = results
        .ports
        .iter()
        .map(|p| p.port.len() + 1 + p.protocol.as_str().len())
        .max()
        .unwrap_or(0)
        .max("port".len());
    let state_w = results
        .ports
        .iter()
        .map(|p| p.state.len())
        .max()
        .unwrap_or(0)
        .max("state".len());

    println!("\n$ {}", results.command);
    println!(
        "Open ports: {} (listed: {})",
        results.open_ports().count(),
        results.ports.len()
    );
    println!("{:<port_w$}  {:<state_w$}  service", "port", "state");
    println!("{:-<port_w$}  {:-<state_w$}  {:-<7}", "", "", "");
    for p in &results.ports {
        let svc: String = p.service.chars().take(60).collect();
        println!(
            "{:<port_w$}  {:<state_w$}  {}",
            format!("{}/{}", p.port, p.protocol),
            p.state,
            svc
        );
    }
    println!(
        "OS        : {}",
        results.os_info.as_deref().unwrap_or("Not detected")
    );
    if let Some(t) = &results.scan_info {
        println!("Completed in {t}");
    }
}

fn write_results_json(path: &Path, results: &ScanResult) -> anyhow::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}
