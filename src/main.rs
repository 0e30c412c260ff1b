//! zap-merge CLI
//!
//! Entry point for the `zap-merge` command-line tool.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use zap_cluster_merge::{pipeline, EffectiveConfig, MergeMode};
use zcl_catalog::{builtin, registry, DeviceSetting};

#[derive(Parser)]
#[command(name = "zap-merge")]
#[command(about = "Merge ZCL cluster catalogs into a ZAP configuration", version)]
struct Cli {
    /// ZAP document to update (default: config/zcl/zcl_config.zap)
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Built-in catalog to merge (default: power-configuration)
    #[arg(long)]
    catalog: Option<String>,

    /// What to do when the cluster already exists
    #[arg(long)]
    mode: Option<MergeMode>,

    /// Path to config file (default: zap-merge.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Compute the merge without writing
    #[arg(long)]
    dry_run: bool,

    /// Print registered attributes and device settings, then exit
    #[arg(long)]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        run_list();
        return;
    }

    let repo_config = match EffectiveConfig::locate_repo_config(cli.config.clone(), Path::new(".")) {
        Ok(path) => path,
        Err(e) => fail("config error", &e.to_string(), e.exit_code()),
    };

    let config = match EffectiveConfig::build(repo_config.as_deref(), Some(cli_overrides(&cli))) {
        Ok(config) => config,
        Err(e) => fail("config error", &e.to_string(), e.exit_code()),
    };

    match pipeline::run(&config) {
        Ok(report) => println!("{}", report.to_human()),
        Err(e) => fail(e.kind(), &e.to_string(), e.exit_code()),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    // Only fails if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Flags the user actually passed, as a config layer
fn cli_overrides(cli: &Cli) -> serde_json::Value {
    let mut overrides = serde_json::Map::new();
    if let Some(file) = &cli.file {
        overrides.insert("zap_file".to_string(), file.to_string_lossy().into());
    }
    if let Some(catalog) = &cli.catalog {
        overrides.insert("catalog".to_string(), catalog.clone().into());
    }
    if let Some(mode) = cli.mode {
        overrides.insert("mode".to_string(), mode.to_string().into());
    }
    if cli.dry_run {
        overrides.insert("dry_run".to_string(), true.into());
    }
    serde_json::Value::Object(overrides)
}

fn run_list() {
    let registry = match registry::global() {
        Ok(registry) => registry,
        Err(e) => fail("schema error", &e.to_string(), 4),
    };

    println!("Catalogs: {}", builtin::catalog_names().join(", "));
    println!();
    println!("{:<8} {:<8} {:<32} {:<8} {}", "CLUSTER", "ATTR", "NAME", "TYPE", "DEFAULT");
    for (key, attr) in registry.iter() {
        println!(
            "{:#06x}   {:#06x}   {:<32} {:<8} {}",
            key.cluster, key.attribute, attr.def.name, attr.def.ty, attr.def.default_value
        );
    }

    for profile in builtin::profiles() {
        println!();
        println!(
            "Device settings ({} {}, {:?} existing clusters):",
            profile.manufacturer, profile.model, profile.policy
        );
        for setting in &profile.settings {
            print_setting(setting);
        }
    }
}

fn print_setting(setting: &DeviceSetting) {
    match setting {
        DeviceSetting::Number {
            key,
            min,
            max,
            step,
            unit,
            multiplier,
            ..
        } => {
            let unit = unit.as_deref().unwrap_or("");
            println!(
                "  {:<32} number {}..{} step {} (x{}) {}",
                key, min, max, step, multiplier, unit
            );
        }
        DeviceSetting::Toggle { key, .. } => println!("  {:<32} toggle", key),
    }
}

fn fail(kind: &str, detail: &str, code: i32) -> ! {
    eprintln!("error: {}: {}", kind, detail);
    process::exit(code);
}
