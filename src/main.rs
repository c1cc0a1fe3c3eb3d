use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dnspod_ddns::{
    config::Settings,
    daemon,
    ip::{DnsLookup, ExternalIpGetter, PublicIpSource, SystemResolver},
};

#[derive(Parser)]
#[command(name = "dnspod-ddns")]
#[command(about = "DNSPod dynamic DNS client - keeps a record pointed at this host's public IP")]
#[command(version)]
struct Cli {
    /// Config file (.toml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon to keep the DNS record up to date
    Daemon,

    /// Check the record's current address and the public IP
    Check,

    /// Show configuration file location and contents
    Config,
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Settings::config_path);
    let settings = Settings::load(&config_path);

    // Initialize logging with config level or default
    let log_level = settings
        .as_ref()
        .map(|s| s.log_level.as_str())
        .unwrap_or("info");
    init_logging(log_level);

    match cli.command {
        Commands::Daemon => {
            let settings = settings?;
            settings.validate()?;
            info!(
                "Loaded config from {}: {:?}",
                config_path.display(),
                settings.redacted()
            );
            daemon::run(settings).await?;
        }

        Commands::Check => {
            check_status(&settings?).await?;
        }

        Commands::Config => {
            show_config(&config_path, settings)?;
        }
    }

    Ok(())
}

async fn check_status(settings: &Settings) -> Result<()> {
    let hostname = settings.hostname();
    println!("Checking {}...\n", hostname);

    match SystemResolver.lookup_ip(&hostname).await {
        Ok(ips) if ips.is_empty() => println!("DNS record: no addresses"),
        Ok(ips) => {
            let ips: Vec<String> = ips.iter().map(ToString::to_string).collect();
            println!("DNS record: {}", ips.join(", "));
        }
        Err(e) => println!("DNS record: Error - {}", e),
    }

    match settings.external_ip_getter.urls.first() {
        Some(url) => {
            let getter = ExternalIpGetter::new(url.clone())?;
            match getter.public_ip().await {
                Ok(ip) => println!("Public IP ({}): {}", url, ip),
                Err(e) => println!("Public IP ({}): Error - {}", url, e),
            }
        }
        None => println!("Public IP: no external IP getter URL configured"),
    }

    if !settings.external_ip_getter.enabled {
        println!("\nExternal IP getter is disabled; the daemon updates on every tick.");
    }

    Ok(())
}

fn show_config(config_path: &Path, settings: Result<Settings>) -> Result<()> {
    println!("Configuration file location: {}\n", config_path.display());

    match settings {
        Ok(s) => {
            println!("Current configuration:\n");
            println!("{}", toml::to_string_pretty(&s.redacted())?);
            if let Err(e) = s.validate() {
                println!("Configuration is invalid: {}", e);
            }
        }
        Err(e) => {
            println!("Configuration could not be loaded: {:#}", e);
            println!("\nCreate a configuration file at the location above.");
            println!("Example configuration:\n");
            println!(
                r#"interval_seconds = 300
secret_id = "AKID..."
secret_key = "..."
update_at_startup = true
log_level = "info"

domain = "example.com"
sub_domain = "home"
record_id = 12345
record_line = "默认"
ttl = 600

[external_ip_getter]
enabled = true
urls = ["https://api.ipify.org"]
"#
            );
        }
    }

    Ok(())
}
