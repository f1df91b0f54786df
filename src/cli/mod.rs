mod employees;
mod install;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::core::terminal::{self, GuideSection, print_error};
use crate::core::{blobs::BlobStore, events, store::Store};
use crate::interfaces::web::ApiServer;

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Core")
        .command("serve", "Run the monitoring API server")
        .print();

    GuideSection::new("Setup")
        .command("install", "Create the data directory and database")
        .print();

    GuideSection::new("Roster")
        .command("employee add <name>", "Register an employee (--code, --device)")
        .command("employee list", "Show the roster")
        .command("employee rotate-key <code>", "Issue a fresh agent API key")
        .command("employee remove <code>", "Delete an employee and their records")
        .print();

    println!(
        "\n {} {} <command> [flags]\n",
        style("Usage:").bold(),
        style("vigil").green()
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeFlags {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config_path: Option<PathBuf>,
}

pub(crate) fn parse_serve_flags(args: &[String], start: usize) -> ServeFlags {
    let mut flags = ServeFlags {
        host: None,
        port: None,
        config_path: None,
    };
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                if i + 1 < args.len() {
                    flags.host = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--port" => {
                if i + 1 < args.len() {
                    flags.port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    flags.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    flags
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" => serve(&args).await,
        "install" => install::run_install().await,
        "employee" => employees::run_employee_command(&args).await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            print_error(&format!("Unknown command: {}", other));
            print_help();
            Ok(())
        }
    }
}

async fn serve(args: &[String]) -> Result<()> {
    let flags = parse_serve_flags(args, 2);
    let mut config = Config::load(flags.config_path.as_deref())?;
    if let Some(host) = flags.host {
        config.api_host = host;
    }
    if let Some(port) = flags.port {
        config.api_port = port;
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    tokio::fs::create_dir_all(&config.data_dir).await?;
    tokio::fs::create_dir_all(config.screenshots_dir()).await?;

    let store = Arc::new(Store::open(config.db_path()).await?);
    let blobs = Arc::new(BlobStore::new(config.screenshots_dir()));
    let event_tx = events::channel();

    // Without a configured token the operator surface would be wide open;
    // mint one per boot and show it once.
    let (operator_token, generated) = match config.operator_token.clone() {
        Some(token) => (token, false),
        None => (uuid::Uuid::new_v4().to_string(), true),
    };

    let mut section = GuideSection::new("Vigil API")
        .status(
            "Endpoint",
            &format!(
                "{}",
                style(format!("http://{}:{}", config.api_host, config.api_port))
                    .underlined()
                    .cyan()
            ),
        )
        .status("Data directory", &config.data_dir.display().to_string());
    if generated {
        section = section.blank().info(&format!(
            "Operator token (per-boot, set operator_token in config.toml to pin): {}",
            style(&operator_token).bold().yellow()
        ));
    }
    section.print();
    println!();

    ApiServer::new(
        store,
        blobs,
        event_tx,
        operator_token,
        config.api_host.clone(),
        config.api_port,
    )
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn serve_flags_parse_host_port_and_config() {
        let flags = parse_serve_flags(
            &args(&[
                "vigil", "serve", "--host", "0.0.0.0", "--port", "9001", "--config",
                "/etc/vigil.toml",
            ]),
            2,
        );
        assert_eq!(flags.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(flags.port, Some(9001));
        assert_eq!(flags.config_path.as_deref(), Some(std::path::Path::new("/etc/vigil.toml")));
    }

    #[test]
    fn serve_flags_ignore_unknown_and_trailing() {
        let flags = parse_serve_flags(&args(&["vigil", "serve", "--verbose", "--port"]), 2);
        assert_eq!(flags.host, None);
        assert_eq!(flags.port, None);
    }

    #[test]
    fn serve_flags_reject_malformed_port() {
        let flags = parse_serve_flags(&args(&["vigil", "serve", "--port", "not-a-port"]), 2);
        assert_eq!(flags.port, None);
    }
}
