use anyhow::Result;

use crate::config::{Config, default_data_dir};
use crate::core::store::Store;
use crate::core::terminal::{print_info, print_status, print_success};

/// First-time setup: data directory, database schema, and a starter
/// config.toml with a pinned operator token.
pub(crate) async fn run_install() -> Result<()> {
    let data_dir = default_data_dir();
    tokio::fs::create_dir_all(&data_dir).await?;

    let config_path = data_dir.join("config.toml");
    if !config_path.exists() {
        let operator_token = uuid::Uuid::new_v4().to_string();
        let starter = format!(
            "# Vigil server configuration\n\
             api_host = \"127.0.0.1\"\n\
             api_port = 8642\n\
             operator_token = \"{}\"\n",
            operator_token
        );
        tokio::fs::write(&config_path, starter).await?;
        print_status("Operator token", &operator_token);
    } else {
        print_info("Existing config.toml kept.");
    }

    let config = Config::load(Some(&config_path))?;
    tokio::fs::create_dir_all(config.screenshots_dir()).await?;
    Store::open(config.db_path()).await?;

    print_status("Data directory", &data_dir.display().to_string());
    print_status("Database", &config.db_path().display().to_string());
    print_success("Vigil is installed. Run 'vigil serve' to start the API.");
    Ok(())
}
