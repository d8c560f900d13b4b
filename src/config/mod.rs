#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "whisky-catalog")]
#[command(about = "Manage a flat-file whisky catalog and notify subscribers of changes")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file; defaults are used when omitted")]
    pub config: Option<String>,

    #[arg(long, help = "Override catalog.csv_path from the configuration")]
    pub csv_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: cli::Command,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_app_config(&self) -> crate::Result<toml_config::AppConfig> {
        let mut config = match &self.config {
            Some(path) => toml_config::AppConfig::from_file(path)?,
            None => toml_config::AppConfig::default(),
        };

        if let Some(csv_path) = &self.csv_path {
            config.catalog.csv_path = csv_path.clone();
        }

        Ok(config)
    }
}
