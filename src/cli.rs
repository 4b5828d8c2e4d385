use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "ioclient")]
#[command(version = "0.1.0")]
#[command(about = "Runs a Wechaty bot together with its Io relay", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml plus environment overlays)
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Relay token, overrides the config file
    #[arg(short, long, env = "IOCLIENT_TOKEN")]
    pub token: Option<String>,

    /// Messaging client profile, overrides the config file
    #[arg(short, long)]
    pub profile: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Bring the bot and the relay up and keep them running until Ctrl+C
    Run,
    /// Load and validate the configuration, then exit
    CheckConfig,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(token) = &self.token {
            config.client.token = Some(token.clone());
        }
        if let Some(profile) = &self.profile {
            config.client.profile = profile.clone();
        }
    }
}
