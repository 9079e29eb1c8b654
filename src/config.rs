//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::gateway::GatewaySettings;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "live-timer")]
#[command(about = "A timer session gateway with live countdown activities")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// JSON file used to persist timer state and scheduled notifications
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Title of the notification sent when a countdown finishes
    #[arg(long, default_value = "Timer Complete")]
    pub notification_title: String,

    /// Body of the notification sent when a countdown finishes
    #[arg(long, default_value = "Your timer is complete!")]
    pub notification_body: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Naming used by the gateway for activities and notifications
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            notification_title: self.notification_title.clone(),
            notification_body: self.notification_body.clone(),
            ..GatewaySettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let config = Config::try_parse_from(["live-timer"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
        assert!(config.data_file.is_none());

        let settings = config.gateway_settings();
        assert_eq!(settings.notification_title, "Timer Complete");
        assert_eq!(settings.notification_body, "Your timer is complete!");
        assert_eq!(settings.activity_name, "Timer");
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "live-timer",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--data-file",
            "/tmp/timer.json",
            "--notification-title",
            "Done",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/timer.json")));
        assert_eq!(config.gateway_settings().notification_title, "Done");
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Config::try_parse_from(["live-timer", "--max-activities", "2"]).is_err());
    }
}
