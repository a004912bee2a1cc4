use std::time::Duration;

use regex::Regex;

use crate::monitor::MonitorConfig;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub host_url: String,
    pub host_token: Option<String>,
    pub space_id: String,
    pub channel_pattern: Regex,
    pub liveness_window: Duration,
    pub sampler_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let host_url = std::env::var("WARDEN_HOST_URL").expect("WARDEN_HOST_URL is required");
        let space_id = std::env::var("WARDEN_SPACE_ID").expect("WARDEN_SPACE_ID is required");
        let channel_pattern = std::env::var("WARDEN_CHANNEL_PATTERN")
            .expect("WARDEN_CHANNEL_PATTERN is required");
        let channel_pattern = Regex::new(&channel_pattern)
            .expect("WARDEN_CHANNEL_PATTERN must be a valid regex");

        let liveness_window = std::env::var("WARDEN_LIVENESS_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let sampler_interval = std::env::var("WARDEN_SAMPLER_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(39180),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:warden.db?mode=rwc".to_string()),
            host_url,
            host_token: std::env::var("WARDEN_HOST_TOKEN").ok(),
            space_id,
            channel_pattern,
            liveness_window: Duration::from_secs(liveness_window),
            sampler_interval: Duration::from_millis(sampler_interval),
        }
    }

    /// The subset of settings the membership monitor owns.
    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig {
            space_id: self.space_id.clone(),
            channel_pattern: self.channel_pattern.clone(),
            liveness_window: self.liveness_window,
            sampler_interval: self.sampler_interval,
        }
    }
}
