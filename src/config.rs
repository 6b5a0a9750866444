use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::sync::OnceLock;

use crate::models::ticket::TicketFields;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub zendesk: ZendeskConfig,
    #[serde(default)]
    pub recaptcha: RecaptchaConfig,
    #[serde(default)]
    pub fields: TicketFields,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ZendeskConfig {
    pub endpoint: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RecaptchaConfig {
    #[serde(default)]
    pub site_key: String,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Loads the YAML file, then lets `ZENDESK_API_USER`, `ZENDESK_API_TOKEN`
/// and `RECAPTCHA_SITE_KEY` override it so secrets can stay out of the file.
pub fn init(path: &str) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let mut config = parse(&raw)?;

    if let Ok(user) = env::var("ZENDESK_API_USER") {
        config.zendesk.user = user;
    }
    if let Ok(token) = env::var("ZENDESK_API_TOKEN") {
        config.zendesk.token = token;
    }
    if let Ok(site_key) = env::var("RECAPTCHA_SITE_KEY") {
        config.recaptcha.site_key = site_key;
    }

    if config.zendesk.user.is_empty() || config.zendesk.token.is_empty() {
        bail!(
            "zendesk credentials are empty; set them in {path} or via ZENDESK_API_USER and ZENDESK_API_TOKEN"
        );
    }

    CONFIG.set(config).unwrap();
    Ok(())
}

fn parse(raw: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(raw)?;
    Ok(config)
}

pub fn get() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}
