use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::is_local_endpoint_url;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9002/";
const DEFAULT_DOMAIN: &str = "example.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoint_url: String,
    pub domain: String,
    pub cookie_path: PathBuf,
    pub reload_command: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let endpoint_url =
            std::env::var("BADGE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let domain = std::env::var("BADGE_DOMAIN").unwrap_or_else(|_| DEFAULT_DOMAIN.to_string());
        let cookie_path = match std::env::var("BADGE_COOKIE_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_cookie_path()?,
        };
        let reload_command = std::env::var("BADGE_RELOAD_COMMAND").ok().and_then(|v| {
            if v.trim().is_empty() {
                None
            } else {
                Some(v)
            }
        });

        Ok(Self {
            endpoint_url,
            domain,
            cookie_path,
            reload_command,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://") {
            bail!(
                "Invalid BADGE_ENDPOINT '{}': expected http:// or https:// URL",
                self.endpoint_url
            );
        }

        let domain = self.domain.trim();
        if domain.is_empty() {
            bail!("BADGE_DOMAIN must not be empty");
        }
        if domain.contains('/') || domain.chars().any(char::is_whitespace) {
            bail!("Invalid BADGE_DOMAIN '{}': expected a bare host name", self.domain);
        }

        if !is_local_endpoint_url(&self.endpoint_url) {
            eprintln!(
                "warning: BADGE_ENDPOINT '{}' is not a local dev server",
                self.endpoint_url
            );
        }

        Ok(())
    }
}

fn default_cookie_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("no user config directory; set BADGE_COOKIE_PATH")?;
    Ok(base.join("buildbadge").join("cookies.json"))
}
