use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub mastodon_token: String,
    pub mastodon_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let mastodon_token = env::var("MASTODON_TOKEN").context(
            "Missing environment variable: MASTODON_TOKEN\n\n\
                To fix this, create ~/.config/mastodon-digest/.env with:\n  \
                MASTODON_TOKEN=your_token_here\n  \
                MASTODON_BASE_URL=https://your.instance\n\n\
                Create a token under Preferences > Development on your Mastodon instance \
                (read scope is enough).",
        )?;

        let mastodon_base_url = env::var("MASTODON_BASE_URL").context(
            "Missing environment variable: MASTODON_BASE_URL\n\n\
                Set it to the address of your Mastodon instance, e.g. https://mastodon.social",
        )?;

        Self::from_values(&mastodon_token, &mastodon_base_url)
    }

    pub(crate) fn from_values(mastodon_token: &str, mastodon_base_url: &str) -> Result<Self> {
        let mastodon_token = mastodon_token.trim();
        if mastodon_token.is_empty() {
            anyhow::bail!("Missing environment variable: MASTODON_TOKEN");
        }

        let mastodon_base_url = format_base_url(mastodon_base_url);
        if mastodon_base_url.is_empty() {
            anyhow::bail!("Missing environment variable: MASTODON_BASE_URL");
        }

        Ok(Self {
            mastodon_token: mastodon_token.to_string(),
            mastodon_base_url,
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/mastodon-digest/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("mastodon-digest").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() && dotenvy::from_path(&home_path).is_ok() {
                return;
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
        tracing::debug!("no .env file found, relying on the process environment");
    }
}

/// Strip surrounding whitespace and trailing slashes so paths can be appended.
pub fn format_base_url(mastodon_base_url: &str) -> String {
    mastodon_base_url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_base_url() {
        assert_eq!(
            format_base_url("  https://mastodon.social/ \n"),
            "https://mastodon.social"
        );
        assert_eq!(format_base_url("https://a.b//"), "https://a.b");
        assert_eq!(format_base_url("https://a.b"), "https://a.b");
    }

    #[test]
    fn test_from_values_normalizes() {
        let config = Config::from_values(" token ", "https://mastodon.social/").unwrap();
        assert_eq!(config.mastodon_token, "token");
        assert_eq!(config.mastodon_base_url, "https://mastodon.social");
    }

    #[test]
    fn test_from_values_rejects_blank() {
        assert!(Config::from_values("", "https://mastodon.social").is_err());
        assert!(Config::from_values("token", " / ").is_err());
    }
}
