use std::env;

use dotenv::dotenv;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN environment variable is required")]
    MissingToken,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    /// When set, the bot registers `{public_url}/telegram` as its webhook;
    /// otherwise it long-polls.
    pub public_url: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let token = env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        let public_url = env::var("PUBLIC_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_owned());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        Ok(Self {
            token,
            public_url,
            port,
        })
    }
}
