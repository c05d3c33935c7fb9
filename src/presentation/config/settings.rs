use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub base_url: Option<String>,
}

impl Settings {
    /// Loads from environment variables. `DATABASE_URL` and
    /// `JWT_SECRET_KEY` are required, everything else has a default.
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: parsed_env_or("SERVER_PORT", 8000)?,
            },
            database: DatabaseSettings {
                url: required_env("DATABASE_URL")?,
                max_connections: parsed_env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            auth: AuthSettings {
                jwt_secret: required_env("JWT_SECRET_KEY")?,
            },
            llm: LlmSettings {
                api_key: env_or("ANTHROPIC_API_KEY", ""),
                model: env_or("ANTHROPIC_MODEL", "claude-3-haiku-20240307"),
                max_tokens: parsed_env_or("ANTHROPIC_MAX_TOKENS", 4000)?,
                base_url: std::env::var("ANTHROPIC_BASE_URL").ok(),
            },
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required_env(name: &str) -> Result<String, SettingsError> {
    std::env::var(name).map_err(|_| SettingsError::MissingVariable(name.to_string()))
}

fn parsed_env_or<T>(name: &str, default: T) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| SettingsError::InvalidVariable(name.to_string())),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing environment variable: {0}")]
    MissingVariable(String),
    #[error("invalid value for environment variable: {0}")]
    InvalidVariable(String),
}
