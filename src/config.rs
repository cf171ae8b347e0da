use anyhow::Context;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set to a production Postgres instance")?;
        let max_connections =
            parse_max_connections(std::env::var("CAREER_PROGRESS_MAX_CONNECTIONS").ok())?;

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

fn parse_max_connections(raw: Option<String>) -> anyhow::Result<u32> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("CAREER_PROGRESS_MAX_CONNECTIONS is not a number: {value}")),
        None => Ok(DEFAULT_MAX_CONNECTIONS),
    }
}
