use anyhow::Context;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    /// Reads `.env.local` and `.env` (when present) before the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        for file in [".env.local", ".env"] {
            if dotenvy::from_filename(file).is_ok() {
                tracing::debug!(file, "loaded environment file");
            }
        }

        Self::from_values(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("FACILITY_DB_MAX_CONNECTIONS").ok(),
        )
    }

    fn from_values(
        database_url: Option<String>,
        max_connections: Option<String>,
    ) -> anyhow::Result<Self> {
        let database_url = database_url
            .filter(|url| !url.trim().is_empty())
            .context("DATABASE_URL must be set to the facility Postgres instance")?;

        let max_connections = match max_connections {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .with_context(|| {
                    format!("FACILITY_DB_MAX_CONNECTIONS must be a positive integer, got {raw:?}")
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Config {
            database_url,
            max_connections,
        })
    }
}
