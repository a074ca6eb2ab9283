use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub function_name: String,
    pub db: DbConfig,
}

#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Resolved once at startup; every connection is opened against this URL.
    pub url: String,
}

fn env_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = env_or(&lookup, "DB_HOST", "localhost");
        let port = env_or_parse(&lookup, "DB_PORT", 5432);
        let database = env_or(&lookup, "DB_NAME", "aksgod");
        let user = env_or(&lookup, "DB_USER", "postgres");
        let password = env_or(&lookup, "DB_PASSWORD", "");

        let url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .or_else(|| lookup("POSTGRES_URL").filter(|url| !url.is_empty()))
            .unwrap_or_else(|| {
                format!("postgres://{user}:{password}@{host}:{port}/{database}")
            });

        Self {
            port: env_or_parse(&lookup, "PORT", 3000),
            function_name: env_or(&lookup, "FUNCTION_NAME", "complaints"),
            db: DbConfig { url },
        }
    }
}
