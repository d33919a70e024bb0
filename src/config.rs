use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Project ids or slugs that back the platform itself and may never be deleted.
    pub internal_projects: Vec<String>,
    pub digests: DigestConfig,
    /// Seconds between a delete request and the purge of the project.
    pub deletion_delay_secs: i64,
    pub worker_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct DigestConfig {
    pub minimum_delay: i64,
    pub maximum_delay: i64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            minimum_delay: 5 * 60,
            maximum_delay: 30 * 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("PROJECTCONF_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid PROJECTCONF_HOST: {e}"))?;

        let port: u16 = env_or("PROJECTCONF_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PROJECTCONF_PORT: {e}"))?;

        let log_level = env_or("PROJECTCONF_LOG_LEVEL", "info");

        let internal_projects: Vec<String> = env_or("PROJECTCONF_INTERNAL_PROJECTS", "")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let defaults = DigestConfig::default();
        let minimum_delay: i64 = env_or(
            "PROJECTCONF_DIGESTS_MIN_DELAY",
            &defaults.minimum_delay.to_string(),
        )
        .parse()
        .map_err(|e| format!("Invalid PROJECTCONF_DIGESTS_MIN_DELAY: {e}"))?;
        let maximum_delay: i64 = env_or(
            "PROJECTCONF_DIGESTS_MAX_DELAY",
            &defaults.maximum_delay.to_string(),
        )
        .parse()
        .map_err(|e| format!("Invalid PROJECTCONF_DIGESTS_MAX_DELAY: {e}"))?;
        if maximum_delay < minimum_delay {
            return Err(
                "PROJECTCONF_DIGESTS_MAX_DELAY must not be lower than PROJECTCONF_DIGESTS_MIN_DELAY"
                    .to_string(),
            );
        }

        let deletion_delay_secs: i64 = env_or("PROJECTCONF_DELETION_DELAY", "3600")
            .parse()
            .map_err(|e| format!("Invalid PROJECTCONF_DELETION_DELAY: {e}"))?;

        let worker_count: usize = env_or("PROJECTCONF_WORKER_COUNT", "1")
            .parse()
            .map_err(|e| format!("Invalid PROJECTCONF_WORKER_COUNT: {e}"))?;

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            log_level,
            internal_projects,
            digests: DigestConfig {
                minimum_delay,
                maximum_delay,
            },
            deletion_delay_secs,
            worker_count: worker_count.max(1),
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
