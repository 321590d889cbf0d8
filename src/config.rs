use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without it the service keeps projects in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    /// Platform's own domain; it and its subdomains cannot be used as custom domains.
    pub root_domain: String,
    /// Slugs reserved in addition to the built-in set.
    pub reserved_slugs: Vec<String>,
    pub registrar: RegistrarConfig,
}

#[derive(Debug, Clone)]
pub struct RegistrarConfig {
    pub base_url: String,
    pub token: String,
    pub project_id: String,
    pub team_id: Option<String>,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("LINKDECK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LINKDECK_HOST: {e}"))?;

        let port: u16 = env_or("LINKDECK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LINKDECK_PORT: {e}"))?;

        let max_body_size: usize = env_or("LINKDECK_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid LINKDECK_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("LINKDECK_LOG_LEVEL", "info");

        let root_domain = env_or("LINKDECK_ROOT_DOMAIN", "dub.sh")
            .trim()
            .to_lowercase();
        if root_domain.is_empty() {
            return Err("LINKDECK_ROOT_DOMAIN must not be empty".to_string());
        }

        let reserved_slugs: Vec<String> = env_or("LINKDECK_RESERVED_SLUGS", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let registrar = RegistrarConfig {
            base_url: env_or("LINKDECK_REGISTRAR_URL", "https://api.vercel.com"),
            token: env_required("LINKDECK_REGISTRAR_TOKEN")?,
            project_id: env_required("LINKDECK_REGISTRAR_PROJECT_ID")?,
            team_id: std::env::var("LINKDECK_REGISTRAR_TEAM_ID")
                .ok()
                .filter(|s| !s.is_empty()),
            timeout_secs: env_or("LINKDECK_REGISTRAR_TIMEOUT_SECS", "30")
                .parse()
                .map_err(|e| format!("Invalid LINKDECK_REGISTRAR_TIMEOUT_SECS: {e}"))?,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            max_body_size,
            log_level,
            root_domain,
            reserved_slugs,
            registrar,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
