use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

/// JWT settings shared by the gateway and every microservice.
/// All of them must agree on `jwt_secret` and `issuer`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Accepted clock skew when checking `exp`.
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

fn default_token_ttl() -> u64 { 3600 }
fn default_issuer() -> String { "biques".into() }
fn default_leeway() -> u64 { 30 }

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            issuer: default_issuer(),
            leeway_secs: default_leeway(),
        }
    }
}

/// Downstream microservices the gateway forwards to.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_users_url")]
    pub users_url: String,
    #[serde(default = "default_orders_url")]
    pub orders_url: String,
    #[serde(default = "default_products_url")]
    pub products_url: String,
    #[serde(default = "default_gw_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_gw_request_timeout")]
    pub request_timeout_secs: u64,
    /// Mint a fresh token for each downstream call instead of forwarding the caller's.
    #[serde(default = "default_reissue")]
    pub reissue_downstream_token: bool,
}

fn default_users_url() -> String { "http://127.0.0.1:8081".into() }
fn default_orders_url() -> String { "http://127.0.0.1:8082".into() }
fn default_products_url() -> String { "http://127.0.0.1:8083".into() }
fn default_gw_connect_timeout() -> u64 { 5 }
fn default_gw_request_timeout() -> u64 { 30 }
fn default_reissue() -> bool { true }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            users_url: default_users_url(),
            orders_url: default_orders_url(),
            products_url: default_products_url(),
            connect_timeout_secs: default_gw_connect_timeout(),
            request_timeout_secs: default_gw_request_timeout(),
            reissue_downstream_token: default_reissue(),
        }
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Defaults plus `SERVER_HOST`, `SERVER_PORT`, `TOKIO_WORKER_THREADS`,
    /// the `*_URL` upstreams, `DATABASE_URL` and `JWT_SECRET`, for running
    /// without a config file.
    pub fn from_env(default_port: u16) -> Result<Self> {
        let mut cfg = AppConfig::default();
        cfg.server.port = default_port;
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            cfg.server.port = port.parse().map_err(|_| anyhow!("SERVER_PORT must be a port number"))?;
        }
        if let Some(n) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(n);
        }
        for (var, slot) in [
            ("USERS_URL", &mut cfg.gateway.users_url),
            ("ORDERS_URL", &mut cfg.gateway.orders_url),
            ("PRODUCTS_URL", &mut cfg.gateway.products_url),
        ] {
            if let Ok(url) = std::env::var(var) {
                *slot = url;
            }
        }
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file when one exists at `CONFIG_PATH`, environment otherwise.
    pub fn load_or_env(default_port: u16) -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        if std::path::Path::new(&path).exists() {
            let mut cfg = load_from_file(&path)?;
            cfg.normalize_and_validate()?;
            Ok(cfg)
        } else {
            Self::from_env(default_port)
        }
    }

    /// Normalizes and validates the sections every process needs
    /// (`server`, `auth`). `database` and `gateway` are validated by the
    /// processes that use them.
    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.database.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_secs == 0 {
            return Err(anyhow!("auth.token_ttl_secs must be positive"));
        }
        if self.issuer.trim().is_empty() {
            return Err(anyhow!("auth.issuer must not be empty"));
        }
        Ok(())
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("users_url", &self.users_url), ("orders_url", &self.orders_url), ("products_url", &self.products_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow!("gateway.{name} must start with http(s)://"));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("gateway.request_timeout_secs must be positive"));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8081

            [database]
            url = "postgres://u:p@localhost:5432/users"

            [auth]
            jwt_secret = "s3cret"
            token_ttl_secs = 120

            [gateway]
            users_url = "http://users:8081"
            reissue_downstream_token = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.auth.token_ttl_secs, 120);
        assert_eq!(cfg.auth.issuer, "biques");
        assert_eq!(cfg.gateway.users_url, "http://users:8081");
        assert_eq!(cfg.gateway.orders_url, "http://127.0.0.1:8082");
        assert!(!cfg.gateway.reissue_downstream_token);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
        assert_eq!(cfg.auth.leeway_secs, 30);
        assert!(cfg.gateway.reissue_downstream_token);
        assert_eq!(cfg.gateway.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn database_url_scheme_is_checked() {
        let mut db = DatabaseConfig { url: "mysql://x".into(), min_connections: 1, max_connections: 2, connect_timeout_secs: 1, acquire_timeout_secs: 1, ..Default::default() };
        assert!(db.validate().is_err());
        db.url = "sqlite://data/users.db?mode=rwc".into();
        assert!(db.validate().is_ok());
    }

    #[test]
    fn pool_bounds_are_checked() {
        let db = DatabaseConfig { url: "postgres://x".into(), min_connections: 5, max_connections: 2, connect_timeout_secs: 1, acquire_timeout_secs: 1, ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn auth_requires_secret() {
        let auth = AuthConfig { jwt_secret: "  ".into(), ..Default::default() };
        assert!(auth.validate().is_err());
        let auth = AuthConfig { jwt_secret: "x".into(), ..Default::default() };
        assert!(auth.validate().is_ok());
    }

    #[test]
    fn server_port_zero_rejected() {
        let mut s = ServerConfig { host: String::new(), port: 0, worker_threads: None };
        assert!(s.normalize().is_err());
        s.port = 1;
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
    }

    #[test]
    fn gateway_urls_must_be_http() {
        let gw = GatewayConfig { users_url: "users:8081".into(), ..Default::default() };
        assert!(gw.validate().is_err());
        assert!(GatewayConfig::default().validate().is_ok());
    }
}
