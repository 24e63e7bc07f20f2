use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub api_timeout_secs: u64,
    pub tick_interval_ms: u64,
    pub routes: RouteConfig,
}

/// Locations views fall back to
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RouteConfig {
    pub login: String,
    pub user_home: String,
    pub admin_home: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            user_home: "/user".to_string(),
            admin_home: "/admin".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Local .env is optional
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables (APP_API__BASE_URL -> api.base_url)
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let api_base_url = settings
            .get_string("api.base_url")
            .or_else(|_| env::var("API_BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:8000/api/".to_string());

        let api_token = settings
            .get_string("api.token")
            .or_else(|_| env::var("API_TOKEN"))
            .ok()
            .filter(|token| !token.is_empty());

        let api_timeout_secs = settings
            .get_int("api.timeout_secs")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| env_u64("API_TIMEOUT_SECS"))
            .filter(|v| *v > 0)
            .unwrap_or(30);

        let tick_interval_ms = settings
            .get_int("clock.tick_interval_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| env_u64("CLOCK_TICK_INTERVAL_MS"))
            .filter(|v| *v > 0)
            .unwrap_or(1000);

        let defaults = RouteConfig::default();
        let routes = RouteConfig {
            login: settings
                .get_string("routes.login")
                .or_else(|_| env::var("LOGIN_ROUTE"))
                .unwrap_or(defaults.login),
            user_home: settings
                .get_string("routes.user_home")
                .or_else(|_| env::var("USER_HOME_ROUTE"))
                .unwrap_or(defaults.user_home),
            admin_home: settings
                .get_string("routes.admin_home")
                .or_else(|_| env::var("ADMIN_HOME_ROUTE"))
                .unwrap_or(defaults.admin_home),
        };

        if api_token.is_none() {
            tracing::warn!("API_TOKEN is not set, requests will be anonymous");
        }

        Ok(Config {
            api_base_url,
            api_token,
            api_timeout_secs,
            tick_interval_ms,
            routes,
        })
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse::<u64>().ok())
}
