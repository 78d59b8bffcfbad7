//! Configuration loading and representation.
//!
//! Everything comes from environment variables. `from_lookup` takes the
//! lookup as a function so tests do not have to mutate the process env.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use skusync_core::ShopDomain;

pub const ENV_BIND_ADDR: &str = "SKUSYNC_BIND_ADDR";
pub const ENV_API_SECRET: &str = "SHOPIFY_API_SECRET";
pub const ENV_SHOP_DOMAIN: &str = "SHOPIFY_SHOP_DOMAIN";
pub const ENV_ACCESS_TOKEN: &str = "SHOPIFY_ADMIN_ACCESS_TOKEN";
pub const ENV_API_VERSION: &str = "SHOPIFY_API_VERSION";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "SKUSYNC_HTTP_TIMEOUT_SECS";
pub const ENV_ECHO_GUARD_TTL_SECS: &str = "SKUSYNC_ECHO_GUARD_TTL_SECS";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_API_VERSION: &str = "2025-01";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {detail}")]
    Invalid { key: &'static str, detail: String },
}

/// Admin API access for one shop.
#[derive(Clone, PartialEq, Eq)]
pub struct ShopConfig {
    pub domain: ShopDomain,
    pub access_token: String,
    pub api_version: String,
}

impl ShopConfig {
    /// GraphQL Admin API endpoint of this shop.
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.domain, self.api_version
        )
    }
}

impl core::fmt::Debug for ShopConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShopConfig")
            .field("domain", &self.domain)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Webhook signing secret.
    pub api_secret: String,
    pub shop: ShopConfig,
    /// Per-request timeout of catalog HTTP calls.
    pub http_timeout: Duration,
    /// `None` disables echo suppression.
    pub echo_guard_ttl: Option<Duration>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_secret", &"<redacted>")
            .field("shop", &self.shop)
            .field("http_timeout", &self.http_timeout)
            .field("echo_guard_ttl", &self.echo_guard_ttl)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let invalid = |key: &'static str, detail: String| ConfigError::Invalid { key, detail };

        let bind_addr = get(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid(ENV_BIND_ADDR, e.to_string()))?;

        let domain = required(ENV_SHOP_DOMAIN)?
            .parse::<ShopDomain>()
            .map_err(|e| invalid(ENV_SHOP_DOMAIN, e.to_string()))?;

        let secs = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match get(key) {
                None => Ok(default),
                Some(v) => v.parse::<u64>().map_err(|e| invalid(key, e.to_string())),
            }
        };

        let http_timeout = match secs(ENV_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS)? {
            0 => return Err(invalid(ENV_HTTP_TIMEOUT_SECS, "must be greater than 0".into())),
            n => Duration::from_secs(n),
        };
        let echo_guard_ttl = match secs(ENV_ECHO_GUARD_TTL_SECS, 0)? {
            0 => None,
            n => Some(Duration::from_secs(n)),
        };

        Ok(Self {
            bind_addr,
            api_secret: required(ENV_API_SECRET)?,
            shop: ShopConfig {
                domain,
                access_token: required(ENV_ACCESS_TOKEN)?,
                api_version: get(ENV_API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            },
            http_timeout,
            echo_guard_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_API_SECRET, "hush"),
            (ENV_SHOP_DOMAIN, "Acme.myshopify.com"),
            (ENV_ACCESS_TOKEN, "shpat_123"),
        ]
    }

    #[test]
    fn defaults_apply_when_optional_settings_are_absent() {
        let cfg = AppConfig::from_lookup(env(&minimal())).unwrap();
        assert_eq!(cfg.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(cfg.shop.domain.as_str(), "acme.myshopify.com");
        assert_eq!(cfg.shop.api_version, DEFAULT_API_VERSION);
        assert_eq!(cfg.http_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        assert_eq!(cfg.echo_guard_ttl, None);
        assert_eq!(
            cfg.shop.graphql_endpoint(),
            "https://acme.myshopify.com/admin/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn missing_required_setting_is_reported() {
        let mut pairs = minimal();
        pairs.retain(|(k, _)| *k != ENV_ACCESS_TOKEN);
        assert_eq!(
            AppConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Missing(ENV_ACCESS_TOKEN))
        );
    }

    #[test]
    fn numeric_settings_are_validated() {
        let mut pairs = minimal();
        pairs.push((ENV_ECHO_GUARD_TTL_SECS, "soon"));
        assert!(matches!(
            AppConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { key: ENV_ECHO_GUARD_TTL_SECS, .. })
        ));

        let mut pairs = minimal();
        pairs.push((ENV_HTTP_TIMEOUT_SECS, "0"));
        assert!(matches!(
            AppConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Invalid { key: ENV_HTTP_TIMEOUT_SECS, .. })
        ));
    }

    #[test]
    fn echo_guard_ttl_enables_guard() {
        let mut pairs = minimal();
        pairs.push((ENV_ECHO_GUARD_TTL_SECS, "30"));
        let cfg = AppConfig::from_lookup(env(&pairs)).unwrap();
        assert_eq!(cfg.echo_guard_ttl, Some(Duration::from_secs(30)));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = AppConfig::from_lookup(env(&minimal())).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("hush"));
        assert!(!dbg.contains("shpat_123"));
    }
}
