//! Process configuration read from environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use catalog_core::CategoryId;
use catalog_infra::CacheSettings;
use catalog_products::ProductGroup;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String },
}

/// Category ids behind the three product listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCategories {
    pub skin: CategoryId,
    pub hygiene: CategoryId,
    pub home: CategoryId,
}

impl GroupCategories {
    pub fn category_for(&self, group: ProductGroup) -> CategoryId {
        match group {
            ProductGroup::Skin => self.skin,
            ProductGroup::Hygiene => self.hygiene,
            ProductGroup::Home => self.home,
        }
    }
}

impl Default for GroupCategories {
    fn default() -> Self {
        Self {
            skin: ProductGroup::Skin.default_category_id(),
            hygiene: ProductGroup::Hygiene.default_category_id(),
            home: ProductGroup::Home.default_category_id(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub store: StoreConfig,
    pub cache: CacheSettings,
    pub groups: GroupCategories,
}

impl ApiConfig {
    /// In-memory stores and default settings; used by tests and local runs.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: jwt_secret.into(),
            store: StoreConfig::InMemory,
            cache: CacheSettings::default(),
            groups: GroupCategories::default(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let use_persistent = parse_or(&lookup, "USE_PERSISTENT_STORES", false)?;
        let store = match (use_persistent, lookup("DATABASE_URL")) {
            (true, Some(database_url)) => StoreConfig::Postgres { database_url },
            (true, None) => {
                tracing::warn!("USE_PERSISTENT_STORES=true but DATABASE_URL is not set; using in-memory stores");
                StoreConfig::InMemory
            }
            (false, _) => StoreConfig::InMemory,
        };

        let cache = CacheSettings {
            enabled: parse_or(&lookup, "CACHE_ENABLED", true)?,
            ttl: parse_opt::<u64>(&lookup, "CATEGORY_CACHE_TTL_SECS")?.map(Duration::from_secs),
        };

        let defaults = GroupCategories::default();
        let groups = GroupCategories {
            skin: parse_or(&lookup, "SKIN_CATEGORY_ID", defaults.skin)?,
            hygiene: parse_or(&lookup, "HYGIENE_CATEGORY_ID", defaults.hygiene)?,
            home: parse_or(&lookup, "HOME_CATEGORY_ID", defaults.home)?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            store,
            cache,
            groups,
        })
    }
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        _ => Ok(None),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.store, StoreConfig::InMemory);
        assert!(cfg.cache.enabled);
        assert_eq!(cfg.cache.ttl, None);
        assert_eq!(cfg.groups.category_for(ProductGroup::Skin), CategoryId::new(5));
        assert_eq!(cfg.groups.category_for(ProductGroup::Home), CategoryId::new(7));
    }

    #[test]
    fn persistent_store_needs_database_url() {
        let cfg = config(&[("USE_PERSISTENT_STORES", "true")]).unwrap();
        assert_eq!(cfg.store, StoreConfig::InMemory);

        let cfg = config(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
        ])
        .unwrap();
        assert_eq!(
            cfg.store,
            StoreConfig::Postgres {
                database_url: "postgres://localhost/catalog".into()
            }
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("CACHE_ENABLED", "false"),
            ("CATEGORY_CACHE_TTL_SECS", "30"),
            ("HYGIENE_CATEGORY_ID", "12"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert!(!cfg.cache.enabled);
        assert_eq!(cfg.cache.ttl, Some(Duration::from_secs(30)));
        assert_eq!(cfg.groups.hygiene, CategoryId::new(12));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(config(&[("CACHE_ENABLED", "maybe")]).is_err());
        assert!(config(&[("SKIN_CATEGORY_ID", "0")]).is_err());
    }
}
