use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::integrity::IntegrityEnforcer;
use crate::record::MembershipTierDraft;
use crate::storage::Store;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Tiers inserted into every fresh store
    pub membership_tiers: Vec<TierSeed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSeed {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_posts_limit: Option<i64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            membership_tiers: default_tiers(),
        }
    }
}

impl ServiceConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_tiers() -> Vec<TierSeed> {
    vec![
        TierSeed {
            id: "basic".to_string(),
            discount: Some(0.0),
            month_posts_limit: Some(20),
        },
        TierSeed {
            id: "business".to_string(),
            discount: Some(5.0),
            month_posts_limit: Some(100),
        },
    ]
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("socialgraph.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ServiceConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ServiceConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ServiceConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Build a fresh store holding the configured membership tiers
pub fn seed_store(config: &ServiceConfig) -> crate::Result<Store> {
    let mut store = Store::new();
    let mut enforcer = IntegrityEnforcer::new(&mut store);
    for tier in &config.membership_tiers {
        enforcer.seed_membership_tier(
            tier.id.clone(),
            MembershipTierDraft {
                discount: tier.discount,
                month_posts_limit: tier.month_posts_limit,
            },
        )?;
    }
    Ok(store)
}
