//! Fee configuration loading
//!
//! Policies and limit tiers live in a JSON document fetched from the policy
//! store. The document is validated once on load so the engine only ever
//! sees well-formed policies.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::limits::TransferLimits;
use crate::policy::FeePolicy;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "FO3_FEES_CONFIG";

/// Name of the limits tier used when none is requested
pub const DEFAULT_LIMITS_TIER: &str = "default";

/// Fee policies and named transfer limit tiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(default)]
    pub policies: Vec<FeePolicy>,
    #[serde(default)]
    pub limits: HashMap<String, TransferLimits>,
}

impl FeeConfig {
    /// Parse and validate a configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FeeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading fee configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        info!(
            policies = config.policies.len(),
            limit_tiers = config.limits.len(),
            "Fee configuration loaded"
        );
        Ok(config)
    }

    /// Load the file named by `FO3_FEES_CONFIG`
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", CONFIG_PATH_ENV)))?;
        Self::from_file(path)
    }

    /// Validate every policy and limits tier, and reject duplicate policy ids
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for policy in &self.policies {
            if !seen.insert(policy.id) {
                return Err(Error::Config(format!("duplicate policy id {}", policy.id)));
            }
            policy.validate()?;
        }

        for (tier, limits) in &self.limits {
            limits
                .validate()
                .map_err(|e| Error::Config(format!("limits tier '{}': {}", tier, e)))?;
        }

        debug!(policies = self.policies.len(), "Fee configuration validated");
        Ok(())
    }

    pub fn policy(&self, id: &Uuid) -> Result<&FeePolicy> {
        self.policies
            .iter()
            .find(|policy| policy.id == *id)
            .ok_or_else(|| Error::NotFound(format!("fee policy {}", id)))
    }

    /// The policy to apply at `now`.
    ///
    /// Among effective policies the one with the latest `effective_from`
    /// wins, an open start counting as earliest. Ties keep declaration order.
    pub fn effective_policy(&self, now: DateTime<Utc>) -> Option<&FeePolicy> {
        self.policies
            .iter()
            .filter(|policy| policy.is_effective(now))
            .fold(None, |best: Option<&FeePolicy>, candidate| match best {
                Some(current) if candidate.effective_from <= current.effective_from => Some(current),
                _ => Some(candidate),
            })
    }

    /// Limits for `tier`
    pub fn limits_for(&self, tier: &str) -> Result<&TransferLimits> {
        self.limits
            .get(tier)
            .ok_or_else(|| Error::NotFound(format!("limits tier '{}'", tier)))
    }
}
