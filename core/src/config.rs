use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_LOG_FILTER: &str = "RX_LOG_FILTER";
pub const ENV_AUDIT_LOG: &str = "RX_AUDIT_LOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Whether a severe interaction may be overridden by a pharmacist acknowledgement.
    pub allow_severe_override: bool,
    /// Whether `dispense` requires a recorded pharmacist approval.
    pub require_pharmacist_sign_off: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            allow_severe_override: true,
            require_pharmacist_sign_off: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PharmacyConfig {
    pub workflow: WorkflowConfig,
    pub log_filter: String,
    pub audit_log_path: Option<PathBuf>,
    /// JSON array of prescriber records; the built-in seed is used when unset.
    pub prescriber_registry_path: Option<PathBuf>,
    /// JSON array of stock batches; the demo ledger is used when unset.
    pub stock_path: Option<PathBuf>,
}

impl Default for PharmacyConfig {
    fn default() -> Self {
        Self {
            workflow: WorkflowConfig::default(),
            log_filter: "info".to_string(),
            audit_log_path: None,
            prescriber_registry_path: None,
            stock_path: None,
        }
    }
}

impl PharmacyConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let cfg: PharmacyConfig = serde_json::from_slice(&bytes).map_err(|e| {
            CoreError::Config(format!("{} is not a valid config: {}", path.display(), e))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Applies `RX_LOG_FILTER` / `RX_AUDIT_LOG` when set.
    pub fn with_env_overrides(self) -> CoreResult<Self> {
        self.with_overrides(|k| std::env::var(k).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        if let Some(filter) = lookup(ENV_LOG_FILTER) {
            self.log_filter = filter;
        }
        if let Some(path) = lookup(ENV_AUDIT_LOG) {
            self.audit_log_path = Some(PathBuf::from(path));
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.log_filter.trim().is_empty() {
            return Err(CoreError::Config("log_filter must not be empty".to_string()));
        }
        if let Some(p) = &self.audit_log_path {
            if p.as_os_str().is_empty() {
                return Err(CoreError::Config("audit_log_path must not be empty".to_string()));
            }
        }
        Ok(())
    }
}
