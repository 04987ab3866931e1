// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration (`steroids.toml`).
//!
//! A fixed `serde` shape, not a free-form key-value store (distilled spec
//! §9 Design Notes: "No free-form key lookups"). Every field has a
//! documented default so a project with no config file at all still runs
//! with sane behavior.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

fn default_max_batch_size() -> u32 {
    10
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_stale_threshold_ms() -> u64 {
    120_000
}

fn default_invocation_timeout_ms() -> u64 {
    1_800_000
}

fn default_inter_iteration_sleep_ms() -> u64 {
    1_000
}

fn default_wakeup_interval_ms() -> u64 {
    60_000
}

fn default_lease_ttl_ms() -> u64 {
    600_000
}

fn default_credit_poll_interval_ms() -> u64 {
    30_000
}

fn default_credit_poll_max_ms() -> u64 {
    30_000
}

fn default_max_incidents_per_hour() -> u32 {
    4
}

fn default_stuck_in_progress_age_ms() -> u64 {
    7_200_000
}

fn default_stuck_review_age_ms() -> u64 {
    3_600_000
}

fn default_log_retention_days() -> u32 {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiRoleConfig {
    pub provider: String,
    pub model: String,
}

impl Default for AiRoleConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    pub workspace_root: Option<String>,
    pub validation_command: Option<String>,
    #[serde(default = "default_true")]
    pub cleanup_on_success: bool,
    #[serde(default = "default_lease_ttl_ms")]
    pub lease_ttl_ms: u64,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            validation_command: None,
            cleanup_on_success: true,
            lease_ttl_ms: default_lease_ttl_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnersConfig {
    pub daemon_logs: bool,
    pub parallel: ParallelConfig,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default = "default_stale_threshold_ms")]
    pub stale_threshold_ms: u64,
    #[serde(default = "default_invocation_timeout_ms")]
    pub invocation_timeout_ms: u64,
    #[serde(default = "default_inter_iteration_sleep_ms")]
    pub inter_iteration_sleep_ms: u64,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,
}

impl Default for RunnersConfig {
    fn default() -> Self {
        Self {
            daemon_logs: true,
            parallel: ParallelConfig::default(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            stale_threshold_ms: default_stale_threshold_ms(),
            invocation_timeout_ms: default_invocation_timeout_ms(),
            inter_iteration_sleep_ms: default_inter_iteration_sleep_ms(),
            log_retention_days: default_log_retention_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    pub batch_mode: bool,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u32,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            batch_mode: false,
            max_batch_size: default_max_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub remote: String,
    pub branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    #[serde(default = "default_max_incidents_per_hour")]
    pub max_incidents_per_hour: u32,
    #[serde(default = "default_stuck_in_progress_age_ms")]
    pub stuck_in_progress_age_ms: u64,
    #[serde(default = "default_stuck_review_age_ms")]
    pub stuck_review_age_ms: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_incidents_per_hour: default_max_incidents_per_hour(),
            stuck_in_progress_age_ms: default_stuck_in_progress_age_ms(),
            stuck_review_age_ms: default_stuck_review_age_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditConfig {
    #[serde(default = "default_credit_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_credit_poll_max_ms")]
    pub poll_max_wait_ms: u64,
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_credit_poll_interval_ms(),
            poll_max_wait_ms: default_credit_poll_max_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WakeupConfig {
    #[serde(default = "default_wakeup_interval_ms")]
    pub interval_ms: u64,
}

impl Default for WakeupConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_wakeup_interval_ms(),
        }
    }
}

/// Full `steroids.toml` configuration shape.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub runners: RunnersConfig,
    pub sections: SectionsConfig,
    pub ai: HashMap<String, AiRoleConfig>,
    pub git: GitConfig,
    pub recovery: RecoveryConfig,
    pub credit: CreditConfig,
    pub wakeup: WakeupConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load config from a TOML file, falling back to fully-defaulted config
    /// when the file does not exist.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Look up the `(provider, model)` pair configured for a role, falling
    /// back to the role-config default when unset.
    pub fn ai_role(&self, role: &str) -> AiRoleConfig {
        self.ai.get(role).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
