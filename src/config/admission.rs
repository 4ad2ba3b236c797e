//! Admission service configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::admission::RetryPolicy;

/// Ledger backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBackendConfig {
    /// In-memory ledger for development/testing.
    InMemory,
    /// Postgres-backed ledger.
    Postgres,
}

/// Audit sink selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditBackendConfig {
    /// No decision auditing.
    Disabled,
    /// Bounded in-memory buffer.
    InMemory,
    /// Postgres audit log.
    Postgres,
}

/// Per-facility admission configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Total attempts for transient ledger faults inside a critical section.
    pub max_retry_attempts: u32,
    /// Base backoff between retries in milliseconds; doubles per retry.
    pub retry_backoff_ms: u64,
    /// Ledger backend selection.
    pub ledger: LedgerBackendConfig,
    /// Audit sink selection.
    pub audit: AuditBackendConfig,
}

/// Root configuration: one admission setup per facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Map of facility name to configuration.
    pub facilities: HashMap<String, AdmissionConfig>,
}

impl AdmissionConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retry_attempts == 0 {
            return Err("max_retry_attempts must be greater than 0".into());
        }
        if self.retry_backoff_ms == 0 {
            return Err("retry_backoff_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// The retry policy this configuration describes.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

impl ServiceConfig {
    /// Validate all facilities and ensure at least one exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.facilities.is_empty() {
            return Err("at least one facility must be defined".into());
        }
        for (name, facility) in &self.facilities {
            facility
                .validate()
                .map_err(|e| format!("facility `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse service configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AdmissionConfig {
        AdmissionConfig {
            max_retry_attempts: 3,
            retry_backoff_ms: 25,
            ledger: LedgerBackendConfig::InMemory,
            audit: AuditBackendConfig::Disabled,
        }
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let mut cfg = valid();
        cfg.max_retry_attempts = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_backoff() {
        let mut cfg = valid();
        cfg.retry_backoff_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_retry_policy_mapping() {
        let policy = valid().retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(25));
    }

    #[test]
    fn test_service_config_requires_facility() {
        let cfg = ServiceConfig {
            facilities: HashMap::new(),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_json_str() {
        let cfg = ServiceConfig::from_json_str(
            r#"{
                "facilities": {
                    "downtown": {
                        "max_retry_attempts": 3,
                        "retry_backoff_ms": 25,
                        "ledger": "postgres",
                        "audit": "in_memory"
                    }
                }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            cfg.facilities["downtown"].ledger,
            LedgerBackendConfig::Postgres
        ));
    }

    #[test]
    fn test_from_json_str_rejects_invalid() {
        let err = ServiceConfig::from_json_str(
            r#"{
                "facilities": {
                    "downtown": {
                        "max_retry_attempts": 0,
                        "retry_backoff_ms": 25,
                        "ledger": "in_memory",
                        "audit": "disabled"
                    }
                }
            }"#,
        )
        .unwrap_err();
        assert!(err.contains("downtown"));
    }
}
