//! Configuration validation.
//!
//! Serde handles syntax; this checks values that would otherwise only fail
//! at the first chain call. Every problem is reported, not just the first.

use std::net::SocketAddr;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("contract.address '{0}' is not a valid address")]
    ContractAddress(String),

    #[error("RPC URL '{0}' is not a valid URL")]
    RpcUrl(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("chain.max_poll_interval_ms ({max}) is below chain.poll_interval_ms ({base})")]
    PollRange { base: u64, max: u64 },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::ContractAddress(
            config.contract.address.clone(),
        ));
    }

    let chain = &config.chain;
    for rpc in std::iter::once(&chain.rpc_url).chain(chain.failover_urls.iter()) {
        if rpc.parse::<url::Url>().is_err() {
            errors.push(ValidationError::RpcUrl(rpc.clone()));
        }
    }

    let positive = [
        ("chain.chain_id", chain.chain_id),
        ("chain.rpc_timeout_secs", chain.rpc_timeout_secs),
        ("chain.confirmation_blocks", u64::from(chain.confirmation_blocks)),
        ("chain.poll_interval_ms", chain.poll_interval_ms),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if chain.max_poll_interval_ms < chain.poll_interval_ms {
        errors.push(ValidationError::PollRange {
            base: chain.poll_interval_ms,
            max: chain.max_poll_interval_ms,
        });
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.contract.address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_needs_contract_address() {
        let errors = validate_config(&AppConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ContractAddress(String::new())]);
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid_config();
        config.chain.failover_urls.push("not a url".to_string());
        config.chain.rpc_timeout_secs = 0;
        config.chain.confirmation_blocks = 0;
        config.chain.max_poll_interval_ms = 10;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "localhost".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::Zero {
            field: "chain.rpc_timeout_secs"
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::PollRange { .. })));
    }
}
