//! Token lifetime defaults.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Default TTLs, in seconds, per kind of redemption token.
///
/// User tokens are shown on screen and live for minutes. Print tokens end up
/// on paper and must outlast the print-to-redeem delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtlConfig {
    #[serde(default = "default_user_seconds")]
    pub user_seconds: u64,

    #[serde(default = "default_print_seconds")]
    pub print_seconds: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            user_seconds: default_user_seconds(),
            print_seconds: default_print_seconds(),
        }
    }
}

impl TtlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_seconds == 0 || self.print_seconds == 0 {
            return Err(ConfigError::Invalid(
                "ttl values must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_user_seconds() -> u64 {
    300
}

fn default_print_seconds() -> u64 {
    30 * 24 * 60 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let ttl: TtlConfig = serde_yaml::from_str("user_seconds: 120").unwrap();
        assert_eq!(ttl.user_seconds, 120);
        assert_eq!(ttl.print_seconds, 2_592_000);
    }

    #[test]
    fn test_zero_rejected() {
        let ttl = TtlConfig {
            user_seconds: 0,
            print_seconds: 10,
        };
        assert!(ttl.validate().is_err());
    }
}
