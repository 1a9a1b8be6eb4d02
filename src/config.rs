// nm-reconcile - Configuration Loader
// SPDX-License-Identifier: MIT

//! Desired-state configuration loading.
//!
//! The configuration is a YAML sequence of desired-connection mappings,
//! supplied inline through an environment variable or read from a fixed
//! fallback path. Failure to obtain or parse it is fatal: reconciliation
//! never starts without a desired state.

use std::env;
use std::path::Path;

use tracing::info;

use crate::models::{DesiredConnection, Error, Result};

/// Environment variable holding the YAML document inline.
pub const CONFIG_ENV_VAR: &str = "NM_RECONCILE_CONFIG";

/// Fallback configuration path when the environment variable is unset.
pub const CONFIG_FALLBACK_PATH: &str = "/etc/nm-reconcile.yaml";

/// Load the desired-connection list from the environment or the fallback file.
pub fn load_desired_connections() -> Result<Vec<DesiredConnection>> {
    let yaml = match env::var(CONFIG_ENV_VAR) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => {
            info!(
                "Configuration not found in environment variable '{}'; trying {}",
                CONFIG_ENV_VAR, CONFIG_FALLBACK_PATH
            );
            read_config_file(CONFIG_FALLBACK_PATH)?
        }
    };
    parse_desired_connections(&yaml)
}

fn read_config_file(path: &str) -> Result<String> {
    if !Path::new(path).is_file() {
        return Err(Error::ConfigNotFound(path.to_string()));
    }
    std::fs::read_to_string(path)
        .map_err(|e| Error::ConfigReadFailed(format!("{}: {}", path, e)))
}

/// Parse a YAML document into desired-connection records.
pub fn parse_desired_connections(yaml: &str) -> Result<Vec<DesiredConnection>> {
    let desired: Vec<DesiredConnection> = serde_yaml::from_str(yaml)?;
    Ok(desired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence() {
        let yaml = r#"
- name: lan0
  iface: eth0
  method: manual
  ipv4: 192.168.1.10
- name: uplink
  iface: eth1
  method: auto
"#;
        let desired = parse_desired_connections(yaml).unwrap();
        assert_eq!(desired.len(), 2);
        assert_eq!(desired[0].name, "lan0");
        assert_eq!(desired[0].ipv4.as_deref(), Some("192.168.1.10"));
        assert_eq!(desired[1].name, "uplink");
        assert_eq!(desired[1].ipv4, None);
    }

    #[test]
    fn test_parse_empty_sequence() {
        let desired = parse_desired_connections("[]").unwrap();
        assert!(desired.is_empty());
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let err = parse_desired_connections("- name: [unterminated").unwrap_err();
        assert!(matches!(err, Error::ConfigParseFailed(_)));
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let yaml = "- name: lan0\n  method: auto\n";
        assert!(parse_desired_connections(yaml).is_err());
    }

    #[test]
    fn test_missing_fallback_file() {
        let err = read_config_file("/nonexistent/nm-reconcile.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
