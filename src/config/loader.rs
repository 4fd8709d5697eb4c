//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::LotteryConfig;
use crate::config::validation::{validate_config, CommandKind, ValidationError, WorkflowConfig};

/// File read when no `--config` path is given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "lottery.toml";

/// Environment variables layered over the file.
pub const ENV_NODE_ENDPOINT: &str = "NODE_ENDPOINT";
pub const ENV_ACCOUNT_ADDRESS: &str = "ACCOUNT_ADDRESS";
pub const ENV_ACCOUNT_PRIVATE_KEY: &str = "ACCOUNT_PRIVATE_KEY";
pub const ENV_CONTRACT_ADDRESS: &str = "LOTTERY_CONTRACT_ADDRESS";
pub const ENV_CHAIN_ID: &str = "CHAIN_ID";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, value } => {
                write!(f, "Invalid value '{}' for environment variable {}", value, key)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Load configuration from a TOML file.
///
/// With no explicit path, [`DEFAULT_CONFIG_FILE`] is read when present and
/// built-in defaults are used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<LotteryConfig, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                tracing::debug!("No configuration file, using defaults");
                return Ok(LotteryConfig::default());
            }
            default
        }
    };

    let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
    let config: LotteryConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    tracing::debug!(path = %path.display(), "Configuration file loaded");
    Ok(config)
}

/// Overlay environment variables on `config`.
///
/// `lookup` resolves a variable name; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut LotteryConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(endpoint) = get(ENV_NODE_ENDPOINT) {
        config.network.endpoint = endpoint;
    }
    if let Some(address) = get(ENV_ACCOUNT_ADDRESS) {
        config.account.address = address;
    }
    if let Some(key) = get(ENV_ACCOUNT_PRIVATE_KEY) {
        config.account.private_key = key;
    }
    if let Some(address) = get(ENV_CONTRACT_ADDRESS) {
        config.contract.address = Some(address);
    }
    if let Some(chain_id) = get(ENV_CHAIN_ID) {
        let parsed = chain_id.trim().parse::<u64>().map_err(|_| ConfigError::Env {
            key: ENV_CHAIN_ID,
            value: chain_id.clone(),
        })?;
        config.network.chain_id = Some(parsed);
    }
    Ok(())
}

/// Load, overlay the process environment and validate for `command`.
pub fn load_workflow_config(
    path: Option<&Path>,
    command: CommandKind,
) -> Result<WorkflowConfig, ConfigError> {
    let mut config = load_config(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config, command).map_err(ConfigError::Validation)
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

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lottery.toml");
        std::fs::write(
            &path,
            r#"
            [network]
            endpoint = "http://127.0.0.1:7545"

            [contract]
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            build_dir = "out"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.network.endpoint, "http://127.0.0.1:7545");
        assert_eq!(config.contract.build_dir, "out");
        assert_eq!(config.contract.source, "contracts/Lottery.sol");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some(Path::new("/nonexistent/lottery.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
        assert!(err.to_string().contains("/nonexistent/lottery.toml"));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[network\nendpoint = 1").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = LotteryConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_NODE_ENDPOINT, "http://node:8545"),
                (ENV_ACCOUNT_PRIVATE_KEY, "0x01"),
                (ENV_CONTRACT_ADDRESS, "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
                (ENV_CHAIN_ID, "1337"),
                (ENV_ACCOUNT_ADDRESS, ""),
            ]),
        )
        .unwrap();

        assert_eq!(config.network.endpoint, "http://node:8545");
        assert_eq!(config.network.chain_id, Some(1337));
        assert_eq!(config.account.private_key, "0x01");
        assert!(config.account.address.is_empty());
        assert!(config.contract.address.is_some());
    }

    #[test]
    fn test_bad_chain_id_env() {
        let mut config = LotteryConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_CHAIN_ID, "goerli")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: ENV_CHAIN_ID, .. }));
    }

    #[test]
    fn test_validation_display_lists_every_error() {
        let err = ConfigError::Validation(vec![
            ValidationError {
                field: "network.endpoint",
                message: "bad".to_string(),
            },
            ValidationError {
                field: "lottery.gas_limit",
                message: "too low".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: network.endpoint: bad, lottery.gas_limit: too low"
        );
    }
}
