// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Import configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Settings for building the import resolver chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Auxiliary directories searched after the primary file's directory.
    pub import_dirs: Vec<PathBuf>,
    /// Whether `http(s)://` imports are fetched.
    pub network_imports: bool,
    /// Timeout for a single network fetch.
    pub fetch_timeout: Duration,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            import_dirs: Vec::new(),
            network_imports: true,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl ImportConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `FLOWPORT_IMPORT_PATH`: `:`-separated import directories (default: none)
    /// - `FLOWPORT_NETWORK_IMPORTS`: `true` or `false` (default: true)
    /// - `FLOWPORT_FETCH_TIMEOUT_SECS`: fetch timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let import_dirs = std::env::var("FLOWPORT_IMPORT_PATH")
            .map(|v| {
                v.split(':')
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default();

        let network_imports = match std::env::var("FLOWPORT_NETWORK_IMPORTS") {
            Err(_) => true,
            Ok(v) => match v.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid(
                        "FLOWPORT_NETWORK_IMPORTS",
                        "must be true or false",
                    ));
                }
            },
        };

        let timeout_secs: u64 = std::env::var("FLOWPORT_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::Invalid(
                "FLOWPORT_FETCH_TIMEOUT_SECS",
                "must be a positive integer",
            ))?;

        Ok(Self {
            import_dirs,
            network_imports,
            fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
