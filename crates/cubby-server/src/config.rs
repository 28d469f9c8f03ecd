//! Server configuration: defaults, TOML file loading, and validation.
//!
//! Resolution order is defaults → TOML file → env vars → CLI flags;
//! the env/CLI half is applied in `main` via clap.

use std::path::Path;

use cubby_protocol::command::{
    DEFAULT_MAX_CLIENT_ID_LEN, DEFAULT_MAX_KEY_LEN, DEFAULT_MAX_VALUE_LEN,
};
use cubby_protocol::FieldLimits;
use serde::{Deserialize, Serialize};

/// Default maximum number of concurrent client connections.
const DEFAULT_MAXCLIENTS: usize = 10_000;

/// Default maximum protocol line length in bytes.
const DEFAULT_MAX_LINE_LEN: usize = 256;

/// Resolved server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CubbyConfig {
    /// address to bind to
    pub bind: String,
    /// port to listen on
    pub port: u16,
    /// maximum number of live sessions in the registry
    pub max_sessions: usize,
    /// maximum key-value entries per session
    pub max_entries: usize,
    /// maximum concurrent client connections (accepted sockets, not
    /// just connected sessions)
    pub maxclients: usize,
    /// maximum protocol line length in bytes, terminator included
    pub max_line_len: usize,
    /// maximum client id length in bytes
    pub max_client_id_len: usize,
    /// maximum key length in bytes
    pub max_key_len: usize,
    /// maximum value length in bytes
    pub max_value_len: usize,
}

impl Default for CubbyConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 7401,
            max_sessions: 5,
            max_entries: 5,
            maxclients: DEFAULT_MAXCLIENTS,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_client_id_len: DEFAULT_MAX_CLIENT_ID_LEN,
            max_key_len: DEFAULT_MAX_KEY_LEN,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
        }
    }
}

impl CubbyConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file '{}': {e}", path.display()))?;
        toml::from_str(&data)
            .map_err(|e| format!("failed to parse config file '{}': {e}", path.display()))
    }

    /// Renders the configuration as TOML, for `--config-template`.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The protocol field limits derived from this config.
    pub fn field_limits(&self) -> FieldLimits {
        FieldLimits {
            max_client_id_len: self.max_client_id_len,
            max_key_len: self.max_key_len,
            max_value_len: self.max_value_len,
        }
    }

    /// Sanity-checks the resolved configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_sessions == 0 {
            return Err("max-sessions must be at least 1".into());
        }
        if self.max_entries == 0 {
            return Err("max-entries must be at least 1".into());
        }
        if self.maxclients == 0 {
            return Err("maxclients must be at least 1".into());
        }
        // the longest legal request must fit in the line buffer:
        // "PUT " + key + " " + value + "\n"
        let put_line = "PUT ".len() + self.max_key_len + 1 + self.max_value_len + 1;
        if self.max_line_len < put_line {
            return Err(format!(
                "max-line-len {} cannot carry a maximal PUT line ({put_line} bytes)",
                self.max_line_len
            ));
        }
        Ok(())
    }
}
