//! Triage service configuration.
//!
//! Configuration lives in a TOML file; every field has a default so a
//! missing or partial file still yields a working single-user setup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TRIAGE_CONFIG";
const CONFIG_FILE: &str = "/etc/triage/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Address the web API binds to. Localhost only by default.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory holding the built frontend assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Mapping table used when a request does not upload its own.
    #[serde(default = "default_mappings_path")]
    pub mappings_path: PathBuf,

    /// Upper bound on uploaded file size, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default)]
    pub auth: AuthSettings,
}

/// Credentials for the single permitted user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_username")]
    pub username: String,

    /// SHA-256 hex digest of the password.
    #[serde(default = "default_password_sha256")]
    pub password_sha256: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("frontend/dist")
}

fn default_mappings_path() -> PathBuf {
    PathBuf::from("error_mappings.csv")
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024 // 100 MB
}

fn default_username() -> String {
    "sameer".to_string()
}

fn default_password_sha256() -> String {
    // Digest of the stock password; override in deployment config.
    "37aa5e2e518ef59f582146ba2c85d9883f4043753e54acfd5036b4e9d29c7f2a".to_string()
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            username: default_username(),
            password_sha256: default_password_sha256(),
        }
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            static_dir: default_static_dir(),
            mappings_path: default_mappings_path(),
            max_upload_bytes: default_max_upload_bytes(),
            auth: AuthSettings::default(),
        }
    }
}

impl TriageConfig {
    /// Load from `$TRIAGE_CONFIG` or the system path, falling back to
    /// defaults when the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Invalid config at '{}': {} (using defaults)", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
