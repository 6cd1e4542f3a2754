//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Directory holding one subtree per user id.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    /// Staging directory the upload transport writes into.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
    /// Maximum upload size in bytes (default 10 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Prefix of the public locators attached to listed files.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Upper bound on collision-avoidance candidates tried per upload.
    #[serde(default = "default_max_name_attempts")]
    pub max_name_attempts: u32,
}

impl StorageConfig {
    /// Storage config with every directory placed under `base`.
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            data_root: base.display().to_string(),
            root_dir: base.join("users").display().to_string(),
            temp_dir: base.join("temp").display().to_string(),
            ..Self::default()
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            root_dir: default_root_dir(),
            temp_dir: default_temp_dir(),
            max_upload_size_bytes: default_max_upload(),
            public_base_url: default_public_base_url(),
            max_name_attempts: default_max_name_attempts(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_root_dir() -> String {
    "./data/uploads".to_string()
}

fn default_temp_dir() -> String {
    "./data/temp".to_string()
}

fn default_max_upload() -> u64 {
    10_737_418_240 // 10 GB
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_name_attempts() -> u32 {
    1000
}
