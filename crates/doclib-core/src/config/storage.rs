//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root path for local blob storage.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum upload size in bytes (default 2 GB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Upload timeout in seconds. A write that exceeds this leaves no
    /// partial asset row behind.
    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
            upload_timeout_seconds: default_upload_timeout(),
        }
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_max_upload() -> u64 {
    2_147_483_648 // 2 GB
}

fn default_upload_timeout() -> u64 {
    300
}
