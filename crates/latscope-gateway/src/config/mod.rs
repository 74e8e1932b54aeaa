//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use latscope_core::error::{LatscopeError, Result};

pub use schema::{Adapter, DatasetSection, GatewayConfig, GatewaySection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<GatewayConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| LatscopeError::Internal(format!("read config failed: {e}")))?;
    let mut cfg = load_from_str(&s)?;
    cfg.base_dir = path.parent().map(Path::to_path_buf);
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| LatscopeError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if it exists, otherwise fall back to built-in defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<GatewayConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_from_file(path);
    }
    tracing::warn!(path = %path.display(), "config file not found, using defaults");
    Ok(GatewayConfig::default())
}
