use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use latscope_core::error::{LatscopeError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub dataset: DatasetSection,

    /// Directory of the config file; relative dataset paths resolve against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            dataset: DatasetSection::default(),
            base_dir: None,
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LatscopeError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.dataset.validate()?;

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.gateway.listen_addr()
    }

    /// Dataset location, resolved against the config file's directory.
    pub fn dataset_path(&self) -> PathBuf {
        let p = Path::new(&self.dataset.path);
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }
}

/// Which HTTP front end serves `/api/latency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adapter {
    /// axum router.
    #[default]
    Framework,
    /// Hand-rolled HTTP/1.1 over raw TCP.
    Raw,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub adapter: Adapter,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            adapter: Adapter::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1..=16 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(LatscopeError::BadRequest(
                "gateway.max_body_bytes must be between 1 and 16777216".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            LatscopeError::BadRequest(format!(
                "gateway.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSection {
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

impl Default for DatasetSection {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl DatasetSection {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(LatscopeError::BadRequest("dataset.path must not be empty".into()));
        }
        Ok(())
    }
}

fn default_dataset_path() -> String {
    "q-vercel-latency.json".into()
}
