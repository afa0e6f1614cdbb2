use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use crate::hwaddr::HardwareAddress;
use crate::layer4::{BroadcastTarget, SendOptions, DEFAULT_TIMEOUT};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/wol-sender.yml";

/// Deserializes an absent field as None and an unset field as T::default.
///
/// This avoid having Option<Option<T>> as in serde_with::rust::double_option
pub fn deserialize_absent_or_null<'de, D, T: Default>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.or(Some(T::default())))
}


#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    pub broadcast: Option<BroadcastTarget>,
    pub bind_addr: Ipv4Addr,
    pub timeout_ms: u64,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            broadcast: None,
            bind_addr: Ipv4Addr::UNSPECIFIED,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        }
    }
}

impl SendConfig {
    pub fn options(&self) -> SendOptions {
        SendOptions {
            bind_addr: self.bind_addr,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HostConfig {
    pub mac: HardwareAddress,
    pub broadcast: Option<BroadcastTarget>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_absent_or_null")]
    pub send: Option<SendConfig>,

    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,
}

impl Config {
    pub fn parse(s: &str) -> Result<Self> {
        // an empty document deserializes as unit, not as an empty map
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(s)?)
    }

    /// Loads the config at `path` (`~` and env vars expanded). A missing file yields the default config.
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::full(path)
            .with_context(|| format!("unable to expand config path '{}'", path))?;
        let path = Path::new(expanded.as_ref());

        if !path.exists() {
            log::debug!("config file '{}' not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config file '{}'", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid config file '{}'", path.display()))
    }

    pub fn send_config(&self) -> SendConfig {
        self.send.clone().unwrap_or_default()
    }

    pub fn host(&self, name: &str) -> Option<&HostConfig> {
        self.hosts.get(name)
    }
}
