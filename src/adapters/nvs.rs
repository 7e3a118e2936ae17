//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`]: the [`SystemConfig`] is stored as a single
//! postcard blob under `blindrelay/syscfg`.
//!
//! - **`target_os = "espidf"`**: `EspNvs` on the default NVS partition.
//! - **`not(target_os = "espidf")`**: in-memory map for host tests.

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;
use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &str = "blindrelay";
const CONFIG_KEY: &str = "syscfg";

/// Upper bound on the encoded config (strings dominate: 24 + 32 + 64).
const MAX_BLOB_SIZE: usize = 256;

pub struct NvsAdapter {
    #[cfg(target_os = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, Vec<u8>>,
}

impl NvsAdapter {
    /// Open the config namespace.
    #[cfg(target_os = "espidf")]
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, ConfigError> {
        let nvs = EspNvs::new(partition, CONFIG_NAMESPACE, true).map_err(|e| {
            warn!("NvsAdapter: open '{}' failed: {}", CONFIG_NAMESPACE, e);
            ConfigError::IoError
        })?;
        info!("NvsAdapter: namespace '{}' open", CONFIG_NAMESPACE);
        Ok(Self { nvs })
    }

    /// In-memory store.
    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, ConfigError> {
        info!("NvsAdapter: simulation backend");
        Ok(Self {
            store: HashMap::new(),
        })
    }

    /// Raw stored blob, `None` when nothing was saved yet.
    #[cfg(target_os = "espidf")]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.nvs.get_raw(CONFIG_KEY, &mut buf) {
            Ok(found) => Ok(found.map(<[u8]>::to_vec)),
            Err(e) => {
                warn!("NvsAdapter: read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        Ok(self.store.get(CONFIG_KEY).cloned())
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.nvs.set_raw(CONFIG_KEY, bytes).map(|_| ()).map_err(|e| {
            warn!("NvsAdapter: write error {}", e);
            ConfigError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.store.insert(CONFIG_KEY.into(), bytes.to_vec());
        Ok(())
    }

    /// Overwrite the stored blob with arbitrary bytes.
    #[cfg(all(test, not(target_os = "espidf")))]
    fn corrupt(&mut self, bytes: &[u8]) {
        self.store.insert(CONFIG_KEY.into(), bytes.to_vec());
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        match self.read_blob()? {
            Some(bytes) => {
                let cfg: SystemConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            None => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::IoError);
        }
        self.write_blob(&bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_yields_defaults() {
        let nvs = NvsAdapter::new().unwrap();
        assert_eq!(nvs.load().unwrap(), SystemConfig::default());
    }

    #[test]
    fn save_then_load() {
        let mut nvs = NvsAdapter::new().unwrap();
        let cfg = SystemConfig {
            channel_count: 5,
            active_duration_ms: 45_000,
            ..SystemConfig::default()
        };
        nvs.save(&cfg).unwrap();
        assert_eq!(nvs.load().unwrap(), cfg);
    }

    #[test]
    fn refuses_to_persist_invalid_config() {
        let mut nvs = NvsAdapter::new().unwrap();
        let cfg = SystemConfig {
            channel_count: 12,
            ..SystemConfig::default()
        };
        assert!(matches!(
            nvs.save(&cfg),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert_eq!(nvs.load().unwrap(), SystemConfig::default());
    }

    #[test]
    fn garbage_blob_is_reported_corrupted() {
        let mut nvs = NvsAdapter::new().unwrap();
        nvs.corrupt(&[0xFF; 3]);
        assert_eq!(nvs.load(), Err(ConfigError::Corrupted));
    }

    #[test]
    fn default_config_fits_blob_limit() {
        let mut cfg = SystemConfig::default();
        cfg.wifi_ssid.push_str(&"s".repeat(32)).unwrap();
        cfg.wifi_password.push_str(&"p".repeat(64)).unwrap();
        assert!(postcard::to_allocvec(&cfg).unwrap().len() <= MAX_BLOB_SIZE);
    }
}
