//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`].  Both sit on four
//! blob primitives (`get_blob`, `put_blob`, `erase_blob`, `has_blob`):
//!
//! - **`target_os = "espidf"`**: ESP-IDF NVS blobs, one `nvs_open` per call.
//!   Commits are atomic per `nvs_commit()`.
//! - **`not(target_os = "espidf")`**: in-memory `HashMap` for host tests
//!   and simulation.
//!
//! The analyzer config is one postcard blob, validated before it is saved.

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::AnalyzerConfig;
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::{cell::RefCell, collections::HashMap};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub const CONFIG_NAMESPACE: &str = "bootcause";
pub const CONFIG_KEY: &str = "anacfg";

const MAX_CONFIG_SIZE: usize = 128;

/// NVS keys and namespaces are limited to 15 characters.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const MAX_NAME_LEN: usize = 15;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<HashMap<(String, String), Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.  A full or outdated partition is erased once
    /// and initialised again.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS use.
            let mut rc = unsafe { nvs_flash_init() };
            if rc == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || rc == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NvsAdapter: partition unusable (rc={}), erasing", rc);
                rc = unsafe { nvs_flash_erase() };
                if rc == ESP_OK {
                    rc = unsafe { nvs_flash_init() };
                }
            }
            if rc != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self::unpersisted())
    }

    /// Adapter for when [`new`](Self::new) failed.  On the device every
    /// call reports an I/O error; the simulation backend is unaffected.
    pub fn unpersisted() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            store: RefCell::new(HashMap::new()),
        }
    }

    /// NUL-terminated copy of an NVS name, truncated to the NVS limit.
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    fn c_name(name: &str) -> [u8; MAX_NAME_LEN + 1] {
        let mut buf = [0u8; MAX_NAME_LEN + 1];
        let len = name.len().min(MAX_NAME_LEN);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        buf
    }

    /// Run `f` with an open handle on `namespace` and the C name of `key`.
    #[cfg(target_os = "espidf")]
    fn with_handle<T>(
        namespace: &str,
        key: &str,
        mode: nvs_open_mode_t,
        f: impl FnOnce(nvs_handle_t, *const core::ffi::c_char) -> esp_err_t,
        ok: T,
    ) -> Result<T, StorageError> {
        let ns = Self::c_name(namespace);
        let c_key = Self::c_name(key);
        let mut handle: nvs_handle_t = 0;

        let mut rc = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if rc == ESP_OK {
            rc = f(handle, c_key.as_ptr().cast());
            if rc == ESP_OK && mode == nvs_open_mode_t_NVS_READWRITE {
                rc = unsafe { nvs_commit(handle) };
            }
            unsafe { nvs_close(handle) };
        }

        match rc {
            rc if rc == ESP_OK => Ok(ok),
            rc if rc == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Err(StorageError::NotFound),
            rc if rc == ESP_ERR_NVS_NOT_ENOUGH_SPACE as esp_err_t => Err(StorageError::Full),
            rc => {
                warn!("NvsAdapter: '{}/{}' failed (rc={})", namespace, key, rc);
                Err(StorageError::IoError)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn get_blob(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let mut size = buf.len();
        Self::with_handle(
            namespace,
            key,
            nvs_open_mode_t_NVS_READONLY,
            |handle, key| unsafe { nvs_get_blob(handle, key, buf.as_mut_ptr().cast(), &mut size) },
            (),
        )?;
        Ok(size)
    }

    #[cfg(not(target_os = "espidf"))]
    fn get_blob(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let store = self.store.borrow();
        let data = store
            .get(&(namespace.to_owned(), key.to_owned()))
            .ok_or(StorageError::NotFound)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    #[cfg(target_os = "espidf")]
    fn put_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        Self::with_handle(
            namespace,
            key,
            nvs_open_mode_t_NVS_READWRITE,
            |handle, key| unsafe { nvs_set_blob(handle, key, data.as_ptr().cast(), data.len()) },
            (),
        )
    }

    #[cfg(not(target_os = "espidf"))]
    fn put_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .insert((namespace.to_owned(), key.to_owned()), data.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn erase_blob(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        match Self::with_handle(
            namespace,
            key,
            nvs_open_mode_t_NVS_READWRITE,
            |handle, key| unsafe { nvs_erase_key(handle, key) },
            (),
        ) {
            Err(StorageError::NotFound) => Ok(()),
            other => other,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn erase_blob(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store
            .borrow_mut()
            .remove(&(namespace.to_owned(), key.to_owned()));
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn has_blob(&self, namespace: &str, key: &str) -> bool {
        Self::with_handle(
            namespace,
            key,
            nvs_open_mode_t_NVS_READONLY,
            |handle, key| unsafe { nvs_find_key(handle, key, core::ptr::null_mut()) },
            true,
        )
        .unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn has_blob(&self, namespace: &str, key: &str) -> bool {
        self.store
            .borrow()
            .contains_key(&(namespace.to_owned(), key.to_owned()))
    }
}

pub(crate) fn validate_config(cfg: &AnalyzerConfig) -> Result<(), ConfigError> {
    fn has_duplicates<T: PartialEq>(items: &[T]) -> bool {
        items
            .iter()
            .enumerate()
            .any(|(i, item)| items[i + 1..].contains(item))
    }

    if !(1..=1000).contains(&cfg.max_wake_cycles) {
        return Err(ConfigError::ValidationFailed("max_wake_cycles must be 1–1000"));
    }
    let domains: heapless::Vec<_, { crate::power::MAX_PLAN_ENTRIES }> =
        cfg.power_domains.iter().map(|entry| entry.domain).collect();
    if has_duplicates(&domains) {
        return Err(ConfigError::ValidationFailed("power_domains must list each domain once"));
    }
    if has_duplicates(&cfg.reset_reasons) {
        return Err(ConfigError::ValidationFailed("reset_reasons must list each reason once"));
    }
    if has_duplicates(&cfg.wakeup_causes) {
        return Err(ConfigError::ValidationFailed("wakeup_causes must list each cause once"));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    /// Missing or unreadable storage yields the defaults; a blob that does
    /// not decode is [`ConfigError::Corrupted`].
    fn load(&self) -> Result<AnalyzerConfig, ConfigError> {
        let mut buf = [0u8; MAX_CONFIG_SIZE];
        match self.get_blob(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let cfg = postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config ({} bytes)", len);
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(AnalyzerConfig::default())
            }
            Err(e) => {
                warn!("NvsAdapter: config read failed ({}), using defaults", e);
                Ok(AnalyzerConfig::default())
            }
        }
    }

    fn save(&self, config: &AnalyzerConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let mut buf = [0u8; MAX_CONFIG_SIZE];
        let bytes = postcard::to_slice(config, &mut buf).map_err(|_| ConfigError::IoError)?;
        self.put_blob(CONFIG_NAMESPACE, CONFIG_KEY, bytes)
            .map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        self.get_blob(namespace, key, buf)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.put_blob(namespace, key, data)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.erase_blob(namespace, key)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.has_blob(namespace, key)
    }
}
