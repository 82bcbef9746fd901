//! NVS-backed configuration storage (ESP-IDF only).
//!
//! Persists the [`SystemConfig`] as a postcard blob in the default NVS
//! partition.  Handles are opened per operation through the raw IDF
//! API, which keeps the [`ConfigPort`] contract `&self` without
//! interior mutability.  Every save re-validates first: a degenerate
//! config must never reach flash, or the node would refuse to boot
//! with it.

use core::ffi::CStr;

use esp_idf_svc::sys::{
    nvs_close, nvs_commit, nvs_get_blob, nvs_open, nvs_open_mode_t_NVS_READONLY,
    nvs_open_mode_t_NVS_READWRITE, nvs_set_blob, ESP_ERR_NVS_NOT_FOUND, ESP_OK,
};
use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

const NAMESPACE: &CStr = c"aquanode";
const CONFIG_KEY: &CStr = c"syscfg";
const MAX_BLOB_SIZE: usize = 1024;

/// Config adapter over the default NVS partition.
pub struct NvsConfigStore;

impl NvsConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Open a namespace handle, run `f`, close the handle.
    fn with_handle<T>(
        write: bool,
        f: impl FnOnce(u32) -> Result<T, i32>,
    ) -> Result<T, i32> {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: u32 = 0;
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }
}

impl ConfigPort for NvsConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let result = Self::with_handle(false, |handle| {
            // First call: get size
            let mut size: usize = 0;
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    CONFIG_KEY.as_ptr(),
                    core::ptr::null_mut(),
                    &mut size,
                )
            };
            if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                return Err(ret);
            }

            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    CONFIG_KEY.as_ptr(),
                    buf.as_mut_ptr().cast(),
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => {
                let config: SystemConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                if let Err(e) = config.validate() {
                    warn!("stored config failed validation ({e}) — using defaults");
                    return Ok(SystemConfig::default());
                }
                info!("loaded config from NVS ({} bytes)", bytes.len());
                Ok(config)
            }
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                info!("no stored config — using defaults");
                Ok(SystemConfig::default())
            }
            Err(e) => {
                warn!("NVS read error {e} — using defaults");
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        if config.validate().is_err() {
            return Err(ConfigError::ValidationFailed(
                "refusing to persist an invalid config",
            ));
        }
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        let result = Self::with_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    CONFIG_KEY.as_ptr(),
                    bytes.as_ptr().cast(),
                    bytes.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });

        match result {
            Ok(()) => {
                info!("config saved to NVS ({} bytes)", bytes.len());
                Ok(())
            }
            Err(e) => {
                warn!("NVS write error {e}");
                Err(ConfigError::IoError)
            }
        }
    }
}
