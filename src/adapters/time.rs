//! ESP32 time adapter.
//!
//! Provides monotonic time queries plus the wall-clock minute-of-day
//! the lighting schedule needs.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic)
//!   and `gettimeofday`/`localtime_r` for the wall clock.
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation; the wall clock reads as unsynced.

/// Time adapter for the ESP32-S3 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Current minute-of-day (0–1439) from the system clock.
    /// `None` if the wall clock is not synced (e.g. pre-NTP).
    #[cfg(target_os = "espidf")]
    pub fn minute_of_day(&self) -> Option<u16> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        // Reject obviously unsynced time (e.g. before 2020-01-01)
        const EPOCH_2020: i64 = 1_577_836_800;
        if tv.tv_sec < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        if !(0..24).contains(&tm.tm_hour) || !(0..60).contains(&tm.tm_min) {
            return None;
        }
        Some((tm.tm_hour * 60 + tm.tm_min) as u16)
    }

    /// Current minute-of-day. On non-ESP targets (simulation) always `None`.
    #[cfg(not(target_os = "espidf"))]
    pub fn minute_of_day(&self) -> Option<u16> {
        None
    }
}
