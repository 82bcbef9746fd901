//! System configuration parameters
//!
//! All tunable parameters for the AquaNode control unit.
//! Values can be overridden via NVS or a remote config update; every
//! mutation path runs [`SystemConfig::validate`] first, and the firmware
//! refuses to start on an invalid config rather than oscillate at runtime.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Control loop ---
    /// Evaluation period (milliseconds) — same cadence as sensor sampling
    pub control_loop_interval_ms: u32,
    /// Snapshot age (milliseconds) after which the staleness flag is raised
    pub snapshot_stale_after_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,

    // --- Fan / climate ---
    /// Air temperature (°C) at which the fan activates
    pub fan_air_temp_on_c: f32,
    /// Air temperature (°C) below which the fan may deactivate
    pub fan_air_temp_off_c: f32,
    /// Relative humidity (%) at which the fan activates
    pub fan_humidity_on_pct: f32,
    /// Relative humidity (%) below which the fan may deactivate
    pub fan_humidity_off_pct: f32,

    // --- Water temperature ---
    /// Water temperature (°C) at which the cooler activates
    pub cooler_on_c: f32,
    /// Water temperature (°C) below which the cooler deactivates
    pub cooler_off_c: f32,
    /// Water temperature (°C) at which the heater activates
    pub heater_on_c: f32,
    /// Water temperature (°C) above which the heater deactivates
    pub heater_off_c: f32,

    // --- Circulation pump duty cycle ---
    /// Pump ON-phase dwell (whole minutes)
    pub pump_on_minutes: u16,
    /// Pump OFF-phase dwell (whole minutes)
    pub pump_off_minutes: u16,

    // --- Lighting schedule ---
    /// Morning window start (minutes since midnight)
    pub light_morning_on_min: u16,
    /// Morning window end (minutes since midnight)
    pub light_morning_off_min: u16,
    /// Evening window start (minutes since midnight)
    pub light_evening_on_min: u16,
    /// Evening window end (minutes since midnight)
    pub light_evening_off_min: u16,

    // --- pH dosing ---
    /// pH at or above which the LOWER (acid) alert sets
    pub ph_high_on: f32,
    /// pH below which the LOWER alert clears
    pub ph_high_off: f32,
    /// pH at or below which the RAISE (base) alert sets
    pub ph_low_on: f32,
    /// pH above which the RAISE alert clears
    pub ph_low_off: f32,
    /// Pulses per dosing attempt
    pub dose_pulses_per_attempt: u8,
    /// Dosing pulse width (milliseconds)
    pub dose_pulse_width_ms: u32,
    /// Gap between pulses within an attempt (milliseconds)
    pub dose_pulse_gap_ms: u32,
    /// Minimum interval between attempt starts (milliseconds)
    pub dose_min_check_interval_ms: u32,
    /// Attempts without the alert clearing before a mandatory rest
    pub dose_max_attempts: u8,
    /// Mandatory rest duration after the attempt cap (milliseconds)
    pub dose_rest_period_ms: u32,

    // --- Relays ---
    /// Minimum interval between physical state changes of one relay (ms)
    pub relay_cooldown_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Control loop
            control_loop_interval_ms: 1000, // 1 Hz
            snapshot_stale_after_ms: 5000,
            telemetry_interval_secs: 60, // 1/min

            // Fan / climate
            fan_air_temp_on_c: 30.0,
            fan_air_temp_off_c: 27.0,
            fan_humidity_on_pct: 85.0,
            fan_humidity_off_pct: 70.0,

            // Water temperature
            cooler_on_c: 30.0,
            cooler_off_c: 28.0,
            heater_on_c: 24.0,
            heater_off_c: 26.0,

            // Pump duty cycle
            pump_on_minutes: 15,
            pump_off_minutes: 45,

            // Lighting: 06:00–10:00 and 17:00–21:00
            light_morning_on_min: 6 * 60,
            light_morning_off_min: 10 * 60,
            light_evening_on_min: 17 * 60,
            light_evening_off_min: 21 * 60,

            // pH dosing
            ph_high_on: 7.8,
            ph_high_off: 7.4,
            ph_low_on: 6.4,
            ph_low_off: 6.8,
            dose_pulses_per_attempt: 3,
            dose_pulse_width_ms: 500,
            dose_pulse_gap_ms: 1500,
            dose_min_check_interval_ms: 60_000,
            dose_max_attempts: 5,
            dose_rest_period_ms: 30 * 60 * 1000, // 30 min

            // Relays
            relay_cooldown_ms: 5000,
        }
    }
}

impl SystemConfig {
    /// Validate every cross-field invariant.
    ///
    /// Called once at startup (and on every remote config update). A
    /// degenerate dead-band (on-threshold equal to or on the wrong side
    /// of its off-threshold) would oscillate a relay indefinitely, so the
    /// firmware refuses to run with one.
    pub fn validate(&self) -> Result<()> {
        if self.control_loop_interval_ms == 0 {
            return Err(Error::Config("control loop interval must be non-zero"));
        }
        if self.snapshot_stale_after_ms < self.control_loop_interval_ms {
            return Err(Error::Config(
                "staleness window shorter than the evaluation period",
            ));
        }

        // Hysteresis dead-bands: on and off must differ, in the direction
        // that activation implies.
        if self.fan_air_temp_on_c <= self.fan_air_temp_off_c {
            return Err(Error::Config("fan temperature dead-band inverted"));
        }
        if self.fan_humidity_on_pct <= self.fan_humidity_off_pct {
            return Err(Error::Config("fan humidity dead-band inverted"));
        }
        if self.cooler_on_c <= self.cooler_off_c {
            return Err(Error::Config("cooler dead-band inverted"));
        }
        if self.heater_on_c >= self.heater_off_c {
            return Err(Error::Config("heater dead-band inverted"));
        }
        if self.heater_off_c > self.cooler_off_c {
            return Err(Error::Config("heater band overlaps cooler band"));
        }

        if self.pump_on_minutes == 0 || self.pump_off_minutes == 0 {
            return Err(Error::Config("pump phase durations must be non-zero"));
        }

        const MINUTES_PER_DAY: u16 = 24 * 60;
        for m in [
            self.light_morning_on_min,
            self.light_morning_off_min,
            self.light_evening_on_min,
            self.light_evening_off_min,
        ] {
            if m >= MINUTES_PER_DAY {
                return Err(Error::Config("light window minute out of range"));
            }
        }
        if self.light_morning_on_min == self.light_morning_off_min
            || self.light_evening_on_min == self.light_evening_off_min
        {
            return Err(Error::Config("light window is empty"));
        }

        if self.ph_high_on <= self.ph_high_off {
            return Err(Error::Config("pH lower-dose dead-band inverted"));
        }
        if self.ph_low_on >= self.ph_low_off {
            return Err(Error::Config("pH raise-dose dead-band inverted"));
        }
        if self.ph_low_off >= self.ph_high_off {
            return Err(Error::Config("pH raise band overlaps lower band"));
        }
        if self.dose_pulses_per_attempt == 0 {
            return Err(Error::Config("dosing needs at least one pulse per attempt"));
        }
        if self.dose_pulse_width_ms == 0 {
            return Err(Error::Config("dosing pulse width must be non-zero"));
        }
        if self.dose_max_attempts == 0 {
            return Err(Error::Config("dosing needs at least one attempt"));
        }
        if self.dose_rest_period_ms == 0 {
            return Err(Error::Config("dosing rest period must be non-zero"));
        }

        Ok(())
    }

    /// Pump ON-phase dwell in milliseconds.
    pub fn pump_on_ms(&self) -> u64 {
        u64::from(self.pump_on_minutes) * 60_000
    }

    /// Pump OFF-phase dwell in milliseconds.
    pub fn pump_off_ms(&self) -> u64 {
        u64::from(self.pump_off_minutes) * 60_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok());
    }

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.fan_air_temp_on_c > c.fan_air_temp_off_c);
        assert!(c.cooler_on_c > c.cooler_off_c);
        assert!(c.heater_on_c < c.heater_off_c);
        assert!(c.ph_high_on > c.ph_high_off);
        assert!(c.ph_low_on < c.ph_low_off);
        assert!(c.pump_on_minutes > 0 && c.pump_off_minutes > 0);
        assert!(c.control_loop_interval_ms > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert!((c.ph_high_on - c2.ph_high_on).abs() < 0.001);
        assert_eq!(c.pump_on_minutes, c2.pump_on_minutes);
        assert_eq!(c.relay_cooldown_ms, c2.relay_cooldown_ms);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.dose_pulses_per_attempt, c2.dose_pulses_per_attempt);
        assert!((c.cooler_on_c - c2.cooler_on_c).abs() < 0.001);
    }

    #[test]
    fn equal_thresholds_are_rejected() {
        let c = SystemConfig {
            cooler_on_c: 28.0,
            cooler_off_c: 28.0,
            ..Default::default()
        };
        assert!(
            c.validate().is_err(),
            "on == off must be refused at startup, not oscillate at runtime"
        );
    }

    #[test]
    fn inverted_fan_band_is_rejected() {
        let c = SystemConfig {
            fan_air_temp_on_c: 20.0,
            fan_air_temp_off_c: 25.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn overlapping_thermal_bands_are_rejected() {
        let c = SystemConfig {
            heater_off_c: 29.0,
            cooler_off_c: 28.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_pulse_attempt_is_rejected() {
        let c = SystemConfig {
            dose_pulses_per_attempt: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn wrapping_light_window_is_accepted() {
        // 22:00 → 02:00 is a legal overnight window.
        let c = SystemConfig {
            light_evening_on_min: 22 * 60,
            light_evening_off_min: 2 * 60,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }
}
