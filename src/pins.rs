//! GPIO pin map for the AquaNode control board (ESP32-S3).
//!
//! One place to change when the board is re-spun.  The relay bank is
//! wired active-low (driver boards with opto-isolated inputs).

/// Relay channel pins, in [`crate::rules::ActuatorId`] order:
/// fan, heater, cooler, pump, light, dose-raise, dose-lower, valve.
pub const RELAY_PINS: [i32; 8] = [4, 5, 6, 7, 15, 16, 17, 18];

/// Relay bank polarity: `false` = active-low.
pub const RELAY_ACTIVE_HIGH: bool = false;

/// Float switch input (pulled up; low = water below safe minimum).
pub const FLOAT_SWITCH_PIN: i32 = 21;

/// Status LED (WS2812 data).
pub const STATUS_LED_PIN: i32 = 48;
