//! Lighting schedule controller.
//!
//! A pure function of wall-clock minute-of-day against two configured
//! on/off windows (morning and evening).  Windows may wrap midnight,
//! same arithmetic as overnight quiet hours.  The only state is the
//! last decision, held when the wall clock is unavailable (pre-NTP
//! sync) — defaulting to OFF mid-photoperiod would be worse than
//! holding.

use crate::config::SystemConfig;

/// A time-of-day window in minutes since midnight; may wrap midnight.
#[derive(Debug, Clone, Copy)]
pub struct LightWindow {
    pub on_min: u16,
    pub off_min: u16,
}

impl LightWindow {
    /// Check whether the given minute falls inside the window.
    pub fn contains(&self, minute: u16) -> bool {
        if self.on_min <= self.off_min {
            // e.g., 06:00..10:00 (daytime window)
            minute >= self.on_min && minute < self.off_min
        } else {
            // e.g., 22:00..02:00 (wraps around midnight)
            minute >= self.on_min || minute < self.off_min
        }
    }
}

/// Schedule controller for the lighting relay.
#[derive(Debug, Default)]
pub struct LightingController {
    last_decision: bool,
}

impl LightingController {
    /// One evaluation cycle.  `minute_of_day` is `None` while the wall
    /// clock is unsynced.
    pub fn evaluate(&mut self, minute_of_day: Option<u16>, config: &SystemConfig) -> bool {
        let Some(minute) = minute_of_day else {
            return self.last_decision;
        };

        let morning = LightWindow {
            on_min: config.light_morning_on_min,
            off_min: config.light_morning_off_min,
        };
        let evening = LightWindow {
            on_min: config.light_evening_on_min,
            off_min: config.light_evening_off_min,
        };

        self.last_decision = morning.contains(minute) || evening.contains(minute);
        self.last_decision
    }
}
