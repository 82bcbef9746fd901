//! Relay channel driver.
//!
//! Thin wrapper over an [`embedded_hal::digital::OutputPin`] adding
//! polarity handling and state tracking.  Most relay boards in the
//! field are active-low; the wrapper keeps that detail out of the
//! adapter layer.

use embedded_hal::digital::OutputPin;
use log::{debug, error};

/// One relay channel.
pub struct Relay<P: OutputPin> {
    pin: P,
    active_high: bool,
    on: bool,
    name: &'static str,
}

impl<P: OutputPin> Relay<P> {
    /// Wrap a pin.  The relay is driven to its OFF level immediately so
    /// boot-time pin floating can't energise a channel.
    pub fn new(mut pin: P, active_high: bool, name: &'static str) -> Self {
        let _ = Self::write(&mut pin, active_high, false);
        Self {
            pin,
            active_high,
            on: false,
            name,
        }
    }

    /// Drive the relay.  A failed GPIO write is logged and the cached
    /// state is left unchanged so the next cycle retries.
    pub fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        match Self::write(&mut self.pin, self.active_high, on) {
            Ok(()) => {
                debug!("relay {}: {}", self.name, if on { "ON" } else { "OFF" });
                self.on = on;
            }
            Err(_) => error!("relay {}: GPIO write failed", self.name),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    fn write(pin: &mut P, active_high: bool, on: bool) -> Result<(), P::Error> {
        if on == active_high {
            pin.set_high()
        } else {
            pin.set_low()
        }
    }
}
