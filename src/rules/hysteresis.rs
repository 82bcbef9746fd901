//! Two-threshold hysteresis evaluator.
//!
//! Every threshold rule in the engine goes through this one pure
//! function: a reading, the current boolean state, and a dead-band of
//! two distinct thresholds map to the next state.  The dead-band is the
//! whole point — a single crossing point would chatter the relay on
//! sensor noise.  `on != off` is validated once at startup
//! ([`crate::config::SystemConfig::validate`]), not re-checked here.

/// Which direction of crossing the on-threshold activates the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Activate when the reading rises past `on` (cooler, fan).
    Rising,
    /// Activate when the reading falls past `on` (heater).
    Falling,
}

/// A configured dead-band for one scalar rule.
#[derive(Debug, Clone, Copy)]
pub struct Hysteresis {
    pub on: f32,
    pub off: f32,
    pub activation: Activation,
}

impl Hysteresis {
    pub const fn rising(on: f32, off: f32) -> Self {
        Self {
            on,
            off,
            activation: Activation::Rising,
        }
    }

    pub const fn falling(on: f32, off: f32) -> Self {
        Self {
            on,
            off,
            activation: Activation::Falling,
        }
    }

    /// Map a reading and the current state to the next state.
    ///
    /// An unknown reading returns `current` unchanged — holding state is
    /// always safer than guessing, and the caller gets a fresh chance
    /// next cycle.
    pub fn next(&self, reading: Option<f32>, current: bool) -> bool {
        let Some(value) = reading else {
            return current;
        };
        match self.activation {
            Activation::Rising => {
                if !current && value > self.on {
                    true
                } else if current && value < self.off {
                    false
                } else {
                    current
                }
            }
            Activation::Falling => {
                if !current && value < self.on {
                    true
                } else if current && value > self.off {
                    false
                } else {
                    current
                }
            }
        }
    }
}
