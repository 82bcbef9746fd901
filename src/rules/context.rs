//! Shared value types threaded through every controller call.
//!
//! Controllers receive the latest [`SensorSnapshot`] and their
//! [`CommandState`] as read-only inputs each cycle and own nothing but
//! their private state.  There is no blackboard of shared mutable data:
//! the explicit-inputs shape is what makes each controller unit-testable
//! in isolation.

use serde::{Deserialize, Serialize};

use super::ActuatorId;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to controllers; written by the ingestion side)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every sensor in the enclosure.
///
/// Scalar fields are `None` when the sensing unit could not produce a
/// reading this period (sensor fault, radio dropout, NaN on the wire).
/// `None` is never treated as zero: a rule referencing an unknown field
/// holds its actuator state for the cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Water temperature (°C).
    pub water_temp_c: Option<f32>,
    /// Water pH.
    pub ph: Option<f32>,
    /// Dissolved oxygen (mg/L).
    pub dissolved_oxygen_mg_l: Option<f32>,
    /// Turbidity (NTU).
    pub turbidity_ntu: Option<f32>,
    /// Air temperature inside the enclosure (°C).
    pub air_temp_c: Option<f32>,
    /// Relative air humidity (%).
    pub air_humidity_pct: Option<f32>,
    /// Float switch: water level below the safe minimum.
    pub float_low: bool,
    /// Monotonic capture time (milliseconds since boot).
    pub timestamp_ms: u64,
}

impl SensorSnapshot {
    /// Replace any NaN the wire format smuggled in with the explicit
    /// unknown marker.  Call once at the ingestion boundary.
    pub fn sanitized(mut self) -> Self {
        for field in [
            &mut self.water_temp_c,
            &mut self.ph,
            &mut self.dissolved_oxygen_mg_l,
            &mut self.turbidity_ntu,
            &mut self.air_temp_c,
            &mut self.air_humidity_pct,
        ] {
            if field.is_some_and(f32::is_nan) {
                *field = None;
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Manual override commands (read-only to controllers)
// ---------------------------------------------------------------------------

/// Per-actuator manual-override intent from the remote command channel.
///
/// While `is_auto` is false, `value` is authoritative and the automatic
/// rule for that actuator is suppressed — except the emergency tier,
/// which always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandState {
    pub is_auto: bool,
    pub value: bool,
}

impl Default for CommandState {
    fn default() -> Self {
        Self {
            is_auto: true,
            value: false,
        }
    }
}

impl CommandState {
    /// Automatic mode (the restart-safe default).
    pub const AUTO: Self = Self {
        is_auto: true,
        value: false,
    };

    /// Manual override to the given value.
    pub const fn manual(value: bool) -> Self {
        Self {
            is_auto: false,
            value,
        }
    }
}

/// One [`CommandState`] per actuator, indexed by [`ActuatorId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    entries: [CommandState; ActuatorId::COUNT],
}

impl CommandSet {
    /// Everything in automatic mode.
    pub fn all_auto() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ActuatorId) -> CommandState {
        self.entries[id as usize]
    }

    pub fn set(&mut self, id: ActuatorId, cmd: CommandState) {
        self.entries[id as usize] = cmd;
    }
}

// ---------------------------------------------------------------------------
// Actuator state (owned by exactly one controller)
// ---------------------------------------------------------------------------

/// Logical on/off state of one actuator plus the time of its last toggle.
///
/// Owned exclusively by the controller that drives the actuator and
/// mutated only through [`ActuatorState::transition`], which is the sole
/// place `last_change_ms` is allowed to move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    on: bool,
    last_change_ms: u64,
}

impl ActuatorState {
    pub fn on(&self) -> bool {
        self.on
    }

    pub fn last_change_ms(&self) -> u64 {
        self.last_change_ms
    }

    /// Apply the next decision.  `last_change_ms` updates exactly when
    /// the state actually toggles.
    pub fn transition(&mut self, next: bool, now_ms: u64) {
        if next != self.on {
            self.on = next;
            self.last_change_ms = now_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_maps_nan_to_unknown() {
        let snap = SensorSnapshot {
            water_temp_c: Some(f32::NAN),
            ph: Some(7.0),
            ..Default::default()
        }
        .sanitized();
        assert_eq!(snap.water_temp_c, None);
        assert_eq!(snap.ph, Some(7.0));
    }

    #[test]
    fn command_default_is_auto_off() {
        let c = CommandState::default();
        assert!(c.is_auto);
        assert!(!c.value);
    }

    #[test]
    fn command_set_round_trips_per_actuator() {
        let mut set = CommandSet::all_auto();
        set.set(ActuatorId::Pump, CommandState::manual(true));
        assert_eq!(set.get(ActuatorId::Pump), CommandState::manual(true));
        assert_eq!(set.get(ActuatorId::Fan), CommandState::AUTO);
    }

    #[test]
    fn last_change_moves_only_on_toggle() {
        let mut s = ActuatorState::default();
        s.transition(true, 100);
        assert_eq!(s.last_change_ms(), 100);
        s.transition(true, 200); // no toggle
        assert_eq!(s.last_change_ms(), 100);
        s.transition(false, 300);
        assert_eq!(s.last_change_ms(), 300);
    }
}
