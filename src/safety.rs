//! Safety supervisor.
//!
//! Runs **every tick before the rule engine** and accumulates a fault
//! bitmask.  Two of the faults feed the emergency tier of the
//! arbitration layer; staleness is observability only.
//!
//! ## Fault lifecycle
//!
//! 1. A condition triggers a fault (e.g. float switch low).
//! 2. The supervisor sets the corresponding bit.
//! 3. The emergency overrides derived from the mask preempt manual and
//!    automatic decisions for the affected actuators.
//! 4. Each tick the supervisor re-evaluates; when the condition clears,
//!    it unsets the bit and the override disappears.
//!
//! Multiple simultaneous faults are tracked independently: the pump
//! stays forced OFF until *every* fault that forces it has cleared.

use log::{error, info};

use crate::config::SystemConfig;
use crate::error::SafetyFault;
use crate::rules::context::SensorSnapshot;
use crate::rules::{ActuatorId, EmergencyOverrides};

/// Safety supervisor.
pub struct SafetySupervisor {
    stale_after_ms: u64,
    /// Latched fault bitmask.
    faults: u8,
    /// Operator emergency stop (set via command, cleared via command).
    estop_latched: bool,
}

impl SafetySupervisor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            stale_after_ms: u64::from(config.snapshot_stale_after_ms),
            faults: 0,
            estop_latched: false,
        }
    }

    /// Latch or release the operator emergency stop.
    pub fn set_emergency_stop(&mut self, latched: bool) {
        self.estop_latched = latched;
    }

    /// Evaluate all safety conditions against the latest snapshot.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, snap: &SensorSnapshot, now_ms: u64) -> u8 {
        // ── Water level ───────────────────────────────────────────
        self.eval_fault(SafetyFault::FloatSwitchLow, snap.float_low);

        // ── Snapshot freshness ────────────────────────────────────
        // The engine keeps running on the last snapshot either way;
        // guessing "failed" would be more dangerous than holding.
        self.eval_fault(
            SafetyFault::SnapshotStale,
            now_ms.saturating_sub(snap.timestamp_ms) > self.stale_after_ms,
        );

        // ── Operator e-stop ───────────────────────────────────────
        self.eval_fault(SafetyFault::EmergencyStop, self.estop_latched);

        self.faults
    }

    /// Emergency overrides for the arbitration layer, derived from the
    /// current fault mask.
    pub fn emergency_overrides(&self) -> EmergencyOverrides {
        if self.has_fault(SafetyFault::EmergencyStop) {
            return EmergencyOverrides::all(false);
        }
        let mut forces = EmergencyOverrides::none();
        if self.has_fault(SafetyFault::FloatSwitchLow) {
            // Running the pump dry destroys it; opening the drain on a
            // critically low enclosure is the failure being prevented.
            forces.force(ActuatorId::Pump, false);
            forces.force(ActuatorId::Valve, false);
        }
        forces
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
