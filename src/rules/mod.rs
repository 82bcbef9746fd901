//! The rule engine — per-actuator decision state machines.
//!
//! ```text
//!  SensorSnapshot ─┐                       ┌─▶ Fan
//!                  │   ┌───────────────┐   ├─▶ Heater / Cooler
//!  CommandSet ─────┼──▶│  RuleEngine   │───┼─▶ Pump (duty cycle)
//!                  │   │  controllers  │   ├─▶ Light (schedule)
//!  Emergency ──────┘   │  + arbitration│   ├─▶ Dose raise / lower
//!                      │  + cooldown   │   └─▶ Drain valve
//!                      └───────────────┘
//! ```
//!
//! One [`RuleEngine::evaluate`] call per sampling period.  Each
//! controller owns its private timers and state and sees only the
//! snapshot, its command, and the clock — no mutable state is shared
//! between controllers, and nothing in here blocks: every dwell, pulse,
//! rest, and cooldown is a deadline comparison.

pub mod arbiter;
pub mod climate;
pub mod context;
pub mod cooldown;
pub mod dosing;
pub mod hysteresis;
pub mod lighting;
pub mod pump;
pub mod thermal;

use log::warn;

use crate::config::SystemConfig;
use crate::error::Result;

use arbiter::DecisionTrace;
use climate::FanController;
use context::{CommandSet, SensorSnapshot};
use cooldown::RelayGuard;
use dosing::DosingController;
use lighting::LightingController;
use pump::PumpController;
use thermal::ThermalController;

// ---------------------------------------------------------------------------
// Actuator identity
// ---------------------------------------------------------------------------

/// Every relay channel the node drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActuatorId {
    Fan = 0,
    Heater = 1,
    Cooler = 2,
    Pump = 3,
    Light = 4,
    DoseRaise = 5,
    DoseLower = 6,
    Valve = 7,
}

impl ActuatorId {
    /// Total number of actuators — used to size the per-actuator arrays.
    pub const COUNT: usize = 8;

    /// All actuators, in relay-channel order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Fan,
        Self::Heater,
        Self::Cooler,
        Self::Pump,
        Self::Light,
        Self::DoseRaise,
        Self::DoseLower,
        Self::Valve,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Heater => "heater",
            Self::Cooler => "cooler",
            Self::Pump => "pump",
            Self::Light => "light",
            Self::DoseRaise => "dose-raise",
            Self::DoseLower => "dose-lower",
            Self::Valve => "valve",
        }
    }
}

// ---------------------------------------------------------------------------
// Emergency overrides (input to the arbitration tier)
// ---------------------------------------------------------------------------

/// Per-actuator forced states for this cycle.  Produced by the safety
/// supervisor; `Some(state)` wins over both manual and automatic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmergencyOverrides {
    forces: [Option<bool>; ActuatorId::COUNT],
}

impl EmergencyOverrides {
    /// No emergency in effect.
    pub const fn none() -> Self {
        Self {
            forces: [None; ActuatorId::COUNT],
        }
    }

    /// Force every actuator to the given state (operator e-stop).
    pub const fn all(state: bool) -> Self {
        Self {
            forces: [Some(state); ActuatorId::COUNT],
        }
    }

    pub fn force(&mut self, id: ActuatorId, state: bool) {
        self.forces[id as usize] = Some(state);
    }

    pub fn get(&self, id: ActuatorId) -> Option<bool> {
        self.forces[id as usize]
    }

    pub fn any(&self) -> bool {
        self.forces.iter().any(Option::is_some)
    }
}

/// A physical relay transition the sink must apply this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayChange {
    pub actuator: ActuatorId,
    pub on: bool,
}

// ---------------------------------------------------------------------------
// Rule engine
// ---------------------------------------------------------------------------

/// Owns every controller, the arbitration step, and the cooldown guards.
pub struct RuleEngine {
    config: SystemConfig,
    fan: FanController,
    thermal: ThermalController,
    pump: PumpController,
    dosing: DosingController,
    lighting: LightingController,
    guards: [RelayGuard; ActuatorId::COUNT],
    traces: [DecisionTrace; ActuatorId::COUNT],
}

impl RuleEngine {
    /// Construct with a validated configuration.  A config that would
    /// oscillate a relay is refused here, before anything runs.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fan: FanController::default(),
            thermal: ThermalController::default(),
            pump: PumpController::default(),
            dosing: DosingController::default(),
            lighting: LightingController::default(),
            guards: Default::default(),
            traces: Default::default(),
        })
    }

    /// One full evaluation cycle.  Returns the physical relay changes to
    /// apply this cycle (empty most cycles).
    pub fn evaluate(
        &mut self,
        snap: &SensorSnapshot,
        commands: &CommandSet,
        emergency: &EmergencyOverrides,
        minute_of_day: Option<u16>,
        now_ms: u64,
    ) -> heapless::Vec<RelayChange, { ActuatorId::COUNT }> {
        // ── Automatic decisions, one controller per actuator class ──
        let fan = self.fan.evaluate(snap, &self.config, now_ms);
        let thermal = self.thermal.evaluate(snap, &self.config, now_ms);
        let pump = self
            .pump
            .evaluate(snap, commands.get(ActuatorId::Pump), &self.config, now_ms);
        let light = self.lighting.evaluate(minute_of_day, &self.config);
        let dose = self.dosing.evaluate(snap.ph, &self.config, now_ms);
        // The drain valve has no automatic rule: it stays closed unless
        // an operator opens it, and the float-switch emergency closes it.
        let valve = false;

        let autos = [
            fan,
            thermal.heater_on,
            thermal.cooler_on,
            pump,
            light,
            dose.raise_on,
            dose.lower_on,
            valve,
        ];

        // ── Arbitration + cooldown, per actuator ────────────────────
        let mut finals = [false; ActuatorId::COUNT];
        for id in ActuatorId::ALL {
            let i = id as usize;
            finals[i] = arbiter::resolve(autos[i], commands.get(id), emergency.get(id));
        }

        // The dosing relays must never be energised together, whatever
        // combination of manual overrides produced it.
        let (raise, lower) = (
            ActuatorId::DoseRaise as usize,
            ActuatorId::DoseLower as usize,
        );
        if finals[raise] && finals[lower] {
            warn!("dose raise and lower both commanded — dropping raise");
            finals[raise] = false;
        }

        let mut changes = heapless::Vec::new();
        for id in ActuatorId::ALL {
            let i = id as usize;
            let before = self.guards[i].current();
            let physical = self.guards[i].request(
                finals[i],
                u64::from(self.config.relay_cooldown_ms),
                now_ms,
            );
            self.traces[i] = DecisionTrace {
                auto_decision: autos[i],
                command: commands.get(id),
                emergency: emergency.get(id),
                final_state: finals[i],
                physical,
            };
            if physical != before {
                // Capacity equals the actuator count; push cannot fail.
                let _ = changes.push(RelayChange {
                    actuator: id,
                    on: physical,
                });
            }
        }
        changes
    }

    /// Drop every relay immediately, bypassing the cooldown guards (the
    /// operator e-stop path).  Returns the changes actually applied.
    pub fn force_all_off(&mut self, now_ms: u64) -> heapless::Vec<RelayChange, { ActuatorId::COUNT }> {
        let mut changes = heapless::Vec::new();
        for id in ActuatorId::ALL {
            let i = id as usize;
            if self.guards[i].current() {
                self.guards[i].force(false, now_ms);
                let _ = changes.push(RelayChange {
                    actuator: id,
                    on: false,
                });
            }
        }
        changes
    }

    /// Last cycle's per-actuator decision traces, for telemetry.
    pub fn traces(&self) -> &[DecisionTrace; ActuatorId::COUNT] {
        &self.traces
    }

    /// Current physical relay states.
    pub fn relay_states(&self) -> [bool; ActuatorId::COUNT] {
        core::array::from_fn(|i| self.guards[i].current())
    }

    /// Live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Adopt a new configuration.  The caller validates first; an
    /// invalid config must be rejected upstream, never adopted.
    pub fn set_config(&mut self, config: SystemConfig) {
        self.config = config;
    }
}
