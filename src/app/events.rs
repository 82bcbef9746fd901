//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them — log to serial, publish to
//! the cloud uplink, etc.

use crate::rules::arbiter::DecisionTrace;
use crate::rules::context::SensorSnapshot;
use crate::rules::ActuatorId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// A relay changed physical state.
    RelayChanged { actuator: ActuatorId, on: bool },

    /// One or more safety faults were raised (bitmask).
    FaultDetected(u8),

    /// All safety faults have been cleared.
    FaultCleared,

    /// A config update was rejected by validation.
    ConfigRejected(&'static str),

    /// The application service has started.
    Started,
}

/// A point-in-time telemetry record suitable for logging or uplink.
///
/// Carries the full decision trace per actuator — last automatic
/// decision, command state, emergency force, and final state — so an
/// operator can see *why* a relay is where it is, not just where.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    /// The snapshot the engine evaluated this cycle.
    pub snapshot: SensorSnapshot,
    /// Per-actuator decision traces, indexed by [`ActuatorId`].
    pub traces: [DecisionTrace; ActuatorId::COUNT],
    /// Active safety-fault bitmask (0 = none).
    pub fault_flags: u8,
}
