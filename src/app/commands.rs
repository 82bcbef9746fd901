//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (remote
//! console, cloud backend, local button) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::SystemConfig;
use crate::rules::context::CommandState;
use crate::rules::ActuatorId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Set one actuator's manual-override state (or return it to auto).
    SetOverride {
        actuator: ActuatorId,
        command: CommandState,
    },

    /// Latch the operator emergency stop: every relay forced OFF until
    /// explicitly cleared.
    EmergencyStop,

    /// Release the operator emergency stop.
    ClearEmergencyStop,

    /// Hot-reload configuration (e.g. from the remote console).
    /// Rejected without adoption if validation fails.
    UpdateConfig(SystemConfig),

    /// Explicitly persist the current config immediately.
    SaveConfig,
}
