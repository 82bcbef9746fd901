//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (snapshot ingestion, command channel, relay sink,
//! event sinks, config storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::SystemConfig;
use crate::rules::context::{CommandSet, SensorSnapshot};
use crate::rules::ActuatorId;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: ingestion → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain the latest snapshot.
///
/// The provider may return the same snapshot repeatedly when the radio
/// link stalls; the safety supervisor detects that from the timestamp.
/// Fields may carry the unknown marker — the engine must never crash or
/// stall on them, only skip the affected rule.
pub trait SensorPort {
    /// Latest snapshot delivered by the sensing unit.
    fn read_snapshot(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Command port (driven adapter: remote control → domain)
// ───────────────────────────────────────────────────────────────

/// Per-actuator manual-override intent from the remote channel.
///
/// `None` means no fresh command set this cycle — the domain retains
/// the last known set, it does NOT revert to automatic.
pub trait CommandPort {
    fn poll_commands(&mut self) -> Option<CommandSet>;
}

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → relay hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this with final logical states.
/// Cooldown is already enforced by the engine's guards; the sink only
/// translates logical channels to pin writes.
pub trait RelayPort {
    /// Drive one relay channel.
    fn set_relay(&mut self, actuator: ActuatorId, on: bool);

    /// Kill every relay — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, cloud
/// uplink, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting — a compromised
/// remote channel must not be able to inject a degenerate dead-band or
/// disable the dosing rest backstop.  Invalid values are rejected with
/// [`ConfigError::ValidationFailed`], never silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
