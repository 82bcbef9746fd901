#![allow(dead_code)] // Error types reserved for future SensorPort/RelayPort typed returns

//! Unified error types for the AquaNode firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level control loop's error handling uniform.
//! All variants are `Copy` so they can be cheaply passed through the safety
//! supervisor and rule engine without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// A relay command failed.
    Relay(RelayError),
    /// A safety condition is active.
    Safety(SafetyFault),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Relay(e) => write!(f, "relay: {e}"),
            Self::Safety(e) => write!(f, "safety: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The snapshot provider has not delivered any reading yet.
    NoSnapshot,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Snapshot older than the configured staleness window.
    Stale,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSnapshot => write!(f, "no snapshot received"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Stale => write!(f, "snapshot stale"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Relay errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// Requested channel does not exist on this board.
    NoSuchChannel,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::NoSuchChannel => write!(f, "no such relay channel"),
        }
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety faults are accumulated in a bitfield by the safety supervisor so
/// that multiple simultaneous conditions can be tracked and individually
/// cleared.  `FloatSwitchLow` additionally drives the emergency-override
/// tier of the arbitration layer; `SnapshotStale` is observability only —
/// the engine keeps running on the last known snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Float switch reports water below the safe minimum.
    FloatSwitchLow = 0b0000_0001,
    /// No fresh sensor snapshot within the expected window.
    SnapshotStale = 0b0000_0010,
    /// Operator-commanded emergency stop is latched.
    EmergencyStop = 0b0000_0100,
}

impl SafetyFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FloatSwitchLow => write!(f, "float switch low"),
            Self::SnapshotStale => write!(f, "snapshot stale"),
            Self::EmergencyStop => write!(f, "emergency stop"),
        }
    }
}

impl From<SafetyFault> for Error {
    fn from(e: SafetyFault) -> Self {
        Self::Safety(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Radio link to the sensing unit is down.
    LinkDown,
    /// Cloud publish failed.
    PublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkDown => write!(f, "radio link down"),
            Self::PublishFailed => write!(f, "cloud publish failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
