//! Hardware adapter — bridges real peripherals to the domain port traits.
//!
//! Owns the relay bank and borrows the transport mailboxes, exposing
//! them through [`SensorPort`], [`CommandPort`], and [`RelayPort`].
//! This is the only module in the system that touches actual GPIO.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use log::error;

use crate::adapters::mailbox::{CommandMailbox, SnapshotMailbox};
use crate::app::ports::{CommandPort, RelayPort, SensorPort};
use crate::drivers::relay::Relay;
use crate::rules::context::{CommandSet, SensorSnapshot};
use crate::rules::ActuatorId;

type BoardRelay = Relay<PinDriver<'static, AnyOutputPin, Output>>;

/// Concrete adapter that combines the relay bank and the transport
/// mailboxes behind the port traits.
pub struct HardwareAdapter<'a> {
    relays: [BoardRelay; ActuatorId::COUNT],
    snapshots: &'a SnapshotMailbox,
    commands: &'a CommandMailbox,
}

impl<'a> HardwareAdapter<'a> {
    /// Build from pre-constructed relay drivers (pin ownership is
    /// established in `main`, where the peripherals are taken).
    pub fn new(
        relays: [BoardRelay; ActuatorId::COUNT],
        snapshots: &'a SnapshotMailbox,
        commands: &'a CommandMailbox,
    ) -> Self {
        Self {
            relays,
            snapshots,
            commands,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter<'_> {
    fn read_snapshot(&mut self) -> SensorSnapshot {
        self.snapshots.latest()
    }
}

// ── CommandPort implementation ────────────────────────────────

impl CommandPort for HardwareAdapter<'_> {
    fn poll_commands(&mut self) -> Option<CommandSet> {
        self.commands.take()
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl RelayPort for HardwareAdapter<'_> {
    fn set_relay(&mut self, actuator: ActuatorId, on: bool) {
        let Some(relay) = self.relays.get_mut(actuator as usize) else {
            error!("no relay wired for {}", actuator.name());
            return;
        };
        relay.set(on);
    }

    fn all_off(&mut self) {
        for relay in &mut self.relays {
            relay.set(false);
        }
    }
}
