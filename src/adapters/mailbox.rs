//! Latest-value mailboxes between the transport task and the control loop.
//!
//! The radio/cloud task and the control loop run on different FreeRTOS
//! tasks, so the handoff points are the only cross-task state in the
//! firmware.  Each mailbox is a single latest-value cell behind a
//! critical-section mutex: the writer overwrites, the reader takes or
//! peeks.  No queueing — the rule engine only ever wants the newest
//! snapshot and the newest command set.

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use crate::app::ports::{CommandPort, SensorPort};
use crate::rules::context::{CommandSet, SensorSnapshot};

// ───────────────────────────────────────────────────────────────
// Snapshot mailbox (ingestion task → control loop)
// ───────────────────────────────────────────────────────────────

/// Latest sensor snapshot from the sensing unit.
pub struct SnapshotMailbox {
    cell: CriticalSectionMutex<Cell<SensorSnapshot>>,
}

impl SnapshotMailbox {
    pub const fn new() -> Self {
        Self {
            cell: CriticalSectionMutex::new(Cell::new(SensorSnapshot {
                water_temp_c: None,
                ph: None,
                dissolved_oxygen_mg_l: None,
                turbidity_ntu: None,
                air_temp_c: None,
                air_humidity_pct: None,
                float_low: false,
                timestamp_ms: 0,
            })),
        }
    }

    /// Overwrite with a fresh snapshot (called by the ingestion task).
    pub fn publish(&self, snap: SensorSnapshot) {
        self.cell.lock(|c| c.set(snap));
    }

    /// Latest snapshot.  Before the first publish this is the all-unknown
    /// default, which the staleness check flags within one window.
    pub fn latest(&self) -> SensorSnapshot {
        self.cell.lock(Cell::get)
    }
}

// ───────────────────────────────────────────────────────────────
// Command mailbox (remote command task → control loop)
// ───────────────────────────────────────────────────────────────

/// Latest manual-override command set from the remote channel.
///
/// Take-semantics: the control loop consumes a set once; `None` on later
/// polls means "no fresh commands", and the loop retains its last copy.
pub struct CommandMailbox {
    cell: CriticalSectionMutex<Cell<Option<CommandSet>>>,
}

impl CommandMailbox {
    pub const fn new() -> Self {
        Self {
            cell: CriticalSectionMutex::new(Cell::new(None)),
        }
    }

    /// Overwrite with a fresh command set (called by the command task).
    pub fn publish(&self, commands: CommandSet) {
        self.cell.lock(|c| c.set(Some(commands)));
    }

    /// Take the freshest unconsumed set, if any.
    pub fn take(&self) -> Option<CommandSet> {
        self.cell.lock(Cell::take)
    }
}

// ───────────────────────────────────────────────────────────────
// Port impls for borrowing adapters
// ───────────────────────────────────────────────────────────────

/// Bridge a pair of mailbox references into the ingestion-side ports.
pub struct MailboxPorts<'a> {
    pub snapshots: &'a SnapshotMailbox,
    pub commands: &'a CommandMailbox,
}

impl SensorPort for MailboxPorts<'_> {
    fn read_snapshot(&mut self) -> SensorSnapshot {
        self.snapshots.latest()
    }
}

impl CommandPort for MailboxPorts<'_> {
    fn poll_commands(&mut self) -> Option<CommandSet> {
        self.commands.take()
    }
}
