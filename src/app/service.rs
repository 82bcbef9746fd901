//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the rule engine, the safety supervisor, and the
//! last-known snapshot/command state.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected
//! at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!  CommandPort ──▶ │       AppService        │
//!    RelayPort ◀── │  RuleEngine · Safety    │
//!                  └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::rules::context::{CommandSet, SensorSnapshot};
use crate::rules::{ActuatorId, RuleEngine};
use crate::safety::SafetySupervisor;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{CommandPort, EventSink, RelayPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    engine: RuleEngine,
    safety: SafetySupervisor,
    /// Last snapshot accepted — the engine keeps operating on it while
    /// the provider is stale.
    last_snapshot: SensorSnapshot,
    /// Last known command set — retained when no fresh set arrives.
    commands: CommandSet,
    /// Seconds per control tick (derived from config).
    tick_secs: f32,
    tick_count: u64,
    prev_faults: u8,
    config_dirty: bool,
    dirty_since_tick: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Fails with [`Error::Config`] on any invariant violation — the
    /// firmware refuses to run rather than oscillate at runtime.
    pub fn new(config: SystemConfig) -> Result<Self> {
        let tick_secs = config.control_loop_interval_ms as f32 / 1000.0;
        let safety = SafetySupervisor::new(&config);
        let engine = RuleEngine::new(config)?;

        Ok(Self {
            engine,
            safety,
            last_snapshot: SensorSnapshot::default(),
            commands: CommandSet::all_auto(),
            tick_secs,
            tick_count: 0,
            prev_faults: 0,
            config_dirty: false,
            dirty_since_tick: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce startup.  All controller state begins at the safe
    /// defaults (every relay OFF, every actuator in AUTO).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!("AppService started — all relays off, all actuators auto");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: ingest → safety → rules → relays.
    ///
    /// The `hw` parameter satisfies the sensor, command, and relay
    /// ports at once — this avoids a triple mutable borrow while
    /// keeping the port boundary explicit.
    ///
    /// * `now_ms` — monotonic milliseconds since boot.
    /// * `minute_of_day` — wall-clock minutes since midnight, `None`
    ///   while NTP has not synced.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + CommandPort + RelayPort),
        sink: &mut impl EventSink,
        now_ms: u64,
        minute_of_day: Option<u16>,
    ) {
        self.tick_count += 1;

        // 1. Ingest the latest snapshot (NaN normalized to unknown).
        self.last_snapshot = hw.read_snapshot().sanitized();

        // 2. Refresh commands; absence retains the last known set.
        if let Some(set) = hw.poll_commands() {
            self.commands = set;
        }

        // 3. Safety evaluation and fault-edge events.
        let faults = self.safety.evaluate(&self.last_snapshot, now_ms);
        if faults != self.prev_faults {
            if faults != 0 {
                warn!("safety faults active: 0b{faults:08b}");
                sink.emit(&AppEvent::FaultDetected(faults));
            } else {
                sink.emit(&AppEvent::FaultCleared);
            }
            self.prev_faults = faults;
        }

        // 4. Rule engine: auto decisions → arbitration → cooldown.
        let overrides = self.safety.emergency_overrides();
        let changes = self.engine.evaluate(
            &self.last_snapshot,
            &self.commands,
            &overrides,
            minute_of_day,
            now_ms,
        );

        // 5. Drive the relay sink and report transitions.
        for change in &changes {
            hw.set_relay(change.actuator, change.on);
            sink.emit(&AppEvent::RelayChanged {
                actuator: change.actuator,
                on: change.on,
            });
        }

        // 6. Periodic telemetry of the full decision state.
        if self.telemetry_due() {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the remote console, cloud,
    /// local button).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl RelayPort,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        match cmd {
            AppCommand::SetOverride { actuator, command } => {
                info!(
                    "override: {} -> {}",
                    actuator.name(),
                    if command.is_auto {
                        "auto"
                    } else if command.value {
                        "manual ON"
                    } else {
                        "manual OFF"
                    }
                );
                self.commands.set(actuator, command);
            }
            AppCommand::EmergencyStop => {
                warn!("EMERGENCY STOP latched");
                self.safety.set_emergency_stop(true);
                // Don't wait for the next cycle, and don't let the
                // cooldown guards defer it either.
                for change in &self.engine.force_all_off(now_ms) {
                    hw.set_relay(change.actuator, false);
                    sink.emit(&AppEvent::RelayChanged {
                        actuator: change.actuator,
                        on: false,
                    });
                }
                hw.all_off();
            }
            AppCommand::ClearEmergencyStop => {
                info!("emergency stop released");
                self.safety.set_emergency_stop(false);
            }
            AppCommand::UpdateConfig(new_config) => match new_config.validate() {
                Ok(()) => {
                    self.mark_config_dirty();
                    self.engine.set_config(new_config);
                    info!("configuration updated at runtime");
                }
                Err(Error::Config(msg)) => {
                    warn!("config update rejected: {msg}");
                    sink.emit(&AppEvent::ConfigRejected(msg));
                }
                Err(e) => {
                    warn!("config update rejected: {e}");
                    sink.emit(&AppEvent::ConfigRejected("invalid configuration"));
                }
            },
            AppCommand::SaveConfig => {
                self.dirty_since_tick = 0;
                self.mark_config_dirty();
                info!("explicit config save requested (will flush on next auto-save check)");
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry record from the current decision state.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            snapshot: self.last_snapshot,
            traces: *self.engine.traces(),
            fault_flags: self.safety.faults(),
        }
    }

    /// Current physical relay states, indexed by [`ActuatorId`].
    pub fn relay_states(&self) -> [bool; ActuatorId::COUNT] {
        self.engine.relay_states()
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.safety.faults()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration (for remote read-back).
    pub fn current_config(&self) -> SystemConfig {
        self.engine.config().clone()
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified.
    pub fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_tick = self.tick_count;
        }
    }

    /// Check if auto-save should trigger (5 seconds after last change).
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl super::ports::ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        let ticks_since_dirty = self.tick_count.saturating_sub(self.dirty_since_tick);
        let secs_since_dirty = ticks_since_dirty as f32 * self.tick_secs;
        if secs_since_dirty < 5.0 {
            return false;
        }
        match storage.save(self.engine.config()) {
            Ok(()) => {
                self.config_dirty = false;
                info!("config auto-saved");
                true
            }
            Err(e) => {
                warn!("config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }

    // ── Internal ──────────────────────────────────────────────

    fn telemetry_due(&self) -> bool {
        let cfg = self.engine.config();
        let interval_ticks = u64::from(cfg.telemetry_interval_secs) * 1000
            / u64::from(cfg.control_loop_interval_ms);
        self.tick_count % interval_ticks.max(1) == 0
    }
}
