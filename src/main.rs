//! AquaNode Firmware — Main Entry Point
//!
//! Hexagonal architecture with a fixed-cadence polling control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     LogEventSink    NvsConfigStore            │
//! │  (Sensor+Cmd+Relay)  (EventSink)     (ConfigPort)              │
//! │  SnapshotMailbox     CommandMailbox  Esp32TimeAdapter          │
//! │  (radio ingestion)   (remote cmds)   (clock)                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  RuleEngine · Safety · Arbitration · Cooldown          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transport task (radio link + cloud uplink, external collaborator)
//! publishes into [`SNAPSHOTS`]/[`COMMANDS`]; the control loop below only
//! ever reads them.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{OutputPin as _, PinDriver};
use esp_idf_hal::peripherals::Peripherals;

use aquanode::adapters::hardware::HardwareAdapter;
use aquanode::adapters::log_sink::LogEventSink;
use aquanode::adapters::mailbox::{CommandMailbox, SnapshotMailbox};
use aquanode::adapters::nvs::NvsConfigStore;
use aquanode::adapters::time::Esp32TimeAdapter;
use aquanode::app::ports::ConfigPort;
use aquanode::app::service::AppService;
use aquanode::drivers::relay::Relay;
use aquanode::pins;
use aquanode::rules::ActuatorId;

// ── Transport mailboxes ───────────────────────────────────────
//
// Static so the (out-of-scope) radio ingestion and remote-command
// tasks can publish into them from their own FreeRTOS contexts.

static SNAPSHOTS: SnapshotMailbox = SnapshotMailbox::new();
static COMMANDS: CommandMailbox = CommandMailbox::new();

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AquaNode v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    // Taking the default partition also initialises nvs_flash; the
    // binding stays alive for the whole of main so the raw handles in
    // NvsConfigStore remain valid.
    let _nvs_partition = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
    let nvs = NvsConfigStore::new();
    let config = match nvs.load() {
        Ok(c) => c,
        Err(e) => {
            warn!("config load failed ({e}), running with defaults");
            aquanode::config::SystemConfig::default()
        }
    };

    // A config that would oscillate a relay is a build/provisioning
    // error: refuse to run rather than chatter hardware forever.
    if let Err(e) = config.validate() {
        error!("invalid configuration: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let loop_interval_ms = config.control_loop_interval_ms;

    // ── 3. Relay bank (channel order matches pins::RELAY_PINS) ─
    let peripherals = Peripherals::take()?;
    let p = peripherals.pins;
    let active_high = pins::RELAY_ACTIVE_HIGH;
    let relays = [
        Relay::new(PinDriver::output(p.gpio4.downgrade_output())?, active_high, ActuatorId::Fan.name()),
        Relay::new(PinDriver::output(p.gpio5.downgrade_output())?, active_high, ActuatorId::Heater.name()),
        Relay::new(PinDriver::output(p.gpio6.downgrade_output())?, active_high, ActuatorId::Cooler.name()),
        Relay::new(PinDriver::output(p.gpio7.downgrade_output())?, active_high, ActuatorId::Pump.name()),
        Relay::new(PinDriver::output(p.gpio15.downgrade_output())?, active_high, ActuatorId::Light.name()),
        Relay::new(PinDriver::output(p.gpio16.downgrade_output())?, active_high, ActuatorId::DoseRaise.name()),
        Relay::new(PinDriver::output(p.gpio17.downgrade_output())?, active_high, ActuatorId::DoseLower.name()),
        Relay::new(PinDriver::output(p.gpio18.downgrade_output())?, active_high, ActuatorId::Valve.name()),
    ];

    let mut hw = HardwareAdapter::new(relays, &SNAPSHOTS, &COMMANDS);
    let mut sink = LogEventSink::new();
    let time = Esp32TimeAdapter::new();

    // ── 4. Application service ────────────────────────────────
    let mut app = AppService::new(config)?;
    app.start(&mut sink);

    // ── 5. Control loop ───────────────────────────────────────
    // Fixed cadence; every timing decision inside the engine is a
    // deadline comparison, so nothing here ever blocks beyond the
    // inter-cycle delay.
    loop {
        let now_ms = time.uptime_ms();
        app.tick(&mut hw, &mut sink, now_ms, time.minute_of_day());
        app.auto_save_if_needed(&nvs);
        FreeRtos::delay_ms(loop_interval_ms);
    }
}
