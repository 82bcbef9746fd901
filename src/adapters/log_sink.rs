//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production).  The cloud uplink adapter
//! implements the same trait on the transport side.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::rules::ActuatorId;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let s = &t.snapshot;
                info!(
                    "TELEM | water={} pH={} air={}/{}% float={} | relays=[{}] | faults=0b{:08b}",
                    fmt_reading(s.water_temp_c),
                    fmt_reading(s.ph),
                    fmt_reading(s.air_temp_c),
                    fmt_reading(s.air_humidity_pct),
                    if s.float_low { "LOW" } else { "ok" },
                    fmt_relays(t),
                    t.fault_flags,
                );
            }
            AppEvent::RelayChanged { actuator, on } => {
                info!(
                    "RELAY | {} -> {}",
                    actuator.name(),
                    if *on { "ON" } else { "OFF" }
                );
            }
            AppEvent::FaultDetected(flags) => {
                info!("FAULT | detected, flags=0b{:08b}", flags);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::ConfigRejected(reason) => {
                info!("CONFIG | rejected: {}", reason);
            }
            AppEvent::Started => {
                info!("START | control loop running");
            }
        }
    }
}

fn fmt_reading(r: Option<f32>) -> heapless::String<8> {
    let mut s = heapless::String::new();
    match r {
        Some(v) => {
            let _ = core::fmt::write(&mut s, format_args!("{v:.1}"));
        }
        None => {
            let _ = s.push_str("?");
        }
    }
    s
}

fn fmt_relays(t: &crate::app::events::TelemetryData) -> heapless::String<{ ActuatorId::COUNT }> {
    let mut s = heapless::String::new();
    for id in ActuatorId::ALL {
        let _ = s.push(if t.traces[id as usize].physical { '#' } else { '.' });
    }
    s
}
