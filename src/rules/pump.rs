//! Circulation pump duty-cycle controller.
//!
//! ```text
//!           ┌──[ on-duration elapsed ]──┐
//!           │                           ▼
//!         ON ◀──[ off-duration ]──── OFF ◀── float low (forced, latched)
//! ```
//!
//! The pump alternates fixed ON/OFF dwells independent of sensor
//! readings.  A triggered float switch forces the phase to OFF
//! immediately — bypassing the duty cycle and any manual ON — and
//! latches until the level recovers; the cycle then resumes from the
//! OFF phase with a fresh phase timer, never mid-dwell.

use log::{info, warn};

use crate::config::SystemConfig;

use super::context::{CommandState, SensorSnapshot};

/// Duty-cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpPhase {
    On,
    Off,
}

/// Pump controller state: current phase plus its start time.
#[derive(Debug)]
pub struct PumpController {
    phase: PumpPhase,
    phase_start_ms: u64,
    /// Float-switch preemption is latched until the level recovers.
    float_latched: bool,
}

impl Default for PumpController {
    fn default() -> Self {
        Self {
            phase: PumpPhase::Off,
            phase_start_ms: 0,
            float_latched: false,
        }
    }
}

impl PumpController {
    /// One evaluation cycle.  Returns the automatic decision (the
    /// emergency tier of the arbiter re-asserts the forced OFF as well).
    pub fn evaluate(
        &mut self,
        snap: &SensorSnapshot,
        command: CommandState,
        config: &SystemConfig,
        now_ms: u64,
    ) -> bool {
        // Safety preemption beats everything, including a manual ON.
        if snap.float_low {
            if !self.float_latched {
                warn!("pump: float switch low — forcing OFF");
                self.float_latched = true;
            }
            self.enter_phase(PumpPhase::Off, now_ms);
            return false;
        }
        if self.float_latched {
            info!("pump: water level recovered — resuming duty cycle from OFF");
            self.float_latched = false;
            // Fresh OFF dwell from the moment of recovery, not from the
            // moment the fault forced the phase.
            self.phase = PumpPhase::Off;
            self.phase_start_ms = now_ms;
            return false;
        }

        // Manual override replaces the phase directly and resets the
        // phase timer, so releasing back to auto continues from a full
        // dwell rather than an instant flip.
        if !command.is_auto {
            let desired = if command.value {
                PumpPhase::On
            } else {
                PumpPhase::Off
            };
            self.enter_phase(desired, now_ms);
            return command.value;
        }

        let elapsed = now_ms.saturating_sub(self.phase_start_ms);
        match self.phase {
            PumpPhase::On if elapsed >= config.pump_on_ms() => {
                self.enter_phase(PumpPhase::Off, now_ms);
            }
            PumpPhase::Off if elapsed >= config.pump_off_ms() => {
                self.enter_phase(PumpPhase::On, now_ms);
            }
            _ => {}
        }
        self.phase == PumpPhase::On
    }

    pub fn phase(&self) -> PumpPhase {
        self.phase
    }

    fn enter_phase(&mut self, phase: PumpPhase, now_ms: u64) {
        if self.phase != phase {
            self.phase = phase;
            self.phase_start_ms = now_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_MS: u64 = 1000;

    fn cfg() -> SystemConfig {
        SystemConfig {
            pump_on_minutes: 2,
            pump_off_minutes: 3,
            ..Default::default()
        }
    }

    fn dry() -> SensorSnapshot {
        SensorSnapshot::default()
    }

    fn low_water() -> SensorSnapshot {
        SensorSnapshot {
            float_low: true,
            ..Default::default()
        }
    }

    /// Drive the controller tick by tick and return the decisions.
    fn run(pump: &mut PumpController, snap: &SensorSnapshot, from_ms: u64, ticks: u64) -> Vec<bool> {
        (0..ticks)
            .map(|i| pump.evaluate(snap, CommandState::AUTO, &cfg(), from_ms + i * TICK_MS))
            .collect()
    }

    #[test]
    fn starts_in_off_phase() {
        let mut pump = PumpController::default();
        assert!(!pump.evaluate(&dry(), CommandState::AUTO, &cfg(), 0));
        assert_eq!(pump.phase(), PumpPhase::Off);
    }

    #[test]
    fn off_to_on_after_off_duration() {
        let mut pump = PumpController::default();
        let decisions = run(&mut pump, &dry(), 0, 3 * 60 + 1);
        assert!(!decisions[3 * 60 - 1], "still OFF one tick before the dwell");
        assert!(decisions[3 * 60], "ON once off-duration has elapsed");
    }

    #[test]
    fn full_cycle_timing() {
        let mut pump = PumpController::default();
        // OFF for 3 min, ON for 2 min, back OFF.
        let decisions = run(&mut pump, &dry(), 0, 5 * 60 + 1);
        assert!(!decisions[60]); // mid OFF-phase
        assert!(decisions[3 * 60 + 60]); // mid ON-phase
        assert!(!decisions[5 * 60], "returns to OFF after on-duration");
    }

    #[test]
    fn float_forces_off_mid_on_phase() {
        let mut pump = PumpController::default();
        run(&mut pump, &dry(), 0, 3 * 60 + 10); // into the ON phase
        assert_eq!(pump.phase(), PumpPhase::On);

        let t = (3 * 60 + 10) * TICK_MS;
        assert!(!pump.evaluate(&low_water(), CommandState::AUTO, &cfg(), t));
        assert_eq!(pump.phase(), PumpPhase::Off);
    }

    #[test]
    fn float_beats_manual_on() {
        let mut pump = PumpController::default();
        assert!(
            !pump.evaluate(&low_water(), CommandState::manual(true), &cfg(), 0),
            "manual ON must not run the pump dry"
        );
    }

    #[test]
    fn cycle_resumes_from_off_after_float_clears() {
        let mut pump = PumpController::default();
        run(&mut pump, &dry(), 0, 3 * 60 + 10); // ON phase, 10 s in
        let t0 = (3 * 60 + 20) * TICK_MS;
        pump.evaluate(&low_water(), CommandState::AUTO, &cfg(), t0);

        // Level recovers: must restart the OFF dwell in full, not resume
        // the interrupted ON phase.
        let t1 = t0 + 60 * TICK_MS;
        assert!(!pump.evaluate(&dry(), CommandState::AUTO, &cfg(), t1));
        assert_eq!(pump.phase(), PumpPhase::Off);

        // A full off-duration after recovery the pump starts again.
        let decisions = run(&mut pump, &dry(), t1 + TICK_MS, 3 * 60 + 1);
        assert!(decisions[3 * 60 - 1]);
    }

    #[test]
    fn manual_override_sets_phase_and_resets_timer() {
        let mut pump = PumpController::default();
        assert!(pump.evaluate(&dry(), CommandState::manual(true), &cfg(), 0));
        assert_eq!(pump.phase(), PumpPhase::On);

        // Release to auto 30 s later: the ON dwell restarts from the
        // override, so the pump keeps running for the full on-duration.
        let decisions = run(&mut pump, &dry(), 30 * TICK_MS, 2 * 60 - 30);
        assert!(decisions.iter().all(|&d| d));
    }
}
