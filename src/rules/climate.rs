//! Fan / climate controller.
//!
//! Activation is deliberately asymmetric: air temperature above its high
//! threshold OR humidity above its high threshold is each sufficient
//! cause to start the fan, but BOTH must drop below their low thresholds
//! before it stops.  The two metrics share one actuator, so the
//! combination is expressed as the OR of two hysteresis evaluators over
//! the same current state — which reduces exactly to
//! OR-to-activate / AND-to-deactivate.

use crate::config::SystemConfig;

use super::context::{ActuatorState, SensorSnapshot};
use super::hysteresis::Hysteresis;

/// Fan controller over air temperature and humidity.
#[derive(Debug, Default)]
pub struct FanController {
    state: ActuatorState,
}

impl FanController {
    /// One evaluation cycle.  Returns the automatic decision.
    ///
    /// The fan rule references both air fields; if either is unknown the
    /// fan holds its previous state for the cycle.
    pub fn evaluate(&mut self, snap: &SensorSnapshot, config: &SystemConfig, now_ms: u64) -> bool {
        let (Some(temp), Some(humidity)) = (snap.air_temp_c, snap.air_humidity_pct) else {
            return self.state.on();
        };

        let by_temp = Hysteresis::rising(config.fan_air_temp_on_c, config.fan_air_temp_off_c);
        let by_humidity =
            Hysteresis::rising(config.fan_humidity_on_pct, config.fan_humidity_off_pct);

        let current = self.state.on();
        let next = by_temp.next(Some(temp), current) || by_humidity.next(Some(humidity), current);
        self.state.transition(next, now_ms);
        next
    }

    pub fn is_on(&self) -> bool {
        self.state.on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(temp: f32, humidity: f32) -> SensorSnapshot {
        SensorSnapshot {
            air_temp_c: Some(temp),
            air_humidity_pct: Some(humidity),
            ..Default::default()
        }
    }

    #[test]
    fn hot_air_alone_starts_fan() {
        let cfg = SystemConfig::default();
        let mut fan = FanController::default();
        // 30 °C is above the on-threshold; humidity is far below its band.
        assert!(fan.evaluate(&snap(30.5, 40.0), &cfg, 0));
    }

    #[test]
    fn humid_air_alone_starts_fan() {
        let cfg = SystemConfig::default();
        let mut fan = FanController::default();
        assert!(fan.evaluate(&snap(22.0, 90.0), &cfg, 0));
    }

    #[test]
    fn fan_stops_only_when_both_clear() {
        let cfg = SystemConfig::default();
        let mut fan = FanController::default();
        assert!(fan.evaluate(&snap(30.5, 90.0), &cfg, 0));

        // Temperature cleared, humidity still above its off-threshold.
        assert!(fan.evaluate(&snap(25.0, 75.0), &cfg, 1000));
        // Humidity cleared, temperature re-elevated past its off-threshold.
        assert!(fan.evaluate(&snap(28.0, 60.0), &cfg, 2000));
        // Both below their off-thresholds.
        assert!(!fan.evaluate(&snap(25.0, 60.0), &cfg, 3000));
    }

    #[test]
    fn unknown_field_holds_state() {
        let cfg = SystemConfig::default();
        let mut fan = FanController::default();
        assert!(fan.evaluate(&snap(30.5, 40.0), &cfg, 0));

        let partial = SensorSnapshot {
            air_temp_c: None,
            air_humidity_pct: Some(10.0),
            ..Default::default()
        };
        assert!(
            fan.evaluate(&partial, &cfg, 1000),
            "missing temperature must hold the fan, not stop it"
        );
    }

    #[test]
    fn dead_band_does_not_restart_fan() {
        let cfg = SystemConfig::default();
        let mut fan = FanController::default();
        // Between off and on thresholds on both metrics: stay off.
        assert!(!fan.evaluate(&snap(28.0, 80.0), &cfg, 0));
    }
}
