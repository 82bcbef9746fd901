//! Arbitration layer.
//!
//! One total function per actuator and cycle:
//!
//! ```text
//!   emergency > manual > automatic
//! ```
//!
//! The ordering is a strict invariant, enforced here and nowhere else —
//! no controller is allowed its own ad-hoc manual check.  Emergency
//! forces exist for the pump and drain valve (float switch) and for
//! every actuator while an operator emergency stop is latched.

use super::context::CommandState;

/// Resolve one actuator's final logical state for this cycle.
pub fn resolve(auto_decision: bool, command: CommandState, emergency: Option<bool>) -> bool {
    if let Some(forced) = emergency {
        return forced;
    }
    if !command.is_auto {
        return command.value;
    }
    auto_decision
}

/// Per-actuator record of how the final state was reached, exposed for
/// observability every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionTrace {
    /// What the automatic rule wanted.
    pub auto_decision: bool,
    /// The manual-override command in effect.
    pub command: CommandState,
    /// The emergency force, if one applied.
    pub emergency: Option<bool>,
    /// Outcome of [`resolve`].
    pub final_state: bool,
    /// Physical relay state after the cooldown guard.
    pub physical: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_wins_without_overrides() {
        assert!(resolve(true, CommandState::AUTO, None));
        assert!(!resolve(false, CommandState::AUTO, None));
    }

    #[test]
    fn manual_beats_auto() {
        assert!(!resolve(true, CommandState::manual(false), None));
        assert!(resolve(false, CommandState::manual(true), None));
    }

    #[test]
    fn emergency_beats_manual() {
        // The case that matters: manual ON while the emergency forces OFF.
        assert!(!resolve(true, CommandState::manual(true), Some(false)));
        assert!(resolve(false, CommandState::manual(false), Some(true)));
    }

    #[test]
    fn emergency_is_insensitive_to_command_toggling() {
        for is_auto in [false, true] {
            for value in [false, true] {
                let cmd = CommandState { is_auto, value };
                assert!(!resolve(true, cmd, Some(false)));
            }
        }
    }
}
