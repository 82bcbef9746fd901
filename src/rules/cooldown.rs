//! Relay cooldown guard.
//!
//! Mechanical relays arc and wear when cycled fast; the guard enforces a
//! minimum interval between physical state changes of one relay, no
//! matter which controller asked.  A blocked request is *deferred*, not
//! dropped: the previous physical state is retained and the caller
//! re-presents its desired state next cycle, so the change lands as soon
//! as the interval allows.

/// Cooldown guard for a single relay channel.
#[derive(Debug, Default)]
pub struct RelayGuard {
    current: bool,
    /// Time of the last physical change; `None` until the first one,
    /// which is always allowed.
    last_change_ms: Option<u64>,
}

impl RelayGuard {
    /// Present the desired state; returns the physical state to drive.
    pub fn request(&mut self, desired: bool, cooldown_ms: u64, now_ms: u64) -> bool {
        if desired != self.current {
            let allowed = match self.last_change_ms {
                None => true,
                Some(t) => now_ms.saturating_sub(t) >= cooldown_ms,
            };
            if allowed {
                self.current = desired;
                self.last_change_ms = Some(now_ms);
            }
        }
        self.current
    }

    /// Physical state currently driven.
    pub fn current(&self) -> bool {
        self.current
    }

    /// Apply a state unconditionally (emergency stop path).  The change
    /// still stamps the clock, so the *next* ordinary request honours
    /// the cooldown from here.
    pub fn force(&mut self, state: bool, now_ms: u64) {
        if state != self.current {
            self.current = state;
            self.last_change_ms = Some(now_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: u64 = 5000;

    #[test]
    fn first_change_is_immediate() {
        let mut g = RelayGuard::default();
        assert!(g.request(true, COOLDOWN, 0));
    }

    #[test]
    fn rapid_flip_is_deferred() {
        let mut g = RelayGuard::default();
        assert!(g.request(true, COOLDOWN, 0));
        // Within the cooldown the OFF request is held back...
        assert!(g.request(false, COOLDOWN, 1000));
        assert!(g.request(false, COOLDOWN, 4999));
        // ...and lands on the first cycle after expiry.
        assert!(!g.request(false, COOLDOWN, 5000));
    }

    #[test]
    fn unchanged_requests_never_reset_the_clock() {
        let mut g = RelayGuard::default();
        assert!(g.request(true, COOLDOWN, 0));
        for t in (1000..5000).step_by(1000) {
            g.request(true, COOLDOWN, t);
        }
        // Re-asserting ON must not have pushed the deadline out.
        assert!(!g.request(false, COOLDOWN, 5000));
    }

    #[test]
    fn at_most_one_change_per_interval() {
        let mut g = RelayGuard::default();
        let mut changes = Vec::new();
        let mut prev = g.current();
        // Adversarial pattern: desired state flips every cycle.
        for t in (0..30_000).step_by(1000) {
            let desired = (t / 1000) % 2 == 0;
            let actual = g.request(desired, COOLDOWN, t);
            if actual != prev {
                changes.push(t);
                prev = actual;
            }
        }
        for pair in changes.windows(2) {
            assert!(
                pair[1] - pair[0] >= COOLDOWN,
                "changes at {} and {} violate the cooldown",
                pair[0],
                pair[1]
            );
        }
    }
}
