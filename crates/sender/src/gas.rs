//! Gas price escalation for rollup transactions.
//!
//! A submission starts at the market price, or replaces a previous transaction at the same nonce,
//! and bumps its price by at least ten percent every time the node rejects it as underpriced. The
//! price never exceeds the ceiling derived from the market price.

/// The numerator of the minimum replacement bump.
const BUMP_NUMERATOR: u128 = 11;

/// The denominator of the minimum replacement bump.
const BUMP_DENOMINATOR: u128 = 10;

/// The escalation bounds for a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEscalationPolicy {
    max_increase_percentage: u64,
}

impl GasEscalationPolicy {
    /// Returns a new [`GasEscalationPolicy`] allowing prices up to `max_increase_percentage` over
    /// the market price.
    pub const fn new(max_increase_percentage: u64) -> Self {
        Self { max_increase_percentage }
    }

    /// Returns the highest price allowed for the provided market price.
    pub const fn ceiling(&self, base_price: u128) -> u128 {
        let increase = base_price.saturating_mul(self.max_increase_percentage as u128) / 100;
        base_price.saturating_add(increase)
    }

    /// Returns the smallest price accepted by the node as a replacement for `previous`.
    pub const fn bump(previous: u128) -> u128 {
        previous.saturating_mul(BUMP_NUMERATOR).div_ceil(BUMP_DENOMINATOR)
    }

    /// Proposes the price replacing a transaction sent at `previous`.
    pub fn propose(&self, previous: u128, base_price: u128) -> Escalation {
        let ceiling = self.ceiling(base_price);
        let candidate = Self::bump(previous).max(base_price);
        if candidate > ceiling {
            return Escalation::Abort { candidate, ceiling };
        }
        Escalation::Replace(candidate)
    }
}

/// The outcome of a replacement proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Replace the transaction at the provided price.
    Replace(u128),
    /// The required price is above the ceiling.
    Abort {
        /// The required price.
        candidate: u128,
        /// The ceiling.
        ceiling: u128,
    },
}

/// The next step of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasDecision {
    /// Broadcast at the provided price.
    Broadcast(u128),
    /// Give up the cycle without broadcasting.
    CeilingExceeded {
        /// The required price.
        candidate: u128,
        /// The ceiling.
        ceiling: u128,
    },
    /// The attempt budget is spent.
    Exhausted(u32),
}

/// Tracks the gas price of a single submission across underpriced rejections.
#[derive(Debug, Clone)]
pub struct GasEscalation {
    policy: GasEscalationPolicy,
    base_price: u128,
    last: Option<u128>,
    attempts: u32,
    max_attempts: u32,
}

impl GasEscalation {
    /// Starts an escalation at `base_price`. When `previous` is set the first broadcast replaces a
    /// transaction sent at that price.
    pub const fn start(
        policy: GasEscalationPolicy,
        base_price: u128,
        previous: Option<u128>,
        max_attempts: u32,
    ) -> Self {
        Self { policy, base_price, last: previous, attempts: 0, max_attempts }
    }

    /// Returns the number of broadcasts decided so far.
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Decides the next step. Called once to start and once after every underpriced rejection.
    pub fn next_decision(&mut self) -> GasDecision {
        if self.attempts >= self.max_attempts {
            return GasDecision::Exhausted(self.attempts);
        }

        let price = match self.last {
            None => self.base_price,
            Some(previous) => match self.policy.propose(previous, self.base_price) {
                Escalation::Replace(price) => price,
                Escalation::Abort { candidate, ceiling } => {
                    return GasDecision::CeilingExceeded { candidate, ceiling }
                }
            },
        };

        self.last = Some(price);
        self.attempts += 1;
        GasDecision::Broadcast(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling() {
        let policy = GasEscalationPolicy::new(50);
        assert_eq!(policy.ceiling(100), 150);
        assert_eq!(policy.ceiling(0), 0);
        assert_eq!(GasEscalationPolicy::new(0).ceiling(100), 100);
    }

    #[test]
    fn test_bump_is_at_least_ten_percent() {
        assert_eq!(GasEscalationPolicy::bump(100), 110);
        assert_eq!(GasEscalationPolicy::bump(101), 112);
        assert_eq!(GasEscalationPolicy::bump(1), 2);
    }

    #[test]
    fn test_propose_aborts_above_ceiling() {
        let policy = GasEscalationPolicy::new(50);
        assert_eq!(policy.propose(100, 100), Escalation::Replace(110));
        assert_eq!(policy.propose(140, 100), Escalation::Abort { candidate: 154, ceiling: 150 });
        // a stale previous price is lifted to the market price
        assert_eq!(policy.propose(50, 100), Escalation::Replace(100));
    }

    #[test]
    fn test_escalation_is_monotonic_and_bounded() {
        let base = 1_000_000_007;
        let policy = GasEscalationPolicy::new(80);
        let mut escalation = GasEscalation::start(policy, base, None, 100);

        let mut prices = Vec::new();
        let last = loop {
            match escalation.next_decision() {
                GasDecision::Broadcast(price) => prices.push(price),
                decision => break decision,
            }
        };

        assert_eq!(prices[0], base);
        for pair in prices.windows(2) {
            assert!(pair[1] * 10 >= pair[0] * 11);
        }
        assert!(prices.iter().all(|price| *price <= policy.ceiling(base)));
        assert!(matches!(last, GasDecision::CeilingExceeded { .. }));
    }

    #[test]
    fn test_escalation_replaces_previous() {
        let mut escalation = GasEscalation::start(GasEscalationPolicy::new(50), 100, Some(120), 10);
        assert_eq!(escalation.next_decision(), GasDecision::Broadcast(132));
        assert_eq!(escalation.next_decision(), GasDecision::Broadcast(146));
        assert_eq!(escalation.next_decision(), GasDecision::CeilingExceeded {
            candidate: 161,
            ceiling: 150
        });
    }

    #[test]
    fn test_escalation_exhausts_attempts() {
        let mut escalation = GasEscalation::start(GasEscalationPolicy::new(1000), 100, None, 2);
        assert_eq!(escalation.next_decision(), GasDecision::Broadcast(100));
        assert_eq!(escalation.next_decision(), GasDecision::Broadcast(110));
        assert_eq!(escalation.next_decision(), GasDecision::Exhausted(2));
        assert_eq!(escalation.attempts(), 2);
    }
}
