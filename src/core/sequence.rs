// LogDash - core/sequence.rs
//
// Sequence gate for discarding superseded remote responses.
// Every outgoing request takes the next number; a response is applied only
// if its number is still the latest issued.

/// Per-channel request counter.
#[derive(Debug, Clone, Default)]
pub struct SequenceGate {
    latest: u64,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number. Earlier numbers become stale.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// True if `seq` is the most recently issued number.
    pub fn is_latest(&self, seq: u64) -> bool {
        seq != 0 && seq == self.latest
    }

    /// Invalidate any outstanding number without issuing a request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_is_current() {
        let mut gate = SequenceGate::new();
        let a = gate.issue();
        let b = gate.issue();
        assert!(a < b);
        assert!(!gate.is_latest(a));
        assert!(gate.is_latest(b));
    }

    #[test]
    fn test_nothing_issued_is_never_latest() {
        let gate = SequenceGate::new();
        assert!(!gate.is_latest(0));
    }

    #[test]
    fn test_invalidate_stales_outstanding() {
        let mut gate = SequenceGate::new();
        let a = gate.issue();
        gate.invalidate();
        assert!(!gate.is_latest(a));
    }
}
