/// Identifies one issued refresh request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshToken(u64);

impl RefreshToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tokens for one refresh routine
///
/// Only the response carrying the most recently issued token is applied;
/// anything older has been superseded and is dropped.
#[derive(Debug, Default, Clone)]
pub struct RefreshTracker {
    latest: u64,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token, superseding every earlier one
    pub fn issue(&mut self) -> RefreshToken {
        self.latest += 1;
        RefreshToken(self.latest)
    }

    /// Supersede every outstanding token without starting a refresh
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, token: RefreshToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_is_current() {
        let mut tracker = RefreshTracker::new();
        let first = tracker.issue();
        let second = tracker.issue();

        assert!(first < second);
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }

    #[test]
    fn test_invalidate_supersedes_outstanding_token() {
        let mut tracker = RefreshTracker::new();
        let token = tracker.issue();
        tracker.invalidate();
        assert!(!tracker.is_current(token));
        let next = tracker.issue();
        assert!(tracker.is_current(next));
    }
}
