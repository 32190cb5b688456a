// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

/// Trailing-edge debounce driven by caller-supplied time.
///
/// Every [`arm`](Self::arm) pushes the deadline out to `now + quiet`; [`poll`](Self::poll)
/// fires once the deadline has passed and disarms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, deadline: None }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Arms with a deadline of `now`, so the next poll fires.
    pub fn arm_immediately(&mut self, now: Instant) {
        self.deadline = Some(now);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::Debouncer;

    #[test]
    fn fires_once_after_the_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        assert!(!debouncer.poll(start));

        debouncer.arm(start);
        assert!(!debouncer.poll(start + Duration::from_secs(1)));
        assert!(debouncer.poll(start + Duration::from_secs(2)));
        assert!(!debouncer.poll(start + Duration::from_secs(3)));
        assert!(!debouncer.is_armed());
    }

    #[test]
    fn rearming_pushes_the_deadline_out() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.arm(start);
        debouncer.arm(start + Duration::from_secs(1));
        assert!(!debouncer.poll(start + Duration::from_secs(2)));
        assert!(debouncer.poll(start + Duration::from_secs(3)));
    }

    #[test]
    fn cancel_and_immediate_arm() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.arm(start);
        debouncer.cancel();
        assert!(!debouncer.poll(start + Duration::from_secs(5)));

        debouncer.arm_immediately(start);
        assert_eq!(debouncer.deadline(), Some(start));
        assert!(debouncer.poll(start));
    }
}
