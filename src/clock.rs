use chrono::{DateTime, Utc};

/// Time source for the lifecycle services, injected so expiry and day-boundary
/// behavior is deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::Mutex;

    use chrono::Duration;

    use super::*;

    /// Clock pinned to a settable instant.
    pub struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub fn at(t: DateTime<Utc>) -> Self {
            Self(Mutex::new(t))
        }

        pub fn advance(&self, d: Duration) {
            let mut now = self.0.lock().unwrap();
            *now = *now + d;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }
}
