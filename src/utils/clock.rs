use chrono::{DateTime, Utc};

///
/// The source of 'now' for every time comparison in the service.
///
/// Tests pin the clock to a fixed instant so lockout and expiry windows can be
/// crossed without sleeping.
///
#[derive(Debug, Default)]
pub struct Clock {
    fixed: Option<DateTime<Utc>>
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        self.fixed.unwrap_or_else(Utc::now)
    }

    ///
    /// Pin the clock to the given instant until resumed.
    ///
    pub fn fix(&mut self, fixed: DateTime<Utc>) {
        self.fixed = Some(fixed);
    }

    ///
    /// Let the clock track the real time again.
    ///
    pub fn resume(&mut self) {
        self.fixed = None;
    }
}
