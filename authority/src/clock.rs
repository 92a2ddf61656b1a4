use chrono::{NaiveDate, Utc};

/// Source of the current UTC date for SOA serials.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Clone, Copy, Debug)]
pub struct FixedDate(pub NaiveDate);

impl Clock for FixedDate {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl Clock for fn() -> NaiveDate {
    fn today(&self) -> NaiveDate {
        self()
    }
}
