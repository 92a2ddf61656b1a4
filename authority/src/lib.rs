//! The authoritative core: record construction and the query classifier.

mod clock;
mod records;
mod responder;

pub use clock::{Clock, FixedDate, SystemClock};
pub use records::ZoneRecords;
pub use responder::{Classification, Responder};
