use chrono::{Datelike, NaiveDate};
use configuration::Zone;
use dns::{RData, ResourceRecord, Soa};

use crate::clock::{Clock, SystemClock};

/// Builds the zone's SOA and NS records. Nothing is cached, every call
/// returns fresh values and the only input besides the zone is the clock.
pub struct ZoneRecords {
    zone: Zone,
    clock: Box<dyn Clock>,
}

impl ZoneRecords {
    pub fn new(zone: Zone) -> Self {
        Self::with_clock(zone, SystemClock)
    }

    pub fn with_clock<C: Clock + 'static>(zone: Zone, clock: C) -> Self {
        Self {
            zone,
            clock: Box::new(clock),
        }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// `YYYYMMDD` followed by the two digit revision, e.g. `2025021900`.
    pub fn serial_for(&self, date: NaiveDate) -> u32 {
        let day_stamp = i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day());
        let serial = day_stamp * 100 + i64::from(self.zone.serial_revision);

        serial.clamp(0, i64::from(u32::MAX)) as u32
    }

    pub fn serial(&self) -> u32 {
        self.serial_for(self.clock.today())
    }

    pub fn soa_at(&self, date: NaiveDate) -> ResourceRecord {
        let soa = Soa {
            mname: self.zone.server_name.clone(),
            rname: self.zone.rname.clone(),
            serial: self.serial_for(date),
            refresh: self.zone.refresh,
            retry: self.zone.retry,
            expire: self.zone.expire,
            minimum: self.zone.minimum,
        };

        ResourceRecord::new(self.zone.base_domain.clone(), self.zone.dns_ttl, RData::Soa(soa))
    }

    pub fn build_soa(&self) -> ResourceRecord {
        self.soa_at(self.clock.today())
    }

    pub fn build_ns(&self) -> ResourceRecord {
        ResourceRecord::new(
            self.zone.base_domain.clone(),
            self.zone.dns_ttl,
            RData::Ns(self.zone.server_name.clone()),
        )
    }
}
