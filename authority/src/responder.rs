use dns::{QType, Query, Rcode, ResponseMessage};
use std::fmt;

use crate::records::ZoneRecords;

/// What a query gets answered with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    SoaAnswer,
    NsAnswer,
    NxDomain,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Classification::SoaAnswer => "SOA answer",
            Classification::NsAnswer => "NS answer",
            Classification::NxDomain => "NXDOMAIN",
        };
        write!(f, "{}", s)
    }
}

/// Answers every query authoritatively: SOA and NS get the zone's records,
/// everything else is NXDOMAIN with the SOA in the authority section.
pub struct Responder {
    records: ZoneRecords,
}

impl Responder {
    pub fn new(records: ZoneRecords) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &ZoneRecords {
        &self.records
    }

    pub fn classify(&self, query: &Query) -> Classification {
        let zone = self.records.zone();
        if zone.enforce_zone && !query.name.is_subdomain_of(&zone.base_domain) {
            return Classification::NxDomain;
        }

        match query.q_type {
            QType::Soa => Classification::SoaAnswer,
            QType::Ns => Classification::NsAnswer,
            QType::A
            | QType::Cname
            | QType::Ptr
            | QType::Mx
            | QType::Txt
            | QType::Aaaa
            | QType::Srv
            | QType::Opt
            | QType::Axfr
            | QType::Any
            | QType::Unknown(_) => Classification::NxDomain,
        }
    }

    pub fn respond(&self, query: &Query) -> ResponseMessage {
        let mut response = ResponseMessage::for_query(query);
        response.set_authoritative(true);

        let classification = self.classify(query);
        match classification {
            Classification::SoaAnswer => {
                response.add_answer(self.records.build_soa().with_owner(query.name.clone()));
            }
            Classification::NsAnswer => {
                response.add_answer(self.records.build_ns().with_owner(query.name.clone()));
            }
            Classification::NxDomain => {
                response.set_rcode(Rcode::NxDomain);
                response.add_authority(self.records.build_soa());
            }
        }

        tracing::info!(
            "query id {} for {} {}, responding {}",
            query.id,
            query.name,
            query.q_type,
            classification
        );

        response
    }
}
