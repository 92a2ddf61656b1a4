use std::fmt;
use std::str::FromStr;

mod name;

pub use name::{Name, NameError, MAX_LABEL_LENGTH, MAX_NAME_LENGTH};

/// Record and query types. Anything not listed is carried as `Unknown` so
/// newly assigned codes still decode.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum QType {
    A,
    Ns,
    Cname,
    Soa,
    Ptr,
    Mx,
    Txt,
    Aaaa,
    Srv,
    Opt,
    Axfr,
    Any,
    Unknown(u16),
}

impl From<u16> for QType {
    fn from(value: u16) -> Self {
        match value {
            1 => QType::A,
            2 => QType::Ns,
            5 => QType::Cname,
            6 => QType::Soa,
            12 => QType::Ptr,
            15 => QType::Mx,
            16 => QType::Txt,
            28 => QType::Aaaa,
            33 => QType::Srv,
            41 => QType::Opt,
            252 => QType::Axfr,
            255 => QType::Any,
            other => QType::Unknown(other),
        }
    }
}

impl From<QType> for u16 {
    fn from(q_type: QType) -> Self {
        match q_type {
            QType::A => 1,
            QType::Ns => 2,
            QType::Cname => 5,
            QType::Soa => 6,
            QType::Ptr => 12,
            QType::Mx => 15,
            QType::Txt => 16,
            QType::Aaaa => 28,
            QType::Srv => 33,
            QType::Opt => 41,
            QType::Axfr => 252,
            QType::Any => 255,
            QType::Unknown(code) => code,
        }
    }
}

impl fmt::Display for QType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            QType::A => "A",
            QType::Ns => "NS",
            QType::Cname => "CNAME",
            QType::Soa => "SOA",
            QType::Ptr => "PTR",
            QType::Mx => "MX",
            QType::Txt => "TXT",
            QType::Aaaa => "AAAA",
            QType::Srv => "SRV",
            QType::Opt => "OPT",
            QType::Axfr => "AXFR",
            QType::Any => "ANY",
            // RFC 3597 generic type notation
            QType::Unknown(code) => return write!(f, "TYPE{}", code),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for QType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let q_type = match upper.as_str() {
            "A" => QType::A,
            "NS" => QType::Ns,
            "CNAME" => QType::Cname,
            "SOA" => QType::Soa,
            "PTR" => QType::Ptr,
            "MX" => QType::Mx,
            "TXT" => QType::Txt,
            "AAAA" => QType::Aaaa,
            "SRV" => QType::Srv,
            "OPT" => QType::Opt,
            "AXFR" => QType::Axfr,
            "ANY" => QType::Any,
            other => match other.strip_prefix("TYPE").map(str::parse::<u16>) {
                Some(Ok(code)) => QType::from(code),
                _ => return Err(format!("unknown query type '{}'", s)),
            },
        };
        Ok(q_type)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum QClass {
    In,
    Ch,
    Hs,
    Any,
    Unknown(u16),
}

impl From<u16> for QClass {
    fn from(value: u16) -> Self {
        match value {
            1 => QClass::In,
            3 => QClass::Ch,
            4 => QClass::Hs,
            255 => QClass::Any,
            other => QClass::Unknown(other),
        }
    }
}

impl From<QClass> for u16 {
    fn from(q_class: QClass) -> Self {
        match q_class {
            QClass::In => 1,
            QClass::Ch => 3,
            QClass::Hs => 4,
            QClass::Any => 255,
            QClass::Unknown(code) => code,
        }
    }
}

impl fmt::Display for QClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QClass::In => write!(f, "IN"),
            QClass::Ch => write!(f, "CH"),
            QClass::Hs => write!(f, "HS"),
            QClass::Any => write!(f, "ANY"),
            QClass::Unknown(code) => write!(f, "CLASS{}", code),
        }
    }
}

/// A decoded inbound query: one question plus the header fields a reply
/// has to echo.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Query {
    pub id: u16,
    pub name: Name,
    pub q_type: QType,
    pub q_class: QClass,
    pub opcode: u8,
    pub recursion_desired: bool,
    pub checking_disabled: bool,
}

impl Query {
    pub fn new(id: u16, name: Name, q_type: QType) -> Self {
        Self {
            id,
            name,
            q_type,
            q_class: QClass::In,
            opcode: 0,
            recursion_desired: false,
            checking_disabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qtype_codes() {
        assert_eq!(QType::from(6), QType::Soa);
        assert_eq!(QType::from(2), QType::Ns);
        assert_eq!(QType::from(65280), QType::Unknown(65280));
        assert_eq!(u16::from(QType::Aaaa), 28);
        assert_eq!(u16::from(QType::Unknown(999)), 999);
    }

    #[test]
    fn qtype_display_and_parse() {
        assert_eq!(QType::Soa.to_string(), "SOA");
        assert_eq!(QType::Unknown(999).to_string(), "TYPE999");
        assert_eq!("soa".parse::<QType>(), Ok(QType::Soa));
        assert_eq!("TYPE16".parse::<QType>(), Ok(QType::Txt));
        assert_eq!("TYPE999".parse::<QType>(), Ok(QType::Unknown(999)));
        assert!("bogus".parse::<QType>().is_err());
    }

    #[test]
    fn qclass_codes() {
        assert_eq!(QClass::from(1), QClass::In);
        assert_eq!(u16::from(QClass::Ch), 3);
        assert_eq!(QClass::Unknown(42).to_string(), "CLASS42");
    }

    #[test]
    fn query_defaults() {
        let name = Name::from_ascii("romulan.zone").unwrap();
        let query = Query::new(0x1234, name, QType::Ns);
        assert_eq!(query.q_class, QClass::In);
        assert_eq!(query.opcode, 0);
        assert!(!query.recursion_desired);
        assert!(!query.checking_disabled);
    }
}
