use crate::error::DnsError;
use crate::utils::{read_name, NameCompressor};
use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt, BE};
use domain_name_query_types::{Name, QClass, QType};
use std::fmt;
use std::io::{Cursor, Read};

// https://datatracker.ietf.org/doc/html/rfc1035#section-3.3.13
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Soa {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RData {
    Soa(Soa),
    Ns(Name),
    /// Any other type, kept as undecoded octets.
    Other { rtype: QType, data: Vec<u8> },
}

impl RData {
    pub fn rtype(&self) -> QType {
        match self {
            RData::Soa(_) => QType::Soa,
            RData::Ns(_) => QType::Ns,
            RData::Other { rtype, .. } => *rtype,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceRecord {
    pub name: Name,
    pub rclass: QClass,
    pub ttl: u32,
    pub rdata: RData,
}

impl ResourceRecord {
    pub fn new(name: Name, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rclass: QClass::In,
            ttl,
            rdata,
        }
    }

    pub fn rtype(&self) -> QType {
        self.rdata.rtype()
    }

    /// Same record under a different owner name.
    pub fn with_owner(mut self, name: Name) -> Self {
        self.name = name;
        self
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>, compressor: &mut NameCompressor) -> std::io::Result<()> {
        compressor.write_name(bytes, &self.name)?;
        bytes.write_u16::<BE>(u16::from(self.rtype()))?;
        bytes.write_u16::<BE>(u16::from(self.rclass))?;
        bytes.write_u32::<BE>(self.ttl)?;

        // rdlength is patched once the rdata size is known
        let rdlength_at = bytes.len();
        bytes.write_u16::<BE>(0)?;
        let rdata_begin = bytes.len();

        match &self.rdata {
            RData::Soa(soa) => {
                compressor.write_name(bytes, &soa.mname)?;
                compressor.write_name(bytes, &soa.rname)?;
                bytes.write_u32::<BE>(soa.serial)?;
                bytes.write_u32::<BE>(soa.refresh)?;
                bytes.write_u32::<BE>(soa.retry)?;
                bytes.write_u32::<BE>(soa.expire)?;
                bytes.write_u32::<BE>(soa.minimum)?;
            }
            RData::Ns(target) => {
                compressor.write_name(bytes, target)?;
            }
            RData::Other { data, .. } => {
                bytes.extend_from_slice(data);
            }
        }

        let rdlength = (bytes.len() - rdata_begin) as u16;
        BE::write_u16(&mut bytes[rdlength_at..rdata_begin], rdlength);

        Ok(())
    }

    pub fn parse_from_reader(rdr: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let name = read_name(rdr)?;
        let rtype = QType::from(rdr.read_u16::<BE>()?);
        let rclass = QClass::from(rdr.read_u16::<BE>()?);
        let ttl = rdr.read_u32::<BE>()?;
        let rdlength = rdr.read_u16::<BE>()?;
        let rdata_begin = rdr.position();

        let rdata = match rtype {
            QType::Soa => RData::Soa(Soa {
                mname: read_name(rdr)?,
                rname: read_name(rdr)?,
                serial: rdr.read_u32::<BE>()?,
                refresh: rdr.read_u32::<BE>()?,
                retry: rdr.read_u32::<BE>()?,
                expire: rdr.read_u32::<BE>()?,
                minimum: rdr.read_u32::<BE>()?,
            }),
            QType::Ns => RData::Ns(read_name(rdr)?),
            _ => {
                let mut data = vec![0; usize::from(rdlength)];
                rdr.read_exact(&mut data)?;
                RData::Other { rtype, data }
            }
        };

        let consumed = rdr.position() - rdata_begin;
        if consumed != u64::from(rdlength) {
            return Err(DnsError::RdataLength {
                declared: rdlength,
                actual: consumed,
            });
        }

        let record = Self {
            name,
            rclass,
            ttl,
            rdata,
        };

        Ok(record)
    }
}

pub(crate) struct Fqdn<'a>(pub &'a Name);

impl fmt::Display for Fqdn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}.", self.0)
        }
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t",
            Fqdn(&self.name),
            self.ttl,
            self.rclass,
            self.rtype()
        )?;

        match &self.rdata {
            RData::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                Fqdn(&soa.mname),
                Fqdn(&soa.rname),
                soa.serial,
                soa.refresh,
                soa.retry,
                soa.expire,
                soa.minimum
            ),
            RData::Ns(target) => write!(f, "{}", Fqdn(target)),
            RData::Other { data, .. } => {
                // RFC 3597 unknown rdata
                write!(f, "\\# {}", data.len())?;
                if !data.is_empty() {
                    write!(f, " ")?;
                    for b in data {
                        write!(f, "{:02x}", b)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn soa_record() -> ResourceRecord {
        let soa = Soa {
            mname: name("blackhole.romulan.zone"),
            rname: name("hostmaster.romulan.zone"),
            serial: 2025021900,
            refresh: 7200,
            retry: 900,
            expire: 1209600,
            minimum: 86400,
        };
        ResourceRecord::new(name("romulan.zone"), 60, RData::Soa(soa))
    }

    #[test]
    fn ns_record_bytes() {
        let record = ResourceRecord::new(name("a.b"), 60, RData::Ns(name("ns.a.b")));
        let mut bytes = vec![];
        record.to_bytes(&mut bytes, &mut NameCompressor::new()).unwrap();

        let expected = [
            1, b'a', 1, b'b', 0, // owner
            0, 2, 0, 1, 0, 0, 0, 60, // type, class, ttl
            0, 5, // rdlength
            2, b'n', b's', 0xc0, 0, // "ns" + pointer to owner
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn soa_rdlength_covers_compressed_names() {
        let record = soa_record();
        let mut bytes = vec![];
        record.to_bytes(&mut bytes, &mut NameCompressor::new()).unwrap();

        // owner 14, fixed fields 10, mname "blackhole" + ptr 12, rname "hostmaster" + ptr 13, 20 octets of counters
        let rdlength = BE::read_u16(&bytes[22..24]);
        assert_eq!(rdlength, 12 + 13 + 20);
        assert_eq!(bytes.len(), 24 + usize::from(rdlength));

        let mut rdr = Cursor::new(&bytes[..]);
        let parsed = ResourceRecord::parse_from_reader(&mut rdr).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn unknown_rdata_is_opaque() {
        let bytes: &[u8] = &[0, 0, 99, 0, 1, 0, 0, 0, 5, 0, 3, 1, 2, 3];
        let mut rdr = Cursor::new(bytes);
        let record = ResourceRecord::parse_from_reader(&mut rdr).unwrap();

        assert_eq!(record.rtype(), QType::Unknown(99));
        assert_eq!(record.ttl, 5);
        assert_eq!(record.to_string(), ".\t5\tIN\tTYPE99\t\\# 3 010203");
    }

    #[test]
    fn rdlength_mismatch_is_rejected() {
        // NS with rdlength 5 but a 3 octet name
        let bytes: &[u8] = &[0, 0, 2, 0, 1, 0, 0, 0, 5, 0, 5, 1, b'x', 0, 0, 0];
        let mut rdr = Cursor::new(bytes);
        assert!(matches!(
            ResourceRecord::parse_from_reader(&mut rdr),
            Err(DnsError::RdataLength { declared: 5, actual: 3 })
        ));
    }

    #[test]
    fn display_soa() {
        assert_eq!(
            soa_record().to_string(),
            "romulan.zone.\t60\tIN\tSOA\tblackhole.romulan.zone. hostmaster.romulan.zone. 2025021900 7200 900 1209600 86400"
        );
    }
}
