use crate::error::DnsError;
use crate::utils::{read_name, NameCompressor};
use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use domain_name_query_types::{Name, QClass, QType};
use std::io::Cursor;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Question {
    pub name: Name,
    pub qtype: QType,
    pub qclass: QClass,
}

impl Question {
    pub fn new(name: Name, qtype: QType) -> Self {
        Self {
            name,
            qtype,
            qclass: QClass::In,
        }
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>, compressor: &mut NameCompressor) -> std::io::Result<()> {
        compressor.write_name(bytes, &self.name)?;
        bytes.write_u16::<BE>(u16::from(self.qtype))?;
        bytes.write_u16::<BE>(u16::from(self.qclass))?;

        Ok(())
    }

    pub fn parse_from_reader(rdr: &mut Cursor<&[u8]>) -> Result<Self, DnsError> {
        let name = read_name(rdr)?;
        let qtype = QType::from(rdr.read_u16::<BE>()?);
        let qclass = QClass::from(rdr.read_u16::<BE>()?);

        let q = Self {
            name,
            qtype,
            qclass,
        };

        Ok(q)
    }
}
