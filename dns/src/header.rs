use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use std::fmt;
use std::io::Cursor;

// https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
//
//   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
const QR: u16 = 0x8000;
const AA: u16 = 0x0400;
const TC: u16 = 0x0200;
const RD: u16 = 0x0100;
const RA: u16 = 0x0080;
const CD: u16 = 0x0010;
const OPCODE_SHIFT: u16 = 11;
const OPCODE_MASK: u16 = 0x7800;
const RCODE_MASK: u16 = 0x000f;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rcode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    Unknown(u8),
}

impl From<u8> for Rcode {
    fn from(value: u8) -> Self {
        match value {
            0 => Rcode::NoError,
            1 => Rcode::FormErr,
            2 => Rcode::ServFail,
            3 => Rcode::NxDomain,
            4 => Rcode::NotImp,
            5 => Rcode::Refused,
            other => Rcode::Unknown(other),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(rcode: Rcode) -> Self {
        match rcode {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NxDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::Unknown(code) => code & 0x0f,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rcode::NoError => write!(f, "NOERROR"),
            Rcode::FormErr => write!(f, "FORMERR"),
            Rcode::ServFail => write!(f, "SERVFAIL"),
            Rcode::NxDomain => write!(f, "NXDOMAIN"),
            Rcode::NotImp => write!(f, "NOTIMP"),
            Rcode::Refused => write!(f, "REFUSED"),
            Rcode::Unknown(code) => write!(f, "RCODE{}", code),
        }
    }
}

/// The 16 flag bits of the header.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Flags(u16);

impl Flags {
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    fn set(&mut self, mask: u16, on: bool) {
        if on {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    pub fn is_response(self) -> bool {
        self.0 & QR != 0
    }

    pub fn set_response(&mut self, on: bool) {
        self.set(QR, on)
    }

    pub fn opcode(self) -> u8 {
        ((self.0 & OPCODE_MASK) >> OPCODE_SHIFT) as u8
    }

    pub fn set_opcode(&mut self, opcode: u8) {
        self.0 = (self.0 & !OPCODE_MASK) | ((u16::from(opcode) << OPCODE_SHIFT) & OPCODE_MASK);
    }

    pub fn is_authoritative(self) -> bool {
        self.0 & AA != 0
    }

    pub fn set_authoritative(&mut self, on: bool) {
        self.set(AA, on)
    }

    pub fn is_truncated(self) -> bool {
        self.0 & TC != 0
    }

    pub fn set_truncated(&mut self, on: bool) {
        self.set(TC, on)
    }

    pub fn recursion_desired(self) -> bool {
        self.0 & RD != 0
    }

    pub fn set_recursion_desired(&mut self, on: bool) {
        self.set(RD, on)
    }

    pub fn recursion_available(self) -> bool {
        self.0 & RA != 0
    }

    pub fn set_recursion_available(&mut self, on: bool) {
        self.set(RA, on)
    }

    pub fn checking_disabled(self) -> bool {
        self.0 & CD != 0
    }

    pub fn set_checking_disabled(&mut self, on: bool) {
        self.set(CD, on)
    }

    pub fn rcode(self) -> Rcode {
        Rcode::from((self.0 & RCODE_MASK) as u8)
    }

    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.0 = (self.0 & !RCODE_MASK) | u16::from(u8::from(rcode));
    }
}

// 12 bytes
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub id: u16,
    pub flags: Flags,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    pub fn new(id: u16, flags: Flags) -> Self {
        Self {
            id,
            flags,
            qdcount: 0,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        }
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> std::io::Result<()> {
        bytes.write_u16::<BE>(self.id)?;
        bytes.write_u16::<BE>(self.flags.bits())?;
        bytes.write_u16::<BE>(self.qdcount)?;
        bytes.write_u16::<BE>(self.ancount)?;
        bytes.write_u16::<BE>(self.nscount)?;
        bytes.write_u16::<BE>(self.arcount)?;

        Ok(())
    }

    pub fn parse_from_reader(rdr: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        let id = rdr.read_u16::<BE>()?;
        let flags = Flags::from_bits(rdr.read_u16::<BE>()?);
        let qdcount = rdr.read_u16::<BE>()?;
        let ancount = rdr.read_u16::<BE>()?;
        let nscount = rdr.read_u16::<BE>()?;
        let arcount = rdr.read_u16::<BE>()?;

        let h = Self {
            id,
            flags,
            qdcount,
            ancount,
            nscount,
            arcount,
        };

        Ok(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_bits() {
        let mut flags = Flags::default();
        flags.set_response(true);
        flags.set_authoritative(true);
        flags.set_rcode(Rcode::NxDomain);
        assert_eq!(flags.bits(), 0x8403);

        flags.set_rcode(Rcode::NoError);
        flags.set_authoritative(false);
        assert_eq!(flags.bits(), 0x8000);
    }

    #[test]
    fn opcode_round_trips_through_bits() {
        let mut flags = Flags::from_bits(0x0100);
        flags.set_opcode(2);
        assert_eq!(flags.opcode(), 2);
        assert!(flags.recursion_desired());
        assert_eq!(flags.bits(), 0x1100);
    }

    #[test]
    fn checking_disabled_bit() {
        let mut flags = Flags::from_bits(0x0110);
        assert!(flags.checking_disabled());
        assert!(flags.recursion_desired());

        flags.set_checking_disabled(false);
        assert_eq!(flags.bits(), 0x0100);
    }

    #[test]
    fn parse_header() {
        let bytes: &[u8] = &[0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 1];
        let mut rdr = Cursor::new(bytes);
        let header = Header::parse_from_reader(&mut rdr).unwrap();

        assert_eq!(header.id, 0x1234);
        assert!(!header.flags.is_response());
        assert!(header.flags.recursion_desired());
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.arcount, 1);
    }

    #[test]
    fn short_header_fails() {
        let bytes: &[u8] = &[0x12, 0x34, 0x01];
        let mut rdr = Cursor::new(bytes);
        assert!(Header::parse_from_reader(&mut rdr).is_err());
    }
}
