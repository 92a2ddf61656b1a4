use crate::error::DnsError;
use byteorder::{ReadBytesExt, WriteBytesExt, BE};
use domain_name_query_types::{Name, NameError, MAX_NAME_LENGTH};
use std::collections::HashMap;
use std::io::{Cursor, Read};

// https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
const POINTER_TAG: u8 = 0xc0;
const MAX_POINTER_OFFSET: usize = 0x3fff;

// 读取域名，跟随压缩指针
pub fn read_name(rdr: &mut Cursor<&[u8]>) -> Result<Name, DnsError> {
    let mut labels: Vec<Vec<u8>> = Vec::new();
    let mut wire_length = 1;
    let mut resume_at: Option<u64> = None;
    let mut segment_start = rdr.position();

    loop {
        let len = rdr.read_u8()?;

        match len & POINTER_TAG {
            0x00 => {
                if len == 0 {
                    break;
                }

                wire_length += usize::from(len) + 1;
                if wire_length > MAX_NAME_LENGTH {
                    return Err(NameError::NameTooLong.into());
                }

                let mut label = vec![0; usize::from(len)];
                rdr.read_exact(&mut label)?;
                labels.push(label);
            }
            POINTER_TAG => {
                let low = rdr.read_u8()?;
                let offset = (u16::from(len & !POINTER_TAG) << 8) | u16::from(low);

                // only backwards jumps, which also rules out loops
                if u64::from(offset) >= segment_start {
                    return Err(DnsError::BadPointer(offset));
                }

                if resume_at.is_none() {
                    resume_at = Some(rdr.position());
                }
                rdr.set_position(u64::from(offset));
                segment_start = u64::from(offset);
            }
            other => return Err(DnsError::LabelType(other)),
        }
    }

    if let Some(pos) = resume_at {
        rdr.set_position(pos);
    }

    Ok(Name::from_labels(labels)?)
}

/// Remembers where each name suffix was written so later occurrences can
/// be replaced by a pointer. Offsets are relative to the start of the
/// message, so one compressor belongs to exactly one output buffer.
#[derive(Debug, Default)]
pub struct NameCompressor {
    offsets: HashMap<Vec<Vec<u8>>, u16>,
}

impl NameCompressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_name(&mut self, bytes: &mut Vec<u8>, name: &Name) -> std::io::Result<()> {
        let labels = name.labels();

        for i in 0..labels.len() {
            let suffix: Vec<Vec<u8>> = labels[i..].iter().map(|l| l.to_ascii_lowercase()).collect();

            if let Some(&offset) = self.offsets.get(&suffix) {
                bytes.write_u16::<BE>((u16::from(POINTER_TAG) << 8) | offset)?;
                return Ok(());
            }

            let here = bytes.len();
            if here <= MAX_POINTER_OFFSET {
                self.offsets.insert(suffix, here as u16);
            }

            bytes.push(labels[i].len() as u8);
            bytes.extend_from_slice(&labels[i]);
        }

        bytes.push(0);

        Ok(())
    }
}
